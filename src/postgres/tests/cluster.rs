//! Version detection, `pg_hba.conf` uploads, and cluster resets.

use rstest::rstest;

use super::{admin, elevated, runner};
use crate::postgres::{AdminError, ClusterReset, HbaUpload, pg_hba_path};
use crate::test_support::{ScriptedConfirm, ScriptedRunner};

#[rstest]
fn detect_version_reports_major_and_minor(runner: ScriptedRunner) {
    runner.push_stdout("psql (PostgreSQL) 12.4.1\n");
    let version = admin(&runner).detect_version().expect("version detected");

    assert_eq!(version.to_string(), "12.4");
    assert_eq!(runner.remote_commands(), vec![String::from("psql --version")]);
}

#[rstest]
fn detect_version_fails_without_match(runner: ScriptedRunner) {
    runner.push_stdout("bash: psql: command not found\n");
    let err = admin(&runner)
        .detect_version()
        .expect_err("detection should fail");

    assert!(
        matches!(err, AdminError::VersionUndetected { ref output } if output.contains("command not found")),
        "unexpected error: {err}"
    );
}

#[rstest]
fn pg_hba_path_follows_debian_layout() {
    assert_eq!(
        pg_hba_path("12.4", "main").as_str(),
        "/etc/postgresql/12.4/main/pg_hba.conf"
    );
}

#[rstest]
fn upload_pg_hba_conf_detects_version_and_restarts(runner: ScriptedRunner) {
    runner.push_stdout("psql (PostgreSQL) 9.6.3\n");
    let destination = admin(&runner)
        .upload_pg_hba_conf(&HbaUpload::default())
        .expect("upload should succeed");

    assert_eq!(destination.as_str(), "/etc/postgresql/9.6/main/pg_hba.conf");
    let invocations = runner.invocations();
    let commands: Vec<String> = invocations.iter().map(|inv| inv.remote_command()).collect();
    assert_eq!(
        commands,
        vec![
            String::from("psql --version"),
            String::from("sudo -n -- tee /etc/postgresql/9.6/main/pg_hba.conf"),
            String::from("sudo -n -- service postgresql restart"),
        ]
    );
    let uploaded = invocations[1].input.clone().unwrap_or_default();
    assert!(uploaded.contains("main cluster (9.6)"), "uploaded: {uploaded}");
}

#[rstest]
fn upload_pg_hba_conf_uses_explicit_version_without_restart(runner: ScriptedRunner) {
    let upload = HbaUpload {
        pg_version: Some(String::from("14")),
        cluster: String::from("replica"),
        restart: false,
        ..HbaUpload::default()
    };
    admin(&runner)
        .upload_pg_hba_conf(&upload)
        .expect("upload should succeed");

    assert_eq!(
        runner.remote_commands(),
        vec![String::from("sudo -n -- tee /etc/postgresql/14/replica/pg_hba.conf")]
    );
}

#[rstest]
fn upload_pg_hba_conf_rejects_traversal_in_cluster(runner: ScriptedRunner) {
    let upload = HbaUpload {
        pg_version: Some(String::from("14")),
        cluster: String::from("../../../tmp"),
        ..HbaUpload::default()
    };
    let err = admin(&runner)
        .upload_pg_hba_conf(&upload)
        .expect_err("traversal should be rejected");

    assert!(
        matches!(err, AdminError::InvalidInput { field: "cluster", .. }),
        "unexpected error: {err}"
    );
    assert!(runner.invocations().is_empty());
}

#[rstest]
fn upload_pg_hba_conf_reports_missing_template(runner: ScriptedRunner) {
    let upload = HbaUpload {
        template_name: Some(String::from("postgres/custom_hba.conf")),
        pg_version: Some(String::from("14")),
        ..HbaUpload::default()
    };
    let err = admin(&runner)
        .upload_pg_hba_conf(&upload)
        .expect_err("unknown template should fail");

    assert!(matches!(err, AdminError::Template(_)), "unexpected error: {err}");
    assert!(runner.invocations().is_empty(), "nothing should be uploaded");
}

#[rstest]
fn reset_cluster_declined_issues_no_commands(runner: ScriptedRunner) {
    let confirm = ScriptedConfirm::answering(false);
    let err = admin(&runner)
        .reset_cluster(&ClusterReset::default(), &confirm)
        .expect_err("declined reset aborts");

    assert!(
        matches!(err, AdminError::Aborted { ref cluster } if cluster == "main"),
        "unexpected error: {err}"
    );
    assert_eq!(confirm.calls(), 1);
    assert!(
        confirm.prompts()[0].starts_with("You are about to drop the main cluster."),
        "prompt: {:?}",
        confirm.prompts()
    );
    assert!(runner.invocations().is_empty(), "no remote command may run");
}

#[rstest]
fn reset_cluster_drops_then_creates(runner: ScriptedRunner) {
    let confirm = ScriptedConfirm::answering(true);
    let reset = ClusterReset {
        pg_version: Some(String::from("12.4")),
        ..ClusterReset::default()
    };
    admin(&runner)
        .reset_cluster(&reset, &confirm)
        .expect("reset should succeed");

    assert_eq!(
        runner.remote_commands(),
        vec![
            elevated("pg_dropcluster --stop 12.4 main"),
            elevated("pg_createcluster --start -e UTF-8 --locale en_US.UTF-8 12.4 main"),
        ]
    );
}

#[rstest]
fn reset_cluster_tolerates_drop_failure(runner: ScriptedRunner) {
    runner.push_output(Some(1), "", "Error: specified cluster does not exist");
    runner.push_success();
    let reset = ClusterReset {
        pg_version: Some(String::from("12.4")),
        ..ClusterReset::default()
    };
    admin(&runner)
        .reset_cluster(&reset, &ScriptedConfirm::answering(true))
        .expect("drop failure is tolerated");

    assert_eq!(runner.invocations().len(), 2);
}

#[rstest]
fn reset_cluster_fails_when_create_fails(runner: ScriptedRunner) {
    runner.push_success();
    runner.push_failure(1);
    let reset = ClusterReset {
        pg_version: Some(String::from("12.4")),
        ..ClusterReset::default()
    };
    let err = admin(&runner)
        .reset_cluster(&reset, &ScriptedConfirm::answering(true))
        .expect_err("create failure is fatal");

    assert!(matches!(err, AdminError::Remote(_)), "unexpected error: {err}");
}

#[rstest]
fn reset_cluster_detects_version_after_confirmation(runner: ScriptedRunner) {
    runner.push_stdout("psql (PostgreSQL) 10.5.0\n");
    let reset = ClusterReset {
        cluster: String::from("analytics"),
        encoding: String::from("SQL_ASCII"),
        locale: String::from("C"),
        ..ClusterReset::default()
    };
    admin(&runner)
        .reset_cluster(&reset, &ScriptedConfirm::answering(true))
        .expect("reset should succeed");

    assert_eq!(
        runner.remote_commands(),
        vec![
            String::from("psql --version"),
            elevated("pg_dropcluster --stop 10.5 analytics"),
            elevated("pg_createcluster --start -e SQL_ASCII --locale C 10.5 analytics"),
        ]
    );
}
