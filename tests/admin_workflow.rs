//! End-to-end provisioning flow through the public API.
//!
//! Drives a [`PgAdmin`] over a scripted runner the way a deployment script
//! would: detect the server, create a role and its database, then lock
//! down client authentication.

use pgprov::test_support::ScriptedRunner;
use pgprov::{
    DatabaseRequest, HbaUpload, PgAdmin, PostgresConfig, Session, SshConfig, TemplateStore,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn runner() -> ScriptedRunner {
    ScriptedRunner::new()
}

fn admin(runner: &ScriptedRunner, templates: &TempDir) -> PgAdmin<ScriptedRunner> {
    let mut ssh = SshConfig::for_host("db.internal");
    ssh.user = String::from("deploy");
    let session = Session::new(ssh, runner.clone())
        .unwrap_or_else(|err| panic!("session should build: {err}"));
    let template_dir = templates
        .path()
        .to_str()
        .unwrap_or_else(|| panic!("template dir should be UTF-8"));
    PgAdmin::new(session, PostgresConfig::default())
        .unwrap_or_else(|err| panic!("admin should build: {err}"))
        .with_templates(TemplateStore::new(template_dir))
}

#[rstest]
fn provisions_role_database_and_hba(runner: ScriptedRunner) {
    let templates = TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"));
    std::fs::create_dir_all(templates.path().join("postgres"))
        .unwrap_or_else(|err| panic!("create template dir: {err}"));
    std::fs::write(
        templates.path().join("postgres/pg_hba.conf"),
        "# {{ cluster }} on {{ version }}\nlocal all postgres peer\n",
    )
    .unwrap_or_else(|err| panic!("write template: {err}"));

    let admin = admin(&runner, &templates);

    runner.push_stdout("psql (PostgreSQL) 13.11\n");
    let version = admin.detect_version().expect("version detected");
    assert_eq!(version.to_string(), "13.11");

    runner.push_stdout("0\n");
    assert!(!admin.db_user_exists("app").expect("role lookup"));
    admin
        .create_db_user("app", Some("hunter2"), None)
        .expect("role created");

    runner.push_stdout("0\n");
    assert!(!admin.db_exists("app").expect("database lookup"));
    admin
        .create_db(&DatabaseRequest::new("app").owner("app"))
        .expect("database created");

    let upload = HbaUpload {
        pg_version: Some(version.to_string()),
        ..HbaUpload::default()
    };
    let destination = admin.upload_pg_hba_conf(&upload).expect("hba uploaded");
    assert_eq!(destination.as_str(), "/etc/postgresql/13.11/main/pg_hba.conf");

    let invocations = runner.invocations();
    assert!(
        invocations.iter().all(|inv| inv.program == "ssh"),
        "every command goes through ssh"
    );
    assert!(
        invocations
            .iter()
            .all(|inv| inv.args.iter().any(|arg| arg == "deploy@db.internal")),
        "every command targets the configured host"
    );

    let commands = runner.remote_commands();
    assert_eq!(commands.len(), 8, "commands: {commands:#?}");
    assert_eq!(commands[0], "psql --version");
    assert_eq!(commands[2], "sudo -n -u postgres -- createuser -S -D -R app");
    assert_eq!(commands[3], "sudo -n -u postgres -- psql -v ON_ERROR_STOP=1");
    assert_eq!(commands[5], "sudo -n -u postgres -- createdb -E UTF-8 -O app app");
    assert_eq!(
        commands[6],
        "sudo -n -- tee /etc/postgresql/13.11/main/pg_hba.conf"
    );
    assert_eq!(commands[7], "sudo -n -- service postgresql restart");

    assert_eq!(
        invocations[6].input.as_deref(),
        Some("# main on 13.11\nlocal all postgres peer\n")
    );
    assert!(
        commands.iter().all(|command| !command.contains("hunter2")),
        "password must never appear on a command line"
    );
}
