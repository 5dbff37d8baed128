//! BDD step definitions for cluster resets.

use pgprov::{AdminError, ClusterReset};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::ResetContext;

#[given("a cluster reset of \"{cluster}\" on version \"{version}\"")]
fn cluster_reset_of(reset_context: &ResetContext, cluster: String, version: String) {
    reset_context.request.replace(ClusterReset {
        cluster,
        pg_version: Some(version),
        ..ClusterReset::default()
    });
}

#[given("the operator declines the confirmation")]
fn operator_declines(reset_context: &ResetContext) {
    reset_context.answer.set(false);
}

#[given("the operator confirms the reset")]
fn operator_confirms(reset_context: &ResetContext) {
    reset_context.answer.set(true);
}

#[given("dropping the cluster fails")]
fn drop_fails(reset_context: &ResetContext) {
    reset_context
        .runner
        .push_output(Some(1), "", "Error: specified cluster does not exist");
    reset_context.runner.push_success();
}

#[given("creating the cluster fails")]
fn create_fails(reset_context: &ResetContext) {
    reset_context.runner.push_success();
    reset_context.runner.push_failure(1);
}

#[when("the cluster reset runs")]
fn reset_runs(reset_context: &ResetContext) {
    reset_context.run();
}

#[then("the reset is aborted for cluster \"{cluster}\"")]
fn reset_aborted(reset_context: &ResetContext, cluster: String) {
    let outcome = reset_context.outcome.borrow();
    match outcome.as_ref() {
        Some(Err(AdminError::Aborted { cluster: aborted })) => assert_eq!(aborted, &cluster),
        other => panic!("expected an aborted reset, got {other:?}"),
    }
}

#[then("no remote command was issued")]
fn no_remote_command(reset_context: &ResetContext) {
    assert!(
        reset_context.runner.invocations().is_empty(),
        "commands: {:?}",
        reset_context.runner.remote_commands()
    );
}

#[then("the reset succeeds")]
fn reset_succeeds(reset_context: &ResetContext) {
    let outcome = reset_context.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Ok(()))),
        "expected success, got {outcome:?}"
    );
}

#[then("the cluster was recreated with \"{command}\"")]
fn cluster_recreated(reset_context: &ResetContext, command: String) {
    let commands = reset_context.runner.remote_commands();
    assert_eq!(
        commands.last(),
        Some(&format!("sudo -n -u postgres -- {command}")),
        "commands: {commands:?}"
    );
}

#[then("the reset fails with a remote command error")]
fn reset_fails_remotely(reset_context: &ResetContext) {
    let outcome = reset_context.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Err(AdminError::Remote(_)))),
        "expected a remote failure, got {outcome:?}"
    );
}
