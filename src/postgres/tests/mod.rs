//! Unit tests for the PostgreSQL administration helpers.

use rstest::fixture;

use super::PgAdmin;
use crate::config::PostgresConfig;
use crate::ssh::{Session, SshConfig};
use crate::template::TemplateStore;
use crate::test_support::ScriptedRunner;

mod cluster;

/// Prefix every elevated client tool invocation carries.
const AS_POSTGRES: &str = "sudo -n -u postgres --";

#[fixture]
fn runner() -> ScriptedRunner {
    ScriptedRunner::new()
}

fn admin(runner: &ScriptedRunner) -> PgAdmin<ScriptedRunner> {
    let session = Session::new(SshConfig::for_host("db.example"), runner.clone())
        .unwrap_or_else(|err| panic!("session should build: {err}"));
    PgAdmin::new(session, PostgresConfig::default())
        .unwrap_or_else(|err| panic!("admin should build: {err}"))
        .with_templates(TemplateStore::new("/nonexistent/pgprov-templates"))
}

fn elevated(command: &str) -> String {
    format!("{AS_POSTGRES} {command}")
}
