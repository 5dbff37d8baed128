//! Shared fixtures for cluster reset scenarios.

use std::cell::{Cell, RefCell};

use pgprov::test_support::{ScriptedConfirm, ScriptedRunner};
use pgprov::{AdminError, ClusterReset, PgAdmin, PostgresConfig, Session, SshConfig};
use rstest::fixture;

#[derive(Debug, Default)]
pub struct ResetContext {
    pub runner: ScriptedRunner,
    pub request: RefCell<ClusterReset>,
    pub answer: Cell<bool>,
    pub outcome: RefCell<Option<Result<(), AdminError>>>,
}

impl ResetContext {
    pub fn admin(&self) -> PgAdmin<ScriptedRunner> {
        let session = Session::new(SshConfig::for_host("db.example"), self.runner.clone())
            .unwrap_or_else(|err| panic!("session should build: {err}"));
        PgAdmin::new(session, PostgresConfig::default())
            .unwrap_or_else(|err| panic!("admin should build: {err}"))
    }

    pub fn run(&self) {
        let confirm = ScriptedConfirm::answering(self.answer.get());
        let result = self.admin().reset_cluster(&self.request.borrow(), &confirm);
        self.outcome.replace(Some(result));
    }
}

#[fixture]
pub fn reset_context() -> ResetContext {
    ResetContext::default()
}
