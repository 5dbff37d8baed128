//! Remote PostgreSQL administration.
//!
//! [`PgAdmin`] drives the PostgreSQL command-line tools (`psql`, `createdb`,
//! `createuser`, `pg_dropcluster`, `pg_createcluster`) on a remote host
//! through an SSH [`Session`]. Each operation is a single blocking round trip
//! (or a short fixed sequence of them); no state survives between calls.
//! Client tools run as the configured service account unless an operation
//! says otherwise.

mod cluster;
mod databases;
mod error;
mod roles;
pub mod sql;
mod version;

pub use cluster::{ClusterReset, HbaUpload, pg_hba_path};
pub use databases::{DEFAULT_TEMPLATE, DatabaseRequest, QueryRequest, output_reports_one};
pub use error::AdminError;
pub use roles::DEFAULT_CREATEUSER_FLAGS;
pub use version::PgVersion;

use crate::config::PostgresConfig;
use crate::ssh::{CommandRunner, Session};
use crate::template::TemplateStore;

/// Administration helpers bound to one database host.
#[derive(Clone, Debug)]
pub struct PgAdmin<R: CommandRunner> {
    session: Session<R>,
    settings: PostgresConfig,
    templates: TemplateStore,
}

impl<R: CommandRunner> PgAdmin<R> {
    /// Creates the helpers for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] when `settings` fail validation.
    pub fn new(session: Session<R>, settings: PostgresConfig) -> Result<Self, AdminError> {
        settings.validate()?;
        let templates = TemplateStore::new(settings.template_dir_path());
        Ok(Self {
            session,
            settings,
            templates,
        })
    }

    /// Replaces the template store, for example to point at another
    /// directory.
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    /// Session the helpers run commands through.
    #[must_use]
    pub const fn session(&self) -> &Session<R> {
        &self.session
    }

    /// Settings the helpers were created with.
    #[must_use]
    pub const fn settings(&self) -> &PostgresConfig {
        &self.settings
    }

    fn service_account(&self) -> Option<&str> {
        Some(self.settings.service_account.as_str())
    }
}

#[cfg(test)]
mod tests;
