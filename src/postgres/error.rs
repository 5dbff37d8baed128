//! Error type for PostgreSQL administration operations.

use thiserror::Error;

use crate::config::ConfigError;
use crate::confirm::ConfirmError;
use crate::ssh::SshError;
use crate::template::TemplateError;

/// Errors surfaced by [`PgAdmin`](super::PgAdmin) operations.
///
/// Every variant is fatal to the operation that produced it; failures that
/// an operation tolerates never reach the caller.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Raised when the administration settings are incomplete.
    #[error("invalid postgres settings: {0}")]
    Config(#[from] ConfigError),
    /// Raised when an argument cannot be passed safely to the remote tools.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidInput {
        /// Which argument was rejected.
        field: &'static str,
        /// Value as supplied.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// Raised when a remote command fails or cannot be started.
    #[error(transparent)]
    Remote(#[from] SshError),
    /// Raised when the `psql --version` output does not carry a version.
    #[error("could not determine the PostgreSQL version of the server from {output:?}")]
    VersionUndetected {
        /// Output of `psql --version`.
        output: String,
    },
    /// Raised when the user declines a destructive operation.
    #[error("dropping the {cluster} cluster was aborted by user input")]
    Aborted {
        /// Cluster that would have been dropped.
        cluster: String,
    },
    /// Raised when no confirmation answer could be read.
    #[error(transparent)]
    Confirm(#[from] ConfirmError),
    /// Raised when a configuration template cannot be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
