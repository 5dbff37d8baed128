//! Core library for the pgprov PostgreSQL provisioning tool.
//!
//! The crate drives the PostgreSQL command-line tools on a remote host over
//! SSH: creating roles and databases, changing passwords, uploading
//! `pg_hba.conf`, detecting the server version, and resetting clusters.

pub mod config;
pub mod confirm;
pub mod logging;
pub mod postgres;
pub mod ssh;
pub mod template;
pub mod test_support;

pub use config::{ConfigError, PostgresConfig};
pub use confirm::{AssumeYes, Confirm, ConfirmError, TerminalConfirm};
pub use postgres::{
    AdminError, ClusterReset, DatabaseRequest, HbaUpload, PgAdmin, PgVersion, QueryRequest,
};
pub use ssh::{
    CommandOutput, CommandRunner, ExecOptions, ProcessCommandRunner, RemoteCommand, RunAs,
    Session, SshConfig, SshConfigLoadError, SshError,
};
pub use template::{TemplateError, TemplateStore};
