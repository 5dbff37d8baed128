//! Command-line interface definitions for the `pgprov` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `pgprov` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pgprov",
    about = "Provision and manage a PostgreSQL server over SSH",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Create a database role.
    #[command(name = "create-user", about = "Create a database role")]
    CreateUser(CreateUserCommand),
    /// Run a SQL statement through psql.
    #[command(name = "query", about = "Run a SQL statement through psql")]
    Query(QueryCommand),
    /// Report whether a database role exists.
    #[command(name = "user-exists", about = "Report whether a database role exists")]
    UserExists(NameArg),
    /// Report whether a database exists.
    #[command(name = "db-exists", about = "Report whether a database exists")]
    DbExists(NameArg),
    /// Change the password of a database role.
    #[command(name = "change-password", about = "Change the password of a database role")]
    ChangePassword(ChangePasswordCommand),
    /// Create a database.
    #[command(name = "create-db", about = "Create a database")]
    CreateDb(CreateDbCommand),
    /// Render and upload pg_hba.conf.
    #[command(name = "upload-hba", about = "Render and upload pg_hba.conf")]
    UploadHba(UploadHbaCommand),
    /// Print the server's PostgreSQL version.
    #[command(name = "detect-version", about = "Print the server's PostgreSQL version")]
    DetectVersion,
    /// Drop and recreate a cluster.
    #[command(name = "reset-cluster", about = "Drop and recreate a cluster")]
    ResetCluster(ResetClusterCommand),
}

/// A single role or database name.
#[derive(Debug, Args)]
pub(crate) struct NameArg {
    /// Role or database name.
    pub(crate) name: String,
}

/// Arguments for `pgprov create-user`.
#[derive(Debug, Args)]
pub(crate) struct CreateUserCommand {
    /// Name of the role to create.
    pub(crate) username: String,
    /// Password to set after creation.
    #[arg(long, env = "PGPROV_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    /// createuser flags, split with shell quoting rules (default "-S -D -R").
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub(crate) flags: Option<String>,
    /// Do nothing when the role already exists.
    #[arg(long)]
    pub(crate) skip_existing: bool,
}

/// Arguments for `pgprov query`.
#[derive(Debug, Args)]
pub(crate) struct QueryCommand {
    /// SQL statement to run.
    pub(crate) sql: String,
    /// Database to connect to.
    #[arg(long, short = 'd')]
    pub(crate) database: Option<String>,
    /// psql flags, split with shell quoting rules.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub(crate) flags: Option<String>,
    /// Run psql as the PostgreSQL service account.
    #[arg(long)]
    pub(crate) sudo: bool,
}

/// Arguments for `pgprov change-password`.
#[derive(Debug, Args)]
pub(crate) struct ChangePasswordCommand {
    /// Role whose password changes.
    pub(crate) username: String,
    /// New password.
    #[arg(long, env = "PGPROV_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

/// Arguments for `pgprov create-db`.
#[derive(Debug, Args)]
pub(crate) struct CreateDbCommand {
    /// Name of the database to create.
    pub(crate) name: String,
    /// Role owning the database.
    #[arg(long, short = 'O')]
    pub(crate) owner: Option<String>,
    /// Character encoding (defaults to the configured encoding).
    #[arg(long, short = 'E')]
    pub(crate) encoding: Option<String>,
    /// Template database to copy.
    #[arg(long, default_value = "template1")]
    pub(crate) template: String,
    /// Do nothing when the database already exists.
    #[arg(long)]
    pub(crate) skip_existing: bool,
}

/// Arguments for `pgprov upload-hba`.
#[derive(Debug, Args)]
pub(crate) struct UploadHbaCommand {
    /// Template name relative to the template directory.
    #[arg(long)]
    pub(crate) template: Option<String>,
    /// Server version; detected when omitted.
    #[arg(long, value_name = "VERSION")]
    pub(crate) pg_version: Option<String>,
    /// Target cluster (defaults to the configured cluster).
    #[arg(long)]
    pub(crate) cluster: Option<String>,
    /// Skip restarting the PostgreSQL service.
    #[arg(long)]
    pub(crate) no_restart: bool,
}

/// Arguments for `pgprov reset-cluster`.
#[derive(Debug, Args)]
pub(crate) struct ResetClusterCommand {
    /// Cluster to drop and recreate (defaults to the configured cluster).
    #[arg(long)]
    pub(crate) cluster: Option<String>,
    /// Server version; detected when omitted.
    #[arg(long, value_name = "VERSION")]
    pub(crate) pg_version: Option<String>,
    /// Encoding of the new cluster (defaults to the configured encoding).
    #[arg(long)]
    pub(crate) encoding: Option<String>,
    /// Locale of the new cluster (defaults to the configured locale).
    #[arg(long)]
    pub(crate) locale: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
}
