//! SSH connection configuration and session errors.
//!
//! [`SshConfig`] is loaded via `ortho-config`, which merges defaults,
//! configuration files, and environment variables.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// SSH settings for the managed database host.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PGPROV_SSH",
    discovery(
        app_name = "pgprov",
        env_var = "PGPROV_CONFIG_PATH",
        config_file_name = "pgprov.toml",
        dotfile_name = ".pgprov.toml",
        project_file_name = "pgprov.toml"
    )
)]
pub struct SshConfig {
    /// Path to the `ssh` executable.
    #[ortho_config(default = "ssh".to_owned())]
    pub ssh_bin: String,
    /// Host name or address of the database server.
    pub host: String,
    /// Remote user to connect as.
    #[ortho_config(default = "root".to_owned())]
    pub user: String,
    /// SSH port on the database server.
    #[ortho_config(default = DEFAULT_SSH_PORT)]
    pub port: u16,
    /// Path to the SSH private key file. Supports tilde expansion. When not
    /// provided, SSH falls back to its default key locations.
    pub identity_file: Option<String>,
    /// Whether to force batch mode for SSH to avoid password prompts.
    #[ortho_config(default = true)]
    pub batch_mode: bool,
    /// Whether to enforce host key checking.
    #[ortho_config(default = true)]
    pub strict_host_key_checking: bool,
    /// Known hosts file override; empty keeps the SSH client default.
    #[ortho_config(default = String::new())]
    pub known_hosts_file: String,
}

/// Errors raised when loading the SSH configuration from layered sources.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SshConfigLoadError {
    /// Indicates that parsing or merging configuration layers failed.
    #[error("ssh configuration parsing failed: {0}")]
    Parse(String),
}

impl SshConfig {
    /// Builds a configuration for `host` with every other field defaulted.
    #[must_use]
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            ssh_bin: String::from("ssh"),
            host: host.into(),
            user: String::from("root"),
            port: DEFAULT_SSH_PORT,
            identity_file: None,
            batch_mode: true,
            strict_host_key_checking: true,
            known_hosts_file: String::new(),
        }
    }

    /// Ensures configuration values are present after trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SshError::InvalidConfig`] when any required field is empty.
    pub fn validate(&self) -> Result<(), SshError> {
        Self::require_value(&self.ssh_bin, "ssh_bin")?;
        Self::require_value(&self.host, "host")?;
        Self::require_value(&self.user, "user")?;
        Self::require_optional_value(self.identity_file.as_deref(), "identity_file")?;
        if self.port == 0 {
            return Err(SshError::InvalidConfig {
                field: String::from("port"),
            });
        }
        Ok(())
    }

    /// Loads configuration from defaults, configuration files, and
    /// environment variables without parsing process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`SshConfigLoadError::Parse`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, SshConfigLoadError> {
        Self::load_from_iter([std::ffi::OsString::from("pgprov")])
            .map_err(|err| SshConfigLoadError::Parse(err.to_string()))
    }

    /// `user@host` destination understood by the SSH client.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn require_optional_value(value: Option<&str>, field: &str) -> Result<(), SshError> {
        match value {
            None => Ok(()),
            Some(v) if !v.trim().is_empty() => Ok(()),
            Some(_) => Err(SshError::InvalidConfig {
                field: field.to_owned(),
            }),
        }
    }

    fn require_value(value: &str, field: &str) -> Result<(), SshError> {
        Self::require_optional_value(Some(value), field)
    }
}

/// Errors surfaced while executing commands on the remote host.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SshError {
    /// Raised when configuration is missing required values.
    #[error("missing {field}: set PGPROV_SSH_{env_suffix} or add {field} to [ssh] in pgprov.toml", env_suffix = field.to_uppercase())]
    InvalidConfig {
        /// Configuration field that failed validation.
        field: String,
    },
    /// Raised when a command cannot be spawned.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Command that failed to start.
        program: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when a remote command completes with a non-zero exit code.
    #[error("{program} exited with status {status_text} on {host}: {stderr}")]
    CommandFailure {
        /// Remote program that failed.
        program: String,
        /// Host the command ran on.
        host: String,
        /// Exit status as reported by the SSH client.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command.
        stderr: String,
    },
}
