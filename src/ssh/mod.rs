//! SSH session: remote command execution against a single host.
//!
//! A [`Session`] carries the target host, the login identity, and the ability
//! to elevate through `sudo`. Commands are built as argument arrays
//! ([`RemoteCommand`]), rendered with per-argument shell escaping, and handed
//! to the system `ssh` client through a [`CommandRunner`].

use std::ffi::OsString;

use tracing::{debug, info, warn};

mod command;
mod config;
mod types;
mod util;

pub use command::RemoteCommand;
pub use config::{DEFAULT_SSH_PORT, SshConfig, SshConfigLoadError, SshError};
pub use types::{CommandOutput, CommandRunner, ExecOptions, ProcessCommandRunner, RunAs};
pub use util::expand_tilde;

/// Explicit connection context used by every remote operation.
#[derive(Clone, Debug)]
pub struct Session<R: CommandRunner> {
    config: SshConfig,
    runner: R,
}

impl Session<ProcessCommandRunner> {
    /// Convenience constructor that wires the real process runner.
    ///
    /// # Errors
    ///
    /// Returns [`SshError::InvalidConfig`] when validation fails.
    pub fn with_process_runner(config: SshConfig) -> Result<Self, SshError> {
        Self::new(config, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> Session<R> {
    /// Creates a new session using the provided runner and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SshError::InvalidConfig`] when configuration validation
    /// fails.
    pub fn new(config: SshConfig, runner: R) -> Result<Self, SshError> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// Returns a reference to the underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Runs `command` as the login user.
    ///
    /// # Errors
    ///
    /// Returns [`SshError::Spawn`] when `ssh` cannot be started, or
    /// [`SshError::CommandFailure`] on a non-zero exit unless
    /// `options.warn_only` is set.
    pub fn run(
        &self,
        command: RemoteCommand,
        options: ExecOptions,
    ) -> Result<CommandOutput, SshError> {
        self.execute(command, &RunAs::Invoker, options, None)
    }

    /// Runs `command` through `sudo`, as `user` or as root when `None`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::run`].
    pub fn sudo(
        &self,
        command: RemoteCommand,
        user: Option<&str>,
        options: ExecOptions,
    ) -> Result<CommandOutput, SshError> {
        let run_as = user.map_or(RunAs::Root, |name| RunAs::User(name.to_owned()));
        self.execute(command, &run_as, options, None)
    }

    /// Runs `command` as `run_as`, optionally feeding `input` on stdin.
    ///
    /// # Errors
    ///
    /// Same as [`Session::run`].
    pub fn execute(
        &self,
        command: RemoteCommand,
        run_as: &RunAs,
        options: ExecOptions,
        input: Option<&str>,
    ) -> Result<CommandOutput, SshError> {
        let program = command.program().to_owned();
        let rendered = command.run_as(run_as).render();
        if options.hide {
            debug!(host = %self.config.host, command = %rendered, "running remote command");
        } else {
            info!(host = %self.config.host, command = %rendered, "running remote command");
        }

        let args = self.build_ssh_args(&rendered);
        let output = match input {
            Some(payload) => self
                .runner
                .run_with_input(&self.config.ssh_bin, &args, payload)?,
            None => self.runner.run(&self.config.ssh_bin, &args)?,
        };

        if output.is_success() {
            if !options.hide && !output.stdout.is_empty() {
                info!(host = %self.config.host, stdout = %output.stdout.trim_end(), "remote output");
            }
            return Ok(output);
        }

        if options.warn_only {
            warn!(
                host = %self.config.host,
                program = %program,
                status = %output.status_text(),
                stderr = %output.stderr.trim_end(),
                "remote command failed; continuing"
            );
            return Ok(output);
        }

        Err(SshError::CommandFailure {
            program,
            host: self.config.host.clone(),
            status: output.code,
            status_text: output.status_text(),
            stderr: output.stderr,
        })
    }

    /// Writes `contents` to `destination` on the remote host.
    ///
    /// # Errors
    ///
    /// Same as [`Session::run`].
    pub fn upload(
        &self,
        contents: &str,
        destination: &str,
        use_sudo: bool,
    ) -> Result<(), SshError> {
        let run_as = if use_sudo { RunAs::Root } else { RunAs::Invoker };
        let command = RemoteCommand::new("tee").arg(destination);
        info!(host = %self.config.host, destination, "uploading file");
        self.execute(command, &run_as, ExecOptions::hidden(), Some(contents))?;
        Ok(())
    }

    /// Restarts the system service `name`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::run`].
    pub fn restart_service(&self, name: &str) -> Result<(), SshError> {
        let command = RemoteCommand::new("service").arg(name).arg("restart");
        self.sudo(command, None, ExecOptions::default())?;
        Ok(())
    }

    fn build_ssh_args(&self, remote_command: &str) -> Vec<OsString> {
        let mut args = self.common_ssh_options();
        args.push(OsString::from(self.config.destination()));
        args.push(OsString::from(remote_command));
        args
    }

    fn common_ssh_options(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-p"),
            OsString::from(self.config.port.to_string()),
        ];

        if let Some(ref identity_file) = self.config.identity_file {
            args.push(OsString::from("-i"));
            args.push(OsString::from(expand_tilde(identity_file)));
        }

        if self.config.batch_mode {
            args.push(OsString::from("-o"));
            args.push(OsString::from("BatchMode=yes"));
        }

        if !self.config.strict_host_key_checking {
            args.push(OsString::from("-o"));
            args.push(OsString::from("StrictHostKeyChecking=no"));
        }

        if !self.config.known_hosts_file.trim().is_empty() {
            args.push(OsString::from("-o"));
            args.push(OsString::from(format!(
                "UserKnownHostsFile={}",
                self.config.known_hosts_file
            )));
        }

        args
    }
}
