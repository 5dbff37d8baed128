//! Core session types and command runner abstraction.

use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::ssh::SshError;

/// Result of running an external command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Human readable exit status, `unknown` when the process was killed.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.code
            .map_or_else(|| String::from("unknown"), |code| code.to_string())
    }
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs `program` with the given arguments, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`SshError::Spawn`] if the command cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, SshError>;

    /// Runs `program` with `input` written to its standard input.
    ///
    /// # Errors
    ///
    /// Returns [`SshError::Spawn`] if the command cannot be started or its
    /// input cannot be delivered.
    fn run_with_input(
        &self,
        program: &str,
        args: &[OsString],
        input: &str,
    ) -> Result<CommandOutput, SshError>;
}

/// Real command runner that shells out to the host operating system.
#[derive(Clone, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, SshError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| spawn_error(program, &err))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_with_input(
        &self,
        program: &str,
        args: &[OsString],
        input: &str,
    ) -> Result<CommandOutput, SshError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| spawn_error(program, &err))?;

        let mut stdin = child.stdin.take().ok_or_else(|| SshError::Spawn {
            program: program.to_owned(),
            message: String::from("standard input was not captured"),
        })?;

        // Feed stdin from a separate thread so a chatty child cannot fill its
        // stdout pipe while we are still blocked writing.
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            let written = writer.join().unwrap_or_else(|_| {
                Err(std::io::Error::other("stdin writer thread panicked"))
            });
            match written {
                // The child exited before reading everything; its status says why.
                Err(err) if err.kind() != std::io::ErrorKind::BrokenPipe => Err(err),
                _ => output,
            }
        })
        .map_err(|err| spawn_error(program, &err))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn spawn_error(program: &str, err: &std::io::Error) -> SshError {
    SshError::Spawn {
        program: program.to_owned(),
        message: err.to_string(),
    }
}

/// Identity a remote command executes as.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum RunAs {
    /// The SSH login user.
    #[default]
    Invoker,
    /// The superuser, through `sudo`.
    Root,
    /// A named account, through `sudo -u`.
    User(String),
}

/// Per-call execution options.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecOptions {
    /// Tolerate a non-zero exit status instead of failing.
    pub warn_only: bool,
    /// Keep the command and its output off the console log.
    pub hide: bool,
}

impl ExecOptions {
    /// Options tolerating failure.
    #[must_use]
    pub const fn warn_only() -> Self {
        Self {
            warn_only: true,
            hide: false,
        }
    }

    /// Options suppressing console output.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            warn_only: false,
            hide: true,
        }
    }

    /// Returns these options with console output suppressed.
    #[must_use]
    pub const fn with_hide(mut self) -> Self {
        self.hide = true;
        self
    }
}
