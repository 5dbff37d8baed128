//! Test support utilities shared across unit and integration tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::rc::Rc;

use crate::confirm::{Confirm, ConfirmError};
use crate::ssh::{CommandOutput, CommandRunner, SshError};

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
/// Once the queue is drained every further call succeeds with empty output.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
    /// Payload written to standard input, if any.
    pub input: Option<String>,
}

impl CommandInvocation {
    /// Returns the remote command line, which `ssh` receives as its final
    /// argument.
    #[must_use]
    pub fn remote_command(&self) -> String {
        self.args
            .last()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Returns the remote command lines issued so far, in order.
    #[must_use]
    pub fn remote_commands(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(CommandInvocation::remote_command)
            .collect()
    }

    /// Pushes a successful exit status.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a successful exit status with the given stdout.
    pub fn push_stdout(&self, stdout: impl Into<String>) {
        self.push_output(Some(0), stdout, "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", "simulated failure");
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }

    fn record(&self, program: &str, args: &[OsString], input: Option<&str>) -> CommandOutput {
        self.invocations.borrow_mut().push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
            input: input.map(str::to_owned),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            })
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, SshError> {
        Ok(self.record(program, args, None))
    }

    fn run_with_input(
        &self,
        program: &str,
        args: &[OsString],
        input: &str,
    ) -> Result<CommandOutput, SshError> {
        Ok(self.record(program, args, Some(input)))
    }
}

/// Confirmation double answering with a fixed value and counting prompts.
#[derive(Clone, Debug, Default)]
pub struct ScriptedConfirm {
    answer: bool,
    prompts: Rc<RefCell<Vec<String>>>,
    calls: Rc<Cell<u32>>,
}

impl ScriptedConfirm {
    /// Confirmer that always answers `answer`.
    #[must_use]
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    /// Number of prompts shown.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, ConfirmError> {
        self.calls.set(self.calls.get() + 1);
        self.prompts.borrow_mut().push(prompt.to_owned());
        Ok(self.answer)
    }
}
