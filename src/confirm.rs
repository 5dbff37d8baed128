//! Yes/no confirmation before destructive operations.
//!
//! Destructive workflows take a [`Confirm`] implementation instead of reading
//! the terminal themselves, so the decision can be scripted in tests or
//! pre-answered from the command line.

use dialoguer::Confirm as Prompt;
use thiserror::Error;

/// Error raised when a confirmation cannot be obtained.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("failed to read confirmation: {0}")]
pub struct ConfirmError(pub String);

/// Source of yes/no answers.
pub trait Confirm {
    /// Asks `prompt`, returning the answer or `default` when the user just
    /// accepts the suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`ConfirmError`] when no answer can be read.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, ConfirmError>;
}

/// Interactive terminal prompt.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, ConfirmError> {
        Prompt::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|err| ConfirmError(err.to_string()))
    }
}

/// Answers yes without asking, for unattended runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, ConfirmError> {
        tracing::info!(prompt, "confirmation assumed");
        Ok(true)
    }
}
