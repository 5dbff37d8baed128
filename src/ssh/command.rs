//! Remote command construction.
//!
//! Commands are assembled as argument arrays and only turned into a single
//! shell line at the last moment, when they are handed to `ssh`. Every
//! argument is shell-escaped on its own, so values never leak into the
//! surrounding command syntax. Elevation is expressed by prefixing the
//! argument array with a non-interactive `sudo` invocation.

use std::fmt;

use shell_escape::unix::escape;

use super::types::RunAs;

/// A program and its arguments, to be executed on the remote host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteCommand {
    program: String,
    args: Vec<String>,
}

impl RemoteCommand {
    /// Starts a command for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument in `args`.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Wraps the command so it runs as `run_as`.
    #[must_use]
    pub fn run_as(self, run_as: &RunAs) -> Self {
        let prefix: Vec<String> = match run_as {
            RunAs::Invoker => return self,
            RunAs::Root => vec![String::from("-n"), String::from("--")],
            RunAs::User(user) => vec![
                String::from("-n"),
                String::from("-u"),
                user.clone(),
                String::from("--"),
            ],
        };

        let mut args = prefix;
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: String::from("sudo"),
            args,
        }
    }

    /// Renders the command as a shell line with each word escaped.
    #[must_use]
    pub fn render(&self) -> String {
        let mut rendered = escape(self.program.as_str().into()).into_owned();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(escape(arg.as_str().into()).as_ref());
        }
        rendered
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
