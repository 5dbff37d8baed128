//! Queries and database management.

use tracing::debug;

use super::sql::{quote_literal, validate_name};
use super::{AdminError, PgAdmin};
use crate::config::DEFAULT_ENCODING;
use crate::ssh::{CommandOutput, CommandRunner, ExecOptions, RemoteCommand, RunAs};

/// Template database `createdb` uses when none is given.
pub const DEFAULT_TEMPLATE: &str = "template1";

/// Flags requesting unaligned, quiet, tuples-only `psql` output.
const SCALAR_FLAGS: &str = "-Aqt";

/// A single `psql` invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryRequest {
    sql: String,
    database: Option<String>,
    flags: Vec<String>,
    use_sudo: bool,
    sensitive: bool,
    options: ExecOptions,
}

impl QueryRequest {
    /// Query running `sql` as the login user with no extra flags.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            database: None,
            flags: Vec::new(),
            use_sudo: false,
            sensitive: false,
            options: ExecOptions::default(),
        }
    }

    /// Connects to `database` instead of the login user's default.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Passes `flags` to `psql` ahead of the query.
    #[must_use]
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Runs `psql` as the service account when `use_sudo` is set.
    #[must_use]
    pub const fn use_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Sends the statement on standard input instead of the command line and
    /// keeps it out of the logs.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self.options = self.options.with_hide();
        self
    }

    /// Execution options passed through to the session.
    #[must_use]
    pub const fn options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        if self.sensitive {
            self.options = self.options.with_hide();
        }
        self
    }

    /// Statement text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn command(&self) -> RemoteCommand {
        let mut command = RemoteCommand::new("psql").args(self.flags.iter().cloned());
        if let Some(ref database) = self.database {
            command = command.arg("-d").arg(database.clone());
        }
        if self.sensitive {
            command.arg("-v").arg("ON_ERROR_STOP=1")
        } else {
            command.arg("-c").arg(self.sql.clone())
        }
    }
}

/// A `createdb` invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatabaseRequest {
    name: String,
    owner: Option<String>,
    encoding: String,
    template: String,
    options: ExecOptions,
}

impl DatabaseRequest {
    /// Database `name` with UTF-8 encoding from `template1`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            encoding: DEFAULT_ENCODING.to_owned(),
            template: DEFAULT_TEMPLATE.to_owned(),
            options: ExecOptions::default(),
        }
    }

    /// Role owning the new database.
    #[must_use]
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Character encoding; empty leaves the server default.
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Template database to copy.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Execution options passed through to the session.
    #[must_use]
    pub const fn options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    /// Database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), AdminError> {
        validate_name("database name", &self.name)?;
        if let Some(ref owner) = self.owner {
            validate_name("owner", owner)?;
        }
        if !self.encoding.is_empty() {
            validate_name("encoding", &self.encoding)?;
        }
        validate_name("template", &self.template)
    }

    fn command(&self) -> RemoteCommand {
        let mut command = RemoteCommand::new("createdb");
        if !self.encoding.is_empty() {
            command = command.arg("-E").arg(self.encoding.clone());
        }
        if let Some(ref owner) = self.owner {
            command = command.arg("-O").arg(owner.clone());
        }
        if self.template != DEFAULT_TEMPLATE {
            command = command.arg(format!("--template={}", self.template));
        }
        command.arg(self.name.clone())
    }
}

/// Returns `true` when the last line of `output` ends with the token `1`.
///
/// This is how a single `COUNT(*)` result reads in tuples-only output, even
/// when the transport prefixes each line (`out: 1`). Empty output and any
/// other trailing value read as `false`.
#[must_use]
pub fn output_reports_one(output: &str) -> bool {
    output
        .lines()
        .last()
        .and_then(|line| {
            line.split([' ', '\t', ':'])
                .filter(|token| !token.is_empty())
                .last()
        })
        .is_some_and(|token| token == "1")
}

impl<R: CommandRunner> PgAdmin<R> {
    /// Runs `request` through `psql` and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Remote`] when `psql` fails and the request does
    /// not tolerate failure.
    pub fn execute_query(&self, request: &QueryRequest) -> Result<CommandOutput, AdminError> {
        if let Some(ref database) = request.database {
            validate_name("database name", database)?;
        }
        let run_as = if request.use_sudo {
            RunAs::User(self.settings.service_account.clone())
        } else {
            RunAs::Invoker
        };
        let input = request.sensitive.then_some(request.sql.as_str());
        let output = self
            .session
            .execute(request.command(), &run_as, request.options, input)?;
        Ok(output)
    }

    /// Creates a database.
    ///
    /// Not idempotent: creating an existing database surfaces the
    /// `createdb` failure.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidInput`] for unsafe names and
    /// [`AdminError::Remote`] when `createdb` fails.
    pub fn create_db(&self, request: &DatabaseRequest) -> Result<(), AdminError> {
        request.validate()?;
        self.session
            .sudo(request.command(), self.service_account(), request.options)?;
        Ok(())
    }

    /// Returns whether database `dbname` exists.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Remote`] when the catalog query fails.
    pub fn db_exists(&self, dbname: &str) -> Result<bool, AdminError> {
        let sql = format!(
            "SELECT COUNT(*) FROM pg_database WHERE datname = {};",
            quote_literal(dbname)
        );
        self.count_is_one(sql)
    }

    pub(super) fn count_is_one(&self, sql: String) -> Result<bool, AdminError> {
        let request = QueryRequest::new(sql)
            .flags([SCALAR_FLAGS])
            .use_sudo(true)
            .options(ExecOptions::hidden());
        let output = self.execute_query(&request)?;
        let exists = output_reports_one(&output.stdout);
        debug!(query = request.sql(), exists, "catalog lookup");
        Ok(exists)
    }
}
