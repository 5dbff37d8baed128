//! Role management.

use super::sql::{quote_ident, quote_literal, validate_name, validate_secret};
use super::{AdminError, PgAdmin, QueryRequest};
use crate::ssh::{CommandRunner, ExecOptions, RemoteCommand};

/// `createuser` flags used when none are given: no superuser, no database
/// creation, no role creation.
pub const DEFAULT_CREATEUSER_FLAGS: [&str; 3] = ["-S", "-D", "-R"];

impl<R: CommandRunner> PgAdmin<R> {
    /// Creates role `username` with `createuser`, then sets its password when
    /// one is given.
    ///
    /// `flags` replaces [`DEFAULT_CREATEUSER_FLAGS`] when supplied. There is
    /// no existence check; an existing role surfaces the `createuser`
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidInput`] for unsafe names and
    /// [`AdminError::Remote`] when a remote command fails.
    pub fn create_db_user(
        &self,
        username: &str,
        password: Option<&str>,
        flags: Option<&[String]>,
    ) -> Result<(), AdminError> {
        validate_name("username", username)?;
        if let Some(secret) = password {
            validate_secret("password", secret)?;
        }

        let command = match flags {
            Some(flags) => RemoteCommand::new("createuser").args(flags.iter().cloned()),
            None => RemoteCommand::new("createuser").args(DEFAULT_CREATEUSER_FLAGS),
        }
        .arg(username);
        self.session
            .sudo(command, self.service_account(), ExecOptions::default())?;

        if let Some(secret) = password {
            self.change_db_user_password(username, secret)?;
        }
        Ok(())
    }

    /// Sets the password of role `username`.
    ///
    /// The statement quotes both values and travels on `psql`'s standard
    /// input, so the password never appears in a process listing or the log.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidInput`] for unsafe values and
    /// [`AdminError::Remote`] when `psql` fails.
    pub fn change_db_user_password(&self, username: &str, password: &str) -> Result<(), AdminError> {
        validate_name("username", username)?;
        validate_secret("password", password)?;

        let sql = format!(
            "ALTER USER {} WITH PASSWORD {};\n",
            quote_ident(username),
            quote_literal(password)
        );
        let request = QueryRequest::new(sql).use_sudo(true).sensitive();
        self.execute_query(&request)?;
        Ok(())
    }

    /// Returns whether role `username` exists.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Remote`] when the catalog query fails.
    pub fn db_user_exists(&self, username: &str) -> Result<bool, AdminError> {
        let sql = format!(
            "SELECT COUNT(*) FROM pg_roles WHERE rolname = {};",
            quote_literal(username)
        );
        self.count_is_one(sql)
    }
}
