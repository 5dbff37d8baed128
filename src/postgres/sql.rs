//! Quoting and validation of values passed to the PostgreSQL tools.
//!
//! SQL text is built with [`quote_ident`] and [`quote_literal`] so that role
//! names and passwords never terminate the surrounding statement. Names that
//! travel as command arguments go through [`validate_name`] first, which
//! refuses anything the client tools would read as an option.

use super::AdminError;

/// Quotes `ident` as a SQL identifier, doubling embedded double quotes.
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quotes `value` as a SQL string literal.
///
/// Single quotes are doubled. Values containing a backslash use the `E''`
/// form with doubled backslashes, which reads the same whatever the server's
/// `standard_conforming_strings` setting.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    let quoted = value.replace('\'', "''");
    if quoted.contains('\\') {
        format!("E'{}'", quoted.replace('\\', "\\\\"))
    } else {
        format!("'{quoted}'")
    }
}

/// Checks a role, database, or template name before it reaches a command
/// line.
///
/// # Errors
///
/// Returns [`AdminError::InvalidInput`] for empty names, names starting with
/// `-`, and names containing control characters.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), AdminError> {
    if value.is_empty() {
        return Err(invalid(field, value, "must not be empty"));
    }
    if value.starts_with('-') {
        return Err(invalid(field, value, "must not start with '-'"));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid(field, value, "must not contain control characters"));
    }
    Ok(())
}

/// Checks a value used as a single path component on the remote host.
///
/// # Errors
///
/// Returns [`AdminError::InvalidInput`] when the value is not a valid name or
/// would address another directory.
pub fn validate_path_component(field: &'static str, value: &str) -> Result<(), AdminError> {
    validate_name(field, value)?;
    if value.contains('/') || value == "." || value == ".." {
        return Err(invalid(field, value, "must be a single path component"));
    }
    Ok(())
}

/// Checks a secret destined for a SQL literal.
///
/// # Errors
///
/// Returns [`AdminError::InvalidInput`] when the value contains a NUL byte,
/// which PostgreSQL cannot store in text.
pub fn validate_secret(field: &'static str, value: &str) -> Result<(), AdminError> {
    if value.contains('\0') {
        return Err(AdminError::InvalidInput {
            field,
            value: String::from("<redacted>"),
            reason: "must not contain NUL bytes",
        });
    }
    Ok(())
}

fn invalid(field: &'static str, value: &str, reason: &'static str) -> AdminError {
    AdminError::InvalidInput {
        field,
        value: value.to_owned(),
        reason,
    }
}
