//! Configuration file templates.
//!
//! Templates are looked up by relative name (for example
//! `postgres/pg_hba.conf`) inside a local template directory and rendered
//! with `minijinja`. Lookups go through a capability handle on the directory,
//! so names cannot escape it. Names that are missing on disk fall back to the
//! templates bundled with the crate.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

/// Name of the bundled `pg_hba.conf` template.
pub const PG_HBA_TEMPLATE: &str = "postgres/pg_hba.conf";

const BUNDLED: &[(&str, &str)] = &[(
    PG_HBA_TEMPLATE,
    include_str!("../templates/postgres/pg_hba.conf"),
)];

/// Errors raised while loading or rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template exists in neither the directory nor the bundled set.
    #[error("template {name} not found in {dir}")]
    NotFound {
        /// Template name as requested.
        name: String,
        /// Directory searched.
        dir: Utf8PathBuf,
    },
    /// Reading the template file failed.
    #[error("failed to read template {name} from {dir}: {message}")]
    Io {
        /// Template name as requested.
        name: String,
        /// Directory searched.
        dir: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// The template failed to render.
    #[error("failed to render template {name}: {source}")]
    Render {
        /// Template name as requested.
        name: String,
        /// Rendering error.
        #[source]
        source: minijinja::Error,
    },
}

/// Loads and renders named templates from a directory.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    dir: Utf8PathBuf,
}

impl TemplateStore {
    /// Creates a store rooted at `dir`. The directory need not exist.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory templates are read from.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Renders template `name` with `context`.
    ///
    /// Undefined variables are errors rather than empty strings, and a
    /// trailing newline in the source is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the template cannot be found, read, or
    /// rendered.
    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<String, TemplateError> {
        let source = self.load(name)?;
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.render_str(&source, context)
            .map_err(|source| TemplateError::Render {
                name: name.to_owned(),
                source,
            })
    }

    fn load(&self, name: &str) -> Result<String, TemplateError> {
        match self.read_from_dir(name) {
            Ok(Some(source)) => Ok(source),
            Ok(None) => bundled(name).ok_or_else(|| TemplateError::NotFound {
                name: name.to_owned(),
                dir: self.dir.clone(),
            }),
            Err(err) => Err(err),
        }
    }

    fn read_from_dir(&self, name: &str) -> Result<Option<String>, TemplateError> {
        let dir = match Dir::open_ambient_dir(&self.dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(name, &err)),
        };

        match dir.read_to_string(name) {
            Ok(source) => Ok(Some(source)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(name, &err)),
        }
    }

    fn io_error(&self, name: &str, err: &std::io::Error) -> TemplateError {
        TemplateError::Io {
            name: name.to_owned(),
            dir: self.dir.clone(),
            message: err.to_string(),
        }
    }
}

fn bundled(name: &str) -> Option<String> {
    BUNDLED
        .iter()
        .find(|(bundled_name, _)| *bundled_name == name)
        .map(|(_, source)| (*source).to_owned())
}
