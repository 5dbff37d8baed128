//! Administration settings loaded via `ortho-config`.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Name of the PostgreSQL service account used for elevated commands.
pub const DEFAULT_SERVICE_ACCOUNT: &str = "postgres";

/// Default cluster name created by the Debian packaging.
pub const DEFAULT_CLUSTER: &str = "main";

/// Default database and cluster encoding.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Default cluster locale.
pub const DEFAULT_LOCALE: &str = "en_US.UTF-8";

/// PostgreSQL administration settings derived from environment variables and
/// configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PGPROV_PG",
    discovery(
        app_name = "pgprov",
        env_var = "PGPROV_CONFIG_PATH",
        config_file_name = "pgprov.toml",
        dotfile_name = ".pgprov.toml",
        project_file_name = "pgprov.toml"
    )
)]
pub struct PostgresConfig {
    /// Account the PostgreSQL client tools run as when elevated.
    #[ortho_config(default = DEFAULT_SERVICE_ACCOUNT.to_owned())]
    pub service_account: String,
    /// System service restarted after configuration uploads.
    #[ortho_config(default = "postgresql".to_owned())]
    pub service_name: String,
    /// Local directory holding configuration templates.
    #[ortho_config(default = "templates".to_owned())]
    pub template_dir: String,
    /// Cluster used when a command does not name one.
    #[ortho_config(default = DEFAULT_CLUSTER.to_owned())]
    pub default_cluster: String,
    /// Encoding used when a command does not name one.
    #[ortho_config(default = DEFAULT_ENCODING.to_owned())]
    pub default_encoding: String,
    /// Locale used when a command does not name one.
    #[ortho_config(default = DEFAULT_LOCALE.to_owned())]
    pub default_locale: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            service_account: DEFAULT_SERVICE_ACCOUNT.to_owned(),
            service_name: String::from("postgresql"),
            template_dir: String::from("templates"),
            default_cluster: DEFAULT_CLUSTER.to_owned(),
            default_encoding: DEFAULT_ENCODING.to_owned(),
            default_locale: DEFAULT_LOCALE.to_owned(),
        }
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl PostgresConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to [postgres] in pgprov.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("pgprov")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Template directory as a path.
    #[must_use]
    pub fn template_dir_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.template_dir)
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.service_account,
            &FieldMetadata::new(
                "PostgreSQL service account",
                "PGPROV_PG_SERVICE_ACCOUNT",
                "service_account",
            ),
        )?;
        Self::require_field(
            &self.service_name,
            &FieldMetadata::new(
                "PostgreSQL service name",
                "PGPROV_PG_SERVICE_NAME",
                "service_name",
            ),
        )?;
        Self::require_field(
            &self.template_dir,
            &FieldMetadata::new(
                "template directory",
                "PGPROV_PG_TEMPLATE_DIR",
                "template_dir",
            ),
        )?;
        Self::require_field(
            &self.default_cluster,
            &FieldMetadata::new(
                "default cluster",
                "PGPROV_PG_DEFAULT_CLUSTER",
                "default_cluster",
            ),
        )?;
        Self::require_field(
            &self.default_locale,
            &FieldMetadata::new(
                "default locale",
                "PGPROV_PG_DEFAULT_LOCALE",
                "default_locale",
            ),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
