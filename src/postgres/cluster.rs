//! Cluster-level operations: version detection, `pg_hba.conf` uploads, and
//! cluster resets.

use camino::Utf8PathBuf;
use minijinja::context;
use tracing::{info, warn};

use super::sql::{validate_name, validate_path_component};
use super::{AdminError, PgAdmin, PgVersion};
use crate::config::{DEFAULT_CLUSTER, DEFAULT_ENCODING, DEFAULT_LOCALE};
use crate::confirm::Confirm;
use crate::ssh::{CommandRunner, ExecOptions, RemoteCommand};
use crate::template::PG_HBA_TEMPLATE;

/// Location of `pg_hba.conf` for a cluster in the Debian layout.
#[must_use]
pub fn pg_hba_path(version: &str, cluster: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("/etc/postgresql/{version}/{cluster}/pg_hba.conf"))
}

/// Parameters for [`PgAdmin::upload_pg_hba_conf`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HbaUpload {
    /// Template to render; the bundled `postgres/pg_hba.conf` when `None`.
    pub template_name: Option<String>,
    /// Server version; detected when `None`.
    pub pg_version: Option<String>,
    /// Target cluster.
    pub cluster: String,
    /// Restart the service after uploading.
    pub restart: bool,
}

impl Default for HbaUpload {
    fn default() -> Self {
        Self {
            template_name: None,
            pg_version: None,
            cluster: DEFAULT_CLUSTER.to_owned(),
            restart: true,
        }
    }
}

/// Parameters for [`PgAdmin::reset_cluster`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterReset {
    /// Cluster to drop and recreate.
    pub cluster: String,
    /// Server version; detected when `None`.
    pub pg_version: Option<String>,
    /// Encoding of the recreated cluster.
    pub encoding: String,
    /// Locale of the recreated cluster.
    pub locale: String,
}

impl Default for ClusterReset {
    fn default() -> Self {
        Self {
            cluster: DEFAULT_CLUSTER.to_owned(),
            pg_version: None,
            encoding: DEFAULT_ENCODING.to_owned(),
            locale: DEFAULT_LOCALE.to_owned(),
        }
    }
}

impl ClusterReset {
    fn prompt(&self) -> String {
        format!(
            "You are about to drop the {} cluster. This cannot be undone. \
             Are you sure you want to continue?",
            self.cluster
        )
    }
}

impl<R: CommandRunner> PgAdmin<R> {
    /// Detects the server version from `psql --version`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::VersionUndetected`] when the output carries no
    /// version and [`AdminError::Remote`] when `psql` cannot be run.
    pub fn detect_version(&self) -> Result<PgVersion, AdminError> {
        let command = RemoteCommand::new("psql").arg("--version");
        let output = self.session.run(command, ExecOptions::hidden())?;
        PgVersion::parse(&output.stdout).ok_or(AdminError::VersionUndetected {
            output: output.stdout,
        })
    }

    /// Renders `pg_hba.conf` and uploads it to the cluster's configuration
    /// directory, restarting the service afterwards when requested.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the version cannot be resolved, the
    /// template cannot be rendered, or a remote command fails.
    pub fn upload_pg_hba_conf(&self, upload: &HbaUpload) -> Result<Utf8PathBuf, AdminError> {
        validate_path_component("cluster", &upload.cluster)?;
        let template_name = upload.template_name.as_deref().unwrap_or(PG_HBA_TEMPLATE);
        let version = self.resolve_version(upload.pg_version.as_deref())?;

        let rendered = self.templates.render(
            template_name,
            context! { version => &version, cluster => &upload.cluster },
        )?;
        let destination = pg_hba_path(&version, &upload.cluster);
        self.session.upload(&rendered, destination.as_str(), true)?;

        if upload.restart {
            self.session.restart_service(&self.settings.service_name)?;
        }
        Ok(destination)
    }

    /// Drops and recreates a cluster after confirmation.
    ///
    /// Nothing runs on the remote host until `confirm` agrees. The drop may
    /// fail, as the cluster may not exist yet; the recreation may not.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Aborted`] when the confirmation is declined and
    /// [`AdminError::Remote`] when `pg_createcluster` fails.
    pub fn reset_cluster(
        &self,
        reset: &ClusterReset,
        confirm: &impl Confirm,
    ) -> Result<(), AdminError> {
        validate_path_component("cluster", &reset.cluster)?;
        validate_name("encoding", &reset.encoding)?;
        validate_name("locale", &reset.locale)?;

        if !confirm.confirm(&reset.prompt(), false)? {
            return Err(AdminError::Aborted {
                cluster: reset.cluster.clone(),
            });
        }

        let version = self.resolve_version(reset.pg_version.as_deref())?;
        info!(cluster = %reset.cluster, %version, "resetting cluster");

        let drop = RemoteCommand::new("pg_dropcluster")
            .arg("--stop")
            .arg(version.clone())
            .arg(reset.cluster.clone());
        let dropped = self
            .session
            .sudo(drop, self.service_account(), ExecOptions::warn_only())?;
        if !dropped.is_success() {
            warn!(cluster = %reset.cluster, "cluster drop failed; it may not have existed");
        }

        let create = RemoteCommand::new("pg_createcluster")
            .arg("--start")
            .arg("-e")
            .arg(reset.encoding.clone())
            .arg("--locale")
            .arg(reset.locale.clone())
            .arg(version)
            .arg(reset.cluster.clone());
        self.session
            .sudo(create, self.service_account(), ExecOptions::default())?;
        Ok(())
    }

    fn resolve_version(&self, explicit: Option<&str>) -> Result<String, AdminError> {
        let version = match explicit {
            Some(version) => version.to_owned(),
            None => self.detect_version()?.to_string(),
        };
        validate_path_component("version", &version)?;
        Ok(version)
    }
}
