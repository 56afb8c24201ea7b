//! Volume creation, including clone and thinclone creation from a transient
//! snapshot.

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};

/// Minutes a transient snapshot is kept before the cluster expires it.
const SNAPSHOT_RETENTION_MINUTES: &str = "5";

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Takes a short-lived snapshot of `fromsourcevolume` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::SnapshotCreation`] when the source is missing,
    /// the cluster rejects `addsnapshot`, or the response carries no id.
    pub async fn create_transient_snapshot(&self) -> Result<String, ActionError> {
        let source = self.spec.fromsourcevolume.as_deref().ok_or_else(|| {
            ActionError::SnapshotCreation(String::from(
                "Missing required parameter(s) for snapshot creation: fromsourcevolume",
            ))
        })?;
        let options = CommandOptions::new()
            .value("volumes", source)
            .value("retentionminutes", SNAPSHOT_RETENTION_MINUTES);
        let response = self
            .run("addsnapshot", &options, None, ActionError::SnapshotCreation)
            .await?;
        let id = response.and_then(|body| body.id).ok_or_else(|| {
            ActionError::SnapshotCreation(format!(
                "Snapshot of volume [{source}] was created without an id"
            ))
        })?;
        info!(source = %source, snapshot = %id, "created transient snapshot");
        Ok(id)
    }

    /// Creates the requested volume and returns its id when the cluster
    /// reports one.
    ///
    /// `iogrp` is the resolved I/O group list; an empty slice leaves the
    /// choice to the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::SnapshotCreation`] when a clone source cannot
    /// be snapshotted and [`ActionError::Creation`] when `mkvolume` fails.
    pub async fn create_volume(&self, iogrp: &[String]) -> Result<Option<String>, ActionError> {
        let mut options = match self.spec.volume_type {
            Some(volume_type) => {
                let snapshot = self.create_transient_snapshot().await?;
                CommandOptions::new()
                    .value("type", volume_type.as_str())
                    .value("fromsnapshotid", snapshot)
                    .value_opt("fromsourcevolume", self.spec.fromsourcevolume.clone())
            }
            None => self.capacity_options(),
        };
        options = options
            .value("name", self.name())
            .value_opt("pool", self.spec.pool.clone())
            .value_opt("volumegroup", self.spec.volumegroup.clone());
        if !iogrp.is_empty() {
            options = options.value("iogrp", iogrp.join(":"));
        }

        let response = self
            .run("mkvolume", &options, None, ActionError::Creation)
            .await?;
        let id = response.and_then(|body| body.id);
        info!(
            volume = %self.name(),
            id = id.as_deref().unwrap_or("unknown"),
            "created volume"
        );
        Ok(id)
    }

    fn capacity_options(&self) -> CommandOptions {
        let spec = self.spec;
        let mut options = CommandOptions::new()
            .value_opt("size", spec.size.clone())
            .value("unit", spec.unit_or_default().as_str());
        let capabilities = [
            ("thin", spec.thin),
            ("compressed", spec.compressed),
            ("deduplicated", spec.deduplicated),
        ];
        for (flag, wanted) in capabilities {
            if wanted == Some(true) {
                options = options.flag(flag);
            }
        }
        options
            .value_opt("buffersize", spec.buffersize.clone())
            .value_opt(
                "warning",
                spec.warning_percent().map(|percent| format!("{percent}%")),
            )
    }
}
