//! Applies a [`ChangeSet`] to an existing volume.

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};
use crate::probe::{ChangeSet, CloudBackupChange, SizeChange, VolumeGroupChange};

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Applies every entry of `changes` in a fixed order: I/O group
    /// additions, I/O group removals, size, volume group, warning, then
    /// cloud backup.
    ///
    /// Additions run before removals so the volume never loses all access.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Update`] on the first rejected command; later
    /// entries are not attempted.
    pub async fn update_volume(&self, changes: &ChangeSet) -> Result<(), ActionError> {
        self.add_iogrp(&changes.iogrp.add).await?;
        self.remove_iogrp(&changes.iogrp.remove).await?;
        match changes.size {
            Some(SizeChange::Expand(delta)) => self.expand_volume(delta).await?,
            Some(SizeChange::Shrink(delta)) => self.shrink_volume(delta).await?,
            None => {}
        }
        if let Some(group) = &changes.volumegroup {
            self.change_volumegroup(group).await?;
        }
        if let Some(percent) = changes.warning {
            self.change_warning(percent).await?;
        }
        if let Some(backup) = &changes.cloud_backup {
            self.change_cloud_backup(backup).await?;
        }
        Ok(())
    }

    async fn chvdisk(&self, options: &CommandOptions) -> Result<(), ActionError> {
        self.run("chvdisk", options, Some(self.name()), ActionError::Update)
            .await
            .map(drop)
    }

    async fn change_volumegroup(&self, change: &VolumeGroupChange) -> Result<(), ActionError> {
        let options = match change {
            VolumeGroupChange::Set(group) => CommandOptions::new().value("volumegroup", group),
            VolumeGroupChange::Remove => CommandOptions::new().flag("novolumegroup"),
        };
        self.chvdisk(&options).await?;
        info!(volume = %self.name(), change = ?change, "updated volume group");
        Ok(())
    }

    async fn change_warning(&self, percent: u8) -> Result<(), ActionError> {
        let options = CommandOptions::new().value("warning", format!("{percent}%"));
        self.chvdisk(&options).await?;
        info!(volume = %self.name(), warning = percent, "updated capacity warning");
        Ok(())
    }

    async fn change_cloud_backup(&self, change: &CloudBackupChange) -> Result<(), ActionError> {
        let options = match change {
            CloudBackupChange::Enable { account } => CommandOptions::new()
                .value("backup", "cloud")
                .flag("enable")
                .value_opt("account", account.clone()),
            CloudBackupChange::Disable => CommandOptions::new()
                .value("backup", "cloud")
                .flag("disable"),
        };
        self.chvdisk(&options).await?;
        info!(volume = %self.name(), change = ?change, "updated cloud backup");
        Ok(())
    }
}
