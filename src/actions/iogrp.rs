//! I/O group access changes.

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Grants each group in `names` access to the volume, one command per
    /// group.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Update`] on the first rejected
    /// `addvdiskaccess`.
    pub async fn add_iogrp(&self, names: &[String]) -> Result<(), ActionError> {
        for group in names {
            self.access("addvdiskaccess", group).await?;
            info!(volume = %self.name(), iogrp = %group, "added I/O group access");
        }
        Ok(())
    }

    /// Revokes access for each group in `names`, one command per group.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Update`] on the first rejected
    /// `rmvdiskaccess`.
    pub async fn remove_iogrp(&self, names: &[String]) -> Result<(), ActionError> {
        for group in names {
            self.access("rmvdiskaccess", group).await?;
            info!(volume = %self.name(), iogrp = %group, "removed I/O group access");
        }
        Ok(())
    }

    async fn access(&self, cmd: &str, group: &str) -> Result<(), ActionError> {
        let options = CommandOptions::new().value("iogrp", group);
        self.run(cmd, &options, Some(self.name()), ActionError::Update)
            .await
            .map(drop)
    }
}
