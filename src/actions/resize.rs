//! Capacity changes.

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Grows the volume by `delta` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Update`] when `expandvdisksize` fails.
    pub async fn expand_volume(&self, delta: u64) -> Result<(), ActionError> {
        self.resize("expandvdisksize", delta).await?;
        info!(volume = %self.name(), bytes = delta, "expanded volume");
        Ok(())
    }

    /// Shrinks the volume by `delta` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Update`] when `shrinkvdisksize` fails.
    pub async fn shrink_volume(&self, delta: u64) -> Result<(), ActionError> {
        self.resize("shrinkvdisksize", delta).await?;
        info!(volume = %self.name(), bytes = delta, "shrank volume");
        Ok(())
    }

    async fn resize(&self, cmd: &str, delta: u64) -> Result<(), ActionError> {
        let options = CommandOptions::new()
            .value("size", delta.to_string())
            .value("unit", "b");
        self.run(cmd, &options, Some(self.name()), ActionError::Update)
            .await
            .map(drop)
    }
}
