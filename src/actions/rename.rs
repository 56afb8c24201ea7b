//! Volume rename.

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Renames volume `old` to `new` and returns the confirmation message.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Rename`] when `chvdisk` fails.
    pub async fn volume_rename(&self, old: &str, new: &str) -> Result<String, ActionError> {
        let options = CommandOptions::new().value("name", new);
        self.run("chvdisk", &options, Some(old), ActionError::Rename)
            .await?;
        info!(from = %old, to = %new, "renamed volume");
        Ok(format!(
            "Volume [{old}] has been successfully rename to [{new}]"
        ))
    }
}
