//! Volume deletion.

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};
use crate::inventory::VolumeState;
use crate::volume::UnmapKind;

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Deletes the volume, severing the associations listed in `unmap`.
    ///
    /// Remote-copy relationships are only removed when `state` reports one,
    /// and FlashCopy mappings only when the mapping count is non-zero or
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Removal`] when `rmvolume` fails.
    pub async fn remove_volume(&self, state: &VolumeState) -> Result<(), ActionError> {
        let mut options = CommandOptions::new();
        for kind in &self.spec.unmap {
            options = match kind {
                UnmapKind::HostMappings => options.flag("removehostmappings"),
                UnmapKind::RemotecopyRelationships if state.rc_name.is_some() => {
                    options.flag("removercrelationships")
                }
                UnmapKind::FlashcopyMappings if state.fc_map_count != Some(0) => {
                    options.flag("removefcmaps")
                }
                UnmapKind::RemotecopyRelationships | UnmapKind::FlashcopyMappings => options,
            };
        }
        self.run("rmvolume", &options, Some(self.name()), ActionError::Removal)
            .await?;
        info!(volume = %self.name(), "deleted volume");
        Ok(())
    }
}
