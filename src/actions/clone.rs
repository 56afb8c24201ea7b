//! Thinclone to clone conversion.

use std::collections::BTreeSet;

use tracing::info;

use super::{ActionError, VolumeActions};
use crate::client::{CommandOptions, SvcClient};
use crate::inventory::VolumeSummary;

const UNKNOWN_VOLUME: &str =
    "CMMVC9855E The command failed because one or more of the specified volumes does not exist.";

/// Result of a conversion request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conversion {
    /// Volumes that were converted.
    pub converted: Vec<String>,
    /// Message describing the outcome.
    pub message: String,
}

impl Conversion {
    /// Returns whether any volume was converted.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.converted.is_empty()
    }
}

impl<C: SvcClient> VolumeActions<'_, C> {
    /// Converts every named volume that is still a thinclone into a clone.
    ///
    /// `name` may list several volumes separated by `:`. Volumes that are
    /// already clones, or were never thinclones, are skipped. `inventory`
    /// is the concise volume listing used to classify each name.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Conversion`] with the cluster's `CMMVC9855E`
    /// text when any name is not in `inventory`, or with the rejection text
    /// when a conversion command fails.
    pub async fn convert_to_clone(
        &self,
        inventory: &[VolumeSummary],
    ) -> Result<Conversion, ActionError> {
        let names = self.spec.names();
        let known: BTreeSet<&str> = inventory.iter().map(|volume| volume.name.as_str()).collect();
        if names.iter().any(|name| !known.contains(name)) {
            return Err(ActionError::Conversion(String::from(UNKNOWN_VOLUME)));
        }
        let thinclones: BTreeSet<&str> = inventory
            .iter()
            .filter(|volume| volume.is_thinclone())
            .map(|volume| volume.name.as_str())
            .collect();

        let mut converted = Vec::new();
        for name in names.iter().filter(|name| thinclones.contains(**name)) {
            let options = CommandOptions::new().flag("converttoclone");
            self.run("chvolume", &options, Some(*name), ActionError::Conversion)
                .await?;
            info!(volume = %name, "converted thinclone to clone");
            converted.push((*name).to_owned());
        }

        let listed = names.join(":");
        let message = match (names.as_slice(), converted.is_empty()) {
            (_, false) => format!("Volume(s) [{listed}] converted to clone."),
            ([single], true) => format!("Volume {single} is not a thinclone."),
            (_, true) => format!("Volume(s) [{listed}] are not thinclone!!"),
        };
        Ok(Conversion { converted, message })
    }
}
