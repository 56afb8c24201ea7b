//! Orchestrator: validates, fetches, diffs, and applies in sequence.
//!
//! A run is a strictly sequential chain of awaits. Validation always
//! finishes before the first mutating command, so a rejected spec never
//! leaves the cluster half-modified.

mod error;
mod report;

use std::collections::BTreeSet;

use tracing::info;

use crate::actions::VolumeActions;
use crate::client::SvcClient;
use crate::inventory::{Inventory, VolumeState};
use crate::probe::{probe_volume, validate_volume_type};
use crate::validate::{mandatory_parameter_validation, volume_creation_parameter_validation};
use crate::volume::{DesiredState, VolumeSpec};

pub use error::ReconcileError;
pub use report::Report;

/// Terminal state of a successful run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutcomeKind {
    /// A new volume was created.
    Created,
    /// An existing volume was modified.
    Updated,
    /// The volume already matched; nothing was sent.
    NoOp,
    /// The volume was deleted.
    Deleted,
    /// The volume to delete did not exist.
    NotFound,
    /// The volume was renamed.
    Renamed,
    /// One or more thinclones were converted.
    Converted,
}

/// Result of a successful run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Outcome {
    /// Terminal state reached.
    pub kind: OutcomeKind,
    /// Message reported to the user.
    pub msg: String,
}

impl Outcome {
    fn new(kind: OutcomeKind, msg: String) -> Self {
        Self { kind, msg }
    }

    /// Returns whether the run modified the cluster.
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self.kind, OutcomeKind::NoOp | OutcomeKind::NotFound)
    }
}

/// Reconciles volumes through an owned [`SvcClient`].
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
}

impl<C: SvcClient> Reconciler<C> {
    /// Creates a reconciler that talks to the cluster through `client`.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Brings the cluster in line with `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when validation fails, the existing volume
    /// cannot reach the desired state, or the cluster rejects a command. The
    /// error's display text is the user-facing message.
    pub async fn apply(&self, spec: &VolumeSpec) -> Result<Outcome, ReconcileError> {
        mandatory_parameter_validation(spec)?;
        if spec.state == DesiredState::Absent {
            return self.delete(spec).await;
        }
        if let Some(old) = spec.old_name.as_deref() {
            return self.rename(spec, old).await;
        }
        if spec.is_clone_conversion() {
            return self.convert(spec).await;
        }
        match self.inventory().get_existing_volume(spec.name()).await? {
            Some(state) => self.update(spec, &state).await,
            None => self.create(spec).await,
        }
    }

    const fn inventory(&self) -> Inventory<'_, C> {
        Inventory::new(&self.client)
    }

    async fn delete(&self, spec: &VolumeSpec) -> Result<Outcome, ReconcileError> {
        let name = spec.name();
        let Some(state) = self.inventory().get_existing_volume(name).await? else {
            info!(volume = %name, "volume absent, nothing to delete");
            return Ok(Outcome::new(
                OutcomeKind::NotFound,
                format!("volume [{name}] does not exist."),
            ));
        };
        VolumeActions::new(&self.client, spec)
            .remove_volume(&state)
            .await?;
        Ok(Outcome::new(
            OutcomeKind::Deleted,
            format!("volume [{name}] has been deleted."),
        ))
    }

    async fn rename(&self, spec: &VolumeSpec, old: &str) -> Result<Outcome, ReconcileError> {
        let new = spec.name();
        let inventory = self.inventory();
        let source = inventory.get_existing_volume(old).await?;
        let target = inventory.get_existing_volume(new).await?;
        match (source.is_some(), target.is_some()) {
            (true, false) => {
                let msg = VolumeActions::new(&self.client, spec)
                    .volume_rename(old, new)
                    .await?;
                Ok(Outcome::new(OutcomeKind::Renamed, msg))
            }
            (false, true) => {
                info!(from = %old, to = %new, "volume already renamed");
                Ok(Outcome::new(
                    OutcomeKind::NoOp,
                    format!("Volume [{new}] already exists."),
                ))
            }
            (false, false) => Err(ReconcileError::RenameConflict(format!(
                "Volume [{old}] does not exist."
            ))),
            (true, true) => Err(ReconcileError::RenameConflict(format!(
                "Volume [{new}] already exists."
            ))),
        }
    }

    async fn convert(&self, spec: &VolumeSpec) -> Result<Outcome, ReconcileError> {
        let listing = self.inventory().list_volumes().await?;
        let conversion = VolumeActions::new(&self.client, spec)
            .convert_to_clone(&listing)
            .await?;
        let kind = if conversion.changed() {
            OutcomeKind::Converted
        } else {
            OutcomeKind::NoOp
        };
        Ok(Outcome::new(kind, conversion.message))
    }

    async fn resolve_iogrp(&self, spec: &VolumeSpec) -> Result<Option<Vec<String>>, ReconcileError> {
        match spec.iogrp.as_deref() {
            Some(iogrp) => Ok(Some(self.inventory().assemble_iogrp(iogrp).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, spec: &VolumeSpec) -> Result<Outcome, ReconcileError> {
        volume_creation_parameter_validation(spec)?;
        let iogrp = self.resolve_iogrp(spec).await?.unwrap_or_default();
        let name = spec.name();
        info!(volume = %name, "volume absent, creating");
        VolumeActions::new(&self.client, spec)
            .create_volume(&iogrp)
            .await?;
        Ok(Outcome::new(
            OutcomeKind::Created,
            format!("volume [{name}] has been created."),
        ))
    }

    async fn update(&self, spec: &VolumeSpec, state: &VolumeState) -> Result<Outcome, ReconcileError> {
        validate_volume_type(state)?;
        let name = spec.name();
        let desired_iogrp = self.resolve_iogrp(spec).await?;
        let current_iogrp = match desired_iogrp {
            Some(_) => self.inventory().get_existing_iogrp(name).await?,
            None => BTreeSet::new(),
        };
        let changes = probe_volume(state, spec, desired_iogrp.as_deref(), &current_iogrp)?;
        if changes.is_empty() {
            info!(volume = %name, "volume matches desired state");
            return Ok(Outcome::new(
                OutcomeKind::NoOp,
                format!("volume [{name}] already exists."),
            ));
        }
        info!(volume = %name, changes = ?changes, "updating volume");
        VolumeActions::new(&self.client, spec)
            .update_volume(&changes)
            .await?;
        Ok(Outcome::new(
            OutcomeKind::Updated,
            format!("volume [{name}] has been modified."),
        ))
    }
}
