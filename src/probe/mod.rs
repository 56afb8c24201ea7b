//! Diff engine comparing an existing volume with its desired state.
//!
//! [`probe_volume`] is pure: it never talks to the cluster and the same
//! inputs always yield the same [`ChangeSet`]. Attributes that are fixed at
//! creation time produce hard failures rather than changes.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::inventory::VolumeState;
use crate::volume::VolumeSpec;

/// Errors raised while comparing desired and current state.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ProbeError {
    /// Raised when a creation-time attribute would have to change, or the
    /// volume has a shape this engine does not manage.
    #[error("{0}")]
    ImmutableAttribute(String),
    /// Raised when a parameter cannot apply to the existing volume.
    #[error("{0}")]
    InvalidParameter(String),
}

/// Capacity adjustment in bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SizeChange {
    /// Grow the volume by this many bytes.
    Expand(u64),
    /// Shrink the volume by this many bytes.
    Shrink(u64),
}

/// Volume group membership change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VolumeGroupChange {
    /// Move the volume into the named group.
    Set(String),
    /// Remove the volume from its current group.
    Remove,
}

/// Cloud backup change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CloudBackupChange {
    /// Enable backups, optionally to a specific account.
    Enable {
        /// Cloud account to back up to.
        account: Option<String>,
    },
    /// Disable backups.
    Disable,
}

/// I/O group access changes. Both lists are sorted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IoGroupChange {
    /// Groups to grant access.
    pub add: Vec<String>,
    /// Groups to revoke access from.
    pub remove: Vec<String>,
}

impl IoGroupChange {
    /// Returns whether neither list has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Minimal set of changes needed to bring a volume to its desired state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeSet {
    /// I/O group access changes.
    pub iogrp: IoGroupChange,
    /// Capacity change.
    pub size: Option<SizeChange>,
    /// Volume group change.
    pub volumegroup: Option<VolumeGroupChange>,
    /// New capacity warning percentage.
    pub warning: Option<u8>,
    /// Cloud backup change.
    pub cloud_backup: Option<CloudBackupChange>,
}

impl ChangeSet {
    /// Returns whether the volume already matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iogrp.is_empty()
            && self.size.is_none()
            && self.volumegroup.is_none()
            && self.warning.is_none()
            && self.cloud_backup.is_none()
    }
}

/// Rejects volumes that cannot be reconciled: members of a remote-copy
/// relationship and mirrored volumes.
///
/// # Errors
///
/// Returns [`ProbeError::ImmutableAttribute`] naming the blocking property.
pub fn validate_volume_type(state: &VolumeState) -> Result<(), ProbeError> {
    if let Some(relationship) = state.rc_name.as_deref() {
        return Err(ProbeError::ImmutableAttribute(format!(
            "Volume [{}] is in remote copy relationship [{relationship}] and cannot be managed",
            state.name
        )));
    }
    if state.is_mirrored() {
        return Err(ProbeError::ImmutableAttribute(format!(
            "Volume [{}] is mirrored and cannot be managed",
            state.name
        )));
    }
    Ok(())
}

fn immutable(param: &str, name: &str) -> ProbeError {
    ProbeError::ImmutableAttribute(format!(
        "Parameter [{param}] cannot be updated for existing volume [{name}]"
    ))
}

fn check_immutable(current: &VolumeState, desired: &VolumeSpec) -> Result<(), ProbeError> {
    let name = desired.name();
    if let Some(pool) = desired.pool.as_deref()
        && current.pool.as_deref() != Some(pool)
    {
        return Err(immutable("pool", name));
    }
    let capabilities = [
        ("thin", desired.thin, current.is_thin()),
        ("compressed", desired.compressed, current.is_compressed()),
        ("deduplicated", desired.deduplicated, current.is_deduplicated()),
    ];
    for (param, wanted, actual) in capabilities {
        if wanted.is_some_and(|flag| flag != actual) {
            return Err(immutable(param, name));
        }
    }
    Ok(())
}

fn probe_size(current: &VolumeState, desired: &VolumeSpec) -> Result<Option<SizeChange>, ProbeError> {
    let wanted = desired
        .size_bytes()
        .map_err(|err| ProbeError::InvalidParameter(err.to_string()))?;
    let (Some(wanted), Some(capacity)) = (wanted, current.capacity) else {
        return Ok(None);
    };
    Ok(match wanted.cmp(&capacity) {
        std::cmp::Ordering::Greater => Some(SizeChange::Expand(wanted - capacity)),
        std::cmp::Ordering::Less => Some(SizeChange::Shrink(capacity - wanted)),
        std::cmp::Ordering::Equal => None,
    })
}

fn probe_iogrp(desired: Option<&[String]>, current: &BTreeSet<String>) -> IoGroupChange {
    let Some(desired) = desired else {
        return IoGroupChange::default();
    };
    let wanted: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
    IoGroupChange {
        add: wanted
            .iter()
            .filter(|group| !current.contains(**group))
            .map(|group| (*group).to_owned())
            .collect(),
        remove: current
            .iter()
            .filter(|group| !wanted.contains(group.as_str()))
            .cloned()
            .collect(),
    }
}

fn probe_volumegroup(current: &VolumeState, desired: &VolumeSpec) -> Option<VolumeGroupChange> {
    if let Some(group) = desired.volumegroup.as_deref() {
        return (current.volume_group.as_deref() != Some(group))
            .then(|| VolumeGroupChange::Set(group.to_owned()));
    }
    (desired.novolumegroup == Some(true) && current.volume_group.is_some())
        .then_some(VolumeGroupChange::Remove)
}

fn probe_warning(current: &VolumeState, desired: &VolumeSpec) -> Result<Option<u8>, ProbeError> {
    if desired.warning.is_none() {
        return Ok(None);
    }
    if !(current.is_thin() || current.is_compressed()) {
        return Err(ProbeError::InvalidParameter(String::from(
            "Parameter [warning] is applicable only for thin-provisioned and compressed volumes.",
        )));
    }
    let Some(wanted) = desired.warning_percent() else {
        return Err(ProbeError::InvalidParameter(format!(
            "Invalid value for [warning]: {}",
            desired.warning.as_deref().unwrap_or_default()
        )));
    };
    Ok((current.warning() != Some(wanted)).then_some(wanted))
}

fn probe_cloud_backup(current: &VolumeState, desired: &VolumeSpec) -> Option<CloudBackupChange> {
    if !desired.enable_cloud_snapshot? {
        return current
            .cloud_backup_enabled
            .then_some(CloudBackupChange::Disable);
    }
    let account = desired.cloud_account_name.as_deref();
    let same_account =
        account.is_none_or(|wanted| current.cloud_account_name.as_deref() == Some(wanted));
    (!current.cloud_backup_enabled || !same_account).then(|| CloudBackupChange::Enable {
        account: account.map(str::to_owned),
    })
}

/// Compares `current` with `desired` and returns the changes to apply.
///
/// `desired_iogrp` is the resolved I/O group list, or `None` when the caller
/// did not ask for I/O group reconciliation. `current_iogrp` is the set of
/// groups that currently have access.
///
/// # Errors
///
/// Returns [`ProbeError::ImmutableAttribute`] when `pool`, `thin`,
/// `compressed`, or `deduplicated` differ from the volume, and
/// [`ProbeError::InvalidParameter`] when `warning` is requested for a fully
/// allocated volume.
pub fn probe_volume(
    current: &VolumeState,
    desired: &VolumeSpec,
    desired_iogrp: Option<&[String]>,
    current_iogrp: &BTreeSet<String>,
) -> Result<ChangeSet, ProbeError> {
    check_immutable(current, desired)?;
    Ok(ChangeSet {
        size: probe_size(current, desired)?,
        iogrp: probe_iogrp(desired_iogrp, current_iogrp),
        volumegroup: probe_volumegroup(current, desired),
        warning: probe_warning(current, desired)?,
        cloud_backup: probe_cloud_backup(current, desired),
    })
}
