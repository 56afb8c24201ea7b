//! Remote state snapshots decoded from `ls*` responses.
//!
//! The cluster reports every attribute as a string (`"1073741824"`,
//! `"yes"`, `""`). Raw records keep that shape and are converted into typed
//! snapshots once, so the rest of the crate never inspects string flags.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::volume::parse_percentage;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVolume {
    id: String,
    name: String,
    capacity: String,
    mdisk_grp_name: String,
    #[serde(rename = "type")]
    vdisk_type: String,
    copy_count: String,
    se_copy_count: String,
    compressed_copy_count: String,
    deduplicated_copy_count: String,
    fc_map_count: String,
    #[serde(rename = "RC_name")]
    rc_name: String,
    volume_group_name: String,
    cloud_backup_enabled: String,
    cloud_account_name: String,
    volume_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCopy {
    copy_id: String,
    mdisk_grp_name: String,
    real_capacity: String,
    used_capacity: String,
    se_copy: String,
    compressed_copy: String,
    deduplicated_copy: String,
    warning: String,
    autoexpand: String,
    grainsize: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn number<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn is_empty_record(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// One copy of a volume as reported by the detailed `lsvdisk` view.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VolumeCopy {
    /// Copy identifier.
    pub copy_id: Option<String>,
    /// Pool holding this copy.
    pub pool: Option<String>,
    /// Allocated capacity in bytes.
    pub real_capacity: Option<u64>,
    /// Used capacity in bytes.
    pub used_capacity: Option<u64>,
    /// Whether the copy is space-efficient (thin).
    pub se_copy: bool,
    /// Whether the copy is compressed.
    pub compressed_copy: bool,
    /// Whether the copy is deduplicated.
    pub deduplicated_copy: bool,
    /// Capacity warning threshold percentage.
    pub warning: Option<u8>,
    /// Whether real capacity grows automatically.
    pub autoexpand: bool,
    /// Grain size in KiB.
    pub grainsize: Option<u32>,
}

impl From<RawCopy> for VolumeCopy {
    fn from(raw: RawCopy) -> Self {
        Self {
            copy_id: non_empty(&raw.copy_id),
            pool: non_empty(&raw.mdisk_grp_name),
            real_capacity: number(&raw.real_capacity),
            used_capacity: number(&raw.used_capacity),
            se_copy: yes(&raw.se_copy),
            compressed_copy: yes(&raw.compressed_copy),
            deduplicated_copy: yes(&raw.deduplicated_copy),
            warning: parse_percentage(&raw.warning),
            autoexpand: raw.autoexpand.trim().eq_ignore_ascii_case("on"),
            grainsize: number(&raw.grainsize),
        }
    }
}

/// Immutable snapshot of an existing volume, valid for one reconciliation
/// pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VolumeState {
    /// Volume identifier.
    pub id: Option<String>,
    /// Volume name.
    pub name: String,
    /// Virtual capacity in bytes.
    pub capacity: Option<u64>,
    /// Pool name; `many` for volumes with copies in several pools.
    pub pool: Option<String>,
    /// Virtualisation type, for example `striped` or `many`.
    pub vdisk_type: Option<String>,
    /// Number of copies.
    pub copy_count: u32,
    /// Number of space-efficient copies.
    pub se_copy_count: u32,
    /// Number of compressed copies.
    pub compressed_copy_count: u32,
    /// Number of deduplicated copies.
    pub deduplicated_copy_count: u32,
    /// Number of FlashCopy mappings, when reported.
    pub fc_map_count: Option<u32>,
    /// Remote-copy relationship name.
    pub rc_name: Option<String>,
    /// Volume group name.
    pub volume_group: Option<String>,
    /// Whether cloud backup is enabled.
    pub cloud_backup_enabled: bool,
    /// Cloud account used for backups.
    pub cloud_account_name: Option<String>,
    /// `clone` or `thinclone` for snapshot-derived volumes.
    pub volume_type: Option<String>,
    /// Copies of the volume.
    pub copies: Vec<VolumeCopy>,
}

impl VolumeState {
    /// Decodes a detailed `lsvdisk <name>` response.
    ///
    /// The response is either a single object or an array whose first
    /// element describes the volume and whose remaining elements describe
    /// its copies. Empty responses decode to `None`.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when a record has an unexpected shape.
    pub fn from_response(value: &Value) -> Result<Option<Self>, serde_json::Error> {
        if is_empty_record(value) {
            return Ok(None);
        }
        let (volume, copies): (&Value, &[Value]) = match value {
            Value::Array(items) => match items.split_first() {
                Some((head, tail)) => (head, tail),
                None => return Ok(None),
            },
            other => (other, &[]),
        };
        if is_empty_record(volume) {
            return Ok(None);
        }
        let raw = RawVolume::deserialize(volume)?;
        let copies = copies
            .iter()
            .filter(|copy| !is_empty_record(copy))
            .map(|copy| RawCopy::deserialize(copy).map(VolumeCopy::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self {
            id: non_empty(&raw.id),
            name: raw.name.trim().to_owned(),
            capacity: number(&raw.capacity),
            pool: non_empty(&raw.mdisk_grp_name),
            vdisk_type: non_empty(&raw.vdisk_type),
            copy_count: number(&raw.copy_count).unwrap_or(1),
            se_copy_count: number(&raw.se_copy_count).unwrap_or_default(),
            compressed_copy_count: number(&raw.compressed_copy_count).unwrap_or_default(),
            deduplicated_copy_count: number(&raw.deduplicated_copy_count).unwrap_or_default(),
            fc_map_count: number(&raw.fc_map_count),
            rc_name: non_empty(&raw.rc_name),
            volume_group: non_empty(&raw.volume_group_name),
            cloud_backup_enabled: yes(&raw.cloud_backup_enabled),
            cloud_account_name: non_empty(&raw.cloud_account_name),
            volume_type: non_empty(&raw.volume_type),
            copies,
        }))
    }

    /// Whether any copy is thin-provisioned. A copy whose real capacity is
    /// below the virtual capacity counts as thin unless it is compressed.
    #[must_use]
    pub fn is_thin(&self) -> bool {
        self.se_copy_count > 0
            || self.copies.iter().any(|copy| {
                copy.se_copy
                    || (!copy.compressed_copy
                        && matches!(
                            (copy.real_capacity, self.capacity),
                            (Some(real), Some(virtual_capacity)) if real < virtual_capacity
                        ))
            })
    }

    /// Whether any copy is compressed.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.compressed_copy_count > 0 || self.copies.iter().any(|copy| copy.compressed_copy)
    }

    /// Whether any copy is deduplicated.
    #[must_use]
    pub fn is_deduplicated(&self) -> bool {
        self.deduplicated_copy_count > 0 || self.copies.iter().any(|copy| copy.deduplicated_copy)
    }

    /// Whether the volume is mirrored across several copies.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.copy_count > 1 || self.vdisk_type.as_deref() == Some("many")
    }

    /// Capacity warning of the primary copy.
    #[must_use]
    pub fn warning(&self) -> Option<u8> {
        self.copies.first().and_then(|copy| copy.warning)
    }
}

/// I/O group as reported by `lsiogrp`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct IoGroup {
    /// Group identifier.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Number of nodes in the group.
    pub node_count: String,
}

impl IoGroup {
    /// Groups without nodes (including the recovery group) cannot serve a
    /// volume.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        number::<u32>(&self.node_count).is_some_and(|count| count > 0)
    }
}

/// Row of the volume-to-I/O-group access list from `lsvdiskaccess`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct VolumeAccess {
    /// Volume name.
    pub vdisk_name: String,
    /// I/O group with access to the volume.
    #[serde(rename = "IO_group_name")]
    pub io_group_name: String,
}

/// Concise volume listing entry from a plain `lsvdisk`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct VolumeSummary {
    /// Volume identifier.
    pub id: String,
    /// Volume name.
    pub name: String,
    /// `clone`, `thinclone`, or empty.
    pub volume_type: String,
}

impl VolumeSummary {
    /// Whether the volume is a thinclone that can still be converted.
    #[must_use]
    pub fn is_thinclone(&self) -> bool {
        self.volume_type.trim() == "thinclone"
    }
}

/// Decodes a list response, treating null and empty objects as no rows.
pub(crate) fn rows<T>(value: &Value) -> Result<Vec<T>, serde_json::Error>
where
    T: for<'de> Deserialize<'de>,
{
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !is_empty_record(item))
            .map(T::deserialize)
            .collect(),
        other if is_empty_record(other) => Ok(Vec::new()),
        other => T::deserialize(other).map(|row| vec![row]),
    }
}
