//! Desired-state model for a single volume.

mod size;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use size::{SizeError, SizeUnit, convert_to_bytes};

/// Whether the volume should exist after reconciliation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Create or update the volume.
    #[default]
    Present,
    /// Delete the volume.
    Absent,
}

/// Snapshot-derived volume flavours.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeType {
    /// Full independent copy of the source volume.
    Clone,
    /// Space-efficient copy that stays linked to its snapshot.
    Thinclone,
}

impl VolumeType {
    /// Label used on the wire and in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Thinclone => "thinclone",
        }
    }
}

impl fmt::Display for VolumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Associations severed before a volume is deleted.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmapKind {
    /// Host mappings.
    HostMappings,
    /// Remote-copy relationships.
    RemotecopyRelationships,
    /// FlashCopy mappings.
    FlashcopyMappings,
}

/// Desired state of a volume, as supplied by the caller.
///
/// Optional fields left unset are not reconciled. Use
/// [`VolumeSpec::builder`] to construct one with trimmed inputs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct VolumeSpec {
    /// Volume name; a colon-separated list when converting clones.
    pub name: Option<String>,
    /// Existing name to rename from.
    pub old_name: Option<String>,
    /// Whether the volume should exist.
    pub state: DesiredState,
    /// Storage pool the volume lives in.
    pub pool: Option<String>,
    /// Capacity as a decimal integer, interpreted in [`VolumeSpec::unit`].
    pub size: Option<String>,
    /// Unit for `size`; `mb` when unset.
    pub unit: Option<SizeUnit>,
    /// Comma-separated I/O group names.
    pub iogrp: Option<String>,
    /// Volume group to place the volume in.
    pub volumegroup: Option<String>,
    /// Remove the volume from its volume group.
    pub novolumegroup: Option<bool>,
    /// Thin-provisioned copy.
    pub thin: Option<bool>,
    /// Compressed copy.
    pub compressed: Option<bool>,
    /// Deduplicated copy.
    pub deduplicated: Option<bool>,
    /// Real capacity buffer for thin or compressed copies, for example `10%`.
    pub buffersize: Option<String>,
    /// Capacity warning threshold as a percentage, for example `80` or `80%`.
    pub warning: Option<String>,
    /// Snapshot-derived volume type.
    #[serde(rename = "type")]
    pub volume_type: Option<VolumeType>,
    /// Source volume for clone or thinclone creation.
    pub fromsourcevolume: Option<String>,
    /// Associations to sever on deletion.
    pub unmap: Vec<UnmapKind>,
    /// Desired cloud backup state.
    pub enable_cloud_snapshot: Option<bool>,
    /// Cloud account used for backups.
    pub cloud_account_name: Option<String>,
}

impl VolumeSpec {
    /// Starts a builder for a [`VolumeSpec`].
    #[must_use]
    pub fn builder() -> VolumeSpecBuilder {
        VolumeSpecBuilder::default()
    }

    /// Returns the volume name, or an empty string when unset.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Returns the effective size unit.
    #[must_use]
    pub fn unit_or_default(&self) -> SizeUnit {
        self.unit.unwrap_or_default()
    }

    /// Converts the requested size to bytes, if one was requested.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError`] when the size is not a valid integer or
    /// overflows.
    pub fn size_bytes(&self) -> Result<Option<u64>, SizeError> {
        self.size
            .as_deref()
            .map(|size| convert_to_bytes(size, self.unit_or_default()))
            .transpose()
    }

    /// Returns the warning threshold as a percentage, if set and well
    /// formed.
    #[must_use]
    pub fn warning_percent(&self) -> Option<u8> {
        self.warning.as_deref().and_then(parse_percentage)
    }

    /// Splits `name` on `:` for multi-volume operations.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.name()
            .split(':')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Returns whether this request asks to convert existing thinclones to
    /// clones rather than create anything.
    #[must_use]
    pub fn is_clone_conversion(&self) -> bool {
        self.state == DesiredState::Present
            && self.old_name.is_none()
            && self.volume_type == Some(VolumeType::Clone)
            && self.fromsourcevolume.is_none()
            && self.pool.is_none()
            && self.size.is_none()
    }

    /// Names of the optional parameters that are set, in declaration order.
    /// `name`, `state`, and `unmap` are never listed.
    #[must_use]
    pub fn present_parameters(&self) -> Vec<&'static str> {
        let flags = [
            ("old_name", self.old_name.is_some()),
            ("pool", self.pool.is_some()),
            ("size", self.size.is_some()),
            ("unit", self.unit.is_some()),
            ("iogrp", self.iogrp.is_some()),
            ("volumegroup", self.volumegroup.is_some()),
            ("novolumegroup", self.novolumegroup.is_some()),
            ("thin", self.thin.is_some()),
            ("compressed", self.compressed.is_some()),
            ("deduplicated", self.deduplicated.is_some()),
            ("buffersize", self.buffersize.is_some()),
            ("warning", self.warning.is_some()),
            ("type", self.volume_type.is_some()),
            ("fromsourcevolume", self.fromsourcevolume.is_some()),
            ("enable_cloud_snapshot", self.enable_cloud_snapshot.is_some()),
            ("cloud_account_name", self.cloud_account_name.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(param, set)| set.then_some(param))
            .collect()
    }
}

/// Parses `80` or `80%` into a percentage between 0 and 100.
#[must_use]
pub fn parse_percentage(value: &str) -> Option<u8> {
    let trimmed = value.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    digits.parse::<u8>().ok().filter(|percent| *percent <= 100)
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_owned())
        .filter(|inner| !inner.is_empty())
}

/// Builder for [`VolumeSpec`] that trims string inputs and drops blank
/// values at construction.
#[derive(Clone, Debug, Default)]
pub struct VolumeSpecBuilder {
    spec: VolumeSpec,
}

macro_rules! string_setter {
    ($($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("Sets `", stringify!($field), "`.")]
            #[must_use]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.spec.$field = Some(value.into());
                self
            }
        )*
    };
}

macro_rules! bool_setter {
    ($($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("Sets the `", stringify!($field), "` flag.")]
            #[must_use]
            pub const fn $field(mut self, value: bool) -> Self {
                self.spec.$field = Some(value);
                self
            }
        )*
    };
}

impl VolumeSpecBuilder {
    string_setter!(
        name,
        old_name,
        pool,
        size,
        iogrp,
        volumegroup,
        buffersize,
        warning,
        fromsourcevolume,
        cloud_account_name,
    );

    bool_setter!(
        novolumegroup,
        thin,
        compressed,
        deduplicated,
        enable_cloud_snapshot,
    );

    /// Sets the desired state.
    #[must_use]
    pub const fn state(mut self, value: DesiredState) -> Self {
        self.spec.state = value;
        self
    }

    /// Sets the size unit.
    #[must_use]
    pub const fn unit(mut self, value: SizeUnit) -> Self {
        self.spec.unit = Some(value);
        self
    }

    /// Sets the snapshot-derived volume type.
    #[must_use]
    pub const fn volume_type(mut self, value: VolumeType) -> Self {
        self.spec.volume_type = Some(value);
        self
    }

    /// Applies `set` when `value` is present, leaving the builder unchanged
    /// otherwise.
    #[must_use]
    pub fn with<T>(self, value: Option<T>, set: impl FnOnce(Self, T) -> Self) -> Self {
        match value {
            Some(inner) => set(self, inner),
            None => self,
        }
    }

    /// Adds an association to sever on deletion.
    #[must_use]
    pub fn unmap(mut self, value: UnmapKind) -> Self {
        if !self.spec.unmap.contains(&value) {
            self.spec.unmap.push(value);
        }
        self
    }

    /// Builds the [`VolumeSpec`], trimming strings and discarding blanks.
    #[must_use]
    pub fn build(self) -> VolumeSpec {
        let spec = self.spec;
        VolumeSpec {
            name: clean(spec.name),
            old_name: clean(spec.old_name),
            pool: clean(spec.pool),
            size: clean(spec.size),
            iogrp: clean(spec.iogrp),
            volumegroup: clean(spec.volumegroup),
            buffersize: clean(spec.buffersize),
            warning: clean(spec.warning),
            fromsourcevolume: clean(spec.fromsourcevolume),
            cloud_account_name: clean(spec.cloud_account_name),
            ..spec
        }
    }
}
