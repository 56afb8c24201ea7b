//! Core library for the `vdiskctl` volume reconciliation tool.
//!
//! The crate reconciles a single IBM Storage Virtualize volume against a
//! declared [`VolumeSpec`]: it validates the request locally, snapshots the
//! cluster through the [`SvcClient`] seam, diffs the snapshot against the
//! spec, and applies the minimal set of commands (create → update → delete,
//! plus rename and thinclone conversion).

pub mod actions;
pub mod client;
pub mod config;
pub mod inventory;
pub mod logging;
pub mod probe;
pub mod reconcile;
pub mod test_support;
pub mod validate;
pub mod volume;

pub use actions::{ActionError, Conversion, VolumeActions};
pub use client::{ClientError, CommandOptions, CommandResponse, RestClient, SvcClient};
pub use config::{ClusterConfig, ConfigError};
pub use inventory::{Inventory, InventoryError, VolumeState, VolumeSummary};
pub use probe::{ChangeSet, ProbeError, probe_volume};
pub use reconcile::{Outcome, OutcomeKind, ReconcileError, Reconciler, Report};
pub use validate::ValidationError;
pub use volume::{DesiredState, SizeUnit, UnmapKind, VolumeSpec, VolumeType, convert_to_bytes};
