//! Command-line interface definitions for the `vdiskctl` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, ValueEnum};

/// Top-level CLI for the `vdiskctl` binary.
#[derive(Debug, Parser)]
#[command(
    name = "vdiskctl",
    about = "Reconcile IBM Storage Virtualize volumes against a declared state",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Create, update, rename, convert, or delete a volume.
    #[command(
        name = "apply",
        about = "Create, update, rename, convert, or delete a volume"
    )]
    Apply(Box<ApplyCommand>),
}

/// Connection overrides layered over configuration files and `SVC_*`
/// environment variables.
#[derive(Debug, Default, Args)]
pub(crate) struct ClusterArgs {
    /// Cluster management hostname or IP address.
    #[arg(long, value_name = "HOST")]
    pub(crate) clustername: Option<String>,
    /// DNS domain appended to the cluster name.
    #[arg(long, value_name = "DOMAIN")]
    pub(crate) domain: Option<String>,
    /// REST API user.
    #[arg(long, value_name = "USER")]
    pub(crate) username: Option<String>,
    /// REST API port.
    #[arg(long, value_name = "PORT")]
    pub(crate) port: Option<u16>,
    /// Skip TLS certificate verification.
    #[arg(long)]
    pub(crate) insecure: bool,
    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub(crate) log_path: Option<String>,
}

/// Desired volume state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum StateArg {
    /// The volume should exist.
    #[default]
    Present,
    /// The volume should not exist.
    Absent,
}

/// Unit applied to `--size`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum UnitArg {
    /// Bytes.
    B,
    /// Kibibytes.
    Kb,
    /// Mebibytes.
    Mb,
    /// Gibibytes.
    Gb,
    /// Tebibytes.
    Tb,
    /// Pebibytes.
    Pb,
}

/// Snapshot-derived volume type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum TypeArg {
    /// Independent full copy.
    Clone,
    /// Space-efficient copy linked to its snapshot.
    Thinclone,
}

/// Association severed before deletion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub(crate) enum UnmapArg {
    /// Host mappings.
    HostMappings,
    /// Remote-copy relationships.
    RemotecopyRelationships,
    /// FlashCopy mappings.
    FlashcopyMappings,
}

/// Arguments for the `vdiskctl apply` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ApplyCommand {
    /// Connection overrides.
    #[command(flatten)]
    pub(crate) cluster: ClusterArgs,
    /// Volume name; a colon-separated list when converting thinclones.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: Option<String>,
    /// Whether the volume should exist.
    #[arg(long, value_enum, default_value_t = StateArg::Present)]
    pub(crate) state: StateArg,
    /// Existing volume to rename to `--name`.
    #[arg(long, value_name = "NAME")]
    pub(crate) old_name: Option<String>,
    /// Storage pool.
    #[arg(long, value_name = "POOL")]
    pub(crate) pool: Option<String>,
    /// Capacity as an integer in `--unit`.
    #[arg(long, value_name = "SIZE")]
    pub(crate) size: Option<String>,
    /// Unit for `--size` (defaults to mb).
    #[arg(long, value_enum)]
    pub(crate) unit: Option<UnitArg>,
    /// Comma-separated I/O group names, or `all`.
    #[arg(long, value_name = "IOGRPS")]
    pub(crate) iogrp: Option<String>,
    /// Volume group to place the volume in.
    #[arg(long, value_name = "GROUP")]
    pub(crate) volumegroup: Option<String>,
    /// Remove the volume from its volume group.
    #[arg(long)]
    pub(crate) novolumegroup: bool,
    /// Create a thin-provisioned volume.
    #[arg(long)]
    pub(crate) thin: bool,
    /// Create a compressed volume.
    #[arg(long)]
    pub(crate) compressed: bool,
    /// Create a deduplicated volume.
    #[arg(long)]
    pub(crate) deduplicated: bool,
    /// Real capacity buffer for thin or compressed volumes.
    #[arg(long, value_name = "BUFFER")]
    pub(crate) buffersize: Option<String>,
    /// Capacity warning threshold, for example `80%`.
    #[arg(long, value_name = "PERCENT")]
    pub(crate) warning: Option<String>,
    /// Create a clone or thinclone, or convert thinclones when used alone.
    #[arg(long = "type", value_enum)]
    pub(crate) volume_type: Option<TypeArg>,
    /// Source volume for clone or thinclone creation.
    #[arg(long, value_name = "VOLUME")]
    pub(crate) fromsourcevolume: Option<String>,
    /// Association to sever when deleting; repeatable.
    #[arg(long, value_enum)]
    pub(crate) unmap: Vec<UnmapArg>,
    /// Enable or disable cloud backup of an existing volume.
    #[arg(long, value_name = "BOOL")]
    pub(crate) enable_cloud_snapshot: Option<bool>,
    /// Cloud account used for backups.
    #[arg(long, value_name = "ACCOUNT")]
    pub(crate) cloud_account_name: Option<String>,
}
