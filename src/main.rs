//! Binary entry point for the `vdiskctl` CLI.

mod cli;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use cli::{ApplyCommand, Cli, ClusterArgs, StateArg, TypeArg, UnitArg, UnmapArg};
use vdiskctl::logging::{self, LoggingError};
use vdiskctl::volume::VolumeSpecBuilder;
use vdiskctl::{
    ClientError, ClusterConfig, ConfigError, DesiredState, Reconciler, Report, RestClient,
    SizeUnit, UnmapKind, VolumeSpec, VolumeType,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("client error: {0}")]
    Client(#[from] ClientError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("failed to write report: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Apply(command) => exec_apply(*command).await,
    }
}

async fn exec_apply(args: ApplyCommand) -> Result<i32, CliError> {
    let mut config = ClusterConfig::load_without_cli_args()?;
    apply_overrides(&mut config, &args.cluster);
    logging::init(config.log_path.as_deref())?;

    let client = RestClient::new(&config)?;
    let spec = volume_spec(args);
    let result = Reconciler::new(client).apply(&spec).await;
    let report = Report::from_result(&result);
    write_report(io::stdout(), &report)?;
    Ok(i32::from(report.is_failure()))
}

fn apply_overrides(config: &mut ClusterConfig, overrides: &ClusterArgs) {
    if let Some(clustername) = &overrides.clustername {
        config.clustername.clone_from(clustername);
    }
    if let Some(domain) = &overrides.domain {
        config.domain = Some(domain.clone());
    }
    if let Some(username) = &overrides.username {
        config.username = Some(username.clone());
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if overrides.insecure {
        config.validate_certs = false;
    }
    if let Some(log_path) = &overrides.log_path {
        config.log_path = Some(log_path.clone());
    }
}

fn volume_spec(args: ApplyCommand) -> VolumeSpec {
    let state = match args.state {
        StateArg::Present => DesiredState::Present,
        StateArg::Absent => DesiredState::Absent,
    };
    let volume_type = args.volume_type.map(|kind| match kind {
        TypeArg::Clone => VolumeType::Clone,
        TypeArg::Thinclone => VolumeType::Thinclone,
    });
    let mut builder = VolumeSpec::builder()
        .state(state)
        .with(args.name, VolumeSpecBuilder::name)
        .with(args.old_name, VolumeSpecBuilder::old_name)
        .with(args.pool, VolumeSpecBuilder::pool)
        .with(args.size, VolumeSpecBuilder::size)
        .with(args.unit.map(size_unit), VolumeSpecBuilder::unit)
        .with(args.iogrp, VolumeSpecBuilder::iogrp)
        .with(args.volumegroup, VolumeSpecBuilder::volumegroup)
        .with(args.novolumegroup.then_some(true), VolumeSpecBuilder::novolumegroup)
        .with(args.thin.then_some(true), VolumeSpecBuilder::thin)
        .with(args.compressed.then_some(true), VolumeSpecBuilder::compressed)
        .with(args.deduplicated.then_some(true), VolumeSpecBuilder::deduplicated)
        .with(args.buffersize, VolumeSpecBuilder::buffersize)
        .with(args.warning, VolumeSpecBuilder::warning)
        .with(volume_type, VolumeSpecBuilder::volume_type)
        .with(args.fromsourcevolume, VolumeSpecBuilder::fromsourcevolume)
        .with(args.enable_cloud_snapshot, VolumeSpecBuilder::enable_cloud_snapshot)
        .with(args.cloud_account_name, VolumeSpecBuilder::cloud_account_name);
    for kind in args.unmap {
        builder = builder.unmap(match kind {
            UnmapArg::HostMappings => UnmapKind::HostMappings,
            UnmapArg::RemotecopyRelationships => UnmapKind::RemotecopyRelationships,
            UnmapArg::FlashcopyMappings => UnmapKind::FlashcopyMappings,
        });
    }
    builder.build()
}

const fn size_unit(unit: UnitArg) -> SizeUnit {
    match unit {
        UnitArg::B => SizeUnit::B,
        UnitArg::Kb => SizeUnit::Kb,
        UnitArg::Mb => SizeUnit::Mb,
        UnitArg::Gb => SizeUnit::Gb,
        UnitArg::Tb => SizeUnit::Tb,
        UnitArg::Pb => SizeUnit::Pb,
    }
}

fn write_report(mut target: impl Write, report: &Report) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string(report).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
