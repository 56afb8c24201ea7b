//! Action executor: one remote command per change.
//!
//! [`VolumeActions`] borrows the transport and the desired state. Every
//! method issues exactly the commands it names and maps rejections to an
//! [`ActionError`] variant that keeps the cluster's text intact.

mod clone;
mod create;
mod iogrp;
mod remove;
mod rename;
mod resize;
mod update;

use thiserror::Error;

use crate::client::{CommandOptions, CommandResponse, SvcClient};
use crate::volume::VolumeSpec;

pub use clone::Conversion;

/// Errors raised when the cluster rejects a mutation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ActionError {
    /// Raised when `mkvolume` fails.
    #[error("{0}")]
    Creation(String),
    /// Raised when a modification command fails.
    #[error("{0}")]
    Update(String),
    /// Raised when the transient snapshot for a clone cannot be taken.
    #[error("{0}")]
    SnapshotCreation(String),
    /// Raised when `rmvolume` fails.
    #[error("{0}")]
    Removal(String),
    /// Raised when the rename command fails.
    #[error("{0}")]
    Rename(String),
    /// Raised when a thinclone cannot be converted.
    #[error("{0}")]
    Conversion(String),
}

/// Executes mutations for a single volume specification.
#[derive(Debug)]
pub struct VolumeActions<'a, C> {
    client: &'a C,
    spec: &'a VolumeSpec,
}

impl<'a, C: SvcClient> VolumeActions<'a, C> {
    /// Binds `client` to the desired state in `spec`.
    #[must_use]
    pub const fn new(client: &'a C, spec: &'a VolumeSpec) -> Self {
        Self { client, spec }
    }

    fn name(&self) -> &str {
        self.spec.name()
    }

    async fn run(
        &self,
        cmd: &str,
        options: &CommandOptions,
        target: Option<&str>,
        wrap: fn(String) -> ActionError,
    ) -> Result<Option<CommandResponse>, ActionError> {
        self.client
            .svc_run_command(cmd, options, target)
            .await
            .map_err(|err| wrap(err.to_string()))
    }
}

#[cfg(test)]
mod tests;
