//! Error type for a reconciliation run.

use thiserror::Error;

use crate::actions::ActionError;
use crate::inventory::InventoryError;
use crate::probe::ProbeError;
use crate::validate::ValidationError;

/// Errors raised by [`super::Reconciler::apply`]. Every variant displays
/// exactly the message reported to the user.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ReconcileError {
    /// Local parameter validation failed; nothing was sent to the cluster.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Reading cluster state failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    /// The existing volume cannot reach the desired state.
    #[error(transparent)]
    Probe(#[from] ProbeError),
    /// The cluster rejected a mutation.
    #[error(transparent)]
    Action(#[from] ActionError),
    /// Raised when a rename's source is missing or its target is taken.
    #[error("{0}")]
    RenameConflict(String),
}
