//! Serialisable summary of a reconciliation run.

use serde::Serialize;

use super::{Outcome, ReconcileError};

/// Report printed after a run: `{"changed", "msg"}` on success and
/// `{"failed": true, "msg"}` on failure.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// The run completed, possibly without changes.
    Success {
        /// Whether the cluster was modified.
        changed: bool,
        /// Description of the outcome.
        msg: String,
    },
    /// The run failed.
    Failure {
        /// Always `true`.
        failed: bool,
        /// Reason for the failure.
        msg: String,
    },
}

impl Report {
    /// Builds the report for a run result.
    #[must_use]
    pub fn from_result(result: &Result<Outcome, ReconcileError>) -> Self {
        match result {
            Ok(outcome) => Self::Success {
                changed: outcome.changed(),
                msg: outcome.msg.clone(),
            },
            Err(err) => Self::Failure {
                failed: true,
                msg: err.to_string(),
            },
        }
    }

    /// Returns whether the report describes a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}
