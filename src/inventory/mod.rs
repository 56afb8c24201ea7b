//! State fetcher: read-only queries that snapshot the cluster.
//!
//! Every function here issues `ls*` commands only. Responses are decoded
//! into the typed snapshots in [`types`] and never mutated afterwards.

mod types;

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::client::{ClientError, CommandOptions, SvcClient};

pub use types::{IoGroup, VolumeAccess, VolumeCopy, VolumeState, VolumeSummary};

/// Cluster error code returned when a named object does not exist.
const OBJECT_NOT_FOUND: &str = "CMMVC5753E";

const ALL_IOGRPS: &str = "all";

/// Errors raised while reading cluster state.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum InventoryError {
    /// Raised when a requested I/O group is unknown or has no nodes.
    #[error("{0}")]
    IoGroupResolution(String),
    /// Raised when a query response cannot be decoded.
    #[error("failed to decode {command} response: {message}")]
    Decode {
        /// Query whose response could not be decoded.
        command: String,
        /// Decoder error message.
        message: String,
    },
    /// Propagates transport failures.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl InventoryError {
    fn decode(command: &str, err: &serde_json::Error) -> Self {
        Self::Decode {
            command: command.to_owned(),
            message: err.to_string(),
        }
    }
}

fn is_not_found(err: &ClientError) -> bool {
    matches!(err, ClientError::Rejected { message, .. } if message.contains(OBJECT_NOT_FOUND))
}

/// Read-only view of a cluster through an [`SvcClient`].
#[derive(Debug)]
pub struct Inventory<'a, C> {
    client: &'a C,
}

impl<'a, C: SvcClient> Inventory<'a, C> {
    /// Wraps `client` for state queries.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetches the detailed view of volume `name` with capacities in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Client`] on transport failures other than
    /// "object not found", and [`InventoryError::Decode`] when the response
    /// has an unexpected shape.
    pub async fn get_existing_volume(
        &self,
        name: &str,
    ) -> Result<Option<VolumeState>, InventoryError> {
        let options = CommandOptions::new().flag("bytes");
        let response = match self.client.svc_obj_info("lsvdisk", &options, Some(name)).await {
            Ok(value) => value,
            Err(err) if is_not_found(&err) => {
                debug!(volume = %name, "volume not found");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let state = VolumeState::from_response(&response)
            .map_err(|err| InventoryError::decode("lsvdisk", &err))?;
        debug!(volume = %name, exists = state.is_some(), "fetched volume state");
        Ok(state)
    }

    /// Returns the names of the I/O groups that can access volume `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when the query fails or cannot be decoded.
    pub async fn get_existing_iogrp(&self, name: &str) -> Result<BTreeSet<String>, InventoryError> {
        let options = CommandOptions::new();
        let response = self
            .client
            .svc_obj_info("lsvdiskaccess", &options, Some(name))
            .await?;
        let rows: Vec<VolumeAccess> = types::rows(&response)
            .map_err(|err| InventoryError::decode("lsvdiskaccess", &err))?;
        let groups: BTreeSet<String> = rows
            .into_iter()
            .map(|row| row.io_group_name.trim().to_owned())
            .filter(|group| !group.is_empty())
            .collect();
        debug!(volume = %name, iogrps = ?groups, "fetched volume access");
        Ok(groups)
    }

    /// Lists every I/O group on the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when the query fails or cannot be decoded.
    pub async fn list_iogrps(&self) -> Result<Vec<IoGroup>, InventoryError> {
        let options = CommandOptions::new();
        let response = self.client.svc_obj_info("lsiogrp", &options, None).await?;
        types::rows(&response).map_err(|err| InventoryError::decode("lsiogrp", &err))
    }

    /// Resolves a comma-separated I/O group list against the eligible groups
    /// of the cluster.
    ///
    /// Names are trimmed, blanks dropped, and duplicates removed while
    /// preserving order. The single name `all` selects every eligible group.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::IoGroupResolution`] when a name is unknown
    /// or ineligible, or when nothing remains after parsing.
    pub async fn assemble_iogrp(&self, iogrp: &str) -> Result<Vec<String>, InventoryError> {
        let requested = split_iogrps(iogrp);
        if requested.is_empty() {
            return Err(InventoryError::IoGroupResolution(format!(
                "No valid I/O group found in [{iogrp}]"
            )));
        }
        let eligible: Vec<String> = self
            .list_iogrps()
            .await?
            .into_iter()
            .filter(IoGroup::is_eligible)
            .map(|group| group.name)
            .collect();
        if let [only] = requested.as_slice()
            && only.eq_ignore_ascii_case(ALL_IOGRPS)
        {
            if eligible.is_empty() {
                return Err(InventoryError::IoGroupResolution(format!(
                    "No valid I/O group found in [{iogrp}]"
                )));
            }
            return Ok(eligible);
        }
        let invalid: Vec<&str> = requested
            .iter()
            .filter(|name| !eligible.contains(*name))
            .map(String::as_str)
            .collect();
        if !invalid.is_empty() {
            return Err(InventoryError::IoGroupResolution(format!(
                "I/O group(s) not found or not eligible: {}",
                invalid.join(", ")
            )));
        }
        debug!(iogrps = ?requested, "resolved I/O groups");
        Ok(requested)
    }

    /// Lists all volumes in the concise view.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when the query fails or cannot be decoded.
    pub async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, InventoryError> {
        let options = CommandOptions::new();
        let response = self.client.svc_obj_info("lsvdisk", &options, None).await?;
        let volumes: Vec<VolumeSummary> =
            types::rows(&response).map_err(|err| InventoryError::decode("lsvdisk", &err))?;
        debug!(count = volumes.len(), "listed volumes");
        Ok(volumes)
    }
}

fn split_iogrps(iogrp: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    iogrp
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedClient;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn client() -> ScriptedClient {
        let client = ScriptedClient::default();
        client.push_obj_info(
            "lsiogrp",
            json!([
                {"id": "0", "name": "io_grp0", "node_count": "2"},
                {"id": "1", "name": "io_grp1", "node_count": "2"},
                {"id": "2", "name": "io_grp2", "node_count": "0"},
                {"id": "4", "name": "recovery_io_grp", "node_count": "0"}
            ]),
        );
        client
    }

    #[test]
    fn split_trims_and_deduplicates_in_order() {
        assert_eq!(
            split_iogrps(" io_grp1, io_grp0,,io_grp1 "),
            vec!["io_grp1", "io_grp0"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn assemble_accepts_eligible_groups(client: ScriptedClient) {
        let groups = Inventory::new(&client)
            .assemble_iogrp("io_grp0, io_grp1")
            .await
            .expect("eligible groups resolve");
        assert_eq!(groups, vec!["io_grp0", "io_grp1"]);
    }

    #[rstest]
    #[case("io_grp0, io_grp2", "I/O group(s) not found or not eligible: io_grp2")]
    #[case("recovery_io_grp", "I/O group(s) not found or not eligible: recovery_io_grp")]
    #[case("io_grp9", "I/O group(s) not found or not eligible: io_grp9")]
    #[tokio::test]
    async fn assemble_rejects_ineligible_groups(
        client: ScriptedClient,
        #[case] iogrp: &str,
        #[case] message: &str,
    ) {
        let err = Inventory::new(&client)
            .assemble_iogrp(iogrp)
            .await
            .expect_err("ineligible groups fail");
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    #[tokio::test]
    async fn assemble_expands_all_to_eligible_groups(client: ScriptedClient) {
        let groups = Inventory::new(&client)
            .assemble_iogrp("all")
            .await
            .expect("all resolves");
        assert_eq!(groups, vec!["io_grp0", "io_grp1"]);
    }

    #[tokio::test]
    async fn assemble_rejects_blank_lists_without_querying() {
        let client = ScriptedClient::default();
        let err = Inventory::new(&client)
            .assemble_iogrp(" , ")
            .await
            .expect_err("blank list fails");
        assert_eq!(err.to_string(), "No valid I/O group found in [ , ]");
        assert!(client.invocations().is_empty());
    }

    #[tokio::test]
    async fn missing_volume_maps_not_found_rejection() {
        let client = ScriptedClient::default();
        client.fail_obj_info(
            "lsvdisk",
            ClientError::Rejected {
                command: String::from("lsvdisk"),
                message: String::from("CMMVC5753E The specified object does not exist."),
            },
        );
        let state = Inventory::new(&client)
            .get_existing_volume("ghost")
            .await
            .expect("not found is not an error");
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn volume_query_requests_bytes() {
        let client = ScriptedClient::default();
        client.push_obj_info("lsvdisk", json!([{"name": "vol0", "capacity": "1024"}, {}]));
        let state = Inventory::new(&client)
            .get_existing_volume("vol0")
            .await
            .expect("query succeeds");
        assert_eq!(state.map(|volume| volume.capacity), Some(Some(1024)));
        let calls = client.invocations();
        assert_eq!(calls[0].command, "lsvdisk");
        assert_eq!(calls[0].target.as_deref(), Some("vol0"));
        assert!(calls[0].options.has_flag("bytes"));
    }

    #[tokio::test]
    async fn access_list_collects_group_names() {
        let client = ScriptedClient::default();
        client.push_obj_info(
            "lsvdiskaccess",
            json!([
                {"vdisk_name": "vol0", "IO_group_name": "io_grp1"},
                {"vdisk_name": "vol0", "IO_group_name": "io_grp0"}
            ]),
        );
        let groups = Inventory::new(&client)
            .get_existing_iogrp("vol0")
            .await
            .expect("query succeeds");
        assert_eq!(
            groups.into_iter().collect::<Vec<_>>(),
            vec!["io_grp0", "io_grp1"]
        );
    }
}
