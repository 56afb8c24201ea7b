//! Unit tests for the action executor.

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::client::CommandResponse;
use crate::inventory::{VolumeState, VolumeSummary};
use crate::probe::{ChangeSet, CloudBackupChange, IoGroupChange, SizeChange, VolumeGroupChange};
use crate::test_support::ScriptedClient;
use crate::volume::{UnmapKind, VolumeType};

fn summary(name: &str, volume_type: &str) -> VolumeSummary {
    VolumeSummary {
        id: String::new(),
        name: name.to_owned(),
        volume_type: volume_type.to_owned(),
    }
}

#[tokio::test]
async fn transient_snapshot_returns_id() {
    let client = ScriptedClient::new();
    client.push_run_command(
        "addsnapshot",
        CommandResponse {
            id: Some(String::from("3")),
            message: Some(String::from(
                "Snapshot, id [3], successfully created or triggered",
            )),
        },
    );
    let spec = VolumeSpec::builder()
        .name("new_name")
        .volume_type(VolumeType::Thinclone)
        .fromsourcevolume("vol1")
        .build();
    let id = VolumeActions::new(&client, &spec)
        .create_transient_snapshot()
        .await
        .expect("snapshot succeeds");
    assert_eq!(id, "3");
    let calls = client.mutations();
    assert_eq!(calls[0].options.get("volumes"), Some("vol1"));
    assert_eq!(calls[0].options.get("retentionminutes"), Some("5"));
}

#[tokio::test]
async fn clone_creation_uses_snapshot_id() {
    let client = ScriptedClient::new();
    client.push_run_command(
        "addsnapshot",
        CommandResponse {
            id: Some(String::from("10")),
            message: None,
        },
    );
    client.push_run_command(
        "mkvolume",
        CommandResponse {
            id: Some(String::from("25")),
            message: Some(String::from("Volume, id [25], successfully created")),
        },
    );
    let spec = VolumeSpec::builder()
        .name("test_volume")
        .pool("test_pool")
        .volume_type(VolumeType::Clone)
        .fromsourcevolume("vol1")
        .build();
    let id = VolumeActions::new(&client, &spec)
        .create_volume(&[])
        .await
        .expect("creation succeeds");
    assert_eq!(id.as_deref(), Some("25"));
    assert_eq!(client.mutation_names(), vec!["addsnapshot", "mkvolume"]);
    let mkvolume = &client.mutations()[1];
    assert_eq!(mkvolume.options.get("fromsnapshotid"), Some("10"));
    assert_eq!(mkvolume.options.get("type"), Some("clone"));
    assert_eq!(mkvolume.options.get("size"), None);
}

#[tokio::test]
async fn plain_creation_sends_capacity_options() {
    let client = ScriptedClient::new();
    let spec = VolumeSpec::builder()
        .name("test_volume")
        .pool("pool0")
        .size("10")
        .thin(true)
        .warning("80")
        .build();
    let iogrp = vec![String::from("io_grp0"), String::from("io_grp1")];
    VolumeActions::new(&client, &spec)
        .create_volume(&iogrp)
        .await
        .expect("creation succeeds");
    let call = &client.mutations()[0];
    assert_eq!(call.command, "mkvolume");
    assert_eq!(call.options.get("unit"), Some("mb"));
    assert_eq!(call.options.get("warning"), Some("80%"));
    assert_eq!(call.options.get("iogrp"), Some("io_grp0:io_grp1"));
    assert!(call.options.has_flag("thin"));
    assert!(!call.options.has_flag("compressed"));
}

#[tokio::test]
async fn creation_failure_keeps_cluster_text() {
    let client = ScriptedClient::new();
    client.reject_run_command("mkvolume", "CMMVC5754E The specified object does not exist.");
    let spec = VolumeSpec::builder()
        .name("test_volume")
        .pool("missing")
        .size("10")
        .build();
    let err = VolumeActions::new(&client, &spec)
        .create_volume(&[])
        .await
        .expect_err("creation fails");
    assert_eq!(
        err,
        ActionError::Creation(String::from(
            "CMMVC5754E The specified object does not exist."
        ))
    );
}

#[rstest]
#[case::unrelated(None, Some(0), vec!["removehostmappings"])]
#[case::related(Some("rcrel0"), Some(2), vec!["removehostmappings", "removercrelationships", "removefcmaps"])]
#[case::unknown_fc_count(None, None, vec!["removehostmappings", "removefcmaps"])]
#[tokio::test]
async fn removal_only_severs_existing_relations(
    #[case] rc_name: Option<&str>,
    #[case] fc_map_count: Option<u32>,
    #[case] expected: Vec<&str>,
) {
    let client = ScriptedClient::new();
    let spec = VolumeSpec::builder()
        .name("test_volume")
        .state(crate::volume::DesiredState::Absent)
        .unmap(UnmapKind::HostMappings)
        .unmap(UnmapKind::RemotecopyRelationships)
        .unmap(UnmapKind::FlashcopyMappings)
        .build();
    let state = VolumeState {
        name: String::from("test_volume"),
        rc_name: rc_name.map(str::to_owned),
        fc_map_count,
        ..Default::default()
    };
    VolumeActions::new(&client, &spec)
        .remove_volume(&state)
        .await
        .expect("removal succeeds");
    let call = &client.mutations()[0];
    assert_eq!(call.command, "rmvolume");
    assert_eq!(call.target.as_deref(), Some("test_volume"));
    for flag in ["removehostmappings", "removercrelationships", "removefcmaps"] {
        assert_eq!(call.options.has_flag(flag), expected.contains(&flag), "{flag}");
    }
}

#[tokio::test]
async fn update_applies_changes_in_order() {
    let client = ScriptedClient::new();
    let spec = VolumeSpec::builder().name("test_volume").build();
    let changes = ChangeSet {
        iogrp: IoGroupChange {
            add: vec![String::from("io_grp1")],
            remove: vec![String::from("io_grp0")],
        },
        size: Some(SizeChange::Shrink(1024)),
        volumegroup: Some(VolumeGroupChange::Remove),
        warning: Some(70),
        cloud_backup: Some(CloudBackupChange::Disable),
    };
    VolumeActions::new(&client, &spec)
        .update_volume(&changes)
        .await
        .expect("update succeeds");
    assert_eq!(
        client.mutation_names(),
        vec![
            "addvdiskaccess",
            "rmvdiskaccess",
            "shrinkvdisksize",
            "chvdisk",
            "chvdisk",
            "chvdisk"
        ]
    );
    let calls = client.mutations();
    assert_eq!(calls[2].options.get("size"), Some("1024"));
    assert_eq!(calls[2].options.get("unit"), Some("b"));
    assert!(calls[3].options.has_flag("novolumegroup"));
    assert_eq!(calls[4].options.get("warning"), Some("70%"));
    assert!(calls[5].options.has_flag("disable"));
}

#[tokio::test]
async fn update_stops_at_first_rejection() {
    let client = ScriptedClient::new();
    client.reject_run_command("expandvdisksize", "CMMVC5860E not enough extents");
    let spec = VolumeSpec::builder().name("test_volume").build();
    let changes = ChangeSet {
        size: Some(SizeChange::Expand(1024)),
        warning: Some(70),
        ..ChangeSet::default()
    };
    let err = VolumeActions::new(&client, &spec)
        .update_volume(&changes)
        .await
        .expect_err("update fails");
    assert_eq!(err, ActionError::Update(String::from("CMMVC5860E not enough extents")));
    assert_eq!(client.mutation_names(), vec!["expandvdisksize"]);
}

#[tokio::test]
async fn rename_reports_confirmation() {
    let client = ScriptedClient::new();
    let spec = VolumeSpec::builder().name("new_name").old_name("name").build();
    let message = VolumeActions::new(&client, &spec)
        .volume_rename("name", "new_name")
        .await
        .expect("rename succeeds");
    assert_eq!(message, "Volume [name] has been successfully rename to [new_name]");
    let call = &client.mutations()[0];
    assert_eq!(call.target.as_deref(), Some("name"));
    assert_eq!(call.options.get("name"), Some("new_name"));
}

#[rstest]
#[case::single_thinclone("vol0", &[("vol0", "thinclone")], true, "Volume(s) [vol0] converted to clone.")]
#[case::single_clone("vol1", &[("vol1", "clone")], false, "Volume vol1 is not a thinclone.")]
#[case::single_plain("vol2", &[("vol2", "")], false, "Volume vol2 is not a thinclone.")]
#[case::mixed(
    "vol0:vol1:vol2",
    &[("vol0", "thinclone"), ("vol1", "clone"), ("vol2", "thinclone")],
    true,
    "Volume(s) [vol0:vol1:vol2] converted to clone."
)]
#[case::none(
    "vol0:vol1:vol2",
    &[("vol0", ""), ("vol1", ""), ("vol2", "")],
    false,
    "Volume(s) [vol0:vol1:vol2] are not thinclone!!"
)]
#[tokio::test]
async fn conversion_reports_per_case(
    #[case] name: &str,
    #[case] inventory: &[(&str, &str)],
    #[case] changed: bool,
    #[case] message: &str,
) {
    let client = ScriptedClient::new();
    let spec = VolumeSpec::builder()
        .name(name)
        .volume_type(VolumeType::Clone)
        .build();
    let inventory: Vec<VolumeSummary> = inventory
        .iter()
        .map(|(volume, kind)| summary(volume, kind))
        .collect();
    let conversion = VolumeActions::new(&client, &spec)
        .convert_to_clone(&inventory)
        .await
        .expect("conversion succeeds");
    assert_eq!(conversion.changed(), changed);
    assert_eq!(conversion.message, message);
    assert_eq!(client.mutations().len(), conversion.converted.len());
}

#[tokio::test]
async fn conversion_rejects_unknown_names_before_mutating() {
    let client = ScriptedClient::new();
    let spec = VolumeSpec::builder()
        .name("vol0:vol1:vol2:vol4")
        .volume_type(VolumeType::Clone)
        .build();
    let listing: Vec<VolumeSummary> = serde_json::from_value(json!([
        {"id": "0", "name": "vol0", "volume_type": "thinclone"},
        {"id": "2", "name": "vol2", "volume_type": ""},
        {"id": "3", "name": "vol3", "volume_type": ""}
    ]))
    .expect("listing decodes");
    let err = VolumeActions::new(&client, &spec)
        .convert_to_clone(&listing)
        .await
        .expect_err("unknown names fail");
    assert_eq!(
        err.to_string(),
        "CMMVC9855E The command failed because one or more of the specified volumes does not exist."
    );
    assert!(client.mutations().is_empty());
}
