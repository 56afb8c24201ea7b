//! Parameter validation performed before any remote call.
//!
//! Every check is pure: it inspects the [`VolumeSpec`] alone and reports the
//! first offending combination with the exact message shown to the caller.

use thiserror::Error;

use crate::volume::{DesiredState, VolumeSpec, VolumeType};

/// Parameters that only make sense when creating or updating a volume.
const DELETION_INVALID: &[&str] = &[
    "old_name",
    "pool",
    "size",
    "unit",
    "iogrp",
    "volumegroup",
    "novolumegroup",
    "thin",
    "compressed",
    "deduplicated",
    "buffersize",
    "warning",
    "type",
    "fromsourcevolume",
    "enable_cloud_snapshot",
    "cloud_account_name",
];

/// Errors raised by local validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    /// The supplied parameters cannot be combined.
    #[error("{0}")]
    InvalidParameterCombination(String),
}

impl ValidationError {
    fn combination(message: impl Into<String>) -> Self {
        Self::InvalidParameterCombination(message.into())
    }
}

/// Checks that apply to every request regardless of the remote state.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidParameterCombination`] when `name` is
/// missing, `volumegroup` and `novolumegroup` are both set, `unmap` is used
/// with `present`, a deletion or rename carries parameters it cannot use, or
/// `size`/`warning` are malformed.
pub fn mandatory_parameter_validation(spec: &VolumeSpec) -> Result<(), ValidationError> {
    if spec.name.is_none() {
        return Err(ValidationError::combination(
            "Missing mandatory parameter: name",
        ));
    }
    if spec.volumegroup.is_some() && spec.novolumegroup == Some(true) {
        return Err(ValidationError::combination(
            "Mutually exclusive parameters detected: [volumegroup] and [novolumegroup]",
        ));
    }
    match spec.state {
        DesiredState::Present => {
            if !spec.unmap.is_empty() {
                return Err(ValidationError::combination(
                    "Parameter [unmap] cannot be specified when creating or updating a volume.",
                ));
            }
            if spec.old_name.is_some() {
                rename_parameter_validation(spec)?;
            }
        }
        DesiredState::Absent => deletion_parameter_validation(spec)?,
    }
    if let Err(err) = spec.size_bytes() {
        return Err(ValidationError::combination(err.to_string()));
    }
    if let (Some(warning), None) = (spec.warning.as_deref(), spec.warning_percent()) {
        return Err(ValidationError::combination(format!(
            "Invalid value for [warning]: {warning}"
        )));
    }
    Ok(())
}

fn deletion_parameter_validation(spec: &VolumeSpec) -> Result<(), ValidationError> {
    let invalid: Vec<&str> = spec
        .present_parameters()
        .into_iter()
        .filter(|param| DELETION_INVALID.contains(param))
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    Err(ValidationError::combination(format!(
        "Following parameter(s) are invalid while deletion of volume: {}",
        invalid.join(", ")
    )))
}

fn rename_parameter_validation(spec: &VolumeSpec) -> Result<(), ValidationError> {
    let invalid: Vec<&str> = spec
        .present_parameters()
        .into_iter()
        .filter(|param| *param != "old_name")
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    Err(ValidationError::combination(format!(
        "Following parameter(s) are invalid while renaming a volume: {}",
        invalid.join(", ")
    )))
}

/// Checks for a volume that does not exist yet and is about to be created.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidParameterCombination`] when cloud
/// backup parameters are supplied, mandatory creation parameters are
/// missing, clone parameters are incomplete, or `warning` is used without
/// `thin` or `compressed`.
pub fn volume_creation_parameter_validation(spec: &VolumeSpec) -> Result<(), ValidationError> {
    if spec.enable_cloud_snapshot.is_some() {
        return Err(not_applicable_for_creation("enable_cloud_snapshot"));
    }
    if spec.cloud_account_name.is_some() {
        return Err(not_applicable_for_creation("cloud_account_name"));
    }

    match spec.volume_type {
        Some(volume_type) => clone_creation_validation(spec, volume_type)?,
        None => {
            if spec.fromsourcevolume.is_some() {
                return Err(ValidationError::combination(
                    "Missing required parameter(s) for clone creation: type",
                ));
            }
            let missing: Vec<&str> = [("pool", spec.pool.is_none()), ("size", spec.size.is_none())]
                .into_iter()
                .filter_map(|(param, absent)| absent.then_some(param))
                .collect();
            if !missing.is_empty() {
                return Err(ValidationError::combination(format!(
                    "Missing required parameter(s) for volume creation: {}",
                    missing.join(", ")
                )));
            }
        }
    }

    if spec.thin == Some(true) && spec.compressed == Some(true) {
        return Err(ValidationError::combination(
            "Mutually exclusive parameters detected: [thin] and [compressed]",
        ));
    }
    if spec.warning.is_some() && spec.thin != Some(true) && spec.compressed != Some(true) {
        return Err(ValidationError::combination(
            "Parameter [warning] is invalid without [thin] or [compressed]",
        ));
    }
    Ok(())
}

fn clone_creation_validation(
    spec: &VolumeSpec,
    volume_type: VolumeType,
) -> Result<(), ValidationError> {
    let missing: Vec<&str> = [
        ("fromsourcevolume", spec.fromsourcevolume.is_none()),
        ("pool", spec.pool.is_none()),
    ]
    .into_iter()
    .filter_map(|(param, absent)| absent.then_some(param))
    .collect();
    if !missing.is_empty() {
        return Err(ValidationError::combination(format!(
            "Missing required parameter(s) for {volume_type} creation: {}",
            missing.join(", ")
        )));
    }
    if spec.size.is_some() {
        return Err(ValidationError::combination(format!(
            "Parameter [size] is invalid while creating a {volume_type} volume"
        )));
    }
    Ok(())
}

fn not_applicable_for_creation(param: &str) -> ValidationError {
    ValidationError::combination(format!(
        "Following parameter not applicable for creation: {param}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{SizeUnit, UnmapKind};
    use rstest::rstest;

    fn message(result: Result<(), ValidationError>) -> String {
        result.expect_err("validation should fail").to_string()
    }

    fn creation_base() -> VolumeSpec {
        VolumeSpec::builder()
            .name("test_volume")
            .pool("test_pool")
            .size("1")
            .unit(SizeUnit::Gb)
            .iogrp("io_grp0, io_grp1")
            .build()
    }

    #[test]
    fn accepts_plain_creation_parameters() {
        let spec = creation_base();
        assert!(mandatory_parameter_validation(&spec).is_ok());
        assert!(volume_creation_parameter_validation(&spec).is_ok());
    }

    #[test]
    fn name_is_mandatory() {
        let spec = VolumeSpec::builder().pool("test_pool").size("1").build();
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            "Missing mandatory parameter: name"
        );
    }

    #[test]
    fn volumegroup_and_novolumegroup_are_exclusive() {
        let spec = VolumeSpec {
            volumegroup: Some(String::from("test_volumegroup")),
            novolumegroup: Some(true),
            ..creation_base()
        };
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            "Mutually exclusive parameters detected: [volumegroup] and [novolumegroup]"
        );
    }

    #[test]
    fn unmap_is_rejected_when_present() {
        let spec = VolumeSpec::builder()
            .name("test_volume")
            .novolumegroup(true)
            .unmap(UnmapKind::HostMappings)
            .build();
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            "Parameter [unmap] cannot be specified when creating or updating a volume."
        );
    }

    #[test]
    fn deletion_lists_every_invalid_parameter() {
        let spec = VolumeSpec {
            state: DesiredState::Absent,
            volumegroup: Some(String::from("test_volumegroup")),
            ..creation_base()
        };
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            "Following parameter(s) are invalid while deletion of volume: \
             pool, size, unit, iogrp, volumegroup"
        );
    }

    #[test]
    fn deletion_rejects_warning() {
        let spec = VolumeSpec::builder()
            .name("test_volume")
            .state(DesiredState::Absent)
            .warning("70")
            .build();
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            "Following parameter(s) are invalid while deletion of volume: warning"
        );
    }

    #[test]
    fn deletion_accepts_unmap() {
        let spec = VolumeSpec::builder()
            .name("test_volume")
            .state(DesiredState::Absent)
            .unmap(UnmapKind::HostMappings)
            .unmap(UnmapKind::RemotecopyRelationships)
            .unmap(UnmapKind::FlashcopyMappings)
            .build();
        assert!(mandatory_parameter_validation(&spec).is_ok());
    }

    #[rstest]
    #[case(VolumeSpec::builder().old_name("name").name("new_name").thin(true).build(), "thin")]
    #[case(
        VolumeSpec::builder()
            .old_name("name")
            .name("new_name")
            .volume_type(VolumeType::Thinclone)
            .build(),
        "type"
    )]
    fn rename_rejects_modification_parameters(#[case] spec: VolumeSpec, #[case] param: &str) {
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            format!("Following parameter(s) are invalid while renaming a volume: {param}")
        );
    }

    #[test]
    fn creation_rejects_cloud_snapshot() {
        let spec = VolumeSpec::builder()
            .name("name")
            .enable_cloud_snapshot(true)
            .cloud_account_name("aws_acc")
            .build();
        assert_eq!(
            message(volume_creation_parameter_validation(&spec)),
            "Following parameter not applicable for creation: enable_cloud_snapshot"
        );
    }

    #[test]
    fn creation_rejects_bare_cloud_account() {
        let spec = VolumeSpec {
            cloud_account_name: Some(String::from("test")),
            ..creation_base()
        };
        assert_eq!(
            message(volume_creation_parameter_validation(&spec)),
            "Following parameter not applicable for creation: cloud_account_name"
        );
    }

    #[test]
    fn creation_requires_pool_and_size() {
        let spec = VolumeSpec::builder()
            .name("test_volume")
            .iogrp("io_grp0")
            .volumegroup("test_volumegroup")
            .build();
        assert_eq!(
            message(volume_creation_parameter_validation(&spec)),
            "Missing required parameter(s) for volume creation: pool, size"
        );
    }

    #[test]
    fn fromsourcevolume_requires_type() {
        let spec = VolumeSpec::builder()
            .name("test_volume")
            .fromsourcevolume("src_volume1")
            .pool("pool1")
            .build();
        assert!(volume_creation_parameter_validation(&spec).is_err());
    }

    #[rstest]
    #[case(VolumeSpec::builder().pool("pool1").build(), "fromsourcevolume")]
    #[case(VolumeSpec::builder().fromsourcevolume("src_volume1").build(), "pool")]
    fn thinclone_requires_source_and_pool(#[case] partial: VolumeSpec, #[case] missing: &str) {
        let spec = VolumeSpec {
            name: Some(String::from("test_volume")),
            volume_type: Some(VolumeType::Thinclone),
            ..partial
        };
        assert_eq!(
            message(volume_creation_parameter_validation(&spec)),
            format!("Missing required parameter(s) for thinclone creation: {missing}")
        );
    }

    #[test]
    fn thinclone_forbids_size() {
        let spec = VolumeSpec::builder()
            .name("test_volume")
            .volume_type(VolumeType::Thinclone)
            .fromsourcevolume("src_volume1")
            .size("2048")
            .pool("pool1")
            .build();
        assert_eq!(
            message(volume_creation_parameter_validation(&spec)),
            "Parameter [size] is invalid while creating a thinclone volume"
        );
    }

    #[test]
    fn warning_requires_thin_or_compressed() {
        let spec = VolumeSpec {
            warning: Some(String::from("70")),
            ..creation_base()
        };
        assert_eq!(
            message(volume_creation_parameter_validation(&spec)),
            "Parameter [warning] is invalid without [thin] or [compressed]"
        );

        let thin = VolumeSpec {
            thin: Some(true),
            ..spec.clone()
        };
        assert!(volume_creation_parameter_validation(&thin).is_ok());
        let compressed = VolumeSpec {
            compressed: Some(true),
            ..spec
        };
        assert!(volume_creation_parameter_validation(&compressed).is_ok());
    }

    #[rstest]
    #[case("1.5", "Invalid value for [size]: 1.5")]
    #[case("big", "Invalid value for [size]: big")]
    fn malformed_size_is_rejected(#[case] size: &str, #[case] expected: &str) {
        let spec = VolumeSpec {
            size: Some(size.to_owned()),
            ..creation_base()
        };
        assert_eq!(message(mandatory_parameter_validation(&spec)), expected);
    }

    #[test]
    fn malformed_warning_is_rejected() {
        let spec = VolumeSpec {
            warning: Some(String::from("200")),
            thin: Some(true),
            ..creation_base()
        };
        assert_eq!(
            message(mandatory_parameter_validation(&spec)),
            "Invalid value for [warning]: 200"
        );
    }
}
