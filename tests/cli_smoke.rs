//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn cli_without_arguments_prints_help() {
    let mut cmd = cargo_bin_cmd!("vdiskctl");
    cmd.assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("apply"));
}

#[test]
fn apply_help_lists_volume_flags() {
    let mut cmd = cargo_bin_cmd!("vdiskctl");
    cmd.args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fromsourcevolume"))
        .stdout(predicate::str::contains("--enable-cloud-snapshot"));
}

#[test]
fn apply_rejects_unknown_unit() {
    let mut cmd = cargo_bin_cmd!("vdiskctl");
    cmd.args(["apply", "--name", "vol0", "--unit", "zb"])
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn apply_without_cluster_reports_actionable_config_error() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let mut cmd = cargo_bin_cmd!("vdiskctl");
    cmd.current_dir(tmp.path())
        .env_clear()
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["apply", "--name", "vol0"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("SVC_CLUSTERNAME"));
}
