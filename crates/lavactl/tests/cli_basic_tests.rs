//! Basic CLI behavior: help, version, argument validation.

use assert_cmd::Command;
use predicates::prelude::*;

fn lavactl() -> Command {
    let mut cmd = Command::cargo_bin("lavactl").expect("binary exists");
    // keep host configuration out of the tests
    cmd.env_remove("LAVA_API_URL")
        .env_remove("LAVA_TENANT_ID")
        .env_remove("LAVA_AUTH_TOKEN");
    cmd
}

#[test]
fn help_lists_resources() {
    lavactl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("stack"))
        .stdout(predicate::str::contains("flavor"))
        .stdout(predicate::str::contains("workload"))
        .stdout(predicate::str::contains("script"));
}

#[test]
fn version_flag_prints_version() {
    lavactl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_subcommand_prints_version() {
    lavactl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lavactl"));
}

#[test]
fn no_args_shows_usage() {
    lavactl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_subcommand_fails() {
    lavactl().arg("nonsense").assert().failure();
}

#[test]
fn cluster_get_requires_an_id() {
    lavactl()
        .args(["cluster", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CLUSTER_ID"));
}

#[test]
fn missing_tenant_is_reported() {
    lavactl()
        .args(["--token", "t", "cluster", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LAVA_TENANT_ID"));
}

#[test]
fn missing_token_is_reported() {
    lavactl()
        .args(["--tenant", "123456", "cluster", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LAVA_AUTH_TOKEN"));
}

#[test]
fn invalid_output_format_is_rejected() {
    lavactl()
        .args(["-o", "xml", "cluster", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn cluster_help_shows_node_group_flag() {
    lavactl()
        .args(["cluster", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--node-group"))
        .stdout(predicate::str::contains("--wait"));
}

#[test]
fn recommendations_require_storage_size() {
    lavactl()
        .args(["workload", "recommendations", "workload_id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--storage-size"));
}
