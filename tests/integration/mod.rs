//! Integration test suite for regpm
//!
//! End-to-end tests that run the `regpm` binary against in-process registries
//! ([`TestRegistry`]) and scratch projects ([`ProjectFixture`]).
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **add**: dependency resolution across registries, file placement, env/CSS/package.json merging
//! - **init**: configuration detection and init-with-items
//! - **list**: registry listings
//! - **search**: fuzzy search and pagination
//! - **view**: item output and error rendering
//!
//! Tests that start a registry use the multi-threaded runtime so the server keeps serving
//! while the test thread blocks on the child process.

use assert_cmd::Command;
use regpm_cli::test_utils::{ProjectFixture, TestRegistry};

mod add;
mod init;
mod list;
mod search;
mod view;

/// `regpm` pointed at `project`, with progress and ambient configuration disabled.
pub fn regpm(project: &ProjectFixture) -> Command {
    let mut cmd = Command::cargo_bin("regpm").unwrap();
    cmd.current_dir(project.path())
        .arg("--no-progress")
        .env_remove("RUST_LOG")
        .env_remove("REGISTRY_URL");
    cmd
}

/// Stdout of a finished command, parsed as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().lines().count(), 1, "expected one line of JSON, got: {stdout}");
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

/// `@one` with `baz` → `bar`, and `bar` also served by a token-protected `@two`.
pub async fn one_and_two() -> (TestRegistry, TestRegistry) {
    use regpm_cli::test_utils::fixtures::component;

    let one = TestRegistry::builder("one")
        .item(component("baz", &["@one/bar"]))
        .item(component("bar", &[]))
        .item(component("qux", &["@two/bar"]))
        .start()
        .await
        .unwrap();
    let two = TestRegistry::builder("two").item(component("bar", &[])).token("two-secret").start().await.unwrap();
    (one, two)
}
