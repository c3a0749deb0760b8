use predicates::prelude::*;
use regpm_cli::test_utils::{ProjectFixture, TestRegistry, fixtures};
use serde_json::json;

use super::{one_and_two, regpm, stdout_json};

/// Test that an unknown namespace is reported without any request
#[test]
fn test_view_unknown_registry() {
    let project = ProjectFixture::empty().unwrap();

    let output = regpm(&project).args(["view", "@unknown/x"]).output().unwrap();
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unknown registry \"@unknown\""), "stdout: {stdout}");
    assert!(stdout.contains("components.json"));
    assert!(serde_json::from_str::<serde_json::Value>(stdout.trim()).is_err());
}

/// Test that view prints items without following their dependencies
#[tokio::test(flavor = "multi_thread")]
async fn test_view_prints_items_as_json() {
    let (one, _two) = one_and_two().await;
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@one": one.url_template()})).unwrap();

    let output = regpm(&project).args(["view", "@one/baz"]).output().unwrap();
    assert!(output.status.success());

    let items = stdout_json(&output);
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "baz");
    assert_eq!(items[0]["registryDependencies"], json!(["@one/bar"]));
    assert!(!project.exists("components/baz.tsx"));
}

/// Test that a missing item is reported as not found
#[tokio::test(flavor = "multi_thread")]
async fn test_view_missing_item() {
    let registry = TestRegistry::builder("one").item(fixtures::ui("button", "A button")).start().await.unwrap();
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@one": registry.url_template()})).unwrap();

    regpm(&project)
        .args(["view", "@one/missing"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("@one/missing was not found"));
}

/// Test that items can be viewed by URL and through the built-in registry
#[tokio::test(flavor = "multi_thread")]
async fn test_view_by_url_and_builtin_override() {
    let registry = TestRegistry::builder("shadcn").item(fixtures::ui("button", "A button")).start().await.unwrap();
    let project = ProjectFixture::empty().unwrap();

    let output = regpm(&project).arg("view").arg(registry.item_url("button")).output().unwrap();
    assert_eq!(stdout_json(&output)[0]["name"], "button");

    let output = regpm(&project).env("REGISTRY_URL", registry.base_url()).args(["view", "button"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)[0]["type"], "registry:ui");
}

/// Test that a malformed item is a validation error
#[tokio::test(flavor = "multi_thread")]
async fn test_view_invalid_item_type() {
    let registry = TestRegistry::builder("one")
        .item(json!({"name": "weird", "type": "registry:unknown", "files": []}))
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@one": registry.url_template()})).unwrap();

    regpm(&project)
        .args(["view", "@one/weird"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to parse registry item"));
}
