use predicates::prelude::*;
use regpm_cli::test_utils::{ProjectFixture, TestRegistry, fixtures};
use serde_json::json;

use super::{one_and_two, regpm, stdout_json};

/// Test listing several registries in the order given
#[tokio::test(flavor = "multi_thread")]
async fn test_list_multiple_registries() {
    let (one, two) = one_and_two().await;
    let project = ProjectFixture::empty().unwrap();
    project
        .with_shadow_config(json!({
            "@one": one.url_template(),
            "@two": {"url": two.url_template(), "headers": {"Authorization": "Bearer two-secret"}}
        }))
        .unwrap();

    let output = regpm(&project).args(["list", "@two", "@one"]).output().unwrap();
    assert!(output.status.success());

    let listings = stdout_json(&output);
    assert_eq!(listings[0]["registry"], "@two");
    assert_eq!(listings[1]["registry"], "@one");

    let names: Vec<&str> =
        listings[1]["items"].as_array().unwrap().iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"baz"));

    // index entries carry metadata only
    let first = &listings[1]["items"][0];
    assert!(first.get("files").is_none());
    assert!(first.get("registryDependencies").is_none());
    assert_eq!(first["type"], "registry:component");
}

/// Test that the built-in registry is listed by default
#[tokio::test(flavor = "multi_thread")]
async fn test_list_defaults_to_builtin() {
    let registry = TestRegistry::builder("shadcn")
        .item(fixtures::ui("button", "Displays a button"))
        .item(fixtures::ui("card", "Displays a card"))
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::empty().unwrap();

    let output = regpm(&project).env("REGISTRY_URL", registry.base_url()).arg("list").output().unwrap();
    assert!(output.status.success());

    let listings = stdout_json(&output);
    assert_eq!(listings[0]["registry"], "@shadcn");
    assert_eq!(listings[0]["items"].as_array().unwrap().len(), 2);
}

/// Test that namespace arguments are validated
#[test]
fn test_list_invalid_namespace() {
    let project = ProjectFixture::empty().unwrap();

    regpm(&project)
        .args(["list", "one"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid registry namespace"));
}

/// Test that an unknown namespace fails before the others are fetched
#[tokio::test(flavor = "multi_thread")]
async fn test_list_unknown_namespace_fails_fast() {
    let (one, _two) = one_and_two().await;
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@one": one.url_template()})).unwrap();

    regpm(&project)
        .args(["list", "@one", "@missing"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown registry \"@missing\""));
    assert_eq!(one.requests(), 0);
}

/// Test that fonts are listed and entries of unknown types are skipped
#[tokio::test(flavor = "multi_thread")]
async fn test_list_skips_unreadable_entries() {
    let registry = TestRegistry::builder("mixed")
        .items([
            fixtures::ui("button", "A button"),
            json!({
                "name": "font-inter",
                "type": "registry:font",
                "font": {"family": "'Inter Variable', sans-serif", "variable": "--font-sans"}
            }),
            json!({"name": "hologram", "type": "registry:hologram"}),
        ])
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@mixed": registry.url_template()})).unwrap();

    let output = regpm(&project).args(["list", "@mixed"]).output().unwrap();
    assert!(output.status.success());

    let listings = stdout_json(&output);
    let names: Vec<&str> =
        listings[0]["items"].as_array().unwrap().iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["button", "font-inter"]);
    assert_eq!(listings[0]["items"][1]["type"], "registry:font");
}
