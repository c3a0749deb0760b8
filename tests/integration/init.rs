use predicates::prelude::*;
use regpm_cli::test_utils::{ProjectFixture, fixtures};
use serde_json::{Value, json};

use super::regpm;

/// Test that init writes a configuration matching the project
#[test]
fn test_init_writes_config() {
    let project = ProjectFixture::next_app().unwrap();

    regpm(&project)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    let config: Value = serde_json::from_str(&project.read("components.json").unwrap()).unwrap();
    assert_eq!(config["style"], "new-york");
    assert_eq!(config["rsc"], true);
    assert_eq!(config["tailwind"]["css"], "app/globals.css");
    assert_eq!(config["tailwind"]["config"], "");
    assert_eq!(config["aliases"]["ui"], "@/components/ui");
}

/// Test that an existing configuration is only replaced with --force
#[test]
fn test_init_existing_config() {
    let project = ProjectFixture::next_app().unwrap();
    project.write("components.json", r#"{"style": "default"}"#).unwrap();

    regpm(&project)
        .arg("init")
        .assert()
        .failure()
        .stdout(predicate::str::contains("already exists"))
        .stdout(predicate::str::contains("--force"));

    regpm(&project).args(["init", "--force", "--base-color", "slate"]).assert().success();
    let config: Value = serde_json::from_str(&project.read("components.json").unwrap()).unwrap();
    assert_eq!(config["tailwind"]["baseColor"], "slate");
}

/// Test that init installs the items it is given
#[tokio::test(flavor = "multi_thread")]
async fn test_init_with_items() {
    let (one, _two) = super::one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project.with_shadow_config(json!({"@one": one.url_template()})).unwrap();

    regpm(&project).args(["init", "--force", "@one/baz"]).assert().success();

    assert!(project.exists("components/baz.tsx"));
    assert!(project.exists("components/bar.tsx"));
    let config: Value = serde_json::from_str(&project.read("components.json").unwrap()).unwrap();
    assert!(config["registries"]["@one"].is_string());
}

/// Test that installed files use the configured aliases in their imports
#[tokio::test(flavor = "multi_thread")]
async fn test_init_then_add_rewrites_imports() {
    let registry = regpm_cli::test_utils::TestRegistry::builder("one")
        .item(fixtures::component("login-form", &[]))
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::next_app().unwrap();
    project.write("tsconfig.json", r#"{"compilerOptions": {"paths": {"~/*": ["./*"]}}}"#).unwrap();

    regpm(&project).arg("init").assert().success();
    let mut config: Value = serde_json::from_str(&project.read("components.json").unwrap()).unwrap();
    config["registries"] = json!({"@one": registry.url_template()});
    project.write("components.json", &config.to_string()).unwrap();

    regpm(&project).args(["add", "@one/login-form"]).assert().success();

    let content = project.read("components/login-form.tsx").unwrap();
    assert!(content.contains("from \"~/lib/utils\""), "content: {content}");
}
