use predicates::prelude::*;
use regpm_cli::test_utils::{ProjectFixture, TestRegistry, fixtures};
use serde_json::json;

use super::{one_and_two, regpm};

/// Test that registry dependencies are installed alongside the requested item
#[tokio::test(flavor = "multi_thread")]
async fn test_add_installs_registry_dependencies() {
    let (one, _two) = one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": one.url_template()})).unwrap();

    regpm(&project)
        .args(["add", "@one/baz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("components/baz.tsx"))
        .stdout(predicate::str::contains("components/bar.tsx"));

    assert!(project.exists("components/baz.tsx"));
    assert!(project.exists("components/bar.tsx"));
}

/// Test that a dependency behind an unauthenticated registry fails the whole add
#[tokio::test(flavor = "multi_thread")]
async fn test_add_unauthorized_dependency_fails() {
    let (one, two) = one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": one.url_template(), "@two": two.url_template()})).unwrap();

    regpm(&project)
        .args(["add", "@one/qux"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unauthorized"));

    assert!(!project.exists("components/qux.tsx"));
}

/// Test that configured headers authenticate against a protected registry
#[tokio::test(flavor = "multi_thread")]
async fn test_add_with_token_from_env() {
    let (one, two) = one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project
        .with_config(json!({
            "@one": one.url_template(),
            "@two": {
                "url": two.url_template(),
                "headers": {"Authorization": "Bearer ${REGPM_IT_TWO_TOKEN}"}
            }
        }))
        .unwrap();

    regpm(&project)
        .env("REGPM_IT_TWO_TOKEN", "two-secret")
        .args(["add", "@one/qux"])
        .assert()
        .success();

    assert!(project.exists("components/qux.tsx"));
    assert!(project.exists("components/bar.tsx"));
}

/// Test that an unset header variable is reported by name
#[tokio::test(flavor = "multi_thread")]
async fn test_add_missing_env_var() {
    let (_one, two) = one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project
        .with_config(json!({
            "@two": {
                "url": two.url_template(),
                "headers": {"Authorization": "Bearer ${REGPM_IT_UNSET_TOKEN}"}
            }
        }))
        .unwrap();

    regpm(&project)
        .args(["add", "@two/bar"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("REGPM_IT_UNSET_TOKEN"));
    assert_eq!(two.requests(), 0);
}

/// Test that existing env values are kept while new keys are added
#[tokio::test(flavor = "multi_thread")]
async fn test_add_preserves_existing_env_values() {
    let registry = TestRegistry::builder("one")
        .item(json!({
            "name": "env-setup",
            "type": "registry:item",
            "files": [{
                "path": "env",
                "type": "registry:file",
                "target": "~/.env.local",
                "content": "APP_URL=https://example.com\nAPI_KEY=changeme\n"
            }]
        }))
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": registry.url_template()})).unwrap();
    project.write(".env.local", "APP_URL=https://foo.com\n").unwrap();

    regpm(&project).args(["add", "@one/env-setup"]).assert().success();

    let env = project.read(".env.local").unwrap();
    assert!(env.contains("APP_URL=https://foo.com"));
    assert!(!env.contains("https://example.com"));
    assert!(env.contains("API_KEY=changeme"));
}

/// Test that npm dependencies, CSS variables and envVars are merged into the project
#[tokio::test(flavor = "multi_thread")]
async fn test_add_merges_project_files() {
    let registry = TestRegistry::builder("one")
        .item(json!({
            "name": "chart",
            "type": "registry:ui",
            "dependencies": ["recharts@2.15.0"],
            "envVars": {"CHART_API": "https://charts.example.com"},
            "cssVars": {"light": {"chart-1": "oklch(0.6 0.2 40)"}, "dark": {"chart-1": "oklch(0.5 0.2 40)"}},
            "files": [{"path": "ui/chart.tsx", "type": "registry:ui", "content": "export const Chart = 1\n"}]
        }))
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": registry.url_template()})).unwrap();

    regpm(&project).args(["add", "@one/chart"]).assert().success();

    assert!(project.exists("components/ui/chart.tsx"));
    let package: serde_json::Value = serde_json::from_str(&project.read("package.json").unwrap()).unwrap();
    assert_eq!(package["dependencies"]["recharts"], "2.15.0");
    assert!(project.read(".env.local").unwrap().contains("CHART_API=https://charts.example.com"));
    let css = project.read("app/globals.css").unwrap();
    assert!(css.contains("--chart-1: oklch(0.6 0.2 40);"));
    assert!(css.contains(".dark"));
}

/// Test that differing files are skipped unless --overwrite is given
#[tokio::test(flavor = "multi_thread")]
async fn test_add_overwrite() {
    let registry = TestRegistry::builder("one").item(fixtures::ui("button", "A button")).start().await.unwrap();
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": registry.url_template()})).unwrap();
    project.write("components/ui/button.tsx", "// local edits\n").unwrap();

    regpm(&project).args(["add", "@one/button"]).assert().success().stdout(predicate::str::contains("Skipped"));
    assert_eq!(project.read("components/ui/button.tsx").unwrap(), "// local edits\n");

    regpm(&project).args(["add", "@one/button", "--overwrite"]).assert().success();
    assert_eq!(project.read("components/ui/button.tsx").unwrap(), "export const Button = () => null\n");
}

/// Test that --dry-run reports without writing
#[tokio::test(flavor = "multi_thread")]
async fn test_add_dry_run() {
    let (one, _two) = one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": one.url_template()})).unwrap();

    regpm(&project)
        .args(["add", "@one/baz", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("components/baz.tsx"));

    assert!(!project.exists("components/baz.tsx"));
}

/// Test that items needing placement fail without components.json
#[tokio::test(flavor = "multi_thread")]
async fn test_add_without_config_suggests_init() {
    let registry = TestRegistry::builder("one").item(fixtures::ui("button", "A button")).start().await.unwrap();
    let project = ProjectFixture::next_app().unwrap();

    regpm(&project)
        .arg("add")
        .arg(registry.item_url("button"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("No components.json"))
        .stdout(predicate::str::contains("regpm init"));
}

/// Test that a shadow config (registries only) is enough for universal items
#[tokio::test(flavor = "multi_thread")]
async fn test_add_universal_item_with_shadow_config() {
    let registry = TestRegistry::builder("one")
        .item(json!({
            "name": "prettier",
            "type": "registry:item",
            "files": [{"path": "prettierrc", "type": "registry:file", "target": "~/.prettierrc", "content": "{}\n"}]
        }))
        .start()
        .await
        .unwrap();
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@one": registry.url_template()})).unwrap();

    regpm(&project).args(["add", "@one/prettier"]).assert().success();
    assert_eq!(project.read(".prettierrc").unwrap(), "{}\n");
}

/// Test that --cwd selects the project directory
#[tokio::test(flavor = "multi_thread")]
async fn test_add_with_cwd() {
    let (one, _two) = one_and_two().await;
    let project = ProjectFixture::next_app().unwrap();
    project.with_config(json!({"@one": one.url_template()})).unwrap();
    let elsewhere = ProjectFixture::empty().unwrap();

    regpm(&elsewhere).arg("--cwd").arg(project.path()).args(["add", "@one/bar"]).assert().success();

    assert!(project.exists("components/bar.tsx"));
    assert!(!elsewhere.exists("components/bar.tsx"));
}
