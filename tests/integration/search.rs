use regpm_cli::test_utils::{ProjectFixture, TestRegistry, fixtures};
use serde_json::{Value, json};

use super::{regpm, stdout_json};

async fn ui_registry() -> TestRegistry {
    TestRegistry::builder("ui")
        .items([
            fixtures::ui("accordion", "A vertically stacked set of sections"),
            fixtures::ui("alert-dialog", "A modal dialog that interrupts the user"),
            fixtures::ui("button", "Displays a button or a component that looks like a button"),
            fixtures::ui("button-group", "A container that groups related buttons"),
            fixtures::ui("card", "Displays a card with header, content, and footer"),
            fixtures::ui("dialog", "A window overlaid on the primary window"),
            fixtures::ui("input", "Displays a form input field"),
        ])
        .start()
        .await
        .unwrap()
}

fn project_for(registry: &TestRegistry) -> ProjectFixture {
    let project = ProjectFixture::empty().unwrap();
    project.with_shadow_config(json!({"@ui": registry.url_template()})).unwrap();
    project
}

fn names(results: &Value) -> Vec<String> {
    results["items"].as_array().unwrap().iter().map(|i| i["name"].as_str().unwrap().to_string()).collect()
}

/// Test that misspelled queries still find the item
#[tokio::test(flavor = "multi_thread")]
async fn test_search_fuzzy_matches() {
    let registry = ui_registry().await;
    let project = project_for(&registry);

    for query in ["buton", "buttn", "btton"] {
        let output = regpm(&project).args(["search", "@ui", "--query", query]).output().unwrap();
        assert!(output.status.success());
        assert!(names(&stdout_json(&output)).contains(&"button".to_string()), "query {query}");
    }

    let output = regpm(&project).args(["search", "@ui", "--query", "dialg"]).output().unwrap();
    assert!(names(&stdout_json(&output)).contains(&"alert-dialog".to_string()));
}

/// Test that exact matches rank first and records carry the add argument
#[tokio::test(flavor = "multi_thread")]
async fn test_search_ranking_and_records() {
    let registry = ui_registry().await;
    let project = project_for(&registry);

    let output = regpm(&project).args(["search", "@ui", "--query", "button"]).output().unwrap();
    let results = stdout_json(&output);
    let found = names(&results);
    assert_eq!(found[0], "button");
    assert_eq!(found[1], "button-group");

    let first = &results["items"][0];
    assert_eq!(first["registry"], "@ui");
    assert_eq!(first["addCommandArgument"], "@ui/button");
    assert_eq!(first["type"], "registry:ui");
}

/// Test the pagination invariants
#[tokio::test(flavor = "multi_thread")]
async fn test_search_pagination() {
    let registry = ui_registry().await;
    let project = project_for(&registry);

    let output = regpm(&project).args(["search", "@ui", "--limit", "3", "--offset", "5"]).output().unwrap();
    let results = stdout_json(&output);
    assert_eq!(results["items"].as_array().unwrap().len(), 2);
    assert_eq!(results["pagination"], json!({"total": 7, "offset": 5, "limit": 3, "hasMore": false}));

    let output = regpm(&project).args(["search", "@ui", "--limit", "3", "--offset", "2"]).output().unwrap();
    let results = stdout_json(&output);
    assert_eq!(results["items"].as_array().unwrap().len(), 3);
    assert_eq!(results["pagination"]["hasMore"], true);

    let output = regpm(&project).args(["search", "@ui", "--offset", "10"]).output().unwrap();
    let results = stdout_json(&output);
    assert!(results["items"].as_array().unwrap().is_empty());
    assert_eq!(results["pagination"]["hasMore"], false);
}

/// Test that a limit of zero means no limit
#[tokio::test(flavor = "multi_thread")]
async fn test_search_limit_zero_is_unlimited() {
    let registry = ui_registry().await;
    let project = project_for(&registry);

    let output = regpm(&project).args(["search", "@ui", "--limit", "0"]).output().unwrap();
    let results = stdout_json(&output);
    assert_eq!(results["items"].as_array().unwrap().len(), 7);
    assert_eq!(results["pagination"]["limit"], 7);
}
