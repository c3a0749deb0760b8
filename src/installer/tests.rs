//! Tests for the installer module.

use super::*;
use crate::config::project::Aliases;
use crate::core::{CssVars, ItemType, RegistryItem};
use crate::project::{Framework, ProjectInfo};
use crate::registry::RegistryReference;
use crate::resolver::ResolvedItem;
use std::fs;
use tempfile::TempDir;

fn item(name: &str, files: Vec<RegistryFile>) -> RegistryItem {
    RegistryItem {
        name: name.to_string(),
        item_type: ItemType::Component,
        title: None,
        description: None,
        author: None,
        dependencies: Vec::new(),
        dev_dependencies: Vec::new(),
        registry_dependencies: Vec::new(),
        files,
        tailwind: None,
        css_vars: None,
        css: None,
        env_vars: Default::default(),
        docs: None,
        categories: Vec::new(),
        meta: None,
        extends: None,
        font: None,
        config: None,
    }
}

fn file(path: &str, file_type: ItemType, content: &str, target: Option<&str>) -> RegistryFile {
    RegistryFile {
        path: path.to_string(),
        content: content.to_string(),
        file_type,
        target: target.map(str::to_string),
    }
}

fn graph(items: Vec<RegistryItem>) -> ResolvedGraph {
    ResolvedGraph::from_items(
        items
            .into_iter()
            .map(|item| {
                let reference = RegistryReference::parse(&format!("@test/{}", item.name)).unwrap();
                ResolvedItem {
                    key: reference.key(),
                    reference,
                    item,
                }
            })
            .collect(),
    )
}

fn project(root: &Path) -> ProjectInfo {
    ProjectInfo {
        root: root.to_path_buf(),
        src_dir: false,
        framework: Framework::Unknown,
        paths: Vec::new(),
        typescript: true,
    }
}

#[tokio::test]
async fn test_installs_components_and_dependencies() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let graph = graph(vec![
        item("baz", vec![file("components/baz.tsx", ItemType::Component, "export const Baz = 1\n", None)]),
        item("bar", vec![file("components/bar.tsx", ItemType::Component, "export const Bar = 1\n", None)]),
    ]);

    let summary = install(&ctx, &graph).await.unwrap();

    assert_eq!(summary.paths(FileAction::Created), vec!["components/baz.tsx", "components/bar.tsx"]);
    assert!(temp.path().join("components/baz.tsx").exists());
    assert!(temp.path().join("components/bar.tsx").exists());
}

#[tokio::test]
async fn test_existing_files_are_kept_unless_overwrite() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("components")).unwrap();
    fs::write(temp.path().join("components/a.tsx"), "same").unwrap();
    fs::write(temp.path().join("components/b.tsx"), "local edit").unwrap();

    let info = project(temp.path());
    let config = ProjectConfig::default();
    let graph = graph(vec![item(
        "pair",
        vec![
            file("components/a.tsx", ItemType::Component, "same", None),
            file("components/b.tsx", ItemType::Component, "upstream", None),
        ],
    )]);

    let ctx = InstallContext::builder(&info).config(Some(&config)).build();
    let summary = install(&ctx, &graph).await.unwrap();
    assert_eq!(summary.paths(FileAction::Unchanged), vec!["components/a.tsx"]);
    assert_eq!(summary.paths(FileAction::Skipped), vec!["components/b.tsx"]);
    assert_eq!(fs::read_to_string(temp.path().join("components/b.tsx")).unwrap(), "local edit");

    let ctx = InstallContext::builder(&info).config(Some(&config)).overwrite(true).build();
    let summary = install(&ctx, &graph).await.unwrap();
    assert_eq!(summary.paths(FileAction::Updated), vec!["components/b.tsx"]);
    assert_eq!(fs::read_to_string(temp.path().join("components/b.tsx")).unwrap(), "upstream");
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).dry_run(true).build();

    let mut with_env = item("env", vec![file("components/x.tsx", ItemType::Component, "x", None)]);
    with_env.env_vars.push(("API_KEY".to_string(), "k".to_string()));

    let summary = install(&ctx, &graph(vec![with_env])).await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.paths(FileAction::Created), vec!["components/x.tsx"]);
    assert_eq!(summary.env[0].added, vec!["API_KEY"]);
    assert!(!temp.path().join("components").exists());
    assert!(!temp.path().join(".env.local").exists());
}

#[tokio::test]
async fn test_duplicate_destinations_last_wins() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let graph = graph(vec![
        item("first", vec![file("components/shared.tsx", ItemType::Component, "first", None)]),
        item("second", vec![file("components/shared.tsx", ItemType::Component, "second", None)]),
    ]);

    let summary = install(&ctx, &graph).await.unwrap();
    assert_eq!(summary.files.len(), 1);
    assert_eq!(summary.files[0].item, "second");
    assert_eq!(fs::read_to_string(temp.path().join("components/shared.tsx")).unwrap(), "second");
}

#[tokio::test]
async fn test_imports_rewritten_to_configured_aliases() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig {
        aliases: Aliases {
            components: Some("@/app-components".to_string()),
            utils: Some("@/helpers/cn".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let source = "import { cn } from \"@/lib/utils\"\nimport { Button } from \"@/components/ui/button\"\n";
    let graph = graph(vec![item(
        "card",
        vec![
            file("ui/card.tsx", ItemType::Ui, source, None),
            file("notes.md", ItemType::File, "see @/lib/utils", Some("docs/notes.md")),
        ],
    )]);

    install(&ctx, &graph).await.unwrap();

    let written = fs::read_to_string(temp.path().join("app-components/ui/card.tsx")).unwrap();
    assert_eq!(
        written,
        "import { cn } from \"@/helpers/cn\"\nimport { Button } from \"@/app-components/ui/button\"\n"
    );
    // non-script files are verbatim
    assert_eq!(fs::read_to_string(temp.path().join("docs/notes.md")).unwrap(), "see @/lib/utils");
}

#[tokio::test]
async fn test_env_vars_preserve_existing_values() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env.local"), "APP_URL=https://foo.com\n").unwrap();

    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let mut declaring = item("auth", Vec::new());
    declaring.env_vars.push(("APP_URL".to_string(), "https://example.com".to_string()));
    declaring.env_vars.push(("AUTH_SECRET".to_string(), "change-me".to_string()));

    let summary = install(&ctx, &graph(vec![declaring])).await.unwrap();

    assert_eq!(summary.env[0].added, vec!["AUTH_SECRET"]);
    assert_eq!(
        fs::read_to_string(temp.path().join(".env.local")).unwrap(),
        "APP_URL=https://foo.com\n\nAUTH_SECRET=change-me\n"
    );
}

#[tokio::test]
async fn test_env_file_merges_into_dot_env_first() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env"), "EXISTING=1\n").unwrap();

    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let shipping = item("db", vec![file(".env.local", ItemType::File, "EXISTING=2\nDATABASE_URL=postgres://\n", Some(".env.local"))]);

    let summary = install(&ctx, &graph(vec![shipping])).await.unwrap();

    assert!(summary.files.is_empty());
    assert_eq!(summary.env[0].path, temp.path().join(".env"));
    assert_eq!(fs::read_to_string(temp.path().join(".env")).unwrap(), "EXISTING=1\n\nDATABASE_URL=postgres://\n");
    assert!(!temp.path().join(".env.local").exists());
}

#[tokio::test]
async fn test_missing_config_allows_only_universal_items() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let ctx = InstallContext::builder(&info).build();

    let universal = item("rules", vec![file("rules.md", ItemType::File, "# Rules", Some("~/.cursor/rules.md"))]);
    install(&ctx, &graph(vec![universal])).await.unwrap();
    assert!(temp.path().join(".cursor/rules.md").exists());

    let component = item("button", vec![file("ui/button.tsx", ItemType::Ui, "x", None)]);
    let err = install(&ctx, &graph(vec![component])).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<RegistryError>(), Some(RegistryError::ConfigMissing { .. })));
}

#[tokio::test]
async fn test_stylesheet_and_package_json() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("app")).unwrap();
    fs::write(temp.path().join("app/globals.css"), "@import \"tailwindcss\";\n").unwrap();
    fs::write(temp.path().join("package.json"), r#"{"name": "app", "dependencies": {"clsx": "^2"}}"#).unwrap();

    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let mut styled = item("theme", Vec::new());
    let mut css_vars = CssVars::default();
    css_vars.light.insert("brand".to_string(), "oklch(0.7 0.1 200)".to_string());
    styled.css_vars = Some(css_vars);
    styled.dependencies = vec!["clsx".to_string(), "motion@12".to_string()];

    let summary = install(&ctx, &graph(vec![styled])).await.unwrap();

    assert_eq!(summary.stylesheet.as_deref(), Some("app/globals.css"));
    let css = fs::read_to_string(temp.path().join("app/globals.css")).unwrap();
    assert!(css.contains("--brand: oklch(0.7 0.1 200);"));
    assert!(css.contains("--color-brand: var(--brand);"));

    assert_eq!(summary.packages.unwrap().dependencies, vec!["motion"]);
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("package.json")).unwrap()).unwrap();
    assert_eq!(manifest["dependencies"]["motion"], "12");
}

#[tokio::test]
async fn test_no_package_json_lists_manual_dependencies() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let mut needs = item("needs", Vec::new());
    needs.dependencies = vec!["zod".to_string()];
    needs.dev_dependencies = vec!["@types/node".to_string()];

    let summary = install(&ctx, &graph(vec![needs])).await.unwrap();
    assert!(summary.packages.is_none());
    assert_eq!(summary.manual_dependencies, vec!["zod", "@types/node"]);
}

#[tokio::test]
async fn test_invalid_target_aborts() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let evil = item(
        "evil",
        vec![
            file("components/ok.tsx", ItemType::Component, "ok", None),
            file("x", ItemType::File, "x", Some("../../etc/passwd")),
        ],
    );
    let err = install(&ctx, &graph(vec![evil])).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<RegistryError>(), Some(RegistryError::InvalidTarget { .. })));
    // destinations are validated before anything is written
    assert!(!temp.path().join("components/ok.tsx").exists());
}

fn tailwind_item() -> RegistryItem {
    let mut animated = item("animated", Vec::new());
    animated.tailwind = Some(crate::core::TailwindFragment {
        config: Some(serde_json::json!({
            "plugins": ["require(\"tailwindcss-animate\")"],
            "theme": {"extend": {
                "animation": {"wiggle": "wiggle 1s ease-in-out infinite"},
                "keyframes": {"wiggle": {
                    "0%, 100%": {"transform": "rotate(-3deg)"},
                    "50%": {"transform": "rotate(3deg)"}
                }}
            }}
        })),
    });
    animated
}

#[tokio::test]
async fn test_tailwind_fragment_lands_in_v4_stylesheet() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("app")).unwrap();
    fs::write(temp.path().join("app/globals.css"), "@import \"tailwindcss\";\n").unwrap();

    let info = project(temp.path());
    let mut config = ProjectConfig::default();
    config.tailwind.config = Some(String::new());
    config.tailwind.css = Some("app/globals.css".to_string());
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let summary = install(&ctx, &graph(vec![tailwind_item()])).await.unwrap();

    assert_eq!(summary.stylesheet.as_deref(), Some("app/globals.css"));
    assert!(summary.tailwind_config.is_none());
    assert!(summary.tailwind_manual.is_none());
    let css = fs::read_to_string(temp.path().join("app/globals.css")).unwrap();
    assert!(css.starts_with("@import \"tailwindcss\";\n@plugin \"tailwindcss-animate\";\n"));
    assert!(css.contains("--animate-wiggle: wiggle 1s ease-in-out infinite;"));
    assert!(css.contains("@keyframes wiggle {"));
    assert!(css.contains("transform: rotate(3deg);"));
}

#[tokio::test]
async fn test_tailwind_fragment_merges_into_v3_config() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tailwind.config.js"),
        "module.exports = {\n  content: [\"./app/**/*.tsx\"],\n  plugins: [],\n}\n",
    )
    .unwrap();

    let info = project(temp.path());
    let mut config = ProjectConfig::default();
    config.tailwind.config = Some("tailwind.config.js".to_string());
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let summary = install(&ctx, &graph(vec![tailwind_item()])).await.unwrap();

    assert_eq!(summary.tailwind_config.as_deref(), Some("tailwind.config.js"));
    assert!(summary.stylesheet.is_none());
    let js = fs::read_to_string(temp.path().join("tailwind.config.js")).unwrap();
    assert!(js.contains("darkMode: [\"class\"],"));
    assert!(js.contains("plugins: [require(\"tailwindcss-animate\")],"));
    assert!(js.contains("wiggle: \"wiggle 1s ease-in-out infinite\","));
    assert!(js.contains("\"0%, 100%\": {"));

    let again = install(&ctx, &graph(vec![tailwind_item()])).await.unwrap();
    assert!(again.tailwind_config.is_none());
}

#[tokio::test]
async fn test_tailwind_config_without_object_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("tailwind.config.js"), "module.exports = require(\"./preset\")\n").unwrap();

    let info = project(temp.path());
    let mut config = ProjectConfig::default();
    config.tailwind.config = Some("tailwind.config.js".to_string());
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let summary = install(&ctx, &graph(vec![tailwind_item()])).await.unwrap();

    let (path, fragment) = summary.tailwind_manual.unwrap();
    assert_eq!(path, "tailwind.config.js");
    assert_eq!(fragment["plugins"][0], "require(\"tailwindcss-animate\")");
}

#[tokio::test]
async fn test_env_vars_follow_declaration_order() {
    let temp = TempDir::new().unwrap();
    let info = project(temp.path());
    let config = ProjectConfig::default();
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let declaring: RegistryItem = serde_json::from_value(serde_json::json!({
        "name": "auth",
        "type": "registry:lib",
        "envVars": {"ZETA_URL": "https://z", "ALPHA_KEY": "a", "MIDDLE": "m"}
    }))
    .unwrap();

    let summary = install(&ctx, &graph(vec![declaring])).await.unwrap();

    assert_eq!(summary.env[0].added, vec!["ZETA_URL", "ALPHA_KEY", "MIDDLE"]);
    assert_eq!(
        fs::read_to_string(temp.path().join(".env.local")).unwrap(),
        "ZETA_URL=https://z\nALPHA_KEY=a\nMIDDLE=m\n"
    );
}

#[tokio::test]
async fn test_font_item_outside_next_uses_fontsource() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/index.css"), "@import \"tailwindcss\";\n").unwrap();
    fs::write(temp.path().join("package.json"), r#"{"name": "app"}"#).unwrap();

    let mut info = project(temp.path());
    info.framework = Framework::Vite;
    let mut config = ProjectConfig::default();
    config.tailwind.css = Some("src/index.css".to_string());
    let ctx = InstallContext::builder(&info).config(Some(&config)).build();

    let font: RegistryItem = serde_json::from_value(serde_json::json!({
        "name": "font-inter",
        "type": "registry:font",
        "font": {"family": "'Inter Variable', sans-serif", "variable": "--font-sans"}
    }))
    .unwrap();

    let summary = install(&ctx, &graph(vec![font])).await.unwrap();

    assert_eq!(summary.packages.unwrap().dependencies, vec!["@fontsource-variable/inter"]);
    let css = fs::read_to_string(temp.path().join("src/index.css")).unwrap();
    assert!(css.contains("@import \"@fontsource-variable/inter\";"));
    assert!(css.contains("--font-sans: 'Inter Variable', sans-serif;"));
    assert!(css.contains("@apply font-sans bg-background text-foreground;"));
}
