//! Project and registry item fixtures.

use anyhow::Result;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch project directory.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Empty directory.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Next.js app-router project with `package.json`, `tsconfig.json` (`@/*`) and
    /// `app/globals.css`.
    pub fn next_app() -> Result<Self> {
        let fixture = Self::empty()?;
        fixture.write("package.json", &json!({"name": "app", "dependencies": {"next": "15.0.0"}}).to_string())?;
        fixture.write("next.config.mjs", "export default {};\n")?;
        fixture.write("tsconfig.json", r#"{"compilerOptions": {"paths": {"@/*": ["./*"]}}}"#)?;
        fixture.write("app/globals.css", "@import \"tailwindcss\";\n")?;
        Ok(fixture)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.join(relative))?)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.join(relative).exists()
    }

    /// Write `components.json` with default settings and `registries`.
    pub fn with_config(&self, registries: Value) -> Result<()> {
        let config = json!({
            "style": "new-york",
            "tailwind": {"config": "", "css": "app/globals.css", "baseColor": "neutral", "cssVariables": true},
            "aliases": {
                "components": "@/components",
                "utils": "@/lib/utils",
                "ui": "@/components/ui",
                "lib": "@/lib",
                "hooks": "@/hooks"
            },
            "registries": registries,
        });
        self.write("components.json", &serde_json::to_string_pretty(&config)?)?;
        Ok(())
    }

    /// Write a `components.json` containing only `registries`.
    pub fn with_shadow_config(&self, registries: Value) -> Result<()> {
        self.write("components.json", &json!({"registries": registries}).to_string())?;
        Ok(())
    }
}

/// A `registry:component` item with one `.tsx` file and optional registry dependencies.
pub fn component(name: &str, registry_dependencies: &[&str]) -> Value {
    json!({
        "name": name,
        "type": "registry:component",
        "description": format!("The {name} component"),
        "registryDependencies": registry_dependencies,
        "files": [{
            "path": format!("registry/new-york/{name}.tsx"),
            "type": "registry:component",
            "content": format!("import {{ cn }} from \"@/lib/utils\"\n\nexport function {}() {{\n  return null\n}}\n", pascal_case(name)),
        }],
    })
}

/// A `registry:ui` item named `name` with a description.
pub fn ui(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "type": "registry:ui",
        "description": description,
        "files": [{
            "path": format!("ui/{name}.tsx"),
            "type": "registry:ui",
            "content": format!("export const {} = () => null\n", pascal_case(name)),
        }],
    })
}

fn pascal_case(name: &str) -> String {
    name.split(['-', '/'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map(|first| first.to_ascii_uppercase().to_string() + chars.as_str()).unwrap_or_default()
        })
        .collect()
}
