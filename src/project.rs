//! Detection of the target project's layout.
//!
//! The installer needs to know where an alias like `@/components/ui` points on disk and
//! where pages go. [`ProjectInfo::detect`] answers from the file system:
//!
//! - whether the project keeps its code under `src/`
//! - the framework ([`Framework`]), from `next.config.*`/`vite.config.*` and the presence
//!   of `app/` or `pages/`
//! - `compilerOptions.paths` from `tsconfig.json` or `jsconfig.json` (comments and
//!   trailing commas tolerated)
//!
//! [`ProjectInfo::alias_dir`] maps an alias to a directory: a matching tsconfig path wins;
//! otherwise `@/` and `~/` point at `src/` (or the root without one); anything else is
//! taken as root-relative.

use crate::utils::fs::normalize_path;
use anyhow::Result;
use std::path::{Path, PathBuf};

const NEXT_CONFIGS: [&str; 4] = ["next.config.js", "next.config.mjs", "next.config.ts", "next.config.cjs"];
const VITE_CONFIGS: [&str; 4] = ["vite.config.js", "vite.config.mjs", "vite.config.ts", "vite.config.cjs"];
const TAILWIND_CONFIGS: [&str; 4] =
    ["tailwind.config.ts", "tailwind.config.js", "tailwind.config.mjs", "tailwind.config.cjs"];
const STYLESHEET_CANDIDATES: [&str; 7] = [
    "app/globals.css",
    "src/app/globals.css",
    "styles/globals.css",
    "src/styles/globals.css",
    "src/index.css",
    "src/global.css",
    "app/tailwind.css",
];

/// Framework flavour, as far as file placement cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    NextApp,
    NextPages,
    Vite,
    Unknown,
}

/// Layout facts about a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub root: PathBuf,
    pub src_dir: bool,
    pub framework: Framework,
    /// `(pattern, first target)` pairs from `compilerOptions.paths`, targets already
    /// joined with `baseUrl`.
    pub paths: Vec<(String, String)>,
    pub typescript: bool,
}

impl ProjectInfo {
    /// Inspect `root`.
    pub async fn detect(root: &Path) -> Result<Self> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::detect_sync(&root)).await?
    }

    fn detect_sync(root: &Path) -> Result<Self> {
        let src_dir = root.join("src").is_dir();
        let in_tree = |dir: &str| root.join(dir).is_dir() || root.join("src").join(dir).is_dir();

        let framework = if NEXT_CONFIGS.iter().any(|c| root.join(c).exists()) {
            if in_tree("app") {
                Framework::NextApp
            } else if in_tree("pages") {
                Framework::NextPages
            } else {
                Framework::NextApp
            }
        } else if VITE_CONFIGS.iter().any(|c| root.join(c).exists()) {
            Framework::Vite
        } else {
            Framework::Unknown
        };

        let typescript = root.join("tsconfig.json").exists();
        let paths = ["tsconfig.json", "jsconfig.json"]
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.exists())
            .map(|p| read_compiler_paths(&p))
            .transpose()?
            .unwrap_or_default();

        tracing::debug!(
            "Detected project at {}: framework {:?}, src/ {}, {} path aliases",
            root.display(),
            framework,
            src_dir,
            paths.len()
        );

        Ok(Self {
            root: root.to_path_buf(),
            src_dir,
            framework,
            paths,
            typescript,
        })
    }

    /// Directory an import alias such as `@/components/ui` refers to.
    #[must_use]
    pub fn alias_dir(&self, alias: &str) -> PathBuf {
        let alias = alias.trim_end_matches('/');

        // longest pattern first so `@/components/*` beats `@/*`
        let mut patterns: Vec<&(String, String)> = self.paths.iter().collect();
        patterns.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.len()));

        for (pattern, target) in patterns {
            if let Some(prefix) = pattern.strip_suffix('*') {
                let target_prefix = target.trim_end_matches('*');
                if let Some(rest) = format!("{alias}/").strip_prefix(prefix) {
                    let dir = format!("{target_prefix}{rest}");
                    return normalize_path(&self.root.join(dir.trim_end_matches('/')));
                }
            } else if pattern == alias {
                return normalize_path(&self.root.join(target));
            }
        }

        for prefix in ["@/", "~/"] {
            if let Some(rest) = alias.strip_prefix(prefix) {
                let base = if self.src_dir { self.root.join("src") } else { self.root.clone() };
                return normalize_path(&base.join(rest));
            }
        }

        normalize_path(&self.root.join(alias.trim_start_matches("./")))
    }

    /// Directory that receives `registry:page` files, if the project has a router.
    #[must_use]
    pub fn pages_dir(&self) -> Option<PathBuf> {
        let base = if self.src_dir { self.root.join("src") } else { self.root.clone() };
        match self.framework {
            Framework::NextApp => Some(base.join("app")),
            Framework::NextPages => Some(base.join("pages")),
            Framework::Vite | Framework::Unknown => None,
        }
    }

    /// First conventional stylesheet that exists, relative to the root.
    #[must_use]
    pub fn find_stylesheet(&self) -> Option<String> {
        STYLESHEET_CANDIDATES
            .iter()
            .find(|candidate| self.root.join(candidate).is_file())
            .map(|c| (*c).to_string())
    }

    /// Tailwind v3 JS/TS config, relative to the root.
    #[must_use]
    pub fn find_tailwind_config(&self) -> Option<String> {
        TAILWIND_CONFIGS
            .iter()
            .find(|candidate| self.root.join(candidate).is_file())
            .map(|c| (*c).to_string())
    }
}

fn read_compiler_paths(path: &Path) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = match serde_json::from_str(&strip_jsonc(&text)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring unparsable {}: {}", path.display(), e);
            return Ok(Vec::new());
        }
    };

    let options = &value["compilerOptions"];
    let base_url = options["baseUrl"].as_str().unwrap_or(".");
    let mut paths = Vec::new();

    if let Some(map) = options["paths"].as_object() {
        for (pattern, targets) in map {
            if let Some(first) = targets.as_array().and_then(|t| t.first()).and_then(|t| t.as_str()) {
                let joined = if base_url == "." {
                    first.trim_start_matches("./").to_string()
                } else {
                    format!(
                        "{}/{}",
                        base_url.trim_start_matches("./").trim_end_matches('/'),
                        first.trim_start_matches("./")
                    )
                };
                paths.push((pattern.clone(), joined));
            }
        }
    }

    Ok(paths)
}

/// Remove `//` and `/* */` comments and trailing commas from JSON-with-comments text.
#[must_use]
pub fn strip_jsonc(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut in_string = false;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match (c, chars.get(i + 1).copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
            }
            (',', _) => {
                let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_strip_jsonc() {
        let text = r#"{
            // paths
            "a": "http://x", /* block */
            "b": [1, 2,],
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_jsonc(text)).unwrap();
        assert_eq!(value, serde_json::json!({"a": "http://x", "b": [1, 2]}));
    }

    #[tokio::test]
    async fn test_detect_next_app_with_src() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("next.config.mjs"), "export default {}").unwrap();
        fs::create_dir_all(temp.path().join("src/app")).unwrap();

        let info = ProjectInfo::detect(temp.path()).await.unwrap();
        assert_eq!(info.framework, Framework::NextApp);
        assert!(info.src_dir);
        assert_eq!(info.alias_dir("@/components/ui"), temp.path().join("src/components/ui"));
        assert_eq!(info.pages_dir(), Some(temp.path().join("src/app")));
    }

    #[tokio::test]
    async fn test_detect_pages_router_and_vite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("next.config.js"), "").unwrap();
        fs::create_dir_all(temp.path().join("pages")).unwrap();
        let info = ProjectInfo::detect(temp.path()).await.unwrap();
        assert_eq!(info.framework, Framework::NextPages);

        let vite = TempDir::new().unwrap();
        fs::write(vite.path().join("vite.config.ts"), "").unwrap();
        let info = ProjectInfo::detect(vite.path()).await.unwrap();
        assert_eq!(info.framework, Framework::Vite);
        assert!(info.pages_dir().is_none());
    }

    #[tokio::test]
    async fn test_tsconfig_paths_win() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("tsconfig.json"),
            r#"{
                // generated
                "compilerOptions": {
                    "paths": {
                        "@/*": ["./*"],
                        "@ui/*": ["./packages/ui/src/*"],
                        "@lib": ["./shared/lib"],
                    }
                }
            }"#,
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();

        let info = ProjectInfo::detect(temp.path()).await.unwrap();
        assert!(info.typescript);
        assert_eq!(info.alias_dir("@/components"), temp.path().join("components"));
        assert_eq!(info.alias_dir("@ui/button"), temp.path().join("packages/ui/src/button"));
        assert_eq!(info.alias_dir("@lib"), temp.path().join("shared/lib"));
    }

    #[tokio::test]
    async fn test_fallback_aliases() {
        let temp = TempDir::new().unwrap();
        let info = ProjectInfo::detect(temp.path()).await.unwrap();

        assert_eq!(info.framework, Framework::Unknown);
        assert_eq!(info.alias_dir("@/hooks"), temp.path().join("hooks"));
        assert_eq!(info.alias_dir("~/lib"), temp.path().join("lib"));
        assert_eq!(info.alias_dir("./shared/ui"), temp.path().join("shared/ui"));
    }

    #[tokio::test]
    async fn test_find_stylesheet_and_tailwind_config() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("app")).unwrap();
        fs::write(temp.path().join("app/globals.css"), "").unwrap();
        fs::write(temp.path().join("tailwind.config.ts"), "").unwrap();

        let info = ProjectInfo::detect(temp.path()).await.unwrap();
        assert_eq!(info.find_stylesheet().as_deref(), Some("app/globals.css"));
        assert_eq!(info.find_tailwind_config().as_deref(), Some("tailwind.config.ts"));
    }
}
