//! Textual import-path rewriting.
//!
//! Registry sources import each other through the conventional aliases (`@/components/ui`,
//! `@/lib/utils`, ...) or through the registry's own layout (`@/registry/new-york/ui/...`).
//! Before a script is written, every module specifier that starts with one of those prefixes
//! is rewritten to the project's configured alias.
//!
//! Only specifiers inside `import ... from "..."`, `import "..."`, `import("...")`,
//! `export ... from "..."` and `require("...")` are touched, and a prefix only matches at a
//! path-segment boundary. This is a string substitution, not a parser: specifiers built at
//! runtime or hidden in comments that look like imports are handled as text.

use crate::config::project::Aliases;
use crate::constants::SCRIPT_EXTENSIONS;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

static SPECIFIER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(\bfrom\s*|\bimport\s*\(\s*|\bimport\s+|\brequire\s*\(\s*)(["'])([^"'\n]+)(["'])"#).ok()
});

/// Whether files at `path` get their imports rewritten.
#[must_use]
pub fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

/// Prefix table, longest first.
fn alias_table(aliases: &Aliases) -> Vec<(String, String)> {
    let mut table = vec![
        ("@/components/ui".to_string(), aliases.ui()),
        ("@/components".to_string(), aliases.components()),
        ("@/lib/utils".to_string(), aliases.utils()),
        ("@/lib".to_string(), aliases.lib()),
        ("@/hooks".to_string(), aliases.hooks()),
    ];
    table.sort_by_key(|(prefix, _)| std::cmp::Reverse(prefix.len()));
    table
}

/// Rewrite a single specifier, or `None` when no known prefix applies.
fn rewrite_specifier(specifier: &str, table: &[(String, String)]) -> Option<String> {
    // `@/registry/<style>/<dir>/...` is the registry's own layout
    let specifier = match specifier.strip_prefix("@/registry/") {
        Some(rest) => {
            let (_style, inner) = rest.split_once('/')?;
            let inner = if inner == "ui" || inner.starts_with("ui/") {
                format!("components/{inner}")
            } else {
                inner.to_string()
            };
            format!("@/{inner}")
        }
        None => specifier.to_string(),
    };

    table.iter().find_map(|(prefix, alias)| {
        let rest = specifier.strip_prefix(prefix.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then(|| format!("{alias}{rest}"))
    })
}

/// Rewrite the module specifiers of `content` to the configured aliases.
#[must_use]
pub fn rewrite_imports(content: &str, aliases: &Aliases) -> String {
    let Some(pattern) = SPECIFIER.as_ref() else {
        return content.to_string();
    };
    let table = alias_table(aliases);

    pattern
        .replace_all(content, |caps: &Captures<'_>| {
            let specifier = &caps[3];
            // mismatched quotes are not a specifier
            if caps[2] != caps[4] {
                return caps[0].to_string();
            }
            match rewrite_specifier(specifier, &table) {
                Some(rewritten) => format!("{}{}{}{}", &caps[1], &caps[2], rewritten, &caps[4]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
