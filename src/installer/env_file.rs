//! Env file parsing and non-destructive merging.
//!
//! Items declare environment variables (`envVars`) or ship env files of their own. Either
//! way, values only ever add keys: a key already present in the project's env file keeps its
//! value. The merge reads and rewrites the file under an exclusive lock, so concurrent merges
//! into the same file cannot interleave.

use crate::constants::ENV_FILE_PREFERENCE;
use crate::utils::lock::LockedFile;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Outcome of merging into one env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvMerge {
    pub path: PathBuf,
    /// Keys appended, in order.
    pub added: Vec<String>,
    /// Whether the file did not exist before.
    pub created: bool,
}

/// `.env` or `.env.<anything>`.
#[must_use]
pub fn is_env_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == ".env" || name.starts_with(".env."))
}

/// The first env file of the preference order that exists in `root`.
#[must_use]
pub fn find_existing(root: &Path) -> Option<PathBuf> {
    ENV_FILE_PREFERENCE.iter().map(|name| root.join(name)).find(|path| path.is_file())
}

/// Parse `KEY=value` lines.
///
/// Comments, blank lines and lines without `=` are ignored; `export ` prefixes are
/// accepted. Values in matching single or double quotes are unquoted. A double-quoted
/// value may span lines; if another assignment comes before its closing quote, only the
/// first line counts. `\"` and `\\` are unescaped in single-line double-quoted values.
#[must_use]
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    let lines: Vec<&str> = content.lines().collect();
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !is_valid_key(key) {
            continue;
        }

        let raw = raw.trim();
        let value = if let Some(rest) = raw.strip_prefix('"') {
            if let Some(inner) = rest.strip_suffix('"').filter(|inner| !ends_escaped(inner)) {
                unescape(inner)
            } else if let Some(end) = closing_line(&lines[i..]) {
                let mut value = rest.to_string();
                for continuation in &lines[i..i + end] {
                    value.push('\n');
                    value.push_str(continuation);
                }
                value.push('\n');
                value.push_str(lines[i + end].trim_end().trim_end_matches('"'));
                i += end + 1;
                value
            } else {
                rest.to_string()
            }
        } else if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
            inner.to_string()
        } else {
            raw.to_string()
        };

        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.to_string(), value)),
        }
    }

    entries
}

/// Whether `text` ends in an odd run of backslashes, escaping whatever follows.
fn ends_escaped(text: &str) -> bool {
    text.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Undo the escaping of [`format_entry`].
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('"' | '\\'))) => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Index of the line closing a multiline value, if it comes before the next assignment.
fn closing_line(lines: &[&str]) -> Option<usize> {
    for (index, line) in lines.iter().enumerate() {
        if is_assignment(line) {
            return None;
        }
        if line.trim_end().ends_with('"') {
            return Some(index);
        }
    }
    None
}

fn is_assignment(line: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    // base64 padding (`abc==`) is not an assignment
    line.split_once('=').is_some_and(|(key, rest)| is_valid_key(key) && !rest.starts_with('='))
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// One `KEY=value` line.
///
/// Values that would not read back as written are double-quoted: multiline values, values
/// with surrounding whitespace, a `#`, or quotes. Embedded double quotes on a single line
/// are escaped.
#[must_use]
pub fn format_entry(key: &str, value: &str) -> String {
    if value.contains('\n') {
        return format!("{key}=\"{value}\"");
    }
    let needs_quotes = value.trim() != value
        || value.contains('#')
        || value.starts_with('\'')
        || value.contains('"');
    if needs_quotes {
        format!("{key}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        format!("{key}={value}")
    }
}

/// Append the entries of `incoming` whose keys `existing` lacks.
///
/// New entries follow a blank separator line; the result always ends with a newline.
/// Returns the merged text and the appended keys.
#[must_use]
pub fn merge_env(existing: &str, incoming: &[(String, String)]) -> (String, Vec<String>) {
    let present: Vec<String> = parse_env(existing).into_iter().map(|(k, _)| k).collect();

    let mut added: Vec<String> = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    for (key, value) in incoming {
        if present.contains(key) || added.contains(key) {
            continue;
        }
        added.push(key.clone());
        lines.push(format_entry(key, value));
    }

    let merged = if lines.is_empty() {
        if existing.is_empty() || existing.ends_with('\n') {
            existing.to_string()
        } else {
            format!("{existing}\n")
        }
    } else if existing.trim().is_empty() {
        format!("{}\n", lines.join("\n"))
    } else {
        format!("{}\n\n{}\n", existing.trim_end(), lines.join("\n"))
    };

    (merged, added)
}

/// Keys of `incoming` that a merge into `path` would add, without writing anything.
pub fn pending_keys(path: &Path, incoming: &[(String, String)]) -> Result<Vec<String>> {
    let existing = crate::utils::fs::read_optional(path)?.unwrap_or_default();
    Ok(merge_env(&existing, incoming).1)
}

/// Merge `incoming` into the env file at `path`, creating it if needed.
pub async fn merge_into(path: &Path, incoming: &[(String, String)]) -> Result<EnvMerge> {
    let created = !path.exists();
    let mut file = LockedFile::acquire(path).await?;

    let existing = file.read_to_string()?;
    let (merged, added) = merge_env(&existing, incoming);

    if merged != existing {
        file.replace_contents(&merged)?;
    }

    tracing::debug!("Merged {} new keys into {}", added.len(), file.path().display());

    Ok(EnvMerge {
        path: path.to_path_buf(),
        added,
        created,
    })
}
