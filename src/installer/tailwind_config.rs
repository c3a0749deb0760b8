//! Best-effort edits of a Tailwind v3 `tailwind.config.{js,ts}`.
//!
//! The config is edited as text, like the stylesheet. Its object is the first object
//! literal with a top-level `content` property. From the fragment:
//!
//! - keys missing from the config object are added, objects present on both sides are
//!   merged recursively, existing values are never replaced
//! - `plugins` entries are appended to the `plugins` array unless that array already names
//!   the same module
//! - `darkMode: ["class"]` is added first when the config has no `darkMode`
//!
//! A file whose config object cannot be found is left alone; the caller reports the
//! fragment instead.

use crate::utils::fs::{read_optional, safe_write};
use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

/// One comma-separated entry of an object or array literal.
#[derive(Debug, Clone)]
struct Entry {
    /// Property name, unquoted. `None` for array items, spreads and shorthands.
    key: Option<String>,
    /// Byte offset where the value starts (after `:` and whitespace).
    value_start: usize,
    /// Byte offset just past the last code byte of the entry.
    end: usize,
}

fn skip_string(bytes: &[u8], start: usize, end: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    end
}

/// Index past a comment starting at `start`, or `None` when there is no comment there.
fn skip_comment(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    match (bytes.get(start), bytes.get(start + 1)) {
        (Some(b'/'), Some(b'/')) => {
            let mut i = start + 2;
            while i < end && bytes[i] != b'\n' {
                i += 1;
            }
            Some(i)
        }
        (Some(b'/'), Some(b'*')) => {
            let mut i = start + 2;
            while i + 1 < end && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            Some((i + 2).min(end))
        }
        _ => None,
    }
}

/// The bracket closing the one at `open`.
fn matching(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(next) = skip_comment(bytes, i, bytes.len()) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i, bytes.len());
                continue;
            }
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn unquote(key: &str) -> String {
    key.trim().trim_matches(['"', '\'', '`']).to_string()
}

/// Entries between the brackets at `open` and `close`.
fn entries(text: &str, open: usize, close: usize) -> Vec<Entry> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut first_code: Option<usize> = None;
    let mut last_code: Option<usize> = None;
    let mut colon: Option<usize> = None;
    let mut i = open + 1;

    let mut finish = |first_code: Option<usize>, last_code: Option<usize>, colon: Option<usize>| {
        let (Some(start), Some(end)) = (first_code, last_code) else {
            return;
        };
        let leading = |from: usize| from + (text[from..end].len() - text[from..end].trim_start().len());
        let (key, value_start) = match colon {
            Some(colon) => (Some(unquote(&text[start..colon])), leading(colon + 1)),
            None => (None, start),
        };
        found.push(Entry {
            key,
            value_start,
            end,
        });
    };

    while i < close {
        if let Some(next) = skip_comment(bytes, i, close) {
            i = next;
            continue;
        }
        let byte = bytes[i];
        if byte == b',' && depth == 0 {
            finish(first_code.take(), last_code.take(), colon.take());
            i += 1;
            continue;
        }
        if !byte.is_ascii_whitespace() && first_code.is_none() {
            first_code = Some(i);
        }
        match byte {
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i, close);
                last_code = Some(i);
                continue;
            }
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && colon.is_none() => colon = Some(i),
            _ => {}
        }
        if !byte.is_ascii_whitespace() {
            last_code = Some(i + 1);
        }
        i += 1;
    }
    finish(first_code, last_code, colon);

    // spreads carry no key
    found
        .into_iter()
        .map(|mut entry| {
            if entry.key.as_deref().is_some_and(|k| k.is_empty() || k.starts_with("...")) {
                entry.key = None;
            }
            entry
        })
        .collect()
}

fn line_indent(text: &str, position: usize) -> String {
    let line_start = text[..position].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..].chars().take_while(|c| *c == ' ' || *c == '\t').collect()
}

/// Quote character of the first string literal outside comments.
fn first_quote(text: &str) -> char {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(next) = skip_comment(bytes, i, bytes.len()) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'"' => return '"',
            b'\'' => return '\'',
            _ => i += 1,
        }
    }
    '"'
}

/// A config file being edited.
struct ConfigText {
    text: String,
    quote: char,
}

impl ConfigText {
    fn new(text: &str) -> Self {
        ConfigText {
            text: text.to_string(),
            quote: first_quote(text),
        }
    }

    /// Brackets of the object literal holding `content`.
    fn root(&self) -> Option<(usize, usize)> {
        let bytes = self.text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if let Some(next) = skip_comment(bytes, i, bytes.len()) {
                i = next;
                continue;
            }
            match bytes[i] {
                b'"' | b'\'' | b'`' => {
                    i = skip_string(bytes, i, bytes.len());
                    continue;
                }
                b'{' => {
                    if let Some(close) = matching(bytes, i)
                        && entries(&self.text, i, close).iter().any(|e| e.key.as_deref() == Some("content"))
                    {
                        return Some((i, close));
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Brackets of the object at `path` below the root.
    fn object_at(&self, path: &[String]) -> Option<(usize, usize)> {
        let mut range = self.root()?;
        for key in path {
            let entry = self.entry(range, key)?;
            if self.text.as_bytes().get(entry.value_start) != Some(&b'{') {
                return None;
            }
            range = (entry.value_start, matching(self.text.as_bytes(), entry.value_start)?);
        }
        Some(range)
    }

    fn entry(&self, (open, close): (usize, usize), key: &str) -> Option<Entry> {
        entries(&self.text, open, close).into_iter().find(|e| e.key.as_deref() == Some(key))
    }

    fn render_key(&self, key: &str) -> String {
        let mut chars = key.chars();
        let identifier = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if identifier { key.to_string() } else { self.render_string(key) }
    }

    fn render_string(&self, value: &str) -> String {
        let q = self.quote;
        let escaped = value.replace('\\', "\\\\").replace(q, &format!("\\{q}"));
        format!("{q}{escaped}{q}")
    }

    fn render(&self, value: &Value, indent: &str) -> String {
        match value {
            Value::String(text) => self.render_string(text),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| self.render(item, indent)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Object(map) if map.is_empty() => "{}".to_string(),
            Value::Object(map) => {
                let inner = format!("{indent}  ");
                let lines: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{inner}{}: {},", self.render_key(k), self.render(v, &inner)))
                    .collect();
                format!("{{\n{}\n{indent}}}", lines.join("\n"))
            }
            other => other.to_string(),
        }
    }

    /// Add `key: value` as the last property of the object at `range`.
    fn append_property(&mut self, (open, close): (usize, usize), key: &str, value: &Value) {
        let existing = entries(&self.text, open, close);
        let indent = match existing.first() {
            Some(first) => line_indent(&self.text, first.value_start),
            None => format!("{}  ", line_indent(&self.text, open)),
        };
        let line = format!("{}: {}", self.render_key(key), self.render(value, &indent));

        match existing.last() {
            Some(last) => {
                let rest = &self.text[last.end..close];
                if rest.trim_start().starts_with(',') {
                    let comma = last.end + rest.find(',').unwrap_or(0) + 1;
                    self.text.insert_str(comma, &format!("\n{indent}{line},"));
                } else {
                    self.text.insert_str(last.end, &format!(",\n{indent}{line}"));
                }
            }
            None if self.text[open + 1..close].trim().is_empty() => {
                let outer = line_indent(&self.text, open);
                self.text.replace_range(open + 1..close, &format!("\n{indent}{line},\n{outer}"));
            }
            None => self.text.insert_str(open + 1, &format!("\n{indent}{line},")),
        }
    }

    fn merge(&mut self, path: &mut Vec<String>, fragment: &Map<String, Value>) {
        for (key, value) in fragment {
            if path.is_empty() && key == "plugins" {
                continue;
            }
            let Some(range) = self.object_at(path) else {
                return;
            };
            match (self.entry(range, key), value) {
                (None, _) => self.append_property(range, key, value),
                (Some(entry), Value::Object(inner)) if self.text.as_bytes().get(entry.value_start) == Some(&b'{') => {
                    path.push(key.clone());
                    self.merge(path, inner);
                    path.pop();
                }
                _ => tracing::debug!("Keeping existing Tailwind config value for \"{}\"", key),
            }
        }
    }

    fn add_plugin(&mut self, plugin: &str) {
        let plugin = plugin.trim();
        let module = plugin
            .strip_prefix("require(")
            .and_then(|rest| rest.strip_suffix(')'))
            .map_or(plugin, str::trim)
            .trim_matches(['"', '\'', '`']);
        let expression = if plugin.contains('(') {
            plugin.to_string()
        } else {
            format!("require({})", self.render_string(module))
        };

        let Some(root) = self.root() else {
            return;
        };
        let Some(entry) = self.entry(root, "plugins") else {
            self.append_property(root, "plugins", &Value::Array(Vec::new()));
            return self.add_plugin(&expression);
        };
        let bytes = self.text.as_bytes();
        if bytes.get(entry.value_start) != Some(&b'[') {
            tracing::warn!("Tailwind config plugins are not an array literal; add {} by hand", expression);
            return;
        }
        let Some(close) = matching(bytes, entry.value_start) else {
            return;
        };

        let body = &self.text[entry.value_start..close];
        if ['"', '\'', '`'].iter().any(|q| body.contains(&format!("{q}{module}{q}"))) {
            return;
        }
        match entries(&self.text, entry.value_start, close).last() {
            Some(last) => self.text.insert_str(last.end, &format!(", {expression}")),
            None => self.text.replace_range(entry.value_start + 1..close, &expression),
        }
    }

    fn ensure_dark_mode(&mut self) {
        let Some((open, close)) = self.root() else {
            return;
        };
        if self.entry((open, close), "darkMode").is_some() {
            return;
        }
        let indent = entries(&self.text, open, close)
            .first()
            .map_or_else(|| format!("{}  ", line_indent(&self.text, open)), |e| line_indent(&self.text, e.value_start));
        let line = format!("\n{indent}darkMode: [{}],", self.render_string("class"));
        self.text.insert_str(open + 1, &line);
    }
}

/// Merge `fragment` into config source text. `None` when the config object is not found.
#[must_use]
pub fn merge(input: &str, fragment: &Map<String, Value>) -> Option<String> {
    let mut config = ConfigText::new(input);
    config.root()?;

    config.ensure_dark_mode();
    if let Some(plugins) = fragment.get("plugins").and_then(Value::as_array) {
        for plugin in plugins.iter().filter_map(Value::as_str) {
            config.add_plugin(plugin);
        }
    }
    config.merge(&mut Vec::new(), fragment);

    Some(config.text)
}

/// Merge `fragment` into the config at `path`.
///
/// Returns `None` when the file is missing or its config object is not found, else
/// whether the file changed (or would, on a dry run).
pub fn update_file(path: &Path, fragment: &Map<String, Value>, dry_run: bool) -> Result<Option<bool>> {
    let Some(existing) = read_optional(path)? else {
        return Ok(None);
    };
    let Some(updated) = merge(&existing, fragment) else {
        tracing::debug!("No config object found in {}", path.display());
        return Ok(None);
    };
    if updated == existing {
        return Ok(Some(false));
    }
    if !dry_run {
        safe_write(path, &updated)?;
        tracing::debug!("Updated {}", path.display());
    }
    Ok(Some(true))
}
