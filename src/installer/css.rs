//! Stylesheet edits: CSS variables and CSS rules shipped by items.
//!
//! The stylesheet is edited in place rather than re-serialized, so the project's own
//! formatting and comments survive. A small brace scanner locates blocks by their prelude
//! (`:root`, `.dark`, `@theme inline`, `@layer base`, ...) and new declarations are inserted
//! before the closing brace. Existing declarations are never overridden.
//!
//! Where things go:
//!
//! - `cssVars.light` → `:root`, `cssVars.dark` → `.dark`, `cssVars.theme` → `@theme inline`
//! - Tailwind v4 projects also expose colour variables as `--color-<name>: var(--<name>)`
//!   in `@theme inline`; v3 projects keep `:root`/`.dark` inside `@layer base`
//! - `css` rules are nested objects of selectors/at-rules; an at-rule mapped to `{}` is a
//!   statement (`@plugin "x";`)
//! - on v4, the Tailwind `config` fragment lands here too: `plugins` become `@plugin`
//!   statements, `theme.extend.keyframes` become `@keyframes` blocks and
//!   `theme.extend.animation` become `--animate-<name>` variables, both in `@theme inline`

use crate::core::CssVars;
use crate::utils::fs::{read_optional, safe_write};
use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

const THEME_BLOCK: &str = "@theme inline";
const BASE_LAYER: &str = "@layer base";
const RADIUS_SCALE: [(&str, &str); 4] = [
    ("sm", "calc(var(--radius) - 4px)"),
    ("md", "calc(var(--radius) - 2px)"),
    ("lg", "var(--radius)"),
    ("xl", "calc(var(--radius) + 4px)"),
];

/// What to apply to a stylesheet.
#[derive(Debug, Clone, Copy)]
pub struct CssEdit<'a> {
    pub css_vars: &'a CssVars,
    pub rules: &'a Map<String, Value>,
    /// No JS Tailwind config: v4 conventions apply.
    pub tailwind_v4: bool,
    /// `tailwind.cssVariables` from the project config.
    pub css_variables: bool,
    /// Tailwind `config` fragment to express in CSS. Only honoured on v4.
    pub tailwind: Option<&'a Value>,
}

impl CssEdit<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (self.css_vars.is_empty() || !self.css_variables) && self.rules.is_empty() && self.tailwind_fragment().is_none()
    }

    fn tailwind_fragment(&self) -> Option<TailwindCss<'_>> {
        if !self.tailwind_v4 {
            return None;
        }
        let fragment = TailwindCss::from_config(self.tailwind?);
        (!fragment.is_empty()).then_some(fragment)
    }
}

/// The parts of a Tailwind `config` fragment that have a CSS form.
#[derive(Debug, Default)]
struct TailwindCss<'a> {
    plugins: Vec<String>,
    keyframes: Vec<(&'a str, &'a Map<String, Value>)>,
    animations: Vec<(&'a str, &'a str)>,
}

impl<'a> TailwindCss<'a> {
    fn from_config(config: &'a Value) -> Self {
        let extend = config.pointer("/theme/extend");
        let plugins = config
            .get("plugins")
            .and_then(Value::as_array)
            .map(|plugins| plugins.iter().filter_map(Value::as_str).map(plugin_name).collect())
            .unwrap_or_default();
        let keyframes = extend
            .and_then(|e| e.get("keyframes"))
            .and_then(Value::as_object)
            .map(|frames| {
                frames
                    .iter()
                    .filter_map(|(name, steps)| Some((name.as_str(), steps.as_object()?)))
                    .collect()
            })
            .unwrap_or_default();
        let animations = extend
            .and_then(|e| e.get("animation"))
            .and_then(Value::as_object)
            .map(|animations| {
                animations
                    .iter()
                    .filter_map(|(name, value)| Some((name.as_str(), value.as_str()?)))
                    .collect()
            })
            .unwrap_or_default();

        TailwindCss {
            plugins,
            keyframes,
            animations,
        }
    }

    fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.keyframes.is_empty() && self.animations.is_empty()
    }
}

/// `require("x")` → `x`.
fn plugin_name(plugin: &str) -> String {
    let plugin = plugin.trim();
    let inner = plugin
        .strip_prefix("require(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(plugin)
        .trim();
    inner.trim_matches(['"', '\'']).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Block,
    Declaration,
    Statement,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Selector/at-rule for blocks, property for declarations, the text for statements.
    prelude: String,
    /// Byte offset just past the node.
    end: usize,
    /// Byte range between the braces of a block.
    body: Option<(usize, usize)>,
}

/// Strip comments and collapse whitespace.
fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(close) => &rest[start + 2 + close + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn skip_comment(bytes: &[u8], start: usize, end: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < end && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
        i += 1;
    }
    (i + 2).min(end)
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

fn matching_brace(bytes: &[u8], open: usize, end: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < end {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(bytes, i, end);
                continue;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i, end);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    end
}

fn classify(raw: String, end: usize) -> Node {
    let (kind, prelude) = if raw.starts_with('@') {
        (NodeKind::Statement, raw)
    } else if let Some((prop, _)) = raw.split_once(':') {
        (NodeKind::Declaration, prop.trim().to_string())
    } else {
        (NodeKind::Statement, raw)
    };
    Node {
        kind,
        prelude,
        end,
        body: None,
    }
}

/// Direct children of the byte range `start..end`.
fn scan(text: &str, start: usize, end: usize) -> Vec<Node> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut segment = start;
    let mut i = start;

    while i < end {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(bytes, i, end),
            b'"' | b'\'' => i = skip_string(bytes, i, end),
            b'{' => {
                let close = matching_brace(bytes, i, end);
                nodes.push(Node {
                    kind: NodeKind::Block,
                    prelude: clean(&text[segment..i]),
                    end: (close + 1).min(end),
                    body: Some((i + 1, close)),
                });
                i = (close + 1).min(end);
                segment = i;
            }
            b';' => {
                let raw = clean(&text[segment..i]);
                if !raw.is_empty() {
                    nodes.push(classify(raw, i + 1));
                }
                i += 1;
                segment = i;
            }
            b'}' => break,
            _ => i += 1,
        }
    }

    let trailing = clean(&text[segment..i.min(end)]);
    if !trailing.is_empty() {
        nodes.push(classify(trailing, i.min(end)));
    }

    nodes
}

/// A stylesheet being edited.
struct Stylesheet {
    text: String,
}

impl Stylesheet {
    fn find_block(&self, path: &[String]) -> Option<(usize, usize)> {
        let mut range = (0, self.text.len());
        for selector in path {
            let wanted = clean(selector);
            range = scan(&self.text, range.0, range.1)
                .into_iter()
                .find(|node| node.kind == NodeKind::Block && node.prelude == wanted)?
                .body?;
        }
        Some(range)
    }

    /// Find or create every block along `path`.
    fn ensure_block(&mut self, path: &[String]) -> Option<(usize, usize)> {
        for depth in 1..=path.len() {
            if self.find_block(&path[..depth]).is_none() {
                let selector = clean(&path[depth - 1]);
                self.insert_child(&path[..depth - 1], &format!("{selector} {{}}"), false);
            }
        }
        self.find_block(path)
    }

    fn insert_child(&mut self, path: &[String], line: &str, statement: bool) {
        if path.is_empty() {
            self.insert_top_level(line, statement);
            return;
        }

        let Some((start, end)) = self.find_block(path) else {
            return;
        };
        let indent = "  ".repeat(path.len());
        let outer = "  ".repeat(path.len() - 1);
        let body = &self.text[start..end];

        if body.trim().is_empty() {
            self.text.replace_range(start..end, &format!("\n{indent}{line}\n{outer}"));
            return;
        }

        let mut position = start + body.trim_end().len();
        let unterminated = scan(&self.text, start, end)
            .last()
            .is_some_and(|node| node.kind != NodeKind::Block && !self.text[..position].ends_with(';'));
        if unterminated {
            self.text.insert(position, ';');
            position += 1;
        }
        self.text.insert_str(position, &format!("\n{indent}{line}"));
    }

    fn insert_top_level(&mut self, line: &str, statement: bool) {
        if statement {
            let last_statement = scan(&self.text, 0, self.text.len())
                .into_iter()
                .filter(|node| node.kind == NodeKind::Statement)
                .last();
            if let Some(node) = last_statement {
                self.text.insert_str(node.end, &format!("\n{line}"));
            } else if self.text.trim().is_empty() {
                self.text = format!("{line}\n");
            } else {
                self.text.insert_str(0, &format!("{line}\n\n"));
            }
            return;
        }

        let kept = self.text.trim_end().len();
        self.text.truncate(kept);
        if !self.text.is_empty() {
            self.text.push_str("\n\n");
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn ensure_declaration(&mut self, path: &[String], property: &str, value: &str) {
        if path.is_empty() {
            return;
        }
        let Some((start, end)) = self.ensure_block(path) else {
            return;
        };
        let present = scan(&self.text, start, end)
            .iter()
            .any(|node| node.kind == NodeKind::Declaration && node.prelude == property);
        if !present {
            self.insert_child(path, &format!("{property}: {value};"), false);
        }
    }

    fn ensure_statement(&mut self, path: &[String], statement: &str) {
        let wanted = clean(statement.trim_end_matches(';'));
        let range = if path.is_empty() {
            Some((0, self.text.len()))
        } else {
            self.ensure_block(path)
        };
        let Some((start, end)) = range else {
            return;
        };
        let present = scan(&self.text, start, end)
            .iter()
            .any(|node| node.kind == NodeKind::Statement && node.prelude == wanted);
        if !present {
            self.insert_child(path, &format!("{wanted};"), true);
        }
    }

    fn merge_rules(&mut self, path: &mut Vec<String>, rules: &Map<String, Value>) {
        for (key, value) in rules {
            match value {
                Value::Object(inner) if inner.is_empty() && key.starts_with('@') => {
                    self.ensure_statement(path, key);
                }
                Value::Object(inner) => {
                    path.push(key.clone());
                    self.ensure_block(path);
                    self.merge_rules(path, inner);
                    path.pop();
                }
                Value::String(text) => self.ensure_declaration(path, key, text),
                Value::Number(number) => self.ensure_declaration(path, key, &number.to_string()),
                _ => tracing::warn!("Ignoring unsupported CSS value for \"{}\"", key),
            }
        }
    }

    /// Where a variables block lives: an existing one, top-level or in the base layer,
    /// else the convention of the Tailwind version.
    fn vars_block(&self, selector: &str, tailwind_v4: bool) -> Vec<String> {
        let top = vec![selector.to_string()];
        let layered = vec![BASE_LAYER.to_string(), selector.to_string()];
        if self.find_block(&top).is_some() {
            top
        } else if self.find_block(&layered).is_some() || !tailwind_v4 {
            layered
        } else {
            top
        }
    }

    fn apply_vars(&mut self, vars: &CssVars, tailwind_v4: bool) {
        for (selector, values) in [(":root", &vars.light), (".dark", &vars.dark)] {
            if values.is_empty() {
                continue;
            }
            let path = self.vars_block(selector, tailwind_v4);
            for (name, value) in values {
                self.ensure_declaration(&path, &custom_property(name), value);
            }
        }

        if tailwind_v4 && !vars.dark.is_empty() {
            self.ensure_statement(&[], "@custom-variant dark (&:is(.dark *))");
        }

        let theme = vec![THEME_BLOCK.to_string()];
        for (name, value) in &vars.theme {
            self.ensure_declaration(&theme, &custom_property(name), value);
        }

        if !tailwind_v4 {
            return;
        }

        let mut names: Vec<&String> = vars.light.keys().collect();
        names.extend(vars.dark.keys().filter(|k| !vars.light.contains_key(*k)));

        for name in names {
            let name = name.trim_start_matches("--");
            let Some(value) = vars.light.get(name).or_else(|| vars.dark.get(name)) else {
                continue;
            };

            if name == "radius" {
                for (step, expression) in RADIUS_SCALE {
                    self.ensure_declaration(&theme, &format!("--radius-{step}"), expression);
                }
            } else if is_color_value(value) || is_bare_hsl(value) {
                let (property, reference) = match name {
                    "sidebar-background" => ("--color-sidebar".to_string(), "var(--sidebar)".to_string()),
                    _ => (format!("--color-{name}"), format!("var(--{name})")),
                };
                self.ensure_declaration(&theme, &property, &reference);
            }
        }
    }

    fn apply_tailwind(&mut self, fragment: &TailwindCss<'_>) {
        for plugin in &fragment.plugins {
            let present = scan(&self.text, 0, self.text.len()).iter().any(|node| {
                node.kind == NodeKind::Statement
                    && node
                        .prelude
                        .strip_prefix("@plugin ")
                        .is_some_and(|name| name.trim_matches(['"', '\'']) == plugin)
            });
            if !present {
                self.insert_top_level(&format!("@plugin \"{plugin}\";"), true);
            }
        }

        let theme = vec![THEME_BLOCK.to_string()];
        for (name, steps) in &fragment.keyframes {
            let mut path = vec![THEME_BLOCK.to_string(), format!("@keyframes {name}")];
            if self.find_block(&path).is_some() {
                continue;
            }
            self.ensure_block(&path);
            for (step, declarations) in steps.iter() {
                let Some(declarations) = declarations.as_object() else {
                    continue;
                };
                path.push(step.clone());
                for (property, value) in declarations {
                    if let Some(value) = value.as_str() {
                        self.ensure_declaration(&path, property, value);
                    }
                }
                path.pop();
            }
        }

        for (name, value) in &fragment.animations {
            self.ensure_declaration(&theme, &format!("--animate-{name}"), value);
        }
    }
}

fn custom_property(name: &str) -> String {
    format!("--{}", name.trim_start_matches("--"))
}

fn is_color_value(value: &str) -> bool {
    ["hsl", "rgb", "#", "oklch"].iter().any(|prefix| value.starts_with(prefix))
}

/// Space-separated HSL channels such as `222.2 84% 4.9%`.
fn is_bare_hsl(value: &str) -> bool {
    let chunks: Vec<&str> = value.split(' ').collect();
    !is_color_value(value) && chunks.len() == 3 && chunks[1..].iter().all(|c| c.contains('%'))
}

/// Apply `edit` to stylesheet text.
#[must_use]
pub fn apply(existing: &str, edit: &CssEdit<'_>) -> String {
    let mut sheet = Stylesheet {
        text: existing.to_string(),
    };

    if edit.css_variables && !edit.css_vars.is_empty() {
        sheet.apply_vars(edit.css_vars, edit.tailwind_v4);
    }
    sheet.merge_rules(&mut Vec::new(), edit.rules);
    if let Some(fragment) = edit.tailwind_fragment() {
        sheet.apply_tailwind(&fragment);
    }

    sheet.text
}

/// Apply `edit` to the stylesheet at `path`, creating it when missing. Returns whether
/// the file changed.
pub fn update_file(path: &Path, edit: &CssEdit<'_>) -> Result<bool> {
    if edit.is_empty() {
        return Ok(false);
    }

    let existing = read_optional(path)?.unwrap_or_default();
    let updated = apply(&existing, edit);
    if updated == existing {
        tracing::debug!("Stylesheet {} already up to date", path.display());
        return Ok(false);
    }

    safe_write(path, &updated)?;
    tracing::debug!("Updated stylesheet {}", path.display());
    Ok(true)
}
