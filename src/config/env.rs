//! `${VAR}` placeholder expansion for registry URLs, headers and query parameters.
//!
//! Expansion reads the process environment at the moment a request is built, never when
//! the configuration is loaded, so a variable exported after `components.json` was read
//! is still honored. Only `${NAME}` with an identifier-shaped name is a placeholder; a bare
//! `$` or `${not a name}` stays literal, which keeps tokens containing `$` intact.

use crate::core::RegistryError;
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());

fn placeholder_regex() -> Result<&'static Regex, RegistryError> {
    PLACEHOLDER.as_ref().ok_or_else(|| RegistryError::Other {
        message: "Invalid placeholder pattern".to_string(),
    })
}

/// Variable names referenced by `value`, in order of appearance.
#[must_use]
pub fn placeholders(value: &str) -> Vec<String> {
    match placeholder_regex() {
        Ok(re) => re.captures_iter(value).map(|c| c[1].to_string()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Replace every `${VAR}` in `value` with the current value of `VAR`.
///
/// `registry` only labels the error.
///
/// # Errors
///
/// [`RegistryError::MissingEnvVar`] for the first variable that is not set.
pub fn expand(value: &str, registry: &str) -> Result<String, RegistryError> {
    let re = placeholder_regex()?;
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for caps in re.captures_iter(value) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = &caps[1];
        let resolved = std::env::var(name).map_err(|_| RegistryError::MissingEnvVar {
            variable: name.to_string(),
            registry: registry.to_string(),
        })?;
        out.push_str(&value[last..whole.start()]);
        out.push_str(&resolved);
        last = whole.end();
    }
    out.push_str(&value[last..]);

    Ok(out)
}

/// Check that every placeholder in `values` can be expanded right now.
pub fn check_all<'a>(
    values: impl IntoIterator<Item = &'a str>,
    registry: &str,
) -> Result<(), RegistryError> {
    for value in values {
        for name in placeholders(value) {
            if std::env::var_os(&name).is_none() {
                return Err(RegistryError::MissingEnvVar {
                    variable: name,
                    registry: registry.to_string(),
                });
            }
        }
    }
    Ok(())
}
