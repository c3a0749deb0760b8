//! Parsing of item references.
//!
//! Every argument to `add`/`view`, and every string in an item's `registryDependencies`,
//! goes through [`RegistryReference::parse`]:
//!
//! | Input                         | Result                                   |
//! |-------------------------------|------------------------------------------|
//! | `https://…`, `http://…`       | [`RegistryReference::Url`]               |
//! | `@acme/ui/button`             | namespaced, name `ui/button` (verbatim)  |
//! | `@`, `@-/x`, `@acme`, `@acme/`| [`RegistryError::InvalidNamespace`]      |
//! | `./item.json`                 | [`RegistryReference::File`]              |
//! | `button`                      | name resolved against `@shadcn`          |
//!
//! Identity for de-duplication is [`ItemKey`]: a bare name and its explicit `@shadcn/`
//! spelling are the same item.

use crate::constants::BUILTIN_NAMESPACE;
use crate::core::RegistryError;
use std::fmt;
use std::path::PathBuf;

/// A parsed item reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryReference {
    /// A bare name, served by the built-in registry.
    Name {
        name: String,
    },
    /// `@namespace/name`.
    Namespaced {
        namespace: String,
        name: String,
    },
    /// A literal item URL.
    Url {
        url: String,
    },
    /// A local item JSON file.
    File {
        path: PathBuf,
    },
}

/// Canonical identity of an item inside one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    Namespaced {
        namespace: String,
        name: String,
    },
    Url(String),
    File(PathBuf),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Namespaced {
                namespace,
                name,
            } => write!(f, "{namespace}/{name}"),
            ItemKey::Url(url) => f.write_str(url),
            ItemKey::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Whether `namespace` matches `^@[A-Za-z0-9-]+$`.
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    namespace.strip_prefix('@').is_some_and(|rest| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Check a namespace against `^@[A-Za-z0-9-]+$`.
pub fn validate_namespace(namespace: &str) -> Result<(), RegistryError> {
    if is_valid_namespace(namespace) {
        Ok(())
    } else {
        Err(RegistryError::InvalidNamespace {
            namespace: namespace.to_string(),
        })
    }
}

/// Parse a `list`/`search` argument, which must be a bare `@namespace`.
pub fn parse_namespace(arg: &str) -> Result<String, RegistryError> {
    validate_namespace(arg)?;
    Ok(arg.to_string())
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

impl RegistryReference {
    /// Parse one reference.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidNamespace`] for anything starting with `@` that is not
    /// `@namespace/name` with a valid namespace and a non-empty name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use regpm_cli::registry::RegistryReference;
    ///
    /// let reference = RegistryReference::parse("@acme/forms/input").unwrap();
    /// assert_eq!(reference.namespace(), Some("@acme"));
    /// assert_eq!(reference.to_string(), "@acme/forms/input");
    ///
    /// assert!(RegistryReference::parse("@/button").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, RegistryError> {
        if is_url(input) {
            return Ok(RegistryReference::Url {
                url: input.to_string(),
            });
        }

        if input.starts_with('@') {
            let Some((namespace, name)) = input.split_once('/') else {
                return Err(RegistryError::InvalidNamespace {
                    namespace: input.to_string(),
                });
            };
            validate_namespace(namespace)?;
            if name.is_empty() {
                return Err(RegistryError::InvalidNamespace {
                    namespace: input.to_string(),
                });
            }
            return Ok(RegistryReference::Namespaced {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }

        if input.ends_with(".json") {
            return Ok(RegistryReference::File {
                path: PathBuf::from(input),
            });
        }

        Ok(RegistryReference::Name {
            name: input.to_string(),
        })
    }

    /// Namespace that serves this reference; `None` for URLs and files.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            RegistryReference::Name {
                ..
            } => Some(BUILTIN_NAMESPACE),
            RegistryReference::Namespaced {
                namespace, ..
            } => Some(namespace),
            RegistryReference::Url {
                ..
            }
            | RegistryReference::File {
                ..
            } => None,
        }
    }

    /// Item name within its namespace, when there is one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            RegistryReference::Name {
                name,
            }
            | RegistryReference::Namespaced {
                name, ..
            } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn key(&self) -> ItemKey {
        match self {
            RegistryReference::Name {
                name,
            } => ItemKey::Namespaced {
                namespace: BUILTIN_NAMESPACE.to_string(),
                name: name.clone(),
            },
            RegistryReference::Namespaced {
                namespace,
                name,
            } => ItemKey::Namespaced {
                namespace: namespace.clone(),
                name: name.clone(),
            },
            RegistryReference::Url {
                url,
            } => ItemKey::Url(url.clone()),
            RegistryReference::File {
                path,
            } => ItemKey::File(path.clone()),
        }
    }
}

impl fmt::Display for RegistryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryReference::Name {
                name,
            } => f.write_str(name),
            other => write!(f, "{}", other.key()),
        }
    }
}

impl std::str::FromStr for RegistryReference {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
