//! Global constants used throughout the regpm codebase.
//!
//! Network timeouts, file names and the defaults of the built-in registry live here so
//! that tests and commands agree on them.

use std::time::Duration;

/// Total timeout for a single registry request (30 seconds).
///
/// Registry fetches are never retried, so this bounds how long one reference can block a
/// command.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for establishing a TCP connection to a registry (10 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Project configuration file name.
pub const CONFIG_FILE_NAME: &str = "components.json";

/// Namespace of the built-in registry, used for bare item names.
pub const BUILTIN_NAMESPACE: &str = "@shadcn";

/// Base URL of the built-in registry.
pub const DEFAULT_REGISTRY_BASE: &str = "https://ui.shadcn.com/r";

/// Environment variable overriding [`DEFAULT_REGISTRY_BASE`], read at request time.
pub const REGISTRY_URL_ENV: &str = "REGISTRY_URL";

/// Style substituted into `{style}` when the configuration names none.
pub const DEFAULT_STYLE: &str = "new-york";

/// Reserved item name that addresses a namespace's index document.
pub const REGISTRY_INDEX_ITEM: &str = "registry";

/// Env files that receive merged variables, in order of preference.
pub const ENV_FILE_PREFERENCE: [&str; 4] =
    [".env", ".env.local", ".env.development.local", ".env.development"];

/// Env file created when a project has none of [`ENV_FILE_PREFERENCE`].
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Extensions whose module specifiers are subject to alias rewriting.
pub const SCRIPT_EXTENSIONS: [&str; 6] = ["ts", "tsx", "js", "jsx", "mjs", "cjs"];
