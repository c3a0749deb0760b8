//! Error handling for regpm
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`RegistryError`]) for everything the engine can classify
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for the CLI
//!
//! Library code returns [`RegistryError`] where the failure is one of the classified cases
//! (bad namespace, unknown registry, HTTP classification, schema validation, placement) and
//! `anyhow::Result` with `.with_context(...)` for file-system work. The CLI funnels every
//! failure through [`user_friendly_error`] before printing it.
//!
//! # Output Contract
//!
//! Errors are printed to **stdout** as plain text. Read-only commands print JSON on
//! success, so callers tell the two apart by attempting a JSON parse.
//!
//! # Examples
//!
//! ```rust,no_run
//! use regpm_cli::core::{RegistryError, user_friendly_error};
//!
//! let error = RegistryError::UnknownRegistry {
//!     namespace: "@acme".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Classified failures of the resolution and installation engine.
///
/// Every variant owns its data (strings and status codes only), so errors can be cloned
/// out of the fetch cache when several dependents wait on the same item.
///
/// # Error Categories
///
/// ## Addressing
/// - [`InvalidNamespace`] - namespace does not match `^@[A-Za-z0-9-]+$`
/// - [`UnknownRegistry`] - namespace is not configured (message carries a config snippet)
/// - [`MissingEnvVar`] - a `${VAR}` placeholder in a registry URL or header is unset
/// - [`InvalidUrl`] - a registry template or literal URL cannot be parsed
///
/// ## Fetching
/// - [`NotFound`] - registry answered 404
/// - [`Unauthorized`] - registry answered 401/403 or `{"error": "Unauthorized"}`
/// - [`RegistryHttpError`] - any other non-2xx answer
/// - [`ValidationError`] - 2xx body that does not match the item schema
/// - [`TransportError`] - connection refused, DNS failure, timeout
///
/// ## Project
/// - [`ConfigParseError`], [`ConfigMissing`], [`ConfigAlreadyExists`]
/// - [`MissingTarget`], [`InvalidTarget`], [`UnsupportedPageTarget`]
///
/// [`InvalidNamespace`]: RegistryError::InvalidNamespace
/// [`UnknownRegistry`]: RegistryError::UnknownRegistry
/// [`MissingEnvVar`]: RegistryError::MissingEnvVar
/// [`InvalidUrl`]: RegistryError::InvalidUrl
/// [`NotFound`]: RegistryError::NotFound
/// [`Unauthorized`]: RegistryError::Unauthorized
/// [`RegistryHttpError`]: RegistryError::RegistryHttpError
/// [`ValidationError`]: RegistryError::ValidationError
/// [`TransportError`]: RegistryError::TransportError
/// [`ConfigParseError`]: RegistryError::ConfigParseError
/// [`ConfigMissing`]: RegistryError::ConfigMissing
/// [`ConfigAlreadyExists`]: RegistryError::ConfigAlreadyExists
/// [`MissingTarget`]: RegistryError::MissingTarget
/// [`InvalidTarget`]: RegistryError::InvalidTarget
/// [`UnsupportedPageTarget`]: RegistryError::UnsupportedPageTarget
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Namespace does not match `^@[A-Za-z0-9-]+$`
    #[error(
        "Invalid registry namespace: \"{namespace}\". Registry name must start with @ followed by alphanumeric characters or hyphens."
    )]
    InvalidNamespace {
        /// The offending argument, verbatim
        namespace: String,
    },

    /// Namespace is not declared in the project configuration
    #[error(
        "Unknown registry \"{namespace}\". Make sure it is defined in components.json as follows:\n{{\n  \"registries\": {{\n    \"{namespace}\": \"[URL_TO_REGISTRY]\"\n  }}\n}}"
    )]
    UnknownRegistry {
        /// Namespace including the leading `@`
        namespace: String,
    },

    /// A `${VAR}` placeholder references an unset environment variable
    #[error("Registry \"{registry}\" requires environment variable \"{variable}\", which is not set")]
    MissingEnvVar {
        /// Variable name without `${}`
        variable: String,
        /// Namespace whose endpoint references the variable
        registry: String,
    },

    /// A registry URL template or a literal item URL is malformed
    #[error("Invalid registry URL \"{url}\": {reason}")]
    InvalidUrl {
        /// The offending URL or template
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Registry answered 404
    #[error("The item at {reference} was not found. It may not exist at the registry.")]
    NotFound {
        /// Canonical reference of the missing item
        reference: String,
        /// URL that was requested
        url: String,
    },

    /// Registry refused the request for lack of credentials
    #[error("Unauthorized: you are not authorized to access the item at {url}.{}", fmt_message(.message))]
    Unauthorized {
        /// URL that was requested
        url: String,
        /// Server-provided message, if any
        message: Option<String>,
    },

    /// Any other non-2xx response
    #[error("Request to {url} failed with status {status}.{}", fmt_message(.message))]
    RegistryHttpError {
        /// URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
        /// Server-provided message, if any
        message: Option<String>,
    },

    /// A 2xx body that does not match the item schema
    #[error("Failed to parse registry item: {reference}\n{reason}")]
    ValidationError {
        /// Canonical reference (or URL) of the payload
        reference: String,
        /// Deserializer message
        reason: String,
    },

    /// Connection refused, DNS failure, timeout
    #[error("Request to {url} failed, reason: {reason}")]
    TransportError {
        /// URL that was requested
        url: String,
        /// Transport-level cause
        reason: String,
    },

    /// `components.json` exists but cannot be parsed
    #[error("Invalid configuration file {file}: {reason}")]
    ConfigParseError {
        /// Path of the configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// The operation needs `components.json` and none exists
    #[error("No components.json found in {path}")]
    ConfigMissing {
        /// Project directory that was searched
        path: String,
    },

    /// `init` would overwrite an existing configuration
    #[error("A components.json file already exists at {path}")]
    ConfigAlreadyExists {
        /// Path of the existing file
        path: String,
    },

    /// A `registry:file`/`registry:item` file without a `target`
    #[error("File \"{path}\" of item \"{item}\" has type {file_type} but no target")]
    MissingTarget {
        /// Item that ships the file
        item: String,
        /// `file.path` as published
        path: String,
        /// Wire form of the file type
        file_type: String,
    },

    /// A destination that escapes the project root
    #[error("Target \"{target}\" of item \"{item}\" resolves outside the project")]
    InvalidTarget {
        /// Item that ships the file
        item: String,
        /// Offending target or path
        target: String,
    },

    /// A page file for a project without a file-system router
    #[error("Cannot place page \"{path}\" of item \"{item}\": the project has no app or pages router")]
    UnsupportedPageTarget {
        /// Item that ships the page
        item: String,
        /// `file.path` as published
        path: String,
    },

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(message) if !message.trim().is_empty() => format!(" {}", message.trim()),
        _ => String::new(),
    }
}

/// Error wrapper that carries user-facing suggestion and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: RegistryError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: RegistryError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, printed after the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add background on what the error means.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stdout.
    ///
    /// Colour is applied by `colored`, which `main` disables when stdout is not a terminal,
    /// so scripted callers always see plain text.
    pub fn display(&self) {
        println!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            println!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            println!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] for CLI display.
///
/// The chain is searched for a [`RegistryError`]; when one is found it gets a tailored
/// suggestion, and any outer `anyhow` context becomes the details line. Everything else is
/// rendered as its message followed by the cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(registry_error) = error.chain().find_map(|e| e.downcast_ref::<RegistryError>()) {
        let mut ctx = create_error_context(registry_error.clone());
        let outer = error.to_string();
        if outer != registry_error.to_string() && ctx.details.is_none() {
            ctx = ctx.with_details(outer);
        }
        return ctx;
    }

    let permission_denied = error
        .chain()
        .filter_map(|e| e.downcast_ref::<std::io::Error>())
        .any(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
    if permission_denied {
        return ErrorContext::new(RegistryError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check the ownership and permissions of the project directory");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(RegistryError::Other {
        message,
    })
}

fn create_error_context(error: RegistryError) -> ErrorContext {
    match &error {
        RegistryError::InvalidNamespace {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use the form @namespace/item, e.g. @acme/button"),

        RegistryError::MissingEnvVar {
            variable,
            ..
        } => {
            let suggestion = format!("Export {variable} before running the command, or add it to your shell profile");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        RegistryError::Unauthorized {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add the required headers for this registry in components.json, e.g. \"headers\": { \"Authorization\": \"Bearer ${REGISTRY_TOKEN}\" }"),

        RegistryError::TransportError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check your network connection and that the registry URL is reachable"),

        RegistryError::ConfigParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix the JSON syntax in components.json or remove it and run 'regpm init'"),

        RegistryError::ConfigMissing {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'regpm init' to create a components.json file")
            .with_details("Only items whose files all declare an explicit target can be installed without configuration"),

        RegistryError::ConfigAlreadyExists {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use --force to overwrite the existing configuration"),

        RegistryError::MissingTarget {
            ..
        } => ErrorContext::new(error)
            .with_details("Files of type registry:file and registry:item must declare where they are written"),

        _ => ErrorContext::new(error),
    }
}
