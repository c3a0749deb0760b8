//! regpm - a resolver and installer for shadcn-style component registries
//!
//! A registry serves JSON items (components, hooks, pages, themes, plain files) that may
//! depend on other items, possibly in other registries. regpm resolves those dependency
//! graphs and installs the result into a project: files land under the project's import
//! aliases, environment variables are merged without clobbering, CSS variables and rules
//! are merged into the stylesheet and npm packages are declared in `package.json`.
//!
//! # Architecture
//!
//! - [`registry`] - reference parsing ([`registry::RegistryReference`]) and the HTTP client
//! - [`config`] - `components.json` and the namespace → endpoint table
//! - [`resolver`] - dependency graph traversal with identity de-duplication
//! - [`installer`] - placement, import rewriting, env/CSS/package.json merging
//! - [`search`] - registry listing, fuzzy search and pagination
//! - [`project`] - project layout detection
//! - [`core`] - item model and error taxonomy
//! - [`cli`] - command implementations
//!
//! # Example
//!
//! ```bash
//! regpm init
//! regpm add button @acme/login-form
//! regpm search @acme --query dialg
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod project;
pub mod registry;
pub mod resolver;
pub mod search;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
