//! Test utilities for regpm
//!
//! Helpers for unit and integration tests:
//! - [`TestRegistry`], an in-process HTTP registry
//! - [`ProjectFixture`], a scratch project directory, and item builders
//! - [`init_test_logging`]
//!
//! # Example
//!
//! ```rust,no_run
//! use regpm_cli::test_utils::{ProjectFixture, TestRegistry, fixtures};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let registry = TestRegistry::builder("one")
//!     .item(fixtures::component("baz", &["@one/bar"]))
//!     .item(fixtures::component("bar", &[]))
//!     .start()
//!     .await?;
//!
//! let project = ProjectFixture::next_app()?;
//! project.with_config(serde_json::json!({"@one": registry.url_template()}))?;
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod registry;

pub use fixtures::ProjectFixture;
pub use registry::{TestRegistry, TestRegistryBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with neither, nothing
/// is logged.
///
/// ```bash
/// RUST_LOG=regpm_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
