//! Shared helpers
//!
//! - [`fs`] - atomic writes and lexical path checks
//! - [`lock`] - exclusive `fs4` locks for in-place file merges
//! - [`progress`] - spinners on stderr

pub mod fs;
pub mod lock;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, is_within, normalize_path, safe_write};
pub use lock::LockedFile;
pub use progress::{ProgressBar, spinner_with_message};
