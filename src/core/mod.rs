//! Core types for regpm
//!
//! This module holds the two things every other module depends on:
//!
//! - [`error`] - the classified [`RegistryError`] taxonomy, [`ErrorContext`] and
//!   [`user_friendly_error`] for CLI rendering
//! - [`item`] - the registry payload model ([`RegistryItem`], [`RegistryFile`], [`ItemType`])
//!   and the listing projections ([`IndexEntry`], [`SearchRecord`])
//!
//! Nothing here performs I/O.

pub mod error;
pub mod item;

pub use error::{ErrorContext, RegistryError, user_friendly_error};
pub use item::{
    CssVars, FontSpec, IndexEntry, ItemType, RegistryFile, RegistryIndex, RegistryItem, SearchRecord,
    TailwindFragment,
};
