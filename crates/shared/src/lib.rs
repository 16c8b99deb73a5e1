//! # Injury Hub Shared
//!
//! Common types and interfaces used across all Injury Hub crates.

pub mod config;
pub mod error;
pub mod record;
pub mod tool;

// Re-exports
pub use config::*;
pub use error::*;
pub use record::*;
pub use tool::*;
