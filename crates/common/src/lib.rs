//! ScrolliTelli Common Utilities
//!
//! Shared infrastructure for all ScrolliTelli crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading (editor and export defaults)

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
