//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/docsync/config.toml)
//! 3. Project config (.docsync/config.toml)
//! 4. Environment variables (DOCSYNC_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigFormat, ConfigLoader};
pub use types::*;
