//! Config Command
//!
//! Manage docsync configuration.
//!
//! Usage:
//!   docsync config show [-f json|yaml]
//!   docsync config path
//!   docsync config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::{ConfigFormat, ConfigLoader};
use crate::types::{DocError, Result};

/// Show merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let format: ConfigFormat = format.parse().map_err(DocError::Config)?;
    ConfigLoader::show_config(format)
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let output = Output::new();
    let (scope, config_path) = if global {
        ("global", ConfigLoader::init_global(force)?)
    } else {
        ("project", ConfigLoader::init_project(force)?)
    };

    output.success(&format!("Initialized {} configuration", scope));
    output.key_value("Config", config_path.display());
    Ok(())
}
