//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docsync/config.toml)
//! 3. Project config (.docsync/config.toml)
//! 4. Environment variables (DOCSYNC_* prefix)
//!
//! The first `_` after the prefix separates section from key, so
//! `DOCSYNC_LLM_TIMEOUT_SECS` sets `llm.timeout_secs`.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::{debug, info};

use super::types::Config;
use crate::types::{DocError, Result};

const ENV_PREFIX: &str = "DOCSYNC_";
const APP_DIR: &str = "docsync";
const PROJECT_DIR: &str = ".docsync";
const CONFIG_FILE: &str = "config.toml";

/// Output format of `show_config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl FromStr for ConfigFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "toml" => Ok(ConfigFormat::Text),
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(format!(
                "Unknown config format: {}. Valid values: text, json, yaml",
                s
            )),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Text => write!(f, "text"),
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment.merge(Self::env_provider());

        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// `DOCSYNC_SECTION_KEY_NAME` → `section.key_name`
    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX)
            .lowercase(true)
            .map(|key| key.as_str().replacen('_', ".", 1).into())
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docsync/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join(APP_DIR))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join(CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(format: ConfigFormat) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, format)?);
        Ok(())
    }

    /// Serialize `config` in the requested format. Secrets are never included.
    pub fn render(config: &Config, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(config)?),
            ConfigFormat::Text => {
                toml::to_string_pretty(config).map_err(|e| DocError::Config(e.to_string()))
            }
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DocError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_config(&global_dir, Self::default_global_config(), force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_config(&Self::project_dir(), Self::default_project_config(), force)
    }

    /// Check if project is initialized
    pub fn is_project_initialized() -> bool {
        Self::project_config_path().exists()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn write_config(dir: &Path, content: &str, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() || force {
            fs::write(&config_path, content)?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Default global config content (TOML)
    fn default_global_config() -> &'static str {
        r#"# docsync Global Configuration
# User-wide defaults. Project settings in .docsync/config.toml override these.

version = "1.0"

# LLM settings
[llm]
provider = "claude-code"
timeout_secs = 300
temperature = 0.0
max_retries = 3
"#
    }

    /// Default project config content (TOML)
    fn default_project_config() -> &'static str {
        r#"# docsync Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

# Where source files come from: "local" or "github"
[source]
kind = "local"
root = "."
# repository = "owner/repo"
# branch = "main"

[documentation]
default_language = "en"
max_file_chars = 12000
concurrency = 4

[parser]
raw_fallback_limit = 1000
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use figment::Jail;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[llm]
provider = "ollama"
model = "llama3"

[source]
kind = "github"
repository = "octo/hello"

[documentation]
extensions = ["rs"]
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3"));
        assert_eq!(config.source.kind, SourceKind::Github);
        assert_eq!(config.source.branch, "main");
        assert_eq!(config.documentation.extensions, vec!["rs"]);
        assert_eq!(config.documentation.concurrency, 4);
    }

    #[test]
    fn test_load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntemperature = 3.0\n").unwrap();

        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(DocError::Config(_))
        ));
    }

    #[test]
    fn test_defaults_templates_parse() {
        let dir = tempfile::tempdir().unwrap();
        for content in [
            ConfigLoader::default_global_config(),
            ConfigLoader::default_project_config(),
        ] {
            let path = dir.path().join("config.toml");
            fs::write(&path, content).unwrap();
            assert!(ConfigLoader::load_from_file(&path).is_ok());
        }
    }

    #[test]
    fn test_env_and_project_layers() {
        Jail::expect_with(|jail| {
            jail.set_env("HOME", jail.directory().display().to_string());
            jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display().to_string());
            jail.create_dir(PROJECT_DIR)?;
            jail.create_file(
                ".docsync/config.toml",
                "[llm]\nmodel = \"from-project\"\ntimeout_secs = 60\n",
            )?;
            jail.set_env("DOCSYNC_LLM_TIMEOUT_SECS", "90");
            jail.set_env("DOCSYNC_DOCUMENTATION_DEFAULT_LANGUAGE", "fr");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.llm.model.as_deref(), Some("from-project"));
            assert_eq!(config.llm.timeout_secs, 90);
            assert_eq!(config.documentation.default_language, "fr");
            Ok(())
        });
    }

    #[test]
    fn test_init_project_does_not_overwrite() {
        Jail::expect_with(|jail| {
            let path = ConfigLoader::init_project(false).map_err(|e| e.to_string())?;
            assert!(ConfigLoader::is_project_initialized());

            jail.create_file(".docsync/config.toml", "version = \"custom\"\n")?;
            ConfigLoader::init_project(false).map_err(|e| e.to_string())?;
            assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

            ConfigLoader::init_project(true).map_err(|e| e.to_string())?;
            assert!(fs::read_to_string(&path).unwrap().contains("[documentation]"));
            Ok(())
        });
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let json = ConfigLoader::render(&config, ConfigFormat::Json).unwrap();
        assert!(json.contains("\"provider\": \"claude-code\""));
        let yaml = ConfigLoader::render(&config, ConfigFormat::Yaml).unwrap();
        assert!(yaml.contains("provider: claude-code"));
        let text = ConfigLoader::render(&config, ConfigFormat::Text).unwrap();
        assert!(text.contains("[llm]"));
        assert_eq!("yml".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
    }
}
