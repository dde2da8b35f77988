//! Configuration module
//!
//! Handles loading and saving of dwexport.toml configuration files.
//! Defines Config, Api, Details, Export and the failure policy.

mod types;

pub use types::{Api, Config, Details, Export, FailurePolicy, NamingScheme};

use crate::error::{ExportError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dwexport.toml";

/// Environment variable overriding `api.base_url`
pub const API_BASE_ENV_VAR: &str = "DATAWRAPPER_API_BASE";

/// Load configuration from a TOML file
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        ExportError::Config(format!(
            "Cannot read config from '{}': {}. Run 'dwexport config init' to create one.",
            path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Resolve the configuration for a command
///
/// An explicit path must exist. Without one, `dwexport.toml` is used when
/// present and built-in defaults otherwise. `DATAWRAPPER_API_BASE` overrides
/// the base URL in either case.
pub fn resolve(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load(&path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load(&default_path)?
            } else {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Config::default()
            }
        }
    };

    if let Ok(base_url) = std::env::var(API_BASE_ENV_VAR) {
        if !base_url.trim().is_empty() {
            debug!("Using API base URL from {}", API_BASE_ENV_VAR);
            config.api.base_url = base_url.trim().to_string();
        }
    }

    Ok(config)
}

/// Save configuration to a TOML file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(config)
        .map_err(|e| ExportError::Config(format!("Failed to serialize config: {}", e)))?;

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, toml)?;
    Ok(())
}

/// Reject values the API or the exporters cannot work with
pub fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(ExportError::Config("api.base_url is empty".to_string()));
    }
    if config.api.timeout_secs == 0 {
        return Err(ExportError::Config(
            "api.timeout_secs must be positive".to_string(),
        ));
    }
    if config.api.page_size == 0 {
        return Err(ExportError::Config(
            "api.page_size must be positive".to_string(),
        ));
    }
    if config.export.formats.is_empty() {
        return Err(ExportError::Config(
            "export.formats must list at least one format".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for options in &config.export.formats {
        options.validate().map_err(ExportError::Config)?;
        if !seen.insert(options.format) {
            return Err(ExportError::Config(format!(
                "export.formats lists '{}' more than once",
                options.format
            )));
        }
    }

    Ok(())
}
