use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::Expiration;
use crate::layers::TileSource;
use crate::utils::NavtileError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tile cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Map layer configuration
    #[serde(default)]
    pub map: MapConfig,
}

/// Tile cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root directory; the OS cache directory when unset
    pub directory: Option<PathBuf>,
    /// Expiration hosts should stamp on freshly fetched tiles, in hours
    pub default_ttl_hours: u64,
    /// Delay before the startup maintenance sweep, in seconds
    pub cleanup_delay_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            default_ttl_hours: 24,
            cleanup_delay_secs: 2,
        }
    }
}

impl CacheConfig {
    /// The effective cache root: the configured directory when set,
    /// otherwise the per-user OS cache directory.
    pub fn resolve_directory(&self) -> Result<PathBuf, NavtileError> {
        if let Some(directory) = &self.directory {
            if directory.as_os_str().is_empty() {
                return Err(NavtileError::InvalidArgument(
                    "cache.directory must not be empty".into(),
                ));
            }
            return Ok(directory.clone());
        }

        match ProjectDirs::from("", "", "navtile") {
            Some(dirs) => Ok(dirs.cache_dir().join("tiles")),
            None => Err(NavtileError::ConfigError(
                "could not determine a cache directory; set cache.directory".into(),
            )),
        }
    }

    /// Expiration a host should stamp on a tile fetched right now.
    pub fn default_expiration(&self) -> Expiration {
        Expiration::after(chrono::Duration::hours(self.default_ttl_hours as i64))
    }
}

/// Map layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Name of the layer to select
    pub layer: String,
    /// User agent the host's tile fetcher should send
    pub user_agent: String,
    /// API key unlocking key-gated layers
    pub api_key: Option<String>,
    /// Additional tile sources beyond the builtins
    #[serde(default)]
    pub layers: Vec<TileSource>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            layer: crate::layers::DEFAULT_LAYER.to_string(),
            user_agent: format!("navtile/{}", env!("CARGO_PKG_VERSION")),
            api_key: None,
            layers: Vec::new(),
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    // Get config directories
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = PathBuf::from(".navtile/config.toml");

    // Build figment configuration
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    // Add global config if it exists
    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    // Add local config if it exists
    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    // Add environment variables (NAVTILE_ prefix, __ nests sections,
    // e.g. NAVTILE_CACHE__DEFAULT_TTL_HOURS)
    figment = figment.merge(Env::prefixed("NAVTILE_").split("__"));

    // Extract and return config
    figment.extract().context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "navtile") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("navtile");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        let default_config = Config::default();
        save_config(&default_config, Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    // Create example local config
    let local_example = PathBuf::from(".navtile/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# Navtile Project Configuration
# This file overrides global settings for this directory

[cache]
# directory = "/path/to/tile/cache"
default_ttl_hours = 24
cleanup_delay_secs = 2

[map]
layer = "OpenStreetMap"
# api_key = "..."   # unlocks key-gated layers

# [[map.layers]]
# name = "Custom Topo"
# url_template = "https://tiles.example.com/{z}/{x}/{y}.png"
# max_zoom = 17
# attribution = "example.com"
"#;
        std::fs::write(&local_example, example_config)?;
        println!(
            "Created example configuration at: {}",
            local_example.display()
        );
    }

    Ok(())
}
