//! Configuration loading and config-file discovery
//!
//! Bootstrap configuration is read from a single TOML file. A missing file is
//! never fatal: the service logs a warning and continues with compiled
//! defaults. Priority for the config file location:
//! 1. Explicit path (command-line argument)
//! 2. `~/.config/tagcluster/config.toml` (platform config dir)
//! 3. `/etc/tagcluster/config.toml` (Linux only)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for tagcluster-engine
pub const DEFAULT_PORT: u16 = 5731;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// Last.fm API key (environment variable takes priority)
    #[serde(default)]
    pub lastfm_api_key: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP server bind configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Clustering engine defaults
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Clustering defaults
///
/// Request-level options may override `merge_threshold` and `max_clusters`;
/// the k-means parameters are fixed per deployment so results stay
/// reproducible.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClusteringConfig {
    /// Minimum Jaccard similarity for merging same-genre clusters
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,

    /// Upper bound on the number of clusters requested
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,

    /// Number of k-means restarts (best inertia kept)
    #[serde(default = "default_restarts")]
    pub restarts: usize,

    /// Maximum Lloyd iterations per restart
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Seed for centroid initialization
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            merge_threshold: default_merge_threshold(),
            max_clusters: default_max_clusters(),
            restarts: default_restarts(),
            max_iterations: default_max_iterations(),
            seed: default_seed(),
        }
    }
}

impl ClusteringConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.merge_threshold) {
            return Err(Error::Config(format!(
                "clustering.merge_threshold must be within [0, 1], got {}",
                self.merge_threshold
            )));
        }
        if self.max_clusters < 2 {
            return Err(Error::Config(format!(
                "clustering.max_clusters must be at least 2, got {}",
                self.max_clusters
            )));
        }
        if self.restarts == 0 {
            return Err(Error::Config("clustering.restarts must be at least 1".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config(
                "clustering.max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_merge_threshold() -> f64 {
    0.3
}

fn default_max_clusters() -> usize {
    8
}

fn default_restarts() -> usize {
    10
}

fn default_max_iterations() -> usize {
    300
}

fn default_seed() -> u64 {
    42
}

/// Locate the default configuration file for the platform
///
/// Returns `None` when no candidate exists on disk.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tagcluster").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tagcluster/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse TOML configuration from a string
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig = toml::from_str(content)?;
    config.clustering.validate()?;
    Ok(config)
}

/// Load TOML configuration from a file
///
/// Fails if the file is unreadable or malformed.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_toml_config(&content)
}

/// Load configuration with graceful degradation
///
/// An explicit path that is missing or invalid is an error. Without an
/// explicit path the platform default is tried, and a missing file yields
/// the compiled defaults with a warning.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("Loading configuration from {}", path.display());
        return load_toml_config(path);
    }

    match default_config_path() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        None => {
            warn!("No configuration file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = parse_toml_config("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.clustering.restarts, 10);
        assert_eq!(config.clustering.seed, 42);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = parse_toml_config(
            r#"
            [clustering]
            merge_threshold = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.clustering.merge_threshold, 0.5);
        assert_eq!(config.clustering.max_clusters, 8);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let result = parse_toml_config(
            r#"
            [clustering]
            merge_threshold = 1.5
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = parse_toml_config("lastfm_api_key = ");
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }
}
