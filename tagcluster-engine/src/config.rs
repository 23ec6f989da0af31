//! Configuration resolution for tagcluster-engine
//!
//! Resolves the Last.fm API key with ENV → TOML priority. The key is handed
//! to the tag provider constructor; clustering code never reads it.

use tagcluster_common::config::TomlConfig;
use tagcluster_common::{Error, Result};
use tracing::{info, warn};

/// Environment variable holding the Last.fm API key
pub const LASTFM_API_KEY_ENV: &str = "TAGCLUSTER_LASTFM_API_KEY";

/// Resolve Last.fm API key from 2-tier configuration
///
/// **Priority:** ENV → TOML
pub fn resolve_lastfm_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(LASTFM_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .lastfm_api_key
        .as_ref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Last.fm API key found in environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Last.fm API key loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("Last.fm API key loaded from TOML config");
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "Last.fm API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: ~/.config/tagcluster/config.toml (lastfm_api_key = \"your-key\")\n\
         \n\
         Obtain API key at: https://www.last.fm/api/account/create",
        LASTFM_API_KEY_ENV
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
