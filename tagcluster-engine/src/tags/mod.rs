//! Tag providers
//!
//! A `TagProvider` resolves (artist, title) to the dominant community tags
//! for that track. Providers report failures as `TagFetchError`; deciding
//! whether a failure is fatal is left to the caller.
//!
//! # Providers
//! 1. **lastfm_client** - Last.fm `track.getTopTags`
//! 2. **StaticTagProvider** - fixed in-memory table (tests, offline runs)

pub mod lastfm_client;

pub use lastfm_client::{filter_dominant_tags, LastFmClient, LastFmTag, DOMINANT_TAG_RATIO};

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Tag lookup errors
#[derive(Debug, Error)]
pub enum TagFetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field in response: {0}")]
    MissingField(String),
}

/// Source of community tags for a track
#[async_trait]
pub trait TagProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Dominant tags for one track, in provider order
    async fn get_tags(&self, artist: &str, title: &str) -> Result<Vec<String>, TagFetchError>;
}

/// In-memory tag table keyed by case-folded (artist, title)
///
/// Unknown tracks resolve to an empty tag list, the same as a Last.fm track
/// with no tags.
#[derive(Debug, Clone, Default)]
pub struct StaticTagProvider {
    entries: HashMap<(String, String), Vec<String>>,
}

impl StaticTagProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register tags for a track (builder style)
    pub fn with_track<I, S>(mut self, artist: &str, title: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(artist, title, tags);
        self
    }

    pub fn insert<I, S>(&mut self, artist: &str, title: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            Self::key(artist, title),
            tags.into_iter().map(Into::into).collect(),
        );
    }

    fn key(artist: &str, title: &str) -> (String, String) {
        (artist.trim().to_lowercase(), title.trim().to_lowercase())
    }
}

#[async_trait]
impl TagProvider for StaticTagProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn get_tags(&self, artist: &str, title: &str) -> Result<Vec<String>, TagFetchError> {
        Ok(self
            .entries
            .get(&Self::key(artist, title))
            .cloned()
            .unwrap_or_default())
    }
}
