//! Last.fm tag client
//!
//! Queries `track.getTopTags` and keeps only the dominant tags of the
//! response.
//!
//! # API Reference
//! - Endpoint: https://ws.audioscrobbler.com/2.0/
//! - Documentation: https://www.last.fm/api/show/track.getTopTags

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{TagFetchError, TagProvider};
use crate::error::{MatchError, MatchResult};

/// Last.fm API endpoint
const LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Default timeout for Last.fm API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("tagcluster-engine/", env!("CARGO_PKG_VERSION"));

/// A tag is dominant when its count exceeds this fraction of the top count
pub const DOMINANT_TAG_RATIO: f64 = 0.3;

/// A single tag from a `track.getTopTags` response
#[derive(Debug, Clone, PartialEq)]
pub struct LastFmTag {
    pub name: String,
    pub count: f64,
}

// Last.fm sends a lone tag as an object instead of a one-element array, and
// counts as either numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagCount {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
    #[serde(default)]
    count: Option<TagCount>,
}

#[derive(Debug, Deserialize)]
struct TopTags {
    #[serde(default)]
    tag: Option<OneOrMany<RawTag>>,
}

#[derive(Debug, Deserialize)]
struct TopTagsResponse {
    toptags: Option<TopTags>,
    error: Option<i64>,
    message: Option<String>,
}

/// Parse a `track.getTopTags` JSON body
///
/// Tags with an unparseable count are kept with a count of zero so they can
/// never pass the dominance filter.
pub fn parse_top_tags(body: &str) -> Result<Vec<LastFmTag>, TagFetchError> {
    let response: TopTagsResponse =
        serde_json::from_str(body).map_err(|e| TagFetchError::Parse(e.to_string()))?;

    if let Some(code) = response.error {
        return Err(TagFetchError::Api(
            0,
            format!(
                "Last.fm error {}: {}",
                code,
                response.message.unwrap_or_default()
            ),
        ));
    }

    let toptags = response
        .toptags
        .ok_or_else(|| TagFetchError::MissingField("toptags".to_string()))?;

    let raw = match toptags.tag {
        Some(OneOrMany::Many(tags)) => tags,
        Some(OneOrMany::One(tag)) => vec![tag],
        None => Vec::new(),
    };

    Ok(raw
        .into_iter()
        .map(|tag| {
            let count = match tag.count {
                Some(TagCount::Number(n)) => n,
                Some(TagCount::Text(s)) => s.trim().parse().unwrap_or(0.0),
                None => 0.0,
            };
            LastFmTag {
                name: tag.name,
                count,
            }
        })
        .collect())
}

/// Keep tags whose count is strictly greater than `ratio` times the top count
///
/// Response order is preserved.
pub fn filter_dominant_tags(tags: &[LastFmTag], ratio: f64) -> Vec<String> {
    let max_count = tags.iter().map(|t| t.count).fold(0.0_f64, f64::max);
    if max_count <= 0.0 {
        return Vec::new();
    }

    let cutoff = max_count * ratio;
    tags.iter()
        .filter(|t| t.count > cutoff)
        .map(|t| t.name.clone())
        .collect()
}

/// Last.fm API client
///
/// # Example
/// ```rust,ignore
/// use tagcluster_engine::tags::{LastFmClient, TagProvider};
///
/// let client = LastFmClient::new("your_api_key".to_string())?;
/// let tags = client.get_tags("Led Zeppelin", "Kashmir").await?;
/// ```
pub struct LastFmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl LastFmClient {
    /// Create client with the default request timeout
    pub fn new(api_key: String) -> MatchResult<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create client with a custom request timeout
    ///
    /// A blank key is rejected here so a misconfigured service fails before
    /// any track is processed.
    pub fn with_timeout(api_key: String, timeout: Duration) -> MatchResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MatchError::MissingConfiguration(
                "Last.fm API key is empty".to_string(),
            ));
        }

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MatchError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: LASTFM_API_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (proxies, mirrors)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the unfiltered top tags for a track
    pub async fn get_top_tags(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Vec<LastFmTag>, TagFetchError> {
        debug!(artist = %artist, title = %title, "Querying Last.fm track.getTopTags");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("method", "track.getTopTags"),
                ("api_key", self.api_key.as_str()),
                ("artist", artist),
                ("track", title),
                ("format", "json"),
                ("autocorrect", "1"),
            ])
            .send()
            .await
            .map_err(|e| TagFetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TagFetchError::Network(e.to_string()))?;

        if !status.is_success() {
            // Last.fm error bodies carry a more useful message than the status
            return match parse_top_tags(&body) {
                Err(TagFetchError::Api(_, message)) => {
                    Err(TagFetchError::Api(status.as_u16(), message))
                }
                _ => Err(TagFetchError::Api(status.as_u16(), body)),
            };
        }

        let tags = parse_top_tags(&body)?;
        debug!(
            artist = %artist,
            title = %title,
            tag_count = tags.len(),
            "Retrieved tags from Last.fm"
        );
        Ok(tags)
    }
}

#[async_trait]
impl TagProvider for LastFmClient {
    fn name(&self) -> &'static str {
        "lastfm"
    }

    async fn get_tags(&self, artist: &str, title: &str) -> Result<Vec<String>, TagFetchError> {
        let tags = self.get_top_tags(artist, title).await?;
        Ok(filter_dominant_tags(&tags, DOMINANT_TAG_RATIO))
    }
}
