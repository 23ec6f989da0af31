//! Track input and working types

use serde::{Deserialize, Serialize};

/// Track as supplied by the caller
///
/// `genres` comes from upstream metadata and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Track {
    pub name: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

impl Track {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
            genres: None,
        }
    }

    pub fn with_genres(mut self, genres: Vec<String>) -> Self {
        self.genres = Some(genres);
        self
    }
}

/// Track with the tags resolved during a pipeline run
///
/// `tags` is always present (possibly empty after a failed lookup).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkingTrack {
    pub name: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    pub tags: Vec<String>,
}

impl WorkingTrack {
    pub fn from_track(track: &Track, tags: Vec<String>) -> Self {
        Self {
            name: track.name.clone(),
            artist: track.artist.clone(),
            genres: track.genres.clone(),
            tags,
        }
    }
}
