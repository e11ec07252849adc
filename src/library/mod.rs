use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    common::errors::LibraryError,
    protocol::tracks::{PlaybackReference, TrackCandidate},
    search::TrackStore,
};

/// A track from the on-device library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTrack {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub uri: String,
    #[serde(default)]
    pub cover_art_uri: Option<String>,
}

impl LocalTrack {
    pub fn into_candidate(self) -> TrackCandidate {
        TrackCandidate {
            title: self.title,
            artist: self.artist,
            album: self.album,
            duration_ms: self.duration_ms,
            thumbnail_url: self.cover_art_uri,
            playback_reference: PlaybackReference::Url(self.uri),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.artist, &self.album]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Library held entirely in memory, optionally seeded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackStore {
    tracks: Vec<LocalTrack>,
}

impl InMemoryTrackStore {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self { tracks }
    }

    /// Reads a JSON array of tracks. A missing file is an empty library.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No library file at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let tracks: Vec<LocalTrack> = serde_json::from_str(&content)?;
        tracing::info!("Loaded {} local tracks from {}", tracks.len(), path.display());
        Ok(Self::new(tracks))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl TrackStore for InMemoryTrackStore {
    fn search(&self, query: &str) -> Vec<LocalTrack> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.tracks
            .iter()
            .filter(|t| t.matches(&needle))
            .cloned()
            .collect()
    }
}
