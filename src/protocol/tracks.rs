use serde::{Deserialize, Serialize};

/// Album label given to every online result.
pub const ONLINE_ALBUM: &str = "YouTube";

/// How a track is handed to playback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PlaybackReference {
    /// Needs to go through stream resolution first.
    VideoId(String),
    /// Directly playable (local file URI or an already resolved URL).
    Url(String),
}

impl PlaybackReference {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::VideoId(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::VideoId(id) => id,
            Self::Url(url) => url,
        }
    }
}

/// A search result ready for presentation. Recreated on every search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCandidate {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub thumbnail_url: Option<String>,
    pub playback_reference: PlaybackReference,
}

impl TrackCandidate {
    pub fn online(
        video_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_ms: u64,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: ONLINE_ALBUM.to_string(),
            duration_ms,
            thumbnail_url,
            playback_reference: PlaybackReference::VideoId(video_id.into()),
        }
    }

    pub fn watch_url(&self) -> Option<String> {
        match &self.playback_reference {
            PlaybackReference::VideoId(id) => Some(crate::sources::youtube::utils::watch_url(id)),
            PlaybackReference::Url(_) => None,
        }
    }
}
