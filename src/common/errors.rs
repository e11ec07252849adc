use thiserror::Error;

/// Transport-level failure of a single HTTP round-trip.
///
/// Never retried by the fetcher itself; callers decide whether to move on
/// to another client profile.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl NetworkError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connect { url, message }
        } else if err.is_builder() {
            Self::InvalidRequest { url, message }
        } else {
            Self::Transport { url, message }
        }
    }
}

/// Upstream explicitly refused to serve the video (region lock, age gate,
/// removed video and so on).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("video not playable ({status}): {reason}")]
pub struct PlayabilityError {
    pub status: String,
    pub reason: String,
}

/// Response body did not have a shape we could read at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("marker `{0}` not found in page")]
    MissingMarker(&'static str),
}

/// Static setup problem: unknown client profile, empty identifiers, bad
/// config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown InnerTube client profile: {0}")]
    UnknownProfile(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("configuration file error: {0}")]
    File(String),
}

/// One failed step of the resolution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Profile name or fallback name.
    pub method: String,
    pub reason: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.method, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("not a YouTube video identifier: {0:?}")]
    InvalidVideoId(String),

    #[error(
        "no extraction method succeeded for {video_id} after {} attempts; the video may be \
         geo-restricted, age-restricted, or require signature deciphering which is not supported",
        attempts.len()
    )]
    Exhausted {
        video_id: String,
        attempts: Vec<AttemptFailure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no results for \"{0}\"")]
    NoResults(String),

    #[error("search for \"{query}\" failed: {reason}")]
    Failed { query: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read library file: {0}")]
    Io(#[from] std::io::Error),

    #[error("library file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
