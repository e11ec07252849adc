//! Secondary extraction path that reads the public watch and results pages
//! instead of calling InnerTube directly.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Value, json};

use super::{
    extractor::{
        best_audio, get_text, normalize_thumbnail_url, parse_duration_text,
        parse_player_response, select_candidate, video_renderers,
    },
    request::Locale,
    resolver::StreamFallback,
    utils::watch_url,
};
use crate::{
    common::{
        errors::{NetworkError, ParseError, PlayabilityError},
        http::{HttpFetch, HttpRequest},
        types::AnyResult,
    },
    configs::YouTubeConfig,
};

pub const FALLBACK_NAME: &str = "watch-page";

/// Results page filter: videos only.
const VIDEO_FILTER: &str = "EgIQAQ%253D%253D";

static PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ytInitialPlayerResponse["']?\]?\s*=\s*"#).expect("static regex")
});

static INITIAL_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ytInitialData["']?\]?\s*=\s*"#).expect("static regex"));

#[derive(Debug, thiserror::Error)]
pub enum WatchPageError {
    #[error("watch-page library not initialized")]
    NotInitialized,
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Playability(#[from] PlayabilityError),
}

#[derive(Debug, Clone)]
pub struct WatchPageSettings {
    pub base_url: String,
    pub locale: Locale,
}

impl Default for WatchPageSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            locale: Locale::default(),
        }
    }
}

impl WatchPageSettings {
    pub fn from_config(config: &YouTubeConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            locale: Locale {
                hl: config.hl.clone(),
                gl: config.gl.clone(),
            },
        }
    }
}

/// Handle to the watch-page extractor. Live between [`WatchPageLibrary::init`]
/// and [`WatchPageLibrary::shutdown`]; every call after shutdown fails with
/// [`WatchPageError::NotInitialized`].
pub struct WatchPageLibrary {
    http: RwLock<Option<Arc<dyn HttpFetch>>>,
    settings: WatchPageSettings,
}

impl WatchPageLibrary {
    pub fn init(http: Arc<dyn HttpFetch>, settings: WatchPageSettings) -> Self {
        tracing::debug!(
            "Watch-page library initialized ({}/{})",
            settings.locale.hl,
            settings.locale.gl
        );
        Self {
            http: RwLock::new(Some(http)),
            settings,
        }
    }

    pub fn shutdown(&self) {
        if self.http.write().take().is_some() {
            tracing::debug!("Watch-page library shut down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.http.read().is_some()
    }

    fn http(&self) -> Result<Arc<dyn HttpFetch>, WatchPageError> {
        self.http.read().clone().ok_or(WatchPageError::NotInitialized)
    }

    async fn fetch_page(&self, url: String) -> Result<String, WatchPageError> {
        let http = self.http()?;
        let request = HttpRequest::get(url).header(
            "Accept-Language",
            format!("{}-{},{};q=0.9", self.settings.locale.hl, self.settings.locale.gl, self.settings.locale.hl),
        );

        let response = http.fetch(request).await?;
        if !response.is_success() {
            return Err(WatchPageError::Status(response.status));
        }
        Ok(response.text())
    }

    /// Best audio URL from the watch page, or the general selection policy
    /// when the page lists no audio-only format.
    pub async fn extract_stream(&self, video_id: &str) -> Result<Option<String>, WatchPageError> {
        let url = format!(
            "{}/watch?v={}&hl={}&gl={}&has_verified=1&bpctr=9999999999",
            self.settings.base_url,
            urlencoding::encode(video_id),
            self.settings.locale.hl,
            self.settings.locale.gl
        );
        let page = self.fetch_page(url).await?;

        let player_response =
            embedded_json(&page, &PLAYER_RESPONSE_RE, "ytInitialPlayerResponse")?;
        let candidates = parse_player_response(&player_response)?;

        Ok(best_audio(&candidates)
            .or_else(|| select_candidate(&candidates))
            .map(|c| c.url.clone()))
    }

    /// Video results as `{"items": [...]}`, one structured item per video.
    pub async fn search_items(&self, query: &str) -> Result<Value, WatchPageError> {
        let url = format!(
            "{}/results?search_query={}&sp={}&hl={}&gl={}",
            self.settings.base_url,
            urlencoding::encode(query),
            VIDEO_FILTER,
            self.settings.locale.hl,
            self.settings.locale.gl
        );
        let page = self.fetch_page(url).await?;
        let initial_data = embedded_json(&page, &INITIAL_DATA_RE, "ytInitialData")?;

        Ok(search_items_from_initial_data(&initial_data))
    }
}

#[async_trait]
impl StreamFallback for WatchPageLibrary {
    fn name(&self) -> &str {
        FALLBACK_NAME
    }

    async fn extract(&self, video_id: &str) -> AnyResult<Option<String>> {
        Ok(self.extract_stream(video_id).await?)
    }
}

/// Reads the JSON object assigned right after `marker`. Only the first
/// value is deserialized, so whatever script follows it is never touched.
fn embedded_json(page: &str, marker: &Regex, name: &'static str) -> Result<Value, ParseError> {
    let start = marker
        .find_iter(page)
        .map(|m| m.end())
        .find(|end| page[*end..].starts_with('{'))
        .ok_or(ParseError::MissingMarker(name))?;

    serde_json::Deserializer::from_str(&page[start..])
        .into_iter::<Value>()
        .next()
        .ok_or(ParseError::MissingMarker(name))?
        .map_err(ParseError::from)
}

fn search_items_from_initial_data(initial_data: &Value) -> Value {
    let items: Vec<Value> = video_renderers(initial_data)
        .into_iter()
        .filter_map(|renderer| {
            let video_id = renderer
                .get("videoId")
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty())?;

            let name = renderer.get("title").and_then(get_text);
            let uploader = ["ownerText", "longBylineText", "shortBylineText"]
                .iter()
                .find_map(|key| renderer.get(*key).and_then(get_text));
            let duration_ms = renderer
                .get("lengthText")
                .and_then(get_text)
                .map(|text| parse_duration_text(&text))
                .unwrap_or(0);
            let duration_secs: i64 = if duration_ms > 0 {
                (duration_ms / 1000) as i64
            } else {
                -1
            };
            let thumbnails: Vec<Value> = renderer
                .get("thumbnail")
                .and_then(|t| t.get("thumbnails"))
                .and_then(|t| t.as_array())
                .into_iter()
                .flatten()
                .filter_map(|t| t.get("url").and_then(|u| u.as_str()))
                .map(|u| json!({ "url": normalize_thumbnail_url(u) }))
                .collect();

            Some(json!({
                "url": watch_url(video_id),
                "name": name,
                "uploaderName": uploader,
                "thumbnails": thumbnails,
                "duration": duration_secs,
            }))
        })
        .collect();

    json!({ "items": items })
}
