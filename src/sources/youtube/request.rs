//! InnerTube request bodies and the transport details that go with them.
//!
//! Body construction is a pure mapping from (request kind, profile) to JSON
//! and knows nothing about HTTP.

use serde_json::{Map, Value, json};

use super::clients::{ClientProfile, is_known_client};
use crate::{common::errors::ConfigurationError, configs::YouTubeConfig};

/// Locale sent inside `context.client`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub hl: String,
    pub gl: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            hl: "en".to_string(),
            gl: "US".to_string(),
        }
    }
}

fn client_context(profile: &ClientProfile, locale: &Locale) -> Result<Value, ConfigurationError> {
    if !is_known_client(&profile.name) {
        return Err(ConfigurationError::UnknownProfile(profile.name.clone()));
    }

    let mut client = Map::new();
    client.insert("clientName".into(), json!(profile.name));
    client.insert("clientVersion".into(), json!(profile.version));
    for (key, value) in &profile.platform_fields {
        client.insert(key.clone(), value.clone());
    }
    client.insert("hl".into(), json!(locale.hl));
    client.insert("gl".into(), json!(locale.gl));

    Ok(json!({
        "client": client,
        "user": { "lockedSafetyMode": false },
        "request": { "useSsl": true }
    }))
}

pub fn build_player_request(
    video_id: &str,
    profile: &ClientProfile,
) -> Result<Value, ConfigurationError> {
    build_player_request_with_locale(video_id, profile, &Locale::default())
}

pub fn build_player_request_with_locale(
    video_id: &str,
    profile: &ClientProfile,
    locale: &Locale,
) -> Result<Value, ConfigurationError> {
    if video_id.trim().is_empty() {
        return Err(ConfigurationError::Empty("video id"));
    }

    Ok(json!({
        "context": client_context(profile, locale)?,
        "videoId": video_id,
        "contentCheckOk": true,
        "racyCheckOk": true
    }))
}

pub fn build_search_request(
    query: &str,
    profile: &ClientProfile,
) -> Result<Value, ConfigurationError> {
    build_search_request_with_locale(query, profile, &Locale::default())
}

pub fn build_search_request_with_locale(
    query: &str,
    profile: &ClientProfile,
    locale: &Locale,
) -> Result<Value, ConfigurationError> {
    if query.trim().is_empty() {
        return Err(ConfigurationError::Empty("search query"));
    }

    Ok(json!({
        "context": client_context(profile, locale)?,
        "query": query
    }))
}

/// Endpoint URLs, keyed with the public API key.
#[derive(Debug, Clone)]
pub struct InnerTubeEndpoints {
    base_url: String,
    api_key: String,
}

impl Default for InnerTubeEndpoints {
    fn default() -> Self {
        Self::new("https://www.youtube.com", crate::configs::DEFAULT_API_KEY)
    }
}

impl InnerTubeEndpoints {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &YouTubeConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn player(&self) -> String {
        format!(
            "{}/youtubei/v1/player?key={}&prettyPrint=false",
            self.base_url, self.api_key
        )
    }

    pub fn search(&self) -> String {
        format!(
            "{}/youtubei/v1/search?key={}&prettyPrint=false",
            self.base_url, self.api_key
        )
    }
}

/// Headers that accompany an InnerTube call made as `profile`.
pub fn innertube_headers(profile: &ClientProfile, origin: &str) -> Vec<(String, String)> {
    let mut headers = vec![
        ("X-YouTube-Client-Name".to_string(), profile.client_id.to_string()),
        ("X-YouTube-Client-Version".to_string(), profile.version.clone()),
        ("X-Goog-Api-Format-Version".to_string(), "2".to_string()),
        ("Origin".to_string(), origin.to_string()),
        ("Referer".to_string(), format!("{}/", origin)),
    ];
    if let Some(ua) = &profile.user_agent {
        headers.push(("User-Agent".to_string(), ua.clone()));
    }
    headers
}
