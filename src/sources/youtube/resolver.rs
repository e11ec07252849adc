use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    clients::{ClientCatalog, ClientProfile},
    extractor::{StreamKind, parse_player_response, select_candidate},
    request::{InnerTubeEndpoints, Locale, build_player_request_with_locale, innertube_headers},
    utils::extract_video_id,
};
use crate::common::{
    errors::{
        AttemptFailure, ConfigurationError, NetworkError, ParseError, PlayabilityError,
        ResolutionError,
    },
    http::{HttpFetch, HttpRequest},
    types::AnyResult,
};

/// The playable URL handed to the player, plus which method produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub url: String,
    /// `None` when a fallback produced the URL without telling us its shape.
    pub kind: Option<StreamKind>,
    pub resolved_by: String,
}

/// One attempt: a video id paired with the identity used to ask for it.
#[derive(Debug, Clone, Copy)]
pub struct StreamRequest<'a> {
    pub video_id: &'a str,
    pub profile: &'a ClientProfile,
}

/// Extraction method tried after every InnerTube profile has failed.
#[async_trait]
pub trait StreamFallback: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the method ran but found nothing playable.
    async fn extract(&self, video_id: &str) -> AnyResult<Option<String>>;
}

#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Playability(#[from] PlayabilityError),
    #[error("no playable stream in response")]
    NoPlayableStream,
}

/// Walks the client profiles in priority order, then the fallbacks, and
/// returns the first playable stream.
pub struct StreamResolver {
    http: Arc<dyn HttpFetch>,
    catalog: Arc<ClientCatalog>,
    endpoints: InnerTubeEndpoints,
    locale: Locale,
    fallbacks: Vec<Arc<dyn StreamFallback>>,
}

impl StreamResolver {
    pub fn new(http: Arc<dyn HttpFetch>, catalog: Arc<ClientCatalog>) -> Self {
        Self {
            http,
            catalog,
            endpoints: InnerTubeEndpoints::default(),
            locale: Locale::default(),
            fallbacks: Vec::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: InnerTubeEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Appends a fallback; fallbacks run in the order they were added.
    pub fn with_fallback(mut self, fallback: Arc<dyn StreamFallback>) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    pub fn catalog(&self) -> &ClientCatalog {
        &self.catalog
    }

    pub async fn resolve(&self, video_id_or_url: &str) -> Result<ResolvedStream, ResolutionError> {
        let video_id = extract_video_id(video_id_or_url);
        if video_id.is_empty() {
            return Err(ResolutionError::InvalidVideoId(video_id_or_url.to_string()));
        }

        let mut attempts = Vec::new();

        for profile in self.catalog.profiles_in_priority_order() {
            let request = StreamRequest {
                video_id: &video_id,
                profile,
            };
            tracing::debug!("Resolving {} with client {}", video_id, profile.name);

            match self.attempt(request).await {
                Ok(stream) => {
                    tracing::info!(
                        "Resolved {} via {} ({})",
                        video_id,
                        stream.resolved_by,
                        stream.kind.map(|k| k.to_string()).unwrap_or_default()
                    );
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::warn!("Client {} failed for {}: {}", profile.name, video_id, e);
                    attempts.push(AttemptFailure {
                        method: profile.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        for fallback in &self.fallbacks {
            let method = fallback.name().to_string();
            tracing::debug!("Resolving {} with fallback {}", video_id, method);

            let reason = match fallback.extract(&video_id).await {
                Ok(Some(url)) if !url.is_empty() => {
                    tracing::info!("Resolved {} via {}", video_id, method);
                    return Ok(ResolvedStream {
                        url,
                        kind: None,
                        resolved_by: method,
                    });
                }
                Ok(_) => "no stream found".to_string(),
                Err(e) => e.to_string(),
            };

            tracing::warn!("Fallback {} failed for {}: {}", method, video_id, reason);
            attempts.push(AttemptFailure { method, reason });
        }

        tracing::error!(
            "All {} extraction methods failed for {}",
            attempts.len(),
            video_id
        );
        Err(ResolutionError::Exhausted { video_id, attempts })
    }

    async fn attempt(&self, request: StreamRequest<'_>) -> Result<ResolvedStream, AttemptError> {
        let body =
            build_player_request_with_locale(request.video_id, request.profile, &self.locale)?;

        let http_request = HttpRequest::post_json(self.endpoints.player(), &body)
            .headers(innertube_headers(request.profile, self.endpoints.base_url()));

        let response = self.http.fetch(http_request).await?;
        if !response.is_success() {
            return Err(AttemptError::Status(response.status));
        }

        let json: Value = response.json().map_err(ParseError::from)?;
        let candidates = parse_player_response(&json)?;

        let chosen = select_candidate(&candidates).ok_or(AttemptError::NoPlayableStream)?;
        Ok(ResolvedStream {
            url: chosen.url.clone(),
            kind: Some(chosen.kind),
            resolved_by: request.profile.name.clone(),
        })
    }
}
