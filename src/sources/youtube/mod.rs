use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

pub mod clients;
pub mod extractor;
pub mod request;
pub mod resolver;
pub mod utils;
pub mod watch_page;
pub mod ytdlp;

use clients::{ClientCatalog, ClientProfile};
use extractor::parse_search_response;
use request::{InnerTubeEndpoints, Locale, build_search_request_with_locale, innertube_headers};
use resolver::{ResolvedStream, StreamResolver};
use watch_page::{WatchPageLibrary, WatchPageSettings};
use ytdlp::YtDlpExtractor;

use crate::{
    common::{
        errors::{ResolutionError, SearchError},
        http::{HttpClient, HttpFetch, HttpRequest},
    },
    configs::YouTubeConfig,
    protocol::tracks::TrackCandidate,
    search::RemoteSearch,
};

/// Everything YouTube: stream resolution and remote search, wired from
/// configuration around one shared HTTP client.
pub struct YouTubeSource {
    http: Arc<dyn HttpFetch>,
    endpoints: InnerTubeEndpoints,
    locale: Locale,
    search_profile: ClientProfile,
    watch_page: Option<Arc<WatchPageLibrary>>,
    ytdlp: Option<Arc<YtDlpExtractor>>,
    resolver: StreamResolver,
}

impl YouTubeSource {
    pub fn from_config(config: &YouTubeConfig) -> Result<Self, reqwest::Error> {
        let http = HttpClient::with_timeouts(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.read_timeout_secs),
        )?;
        Ok(Self::with_http(config, Arc::new(http)))
    }

    pub fn with_http(config: &YouTubeConfig, http: Arc<dyn HttpFetch>) -> Self {
        let catalog = Arc::new(ClientCatalog::from_names(&config.clients.playback));
        let endpoints = InnerTubeEndpoints::from_config(config);
        let locale = Locale {
            hl: config.hl.clone(),
            gl: config.gl.clone(),
        };

        let search_profile = clients::builtin(&config.clients.search).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown YouTube search client {}, using WEB",
                config.clients.search
            );
            clients::web::web()
        });

        let mut resolver = StreamResolver::new(http.clone(), catalog)
            .with_endpoints(endpoints.clone())
            .with_locale(locale.clone());

        let watch_page = config.watch_page.enabled.then(|| {
            Arc::new(WatchPageLibrary::init(
                http.clone(),
                WatchPageSettings::from_config(config),
            ))
        });
        if let Some(library) = &watch_page {
            resolver = resolver.with_fallback(library.clone());
        }
        let ytdlp = config
            .ytdlp
            .enabled
            .then(|| Arc::new(YtDlpExtractor::from_config(&config.ytdlp)));
        if let Some(extractor) = &ytdlp {
            tracing::debug!("yt-dlp fallback at {}", extractor.binary().display());
            resolver = resolver.with_fallback(extractor.clone());
        }

        tracing::info!(
            "YouTube source ready with {} playback clients",
            resolver.catalog().len()
        );

        Self {
            http,
            endpoints,
            locale,
            search_profile,
            watch_page,
            ytdlp,
            resolver,
        }
    }

    /// Runs `yt-dlp --version` once and logs the outcome. `None` when the
    /// fallback is disabled.
    pub async fn check_ytdlp(&self) -> Option<bool> {
        let extractor = self.ytdlp.as_ref()?;
        let available = extractor.is_available().await;
        if available {
            tracing::info!("yt-dlp fallback available at {}", extractor.binary().display());
        } else {
            tracing::warn!(
                "yt-dlp fallback enabled but {} is not runnable",
                extractor.binary().display()
            );
        }
        Some(available)
    }

    pub async fn resolve(&self, video_id_or_url: &str) -> Result<ResolvedStream, ResolutionError> {
        self.resolver.resolve(video_id_or_url).await
    }

    /// Direct InnerTube search with the configured search profile.
    pub async fn search_innertube(&self, query: &str) -> Result<Vec<TrackCandidate>, SearchError> {
        let failed = |reason: String| SearchError::Failed {
            query: query.to_string(),
            reason,
        };

        let body = build_search_request_with_locale(query, &self.search_profile, &self.locale)
            .map_err(|e| failed(e.to_string()))?;
        let request = HttpRequest::post_json(self.endpoints.search(), &body)
            .headers(innertube_headers(&self.search_profile, self.endpoints.base_url()));

        let response = self
            .http
            .fetch(request)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.is_success() {
            return Err(failed(format!("HTTP {}", response.status)));
        }

        let json: Value = response.json().map_err(|e| failed(e.to_string()))?;
        Ok(parse_search_response(&json))
    }

    /// Stops the watch-page library. Resolution keeps working through the
    /// remaining methods.
    pub fn shutdown(&self) {
        if let Some(library) = &self.watch_page {
            library.shutdown();
        }
    }
}

#[async_trait]
impl RemoteSearch for YouTubeSource {
    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SearchError> {
        let mut attempted = 0;
        let mut errors = Vec::new();

        if let Some(library) = self.watch_page.as_ref().filter(|l| l.is_initialized()) {
            attempted += 1;
            match library.search_items(query).await {
                Ok(items) => {
                    let tracks = parse_search_response(&items);
                    if !tracks.is_empty() {
                        return Ok(tracks);
                    }
                    tracing::debug!("Watch-page search returned nothing for \"{}\"", query);
                }
                Err(e) => {
                    tracing::warn!("Watch-page search failed for \"{}\": {}", query, e);
                    errors.push(format!("{}: {}", watch_page::FALLBACK_NAME, e));
                }
            }
        }

        attempted += 1;
        match self.search_innertube(query).await {
            Ok(tracks) if !tracks.is_empty() => return Ok(tracks),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("InnerTube search failed for \"{}\": {}", query, e);
                errors.push(format!("{}: {}", self.search_profile.name, e));
            }
        }

        if errors.len() == attempted {
            return Err(SearchError::Failed {
                query: query.to_string(),
                reason: errors.join("; "),
            });
        }
        Ok(Vec::new())
    }
}
