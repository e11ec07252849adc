use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, header::HeaderMap};
use serde::de::DeserializeOwned;

use super::errors::NetworkError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: &serde_json::Value) -> Self {
        Self {
            url: url.into(),
            method: Method::POST,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.to_string().into_bytes()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Single-shot HTTP transport used by every upstream call.
///
/// Implementations must not retry: one call is one network round-trip.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError>;
}

/// reqwest-backed fetcher with a fixed browser identity.
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn default_user_agent() -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    pub fn with_timeouts(connect: Duration, read: Duration) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .user_agent(Self::default_user_agent())
            .connect_timeout(connect)
            .read_timeout(read)
            .gzip(true)
            .build()?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let HttpRequest {
            url,
            method,
            headers,
            body,
        } = request;

        let mut req = self.inner.request(method, &url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        let res = req
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(&url, e))?;

        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res
            .bytes()
            .await
            .map_err(|e| NetworkError::from_reqwest(&url, e))?;

        tracing::trace!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
