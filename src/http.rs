//! The single request path used by every network call.
//!
//! Transport failures and non-2xx statuses are turned into [`Error`] values
//! here and nowhere else.

use std::time::Duration;

use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

/// Name of the cache-busting query parameter.
const CACHE_BUST_PARAM: &str = "z";
/// Length of the random cache-busting value.
const CACHE_BUST_LEN: usize = 8;
const CACHE_BUST_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Body of an outgoing request.
#[derive(Debug)]
pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Binary(Vec<u8>),
}

impl RequestBody {
    pub(crate) fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(Error::unknown)
    }
}

/// HTTP client bound to one base URL and an optional bearer token.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cache_bust: bool,
}

impl HttpClient {
    pub(crate) fn new(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            cache_bust: false,
        }
    }

    /// Appends a random `z` query parameter to every request.
    pub(crate) fn with_cache_busting(mut self) -> Self {
        self.cache_bust = true;
        self
    }

    /// Builds the underlying transport.
    pub(crate) fn build_transport(timeout: Option<Duration>) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
    }

    pub(crate) fn transport(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request and classifies the outcome.
    ///
    /// Returns the response only for 2xx statuses.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Response, Error> {
        let url = self.url(path);
        let mut builder = self.client.request(method.clone(), &url);

        if self.cache_bust {
            builder = builder.query(&[(CACHE_BUST_PARAM, cache_bust_value())]);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Binary(bytes) => builder
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(bytes),
        };

        tracing::debug!("{} {}", method, url);

        let response = builder.send().await.map_err(|e| {
            let err = classify_transport_error(&url, &e);
            tracing::warn!("{} {} failed: {}", method, url, err);
            err
        })?;

        if let Some(err) = classify_status(response.status(), self.token.is_some(), &url) {
            tracing::warn!("{} {} failed: {}", method, url, err);
            return Err(err);
        }

        Ok(response)
    }

    /// Sends a request and decodes a JSON response body.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, Error> {
        let response = self.request(method, path, body).await?;
        response.json::<T>().await.map_err(Error::unknown)
    }

    /// Sends a request and returns the raw response body.
    pub(crate) async fn request_bytes(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Vec<u8>, Error> {
        let response = self.request(method, path, body).await?;
        let bytes = response.bytes().await.map_err(Error::unknown)?;
        Ok(bytes.to_vec())
    }
}

/// Maps a failed send to an error kind.
fn classify_transport_error(url: &str, err: &reqwest::Error) -> Error {
    if err.is_connect() {
        Error::ServerRefused {
            url: url.to_string(),
        }
    } else {
        Error::unknown(err)
    }
}

/// Maps a response status to an error kind, or `None` on success.
fn classify_status(status: StatusCode, has_token: bool, url: &str) -> Option<Error> {
    if status.is_success() {
        return None;
    }

    let reason = status.canonical_reason().unwrap_or("").to_string();
    let err = match status {
        StatusCode::UNAUTHORIZED if has_token => Error::InvalidAuthProvided,
        StatusCode::UNAUTHORIZED => Error::NoAuthProvided,
        StatusCode::NOT_FOUND => Error::NotFound {
            status: status.as_u16(),
            reason,
            url: url.to_string(),
        },
        _ => Error::ServerError {
            status: status.as_u16(),
            reason,
            url: url.to_string(),
        },
    };
    Some(err)
}

/// Random lowercase alphanumeric string for the cache-busting parameter.
fn cache_bust_value() -> String {
    let mut rng = rand::rng();
    (0..CACHE_BUST_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CACHE_BUST_CHARSET.len());
            CACHE_BUST_CHARSET[idx] as char
        })
        .collect()
}
