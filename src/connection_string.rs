//! Connection string parsing.
//!
//! A connection string looks like `ys://<token>@<host>[:port][/path]` or
//! `yss://<token>@<host>[:port][/path]`. The scheme `ys` selects plain HTTP;
//! any other scheme selects HTTPS. The user-info part, if present, is the
//! percent-encoded bearer token.

use std::str::FromStr;

use reqwest::Url;

use crate::error::Error;

/// Scheme that selects plain (unencrypted) HTTP.
pub const PLAIN_SCHEME: &str = "ys";
/// Scheme used when rendering a secure connection string.
pub const SECURE_SCHEME: &str = "yss";

/// Credentials and base URL extracted from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    secure: bool,
    base_url: String,
    token: Option<String>,
}

impl ConnectionString {
    /// Parses a connection string.
    ///
    /// Fails with [`Error::Config`] if the string is empty, is not a URL, or
    /// has no host.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Config("connection string is empty".to_string()));
        }

        let url = Url::parse(input)
            .map_err(|e| Error::Config(format!("invalid connection string: {}", e)))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Config("connection string has no host".to_string()))?;

        let secure = url.scheme() != PLAIN_SCHEME;
        let protocol = if secure { "https" } else { "http" };

        let mut base_url = format!("{}://{}", protocol, host);
        if let Some(port) = url.port() {
            base_url.push_str(&format!(":{}", port));
        }
        base_url.push_str(url.path());
        let base_url = base_url.trim_end_matches('/').to_string();

        let token = match raw_user_info(input) {
            Some(raw) if !raw.is_empty() => {
                let decoded = urlencoding::decode(raw)
                    .map_err(|e| Error::Config(format!("token is not valid UTF-8: {}", e)))?;
                Some(decoded.into_owned())
            }
            _ => None,
        };

        Ok(Self {
            secure,
            base_url,
            token,
        })
    }

    /// Whether traffic goes over HTTPS.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// HTTP(S) base URL of the document-admin API, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token, if the connection string carried one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Renders the connection string back into `ys://` / `yss://` form.
    ///
    /// Parsing the result yields a value equal to `self`.
    pub fn to_connection_string(&self) -> String {
        let scheme = if self.secure {
            SECURE_SCHEME
        } else {
            PLAIN_SCHEME
        };
        let rest = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);

        match &self.token {
            Some(token) => format!("{}://{}@{}", scheme, urlencoding::encode(token), rest),
            None => format!("{}://{}", scheme, rest),
        }
    }
}

/// Returns the user-info of `input` exactly as written.
///
/// The whole user-info is the token, so it is taken from the raw text rather
/// than from the parsed username and password: a `:` inside it is not a
/// separator, and a trailing `:` is kept.
fn raw_user_info(input: &str) -> Option<&str> {
    let (_, rest) = input.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    authority.rsplit_once('@').map(|(user_info, _)| user_info)
}

impl FromStr for ConnectionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
