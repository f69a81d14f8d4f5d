//! Wire types exchanged with the document-admin service.
//!
//! All JSON bodies use camelCase field names.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Response to `GET check_store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStoreResult {
    pub ok: bool,
    /// Present when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request body for `POST doc/new`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocCreationRequest {
    #[serde(rename = "docId", skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

/// Response to `POST doc/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocCreationResult {
    #[serde(rename = "docId")]
    pub doc_id: String,
}

/// Access level granted by a client token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "read-only")]
    ReadOnly,
}

/// Request body for `POST doc/{docId}/auth`.
///
/// The default value serializes to `{}`, which lets the server pick full
/// access and its default expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDocRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "validForSeconds", skip_serializing_if = "Option::is_none")]
    pub valid_for_seconds: Option<u64>,
}

/// Document-scoped access descriptor minted by the admin service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientToken {
    /// WebSocket endpoint; live clients append the doc id to it.
    pub url: String,

    /// Base URL of the document's data endpoints (`as-update`, `update`).
    #[serde(rename = "baseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(rename = "docId")]
    pub doc_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
}

impl ClientToken {
    /// Base URL for document traffic, falling back to `url` for servers that
    /// do not send `baseUrl`.
    pub fn data_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(&self.url)
            .trim_end_matches('/')
    }

    /// Bearer token, treating an empty string as absent.
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// WebSocket URL for this document, with the token as a query parameter.
    pub fn websocket_url(&self) -> String {
        let url = self.url.trim_end_matches('/');
        match self.bearer() {
            Some(token) => format!(
                "{}/{}?token={}",
                url,
                self.doc_id,
                urlencoding::encode(token)
            ),
            None => format!("{}/{}", url, self.doc_id),
        }
    }

    /// Encodes the token as URL-safe base64 of its JSON form.
    pub fn encode(&self) -> Result<String, Error> {
        let json = serde_json::to_vec(self).map_err(Error::unknown)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes a token produced by [`ClientToken::encode`].
    ///
    /// Trailing `=` padding is tolerated.
    pub fn decode(encoded: &str) -> Result<Self, Error> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim().trim_end_matches('='))
            .map_err(|e| Error::Config(format!("invalid client token encoding: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Config(format!("invalid client token: {}", e)))
    }
}
