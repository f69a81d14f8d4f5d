//! Token-scoped access to one document's data endpoints.

use reqwest::Method;

use crate::error::Error;
use crate::http::{HttpClient, RequestBody};
use crate::protocol::ClientToken;

/// A connection to a single document.
///
/// Holds no document state; every call goes to the server.
#[derive(Debug, Clone)]
pub struct DocConnection {
    http: HttpClient,
    doc_id: String,
}

impl DocConnection {
    /// Binds a connection to the document described by `token`.
    pub fn new(token: &ClientToken) -> Result<Self, Error> {
        let transport = HttpClient::build_transport(None)?;
        Ok(Self::with_transport(transport, token))
    }

    /// Binds a connection that shares an existing HTTP transport.
    pub(crate) fn with_transport(transport: reqwest::Client, token: &ClientToken) -> Self {
        let http = HttpClient::new(
            transport,
            token.data_url(),
            token.bearer().map(str::to_string),
        );
        Self {
            http,
            doc_id: token.doc_id.clone(),
        }
    }

    /// The document this connection is bound to.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Base URL of the document's data endpoints.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Fetches the entire document as a single update.
    pub async fn get_as_update(&self) -> Result<Vec<u8>, Error> {
        self.http
            .request_bytes(Method::GET, "as-update", RequestBody::Empty)
            .await
    }

    /// Sends an update (full or diff) for the server to merge.
    ///
    /// Success means the server accepted the bytes.
    pub async fn update_doc(&self, update: &[u8]) -> Result<(), Error> {
        self.http
            .request(
                Method::POST,
                "update",
                RequestBody::Binary(update.to_vec()),
            )
            .await?;
        Ok(())
    }
}
