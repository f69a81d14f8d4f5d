//! Client for the document-admin API.
//!
//! A [`DocumentManager`] holds the server-level credential from the
//! connection string. It creates documents and mints document-scoped
//! [`ClientToken`]s, which in turn open [`DocConnection`]s.

use reqwest::Method;

use crate::config::Config;
use crate::connection::DocConnection;
use crate::connection_string::ConnectionString;
use crate::error::Error;
use crate::http::{HttpClient, RequestBody};
use crate::protocol::{
    AuthDocRequest, CheckStoreResult, ClientToken, DocCreationRequest, DocCreationResult,
};

/// Session client for one collaboration server.
#[derive(Debug, Clone)]
pub struct DocumentManager {
    http: HttpClient,
}

impl DocumentManager {
    /// Creates a manager from a `ys://` or `yss://` connection string.
    pub fn new(connection_string: &str) -> Result<Self, Error> {
        let parsed = ConnectionString::parse(connection_string)?;
        Self::from_connection_string(&parsed)
    }

    /// Creates a manager from an already parsed connection string.
    pub fn from_connection_string(parsed: &ConnectionString) -> Result<Self, Error> {
        let transport = HttpClient::build_transport(None)?;
        Ok(Self::with_transport(transport, parsed))
    }

    /// Creates a manager from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let parsed = config.connection_string()?;
        let transport = HttpClient::build_transport(config.timeout.value)?;
        Ok(Self::with_transport(transport, &parsed))
    }

    fn with_transport(transport: reqwest::Client, parsed: &ConnectionString) -> Self {
        let http = HttpClient::new(
            transport,
            parsed.base_url(),
            parsed.token().map(str::to_string),
        )
        .with_cache_busting();
        Self { http }
    }

    /// Base URL of the admin API.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Asks the server whether its backing store is usable.
    pub async fn check_store(&self) -> Result<CheckStoreResult, Error> {
        self.http
            .request_json(Method::GET, "check_store", RequestBody::Empty)
            .await
    }

    /// Creates a document. With `None` the server picks the id.
    ///
    /// Creating an id that already exists is a no-op that returns the same id.
    pub async fn create_doc(&self, doc_id: Option<&str>) -> Result<DocCreationResult, Error> {
        let body = DocCreationRequest {
            doc_id: doc_id.map(str::to_string),
        };
        self.http
            .request_json(Method::POST, "doc/new", RequestBody::json(&body)?)
            .await
    }

    /// Mints a client token for an existing document.
    ///
    /// Whether an unknown document yields [`Error::NotFound`] or is created
    /// on the fly depends on the server.
    pub async fn get_client_token(&self, doc_id: &str) -> Result<ClientToken, Error> {
        self.get_client_token_with(doc_id, &AuthDocRequest::default())
            .await
    }

    /// Mints a client token with an explicit access level or lifetime.
    pub async fn get_client_token_with(
        &self,
        doc_id: &str,
        request: &AuthDocRequest,
    ) -> Result<ClientToken, Error> {
        let path = format!("doc/{}/auth", urlencoding::encode(doc_id));
        self.http
            .request_json(Method::POST, &path, RequestBody::json(request)?)
            .await
    }

    /// Creates the document if needed, then mints a token for it.
    pub async fn get_or_create_doc_and_token(
        &self,
        doc_id: Option<&str>,
    ) -> Result<ClientToken, Error> {
        let created = self.create_doc(doc_id).await?;
        self.get_client_token(&created.doc_id).await
    }

    /// Mints a token for `doc_id` and binds a connection to it.
    pub async fn get_connection(&self, doc_id: &str) -> Result<DocConnection, Error> {
        let token = self.get_client_token(doc_id).await?;
        Ok(DocConnection::with_transport(
            self.http.transport().clone(),
            &token,
        ))
    }

    /// Fetches the whole document as a single update.
    pub async fn get_doc_as_update(&self, doc_id: &str) -> Result<Vec<u8>, Error> {
        self.get_connection(doc_id).await?.get_as_update().await
    }

    /// Sends an update to the document.
    pub async fn update_doc(&self, doc_id: &str, update: &[u8]) -> Result<(), Error> {
        self.get_connection(doc_id).await?.update_doc(update).await
    }

    /// Creates the document if needed and returns its WebSocket URL.
    pub async fn get_websocket_url(&self, doc_id: &str) -> Result<String, Error> {
        let token = self.get_or_create_doc_and_token(Some(doc_id)).await?;
        Ok(token.websocket_url())
    }
}

/// Creates a document on the server named by `connection_string`.
pub async fn create_doc(
    connection_string: &str,
    doc_id: Option<&str>,
) -> Result<DocCreationResult, Error> {
    DocumentManager::new(connection_string)?
        .create_doc(doc_id)
        .await
}

/// Mints a client token on the server named by `connection_string`.
pub async fn get_client_token(connection_string: &str, doc_id: &str) -> Result<ClientToken, Error> {
    DocumentManager::new(connection_string)?
        .get_client_token(doc_id)
        .await
}

/// Creates a document if needed and mints a client token for it.
pub async fn get_or_create_doc_and_token(
    connection_string: &str,
    doc_id: Option<&str>,
) -> Result<ClientToken, Error> {
    DocumentManager::new(connection_string)?
        .get_or_create_doc_and_token(doc_id)
        .await
}
