//! In-process stand-in for the collaboration server, used by tests.
//!
//! Speaks the same admin and document routes as the real server, keeps one
//! replica per document in memory and counts pushed updates.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::protocol::{
    AuthDocRequest, Authorization, ClientToken, DocCreationRequest, DocCreationResult,
};
use crate::replica::Replica;

/// Installs a test subscriber once; `RUST_LOG=docsync=debug` shows requests.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Server behavior knobs.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeServerOptions {
    /// Bearer token every request must carry.
    pub token: Option<String>,
    /// Mint tokens for unknown documents (creating them) instead of 404.
    pub auto_create: bool,
}

struct ServerState<R> {
    docs: Mutex<HashMap<String, R>>,
    options: FakeServerOptions,
    addr: SocketAddr,
    pushes: AtomicUsize,
    forced_status: Mutex<Option<StatusCode>>,
    requests: Mutex<Vec<String>>,
}

pub(crate) struct FakeServer<R: Replica> {
    state: Arc<ServerState<R>>,
    task: tokio::task::JoinHandle<()>,
}

impl<R> FakeServer<R>
where
    R: Replica + Send + 'static,
{
    pub async fn start() -> Self {
        Self::start_with(FakeServerOptions::default()).await
    }

    pub async fn start_with_token(token: &str) -> Self {
        Self::start_with(FakeServerOptions {
            token: Some(token.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn start_with(options: FakeServerOptions) -> Self {
        init_tracing();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(ServerState {
            docs: Mutex::new(HashMap::new()),
            options,
            addr,
            pushes: AtomicUsize::new(0),
            forced_status: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/check_store", get(check_store).post(check_store))
            .route("/doc/new", post(new_doc::<R>))
            .route("/doc/{doc_id}/auth", post(auth_doc::<R>))
            .route("/d/{doc_id}/as-update", get(as_update::<R>))
            .route("/d/{doc_id}/update", post(update::<R>))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                gatekeeper::<R>,
            ))
            .with_state(state.clone())
            .layer(TraceLayer::new_for_http());

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, task }
    }

    pub fn addr(&self) -> SocketAddr {
        self.state.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.state.addr)
    }

    /// A `ys://` connection string for this server, optionally with a token.
    pub fn connection_string(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ys://{}@{}", urlencoding::encode(token), self.state.addr),
            None => format!("ys://{}", self.state.addr),
        }
    }

    /// Creates an empty document directly on the server.
    pub fn insert_doc(&self, doc_id: &str) {
        self.state
            .docs
            .lock()
            .unwrap()
            .entry(doc_id.to_string())
            .or_insert_with(R::empty);
    }

    /// Full state of a document as the server sees it.
    pub fn doc_state(&self, doc_id: &str) -> Option<Vec<u8>> {
        self.state
            .docs
            .lock()
            .unwrap()
            .get_mut(doc_id)
            .map(|doc| doc.encode_state())
    }

    pub fn doc_count(&self) -> usize {
        self.state.docs.lock().unwrap().len()
    }

    /// Number of accepted `update` requests.
    pub fn push_count(&self) -> usize {
        self.state.pushes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent request fail with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        *self.state.forced_status.lock().unwrap() = Some(status);
    }

    /// Path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl<R: Replica> Drop for FakeServer<R> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An address nothing listens on.
pub(crate) async fn unused_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn gatekeeper<R: Send + 'static>(
    State(state): State<Arc<ServerState<R>>>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_default();
    state.requests.lock().unwrap().push(uri);

    let forced = *state.forced_status.lock().unwrap();
    if let Some(status) = forced {
        return status.into_response();
    }

    if let Some(expected) = &state.options.token {
        let provided = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));
        if provided != Some(expected.as_str()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    next.run(request).await
}

async fn check_store() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn new_doc<R: Replica + Send + 'static>(
    State(state): State<Arc<ServerState<R>>>,
    Json(body): Json<DocCreationRequest>,
) -> Json<DocCreationResult> {
    let doc_id = body
        .doc_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    state
        .docs
        .lock()
        .unwrap()
        .entry(doc_id.clone())
        .or_insert_with(R::empty);
    Json(DocCreationResult { doc_id })
}

async fn auth_doc<R: Replica + Send + 'static>(
    State(state): State<Arc<ServerState<R>>>,
    Path(doc_id): Path<String>,
    Json(body): Json<AuthDocRequest>,
) -> Result<Json<ClientToken>, StatusCode> {
    {
        let mut docs = state.docs.lock().unwrap();
        if !docs.contains_key(&doc_id) {
            if !state.options.auto_create {
                return Err(StatusCode::NOT_FOUND);
            }
            docs.insert(doc_id.clone(), R::empty());
        }
    }

    Ok(Json(ClientToken {
        url: format!("ws://{}/d/{}/ws", state.addr, doc_id),
        base_url: Some(format!("http://{}/d/{}", state.addr, doc_id)),
        doc_id,
        token: state.options.token.clone(),
        authorization: Some(body.authorization.unwrap_or(Authorization::Full)),
    }))
}

async fn as_update<R: Replica + Send + 'static>(
    State(state): State<Arc<ServerState<R>>>,
    Path(doc_id): Path<String>,
) -> Result<Vec<u8>, StatusCode> {
    let mut docs = state.docs.lock().unwrap();
    let doc = docs.get_mut(&doc_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(doc.encode_state())
}

async fn update<R: Replica + Send + 'static>(
    State(state): State<Arc<ServerState<R>>>,
    Path(doc_id): Path<String>,
    body: Bytes,
) -> StatusCode {
    let mut docs = state.docs.lock().unwrap();
    let Some(doc) = docs.get_mut(&doc_id) else {
        return StatusCode::NOT_FOUND;
    };
    match doc.apply_update(&body) {
        Ok(()) => {
            state.pushes.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK
        }
        Err(_) => StatusCode::BAD_REQUEST,
    }
}
