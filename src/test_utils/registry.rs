//! In-process registry server for tests.
//!
//! Serves a fixed set of items over HTTP on `127.0.0.1` with an ephemeral port:
//!
//! | Route                         | Response                                      |
//! |-------------------------------|-----------------------------------------------|
//! | `/r/<name>.json`              | item `<name>`                                 |
//! | `/r/registry.json`            | `{"name", "items"}` index of every item       |
//! | `/styles/<style>/<name>.json` | item `<name>` (built-in registry layout)      |
//! | `/index.json`                 | bare index array (built-in registry layout)   |
//!
//! With a token configured, every request must carry `Authorization: Bearer <token>` or
//! gets `401 {"error":"Unauthorized"}`. Unknown items get `404 {"error":"Item not found"}`.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinHandle;

#[derive(Debug)]
struct RegistryState {
    name: String,
    items: BTreeMap<String, Value>,
    token: Option<String>,
    requests: AtomicUsize,
}

impl RegistryState {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let Some(token) = &self.token else {
            return Ok(());
        };
        let expected = format!("Bearer {token}");
        let provided = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if provided == Some(expected.as_str()) {
            Ok(())
        } else {
            Err((StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response())
        }
    }

    fn lookup(&self, headers: &HeaderMap, path: &str) -> Response {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Err(denied) = self.authorize(headers) {
            return denied;
        }

        let name = path.strip_suffix(".json").unwrap_or(path);
        if name == crate::constants::REGISTRY_INDEX_ITEM && !self.items.contains_key(name) {
            return Json(json!({
                "name": self.name,
                "homepage": "http://localhost",
                "items": self.items.values().collect::<Vec<_>>(),
            }))
            .into_response();
        }

        match self.items.get(name) {
            Some(item) => Json(item.clone()).into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({"error": "Item not found"}))).into_response(),
        }
    }
}

async fn serve_item(
    State(state): State<Arc<RegistryState>>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    state.lookup(&headers, &path)
}

async fn serve_styled_item(
    State(state): State<Arc<RegistryState>>,
    headers: HeaderMap,
    Path((_style, path)): Path<(String, String)>,
) -> Response {
    state.lookup(&headers, &path)
}

async fn serve_bare_index(State(state): State<Arc<RegistryState>>, headers: HeaderMap) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if let Err(denied) = state.authorize(&headers) {
        return denied;
    }
    Json(state.items.values().collect::<Vec<_>>()).into_response()
}

/// Builder for [`TestRegistry`].
#[derive(Debug, Default)]
pub struct TestRegistryBuilder {
    name: String,
    items: BTreeMap<String, Value>,
    token: Option<String>,
}

impl TestRegistryBuilder {
    /// Serve `item`, keyed by its `name` field.
    pub fn item(mut self, item: Value) -> Self {
        let name = item["name"].as_str().unwrap_or_default().to_string();
        self.items.insert(name, item);
        self
    }

    /// Serve every item in `items`.
    pub fn items(self, items: impl IntoIterator<Item = Value>) -> Self {
        items.into_iter().fold(self, Self::item)
    }

    /// Require `Authorization: Bearer <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Bind to an ephemeral port and start serving.
    pub async fn start(self) -> std::io::Result<TestRegistry> {
        let state = Arc::new(RegistryState {
            name: self.name,
            items: self.items,
            token: self.token,
            requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/r/{*path}", get(serve_item))
            .route("/styles/{style}/{*path}", get(serve_styled_item))
            .route("/index.json", get(serve_bare_index))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("Test registry stopped: {}", e);
            }
        });
        tracing::debug!("Test registry {} listening on http://{}", state.name, addr);

        Ok(TestRegistry {
            addr,
            state,
            handle,
        })
    }
}

/// A running test registry. The server stops when this is dropped.
#[derive(Debug)]
pub struct TestRegistry {
    addr: SocketAddr,
    state: Arc<RegistryState>,
    handle: JoinHandle<()>,
}

impl TestRegistry {
    /// Builder for a registry whose index is labelled `name`.
    pub fn builder(name: impl Into<String>) -> TestRegistryBuilder {
        TestRegistryBuilder {
            name: name.into(),
            ..TestRegistryBuilder::default()
        }
    }

    /// Base URL, usable as `REGISTRY_URL` for the built-in layout.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Item URL template for `components.json`.
    pub fn url_template(&self) -> String {
        format!("{}/r/{{name}}.json", self.base_url())
    }

    /// URL of one item.
    pub fn item_url(&self, name: &str) -> String {
        format!("{}/r/{}.json", self.base_url(), name)
    }

    /// Number of requests served so far, including rejected ones.
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestRegistry {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
