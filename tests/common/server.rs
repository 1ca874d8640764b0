//! Fake catalog service
//!
//! Serves the fixture library over the catalog's JSON API, plus a `/files`
//! route standing in for the places users download archives from. Each test
//! gets its own server on a random port.

use super::constants::*;
use super::fixtures::{artist_json, children_of, container, metadata_by_id, season_json};
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

type Params = Query<HashMap<String, String>>;

#[derive(Clone, Default)]
struct ServerState {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    refreshes: Arc<AtomicU32>,
}

/// Test catalog instance. Shuts down when dropped.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: ServerState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new fake catalog on a random port.
    ///
    /// The listener is bound before this returns, so requests made right
    /// after are queued rather than refused.
    pub async fn spawn() -> Self {
        let state = ServerState::default();

        let app = Router::new()
            .route("/hubs/search", get(search))
            .route("/library/metadata/{id}", get(metadata))
            .route("/library/metadata/{id}/children", get(children))
            .route("/library/metadata/{id}/thumb/{version}", get(thumb))
            .route("/library/recentlyAdded", get(recently_added))
            .route("/library/sections/{section}/all", get(section_all))
            .route("/library/sections/{section}/refresh", get(refresh))
            .route("/files/{name}", get(file))
            .route("/truncated/{name}", get(truncated_file))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Serve `data` at `/files/<name>` and return its URL.
    pub fn host_file(&self, name: &str, data: Vec<u8>) -> String {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(name.to_string(), data);
        self.file_url(name)
    }

    pub fn file_url(&self, name: &str) -> String {
        format!("{}/files/{}", self.base_url, name)
    }

    /// URL that sends the first half of a hosted file, then drops the
    /// connection.
    pub fn truncated_url(&self, name: &str) -> String {
        format!("{}/truncated/{}", self.base_url, name)
    }

    /// How many library refreshes were requested so far.
    pub fn refreshes(&self) -> u32 {
        self.state.refreshes.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn authorized(params: &HashMap<String, String>) -> bool {
    params.get("X-Plex-Token").map(String::as_str) == Some(TEST_TOKEN)
}

fn known_section(section: &str) -> bool {
    section == SECTION_ID.to_string()
}

async fn search(Query(params): Params) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let query = params.get("query").cloned().unwrap_or_default().to_lowercase();
    let artists = if !query.is_empty() && ARTIST_TITLE.to_lowercase().contains(&query) {
        vec![artist_json()]
    } else {
        Vec::new()
    };
    Json(json!({"MediaContainer": {"Hub": [
        {"type": "album", "Metadata": []},
        {"type": "artist", "Metadata": artists}
    ]}}))
    .into_response()
}

async fn metadata(Path(id): Path<String>, Query(params): Params) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match metadata_by_id(&id) {
        Some(item) => Json(container(vec![item])).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn children(Path(id): Path<String>, Query(params): Params) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if metadata_by_id(&id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(container(children_of(&id))).into_response()
}

async fn thumb(Path((id, _version)): Path<(String, String)>, Query(params): Params) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if metadata_by_id(&id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/jpeg")], ARTWORK_BYTES.to_vec()).into_response()
}

async fn recently_added(Query(params): Params) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    // Recently added spans every section, not just the music library.
    let mut items = children_of(ARTIST_ID);
    items.push(season_json());
    let items = items.into_iter().take(limit).collect();
    Json(container(items)).into_response()
}

async fn section_all(Path(section): Path<String>, Query(params): Params) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !known_section(&section) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let items = match params.get("title") {
        Some(title) if title == ARTIST_TITLE => vec![artist_json()],
        _ => Vec::new(),
    };
    Json(container(items)).into_response()
}

async fn refresh(
    State(state): State<ServerState>,
    Path(section): Path<String>,
    Query(params): Params,
) -> Response {
    if !authorized(&params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !known_section(&section) {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.refreshes.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK.into_response()
}

async fn file(State(state): State<ServerState>, Path(name): Path<String>) -> Response {
    match state.files.lock().unwrap().get(&name) {
        Some(data) => data.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn truncated_file(State(state): State<ServerState>, Path(name): Path<String>) -> Response {
    let Some(data) = state.files.lock().unwrap().get(&name).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let head = Bytes::from(data[..data.len() / 2].to_vec());
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(head),
        Err(std::io::Error::other("connection dropped")),
    ];
    // Delay the failure so the first chunk reaches the client.
    let stream = futures::stream::iter(chunks).then(|chunk| async move {
        if chunk.is_err() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        chunk
    });
    Body::from_stream(stream).into_response()
}
