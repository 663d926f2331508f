//! HTTP side channel used by the browser script.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client_script;
use crate::editor::EditorLauncher;
use crate::error::Result;

pub const OPEN_IN_EDITOR_PATH: &str = "/__open-in-editor";
pub const CLIENT_SCRIPT_PATH: &str = "/__component-ref/client.js";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) root: Arc<PathBuf>,
    pub(crate) launcher: Arc<EditorLauncher>,
    pub(crate) client_script: Arc<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenParams {
    pub file: Option<String>,
    pub line: Option<String>,
}

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route(OPEN_IN_EDITOR_PATH, get(open_in_editor_handler))
        .route(CLIENT_SCRIPT_PATH, get(client_script_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /__open-in-editor?file=src/App.tsx&line=12
async fn open_in_editor_handler(
    State(state): State<AppState>,
    Query(params): Query<OpenParams>,
) -> impl IntoResponse {
    let Some(file) = params.file.filter(|f| !f.is_empty()) else {
        return (StatusCode::NOT_FOUND, "").into_response();
    };

    let path = resolve_in_root(&state.root, &file);
    let line = parse_line(params.line.as_deref());
    info!(file = %path.display(), line, "open in editor");

    // Outcome is logged by the launcher; the browser always gets "ok".
    state.launcher.open(&path, line);
    (StatusCode::OK, "ok").into_response()
}

async fn client_script_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        state.client_script.as_str().to_owned(),
    )
}

/// Leading-integer parse; anything without leading digits means line 1.
pub fn parse_line(raw: Option<&str>) -> u32 {
    let digits: String = raw
        .unwrap_or("")
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(1)
}

/// Join `file` onto `root` (absolute files replace it) and fold `.`/`..` lexically.
pub fn resolve_in_root(root: &Path, file: &str) -> PathBuf {
    let joined = root.join(file);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub(crate) fn client_script_for(prefix: &str) -> Arc<String> {
    Arc::new(client_script::render(prefix))
}

/// Serve `router` until the process is stopped.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("component-ref side channel listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
