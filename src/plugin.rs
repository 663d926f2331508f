use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use tracing::{debug, warn};

use crate::client_script;
use crate::config::{TaggerConfig, TaggerOptions};
use crate::editor::{EditorLauncher, EDITOR_ENV};
use crate::error::Result;
use crate::server::{build_router, client_script_for, AppState};
use crate::transform::{transform_source, TransformOutput};

/// What the dev host is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostMode {
    #[default]
    Serve,
    Build,
}

impl HostMode {
    /// Mode name used to pick `.env.[mode]` files.
    pub fn env_mode(self) -> &'static str {
        match self {
            HostMode::Serve => "development",
            HostMode::Build => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostContext {
    pub mode: HostMode,
    /// Project root; side-channel file paths are resolved against it.
    pub root: PathBuf,
}

impl HostContext {
    pub fn serve(root: impl Into<PathBuf>) -> Self {
        Self {
            mode: HostMode::Serve,
            root: root.into(),
        }
    }

    pub fn build(root: impl Into<PathBuf>) -> Self {
        Self {
            mode: HostMode::Build,
            root: root.into(),
        }
    }
}

/// Host-facing entry point: per-file transform, index.html injection and the
/// open-in-editor side channel. Cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct ComponentRefTagger {
    config: Arc<TaggerConfig>,
    host: HostContext,
}

impl ComponentRefTagger {
    /// Resolve `options` against the defaults. The editor override is looked up
    /// once: process environment first, then the `.env` files under `host.root`.
    pub fn new(options: TaggerOptions, host: HostContext) -> Self {
        let editor_override = std::env::var(EDITOR_ENV)
            .ok()
            .filter(|e| !e.is_empty())
            .or_else(|| env_file_value(&host.root, host.mode, EDITOR_ENV));
        Self::with_config(TaggerConfig::resolve(options, editor_override), host)
    }

    pub fn with_config(config: TaggerConfig, host: HostContext) -> Self {
        Self {
            config: Arc::new(config),
            host,
        }
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    fn active(&self) -> bool {
        self.host.mode == HostMode::Serve && self.config.enabled
    }

    pub fn transform(&self, code: &str, id: &str) -> Result<TransformOutput> {
        if !self.active() {
            debug!(file = id, mode = ?self.host.mode, "tagging inactive");
            return Ok(TransformOutput::Unchanged);
        }
        transform_source(&self.config, code, id)
    }

    pub fn transform_index_html(&self, html: &str) -> String {
        if !self.active() {
            return html.to_string();
        }
        client_script::inject_into_html(html, &self.config.prefix)
    }

    pub fn router(&self) -> Router {
        build_router(AppState {
            root: Arc::new(self.host.root.clone()),
            launcher: Arc::new(EditorLauncher::new(self.config.editor.clone())),
            client_script: client_script_for(&self.config.prefix),
        })
    }
}

/// Look `key` up in `.env.[mode].local`, `.env.[mode]`, `.env.local` and `.env`
/// under `root`, in that order. Missing files are skipped.
fn env_file_value(root: &Path, mode: HostMode, key: &str) -> Option<String> {
    let mode = mode.env_mode();
    let files = [
        format!(".env.{mode}.local"),
        format!(".env.{mode}"),
        ".env.local".to_string(),
        ".env".to_string(),
    ];
    for name in files {
        let path = root.join(&name);
        let Ok(iter) = dotenvy::from_path_iter(&path) else {
            continue;
        };
        for item in iter {
            match item {
                Ok((k, v)) if k == key && !v.is_empty() => return Some(v),
                Ok(_) => {}
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping malformed env file");
                    break;
                }
            }
        }
    }
    None
}
