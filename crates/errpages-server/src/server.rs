//! Development server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;

use errpages_static::{BuildConfig, BuildError, StaticBuilder};

use crate::watcher::{watch_dirs, FileWatcher, WatchEvent};
use crate::websocket::{
    reload_client_script, reload_script_tag, ReloadHub, ReloadMessage, RELOAD_PATH,
    RELOAD_SCRIPT_PATH,
};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Build settings used for every rebuild
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Build on startup even when the output directory already exists
    pub rebuild_on_start: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 5173,
            host: "127.0.0.1".to_string(),
            open: true,
            rebuild_on_start: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    AddressError(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Initial build failed: {0}")]
    BuildError(#[from] BuildError),
}

/// Shared server state.
struct ServerState {
    hub: ReloadHub,
    builder: StaticBuilder,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_text = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_text
            .parse()
            .map_err(|_| ServerError::AddressError(addr_text.clone()))?;

        let build = dev_build_config(&self.config.build);
        let output_dir = build.output_dir.clone();

        let state = Arc::new(ServerState {
            hub: ReloadHub::new(),
            builder: StaticBuilder::new(build.clone()),
        });

        if self.config.rebuild_on_start || !output_dir.exists() {
            let result = state.builder.build().await?;
            tracing::info!(
                "Built {} pages in {}ms",
                result.pages,
                result.duration_ms
            );
        } else {
            tracing::info!(
                "Serving existing {} (pages lack the reload client until the next rebuild)",
                output_dir.display()
            );
        }

        // Set up file watcher
        let config_source = if build.configs_dir.is_dir() {
            build.configs_dir.clone()
        } else {
            build.root_dir.clone()
        };
        let dirs = watch_dirs(&config_source, &build.template, &build.root_config);

        let (watcher, mut rx) = FileWatcher::new(&dirs, &build.template)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Spawn file watch handler
        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route(RELOAD_PATH, get(ws_handler))
            .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
            .fallback_service(ServeDir::new(&output_dir))
            .with_state(state);

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build settings with the reload client injected into every page.
fn dev_build_config(build: &BuildConfig) -> BuildConfig {
    BuildConfig {
        dev_script: Some(reload_script_tag()),
        ..build.clone()
    }
}

/// Rebuild on every watch event and tell clients to reload.
async fn handle_watch_event(state: &ServerState, event: WatchEvent) {
    match &event {
        WatchEvent::ConfigChanged(path) => {
            tracing::info!("Config {} changed, rebuilding...", path.display())
        }
        WatchEvent::ConfigRemoved(path) => {
            tracing::info!("Config {} removed, rebuilding...", path.display())
        }
        WatchEvent::TemplateChanged(path) => {
            tracing::info!("Template {} changed, rebuilding...", path.display())
        }
    }

    match state.builder.build().await {
        Ok(result) => {
            tracing::info!("Rebuilt {} pages in {}ms", result.pages, result.duration_ms);
            state.hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::error!("Build failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected)
        .await
        .is_err()
    {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Reload client lagged by {} messages", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

/// Handler for the reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}
