use std::sync::Arc;

use axum::Router;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::actor::HubHandle;
use super::config::{HUB_COMMAND_CAPACITY, OriginPolicy, ServerConfig};
use super::connection::serve_connection;

pub const INDEX_TEXT: &str = "WebSocket signaling server is running. Connect to /ws";

#[derive(Clone)]
struct AppState {
    hub: HubHandle,
    queue_capacity: usize,
    origin_policy: Arc<OriginPolicy>,
}

pub struct SignalingServer {
    config: ServerConfig,
    handle: HubHandle,
}

impl SignalingServer {
    /// Spawns the hub actor; must be called inside a tokio runtime.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            handle: HubHandle::spawn(HUB_COMMAND_CAPACITY),
        }
    }

    pub fn handle(&self) -> HubHandle {
        self.handle.clone()
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            hub: self.handle.clone(),
            queue_capacity: self.config.queue_capacity,
            origin_policy: Arc::new(self.config.origin_policy.clone()),
        };

        Router::new()
            .route("/", get(index))
            .route("/ws", get(ws_handler))
            .with_state(state)
    }

    /// Bind `config.addr` and serve until the process exits.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.addr).await?;
        self.serve(listener).await
    }

    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        info!("Signaling server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}

async fn index() -> &'static str {
    INDEX_TEXT
}

async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!("WebSocket upgrade error: {}", rejection);
            return rejection.into_response();
        }
    };

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    if !state.origin_policy.allows(origin) {
        warn!("Rejected upgrade from origin {:?}", origin);
        return StatusCode::FORBIDDEN.into_response();
    }

    let AppState {
        hub,
        queue_capacity,
        ..
    } = state;

    ws.on_failed_upgrade(|e| warn!("WebSocket upgrade error: {}", e))
        .on_upgrade(move |socket| serve_connection(socket, hub, queue_capacity))
}
