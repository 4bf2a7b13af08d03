//! Router construction and the serve loop.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::connection::handle_connection;
use crate::state::ServerState;

/// Start the Treecast server on `bind:port` and serve until shutdown.
pub async fn start_server(state: Arc<ServerState>, bind: &str, port: u16) -> anyhow::Result<()> {
    // /ws and /health are registered first so they take priority over the
    // static-file fallback.
    let mut app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .layer(cors_layer(&state.config.allow_origins()));

    if state.config.mount_static() {
        if let Some(dir) = state.config.static_dir() {
            if dir.is_dir() {
                app = app.fallback_service(
                    ServeDir::new(&dir).append_index_html_on_directories(true),
                );
                info!("Serving static files from {}", dir.display());
            } else {
                warn!("Static directory not found, skipping: {}", dir.display());
            }
        }
    }

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Treecast listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring unparseable CORS origin: {o}");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    axum::Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": state.open_connections.load(Ordering::SeqCst),
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
