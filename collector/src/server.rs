//! HTTP server accepting capture records from agents.
//!
//! Routes:
//!   POST /collect → stamp and archive a JSON record
//!   GET  /health  → health check

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use muster_common::protocol::{CollectResponse, HealthResponse};

use crate::storage;

/// Shared state for route handlers.
#[derive(Clone)]
struct AppState {
    data_dir: PathBuf,
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn run(
    data_dir: PathBuf,
    listen_addr: &str,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Collector HTTP server listening on {listen_addr}");

    axum::serve(listener, router(data_dir))
        .with_graceful_shutdown(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}

/// Build the route table. Kept separate from [`run`] so tests can drive the
/// routes without binding a socket.
fn router(data_dir: PathBuf) -> Router {
    Router::new()
        .route("/collect", post(collect))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(AppState { data_dir })
}

// ── route handlers ───────────────────────────────────────────────────────

/// The body is taken as raw bytes rather than through the JSON or String
/// extractors: any body that fails to parse (including non-UTF-8) must
/// produce a 500 with the parse error in the response body, not an
/// extractor-level 4xx.
async fn collect(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<CollectResponse>) {
    match storage::store(&state.data_dir, &body, chrono::Local::now()) {
        Ok(path) => {
            info!("Record archived to {}", path.display());
            (
                StatusCode::OK,
                Json(CollectResponse::success(format!(
                    "Data saved to {}",
                    path.display()
                ))),
            )
        }
        Err(e) => {
            warn!("Cannot archive record: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CollectResponse::error(e.to_string())),
            )
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// ─── tests ───────────────────────────────────────────────────────────────
