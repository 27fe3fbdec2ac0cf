//! `paylot serve` command implementation
//!
//! HTTP API consumed by the web front end. `POST /api/draw` runs the full
//! admin draw sequence and returns the step list; the signing client is
//! re-created per request and nothing is shared across invocations.

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{error, info};

use paylot_adapters::{EvmChainClient, HermesClient};
use paylot_core::{run_draw, DrawRun, PaylotConfig, ThreadSleeper};

mod http_middleware;


#[derive(Clone)]
struct AppState {
    config: PaylotConfig,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn draw_handler(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    info!("draw requested");

    // Configuration errors are reported before any transaction is attempted.
    if let Err(e) = state.config.require_admin_key() {
        error!(error = %e, "draw rejected");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        );
    }

    let config = state.config.clone();
    let join = tokio::task::spawn_blocking(move || -> paylot_core::Result<DrawRun> {
        let chain = EvmChainClient::new(&config.chain)?;
        let prices = HermesClient::from_config(&config)?;
        Ok(run_draw(&chain, &prices, &ThreadSleeper, &config.timing))
    })
    .await;

    match join {
        Ok(Ok(outcome)) if outcome.success => {
            info!("draw completed");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "updates": outcome.updates,
                    "message": outcome.message,
                })),
            )
        }
        Ok(Ok(outcome)) => {
            error!("draw failed partway; returning partial step list");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "updates": outcome.updates })),
            )
        }
        Ok(Err(e)) => {
            error!(error = %e, "draw setup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to execute draw process",
                    "details": e.to_string(),
                })),
            )
        }
        Err(e) => {
            error!(error = %e, "draw task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to execute draw process",
                    "details": e.to_string(),
                })),
            )
        }
    }
}

fn build_app(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;

    Router::new()
        .route("/health", get(health))
        .route("/api/draw", post(draw_handler))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(middleware::from_fn(http_middleware::cors_middleware))
        .with_state(state)
}

async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_app(state);
    info!(%addr, "serving paylot HTTP API");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn run(bind: String) -> Result<()> {
    // Start even without a credential; /api/draw reports the configuration
    // error per request.
    let config = PaylotConfig::from_env()?;
    let addr: SocketAddr = bind.parse()?;
    let state = AppState { config };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(start_server(addr, state))
}
