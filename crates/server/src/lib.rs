//! HTTP surface of the analyzer: the board page, its WebSocket and a couple
//! of stateless helpers.

pub mod config;
pub mod error;
pub mod routes;
pub mod screen;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

pub fn app(config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let engine_slots = Arc::new(Semaphore::new(config.max_engines));

    Router::new()
        .route("/", get(routes::page::index))
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::screen_ws::ws_handler))
        .route("/api/position/validate", get(routes::position::validate_fen))
        .layer(Extension(config))
        .layer(Extension(engine_slots))
        .layer(CompressionLayer::new())
        .layer(cors)
}

pub async fn serve(listener: TcpListener, config: Config) -> std::io::Result<()> {
    axum::serve(listener, app(config)).await
}
