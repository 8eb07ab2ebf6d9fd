//! Liveness endpoint for the deployment platform's health checks.
//!
//! Not part of the reporting core; it only proves the process is up.

use crate::error::Result;
use axum::{routing::get, Router};
use log::info;

const STATUS_TEXT: &str = "Bot Status: Active (Dual Schedule)";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { STATUS_TEXT }))
}

/// Binds `0.0.0.0:{port}` and serves until the process exits.
pub async fn serve(port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health endpoint listening on port {}", port);
    axum::serve(listener, router()).await?;
    Ok(())
}
