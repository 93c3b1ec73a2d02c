//! Wisdom Riddles · Matching Backend
//!
//! - Axum HTTP + WebSocket API
//! - TF-IDF riddle matcher with emotion and random fallbacks, hot reload
//! - Optional chat-completions model for wisdom, philosopher answers and translation
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   RIDDLES_CSV_PATH    : riddle dataset (default "realistic_spiritual_riddles.csv")
//!   WISDOM_CONFIG_PATH  : path to TOML config (matcher settings, prompts, beliefs, riddle bank)
//!   LLM_BASE_URL        : enables model integration if present
//!   LLM_API_KEY         : optional bearer token
//!   LLM_MODEL           : default "tinyllama"
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod text;
mod domain;
mod config;
mod seeds;
mod dataset;
mod index;
mod matcher;
mod llm;
mod wisdom;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Load config + dataset and build the matcher before accepting traffic.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "wisdom_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "wisdom_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "wisdom_backend", error = %e, "Failed to listen for Ctrl-C");
  }
}
