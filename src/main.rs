//! BAC Geo · exam-prep backend for Romanian geography and history
//!
//! - Axum JSON API under `/api` (quiz generation, tutoring chat, region
//!   comparison, country-matching game, quiz progress)
//! - Optional Google Gemini integration (enabled by `GOOGLE_AI_API_KEY`)
//! - Static SPA fallback (`STATIC_DIR/index.html`)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   GOOGLE_AI_API_KEY   : enables the generative endpoints if present
//!   GEMINI_BASE_URL     : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_QUIZ_MODEL   : default "gemini-2.0-flash"
//!   GEMINI_CHAT_MODEL   : default "gemini-1.5-flash"
//!   GEMINI_TIMEOUT_SECS : upstream request timeout (default 30)
//!   DATA_DIR            : where progress.json lives (default "./data")
//!   STATIC_DIR          : frontend build (default "./static")
//!   PROMPTS_CONFIG_PATH : TOML file with `[prompts]` overrides
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod error;
mod seeds;
mod state;
mod protocol;
mod quiz_parser;
mod gemini;
mod progress;
mod game;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let settings = Settings::from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

  let state = Arc::new(AppState::new(settings));
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "bac_geo", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "bac_geo", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "bac_geo", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "bac_geo", "Shutdown requested");
}
