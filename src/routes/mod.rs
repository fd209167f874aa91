//! Router assembly: JSON API under `/api`, static UI, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - AI endpoints (quiz, chat, assistant, comparison, geo items)
/// - Reference data (region sheets, map regions, relief tours)
/// - Game sessions and per-client quiz progress
/// - Static SPA from `settings.static_dir` with index fallback
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.settings.static_dir.clone();
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(http::http_health))
        // AI
        .route("/api/generate-quiz", post(http::http_generate_quiz))
        .route("/api/chat", post(http::http_chat))
        .route("/api/virtual-assistant", post(http::http_virtual_assistant))
        .route("/api/evaluate-comparison", post(http::http_evaluate_comparison))
        .route("/api/generate-geo-items", post(http::http_generate_geo_items))
        // Reference data
        .route("/api/regions", get(http::http_regions))
        .route("/api/regions/:name", get(http::http_region))
        .route("/api/map-regions", get(http::http_map_regions))
        .route("/api/map-regions/:id", get(http::http_map_region))
        .route("/api/terrain-regions", get(http::http_terrain_regions))
        .route("/api/terrain-regions/:id", get(http::http_terrain_region))
        .route("/api/relief-tour/:id", get(http::http_relief_tour))
        // Game
        .route("/api/game/check", post(http::http_game_check))
        .route("/api/game/sessions", post(http::http_game_start))
        .route("/api/game/sessions/:id/answer", post(http::http_game_answer))
        // Progress
        .route("/api/progress/:client", get(http::http_progress_get))
        .route(
            "/api/progress/:client/quiz",
            put(http::http_progress_start).delete(http::http_progress_reset),
        )
        .route("/api/progress/:client/answer", post(http::http_progress_answer))
        .route("/api/progress/:client/next", post(http::http_progress_next))
        .route("/api/progress/:client/previous", post(http::http_progress_previous))
        .route("/api/progress/:client/complete", post(http::http_progress_complete))
        .route(
            "/api/progress/:client/history",
            delete(http::http_progress_clear_history),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}
