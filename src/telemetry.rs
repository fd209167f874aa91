//! Tracing setup.
//!
//! - `LOG_LEVEL` holds filter directives (e.g. "debug" or
//!   "info,quiz=debug,progress=debug,tower_http=info").
//! - `LOG_FORMAT=json` switches to structured JSON lines; anything else is the
//!   human-readable format.
//!
//! Targets used across the crate: `bac_geo`, `quiz`, `assistant`, `game`,
//! `progress`, `gemini`, `config`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,bac_geo=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
