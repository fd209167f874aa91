//! Application state: settings, prompts, the optional generative-API client,
//! the progress store, and in-flight game sessions.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{resolve_prompts, Prompts, Settings};
use crate::game::GameSession;
use crate::gemini::Gemini;
use crate::progress::ProgressStore;

#[derive(Clone)]
pub struct AppState {
  pub settings: Settings,
  pub prompts: Prompts,
  pub gemini: Option<Gemini>,
  pub progress: ProgressStore,
  pub games: Arc<RwLock<HashMap<String, GameSession>>>,
}

impl AppState {
  /// Build state from settings: load prompts, open the progress store, init the AI client.
  #[instrument(level = "info", skip_all)]
  pub fn new(settings: Settings) -> Self {
    let prompts = resolve_prompts(&settings);
    let progress = ProgressStore::open(&settings.data_dir);

    let gemini = Gemini::from_settings(&settings);
    if let Some(g) = &gemini {
      info!(target: "bac_geo", base_url = %g.base_url, quiz_model = %g.quiz_model, chat_model = %g.chat_model, "Generative API enabled.");
    } else {
      info!(target: "bac_geo", "Generative API disabled (no GOOGLE_AI_API_KEY). AI endpoints will answer with errors or local fallbacks.");
    }

    Self::from_parts(settings, prompts, gemini, progress)
  }

  pub fn from_parts(
    settings: Settings,
    prompts: Prompts,
    gemini: Option<Gemini>,
    progress: ProgressStore,
  ) -> Self {
    Self { settings, prompts, gemini, progress, games: Arc::new(RwLock::new(HashMap::new())) }
  }
}
