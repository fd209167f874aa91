//! Public protocol structs for the HTTP endpoints (serde ready).
//! Field names follow what the web UI already sends and reads (camelCase
//! where the UI uses it, `country_iso2` where the model output uses it).

use serde::{Deserialize, Serialize};

use crate::domain::{GeoItem, HistoryItem, Quiz, QuizQuestion};
use crate::progress::ClientProgress;

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
  pub ai_enabled: bool,
}

//
// Quiz generation
//

/// `county` is the historical name of the field; `region` is accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuizIn {
  #[serde(default)]
  pub county: Option<String>,
  #[serde(default)]
  pub region: Option<String>,
  #[serde(default)]
  pub subject: Option<String>,
}

impl GenerateQuizIn {
  pub fn region_name(&self) -> Option<&str> {
    [self.county.as_deref(), self.region.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .find(|s| !s.is_empty())
  }
}

#[derive(Debug, Serialize)]
pub struct GenerateQuizOut {
  pub questions: Vec<QuizQuestion>,
}

//
// Chat + assistant
//

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
  #[serde(default)]
  pub subject: String,
  #[serde(default)]
  pub region: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatIn {
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub context: ChatContext,
}

#[derive(Debug, Serialize)]
pub struct ChatOut {
  pub response: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HistoryMessage {
  pub role: String,
  pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AssistantIn {
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub context: String,
  #[serde(default)]
  pub query: String,
  #[serde(default)]
  pub history: Vec<HistoryMessage>,
}

//
// Region comparison
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonIn {
  #[serde(default)]
  pub region1: String,
  #[serde(default)]
  pub region1_data: serde_json::Value,
  #[serde(default)]
  pub region1_notes: String,
  #[serde(default)]
  pub region2: String,
  #[serde(default)]
  pub region2_data: serde_json::Value,
  #[serde(default)]
  pub region2_notes: String,
}

#[derive(Debug, Serialize)]
pub struct Correction {
  pub field: String,
  pub correction: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOut {
  pub is_correct: bool,
  pub message: String,
  pub feedback: String,
  pub corrections: Vec<Correction>,
}

//
// Geo items + game
//

#[derive(Debug, Default, Deserialize)]
pub struct GeoItemsIn {
  #[serde(default)]
  pub count: Option<usize>,
  #[serde(default)]
  pub exclude: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GeoItemsOut {
  pub items: Vec<GeoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerIn {
  pub item: GeoItem,
  pub country_iso2: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAnswerOut {
  pub correct: bool,
  pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnswerIn {
  pub country_iso2: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOut {
  pub session_id: String,
  pub current_item: Option<GeoItem>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
  pub score: usize,
  pub total_items: usize,
  pub remaining: usize,
  pub finished: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub feedback: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub correct: Option<bool>,
  /// Closing line once the last item has been matched.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
}

//
// Progress
//

#[derive(Debug, Deserialize)]
pub struct StartQuizIn {
  pub region: String,
  pub subject: String,
  pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectAnswerIn {
  pub question_index: usize,
  pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
  pub quiz: Option<Quiz>,
  pub history: Vec<HistoryItem>,
  pub score: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub completed: Option<HistoryItem>,
}

impl ProgressOut {
  pub fn from_progress(p: &ClientProgress, completed: Option<HistoryItem>) -> Self {
    Self { quiz: p.quiz.clone(), history: p.history.clone(), score: p.score(), completed }
  }
}
