//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Quiz generation (model text → `quiz_parser`)
//!   - Chat about a quiz question and the virtual assistant (with a local fallback)
//!   - Region comparison feedback (with a canned fallback)
//!   - Geo item generation and server-side game sessions
//!   - Client id validation for the progress endpoints

use std::time::Instant;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{GeoItem, QuizQuestion};
use crate::error::ApiError;
use crate::game::{clamp_count, parse_geo_items, prune_sessions, GameSession, GeoItemsError, Verdict};
use crate::gemini::{AiError, Gemini};
use crate::protocol::*;
use crate::quiz_parser::parse_quiz_questions;
use crate::state::AppState;
use crate::util::{contains_any_ci, preview, trunc_for_log};

pub const QUIZ_QUESTION_COUNT: usize = 5;
/// Assistant prompts only carry the most recent turns of the conversation.
pub const ASSISTANT_HISTORY_WINDOW: usize = 3;

const MSG_API_MISCONFIGURED: &str = "Configurare API incompletă";
const MSG_KEY_MISSING: &str = "Cheia API Google AI nu este configurată pe server";

fn require_ai<'a>(state: &'a AppState, message: &str) -> Result<&'a Gemini, ApiError> {
  state.gemini.as_ref().ok_or_else(|| ApiError::internal(message))
}

/// Map a failed generation call onto the response the UI expects.
fn generation_error(e: AiError, unavailable: &str) -> ApiError {
  match e {
    AiError::Status { status, message } => ApiError::Unavailable {
      message: unavailable.to_string(),
      details: format!("HTTP {status}: {message}"),
    },
    AiError::Transport(e) => ApiError::Unavailable {
      message: "Eroare la comunicarea cu serviciul AI".into(),
      details: e.to_string(),
    },
    AiError::MissingText { body } => {
      ApiError::internal_with("Răspuns invalid de la serviciul AI", preview(&body, 500))
    }
    AiError::Decode(e) => ApiError::internal_with("Răspuns invalid de la serviciul AI", e.to_string()),
  }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}

#[instrument(level = "info", skip(state, req))]
pub async fn generate_quiz(state: &AppState, req: &GenerateQuizIn) -> Result<Vec<QuizQuestion>, ApiError> {
  let (Some(region), Some(subject)) = (req.region_name(), non_blank(req.subject.as_deref())) else {
    return Err(ApiError::BadRequest("Este necesară specificarea regiunii și subiectului".into()));
  };
  info!(target: "quiz", %region, %subject, "Quiz generation requested");

  let gemini = require_ai(state, MSG_API_MISCONFIGURED)?;
  let text = gemini
    .quiz_text(&state.prompts, region, subject, QUIZ_QUESTION_COUNT)
    .await
    .map_err(|e| {
      error!(target: "quiz", error = %e, "Quiz generation call failed");
      generation_error(e, "Serviciul de generare întrebări nu este disponibil momentan")
    })?;

  let questions = parse_quiz_questions(&text);
  if questions.is_empty() {
    warn!(target: "quiz", text = %trunc_for_log(&text, 200), "No questions could be extracted");
    return Err(ApiError::Unprocessable {
      message: "Nu s-au putut genera întrebări valide".into(),
      details: preview(&text, 200),
    });
  }

  info!(target: "quiz", %region, %subject, count = questions.len(), "Quiz generated");
  Ok(questions)
}

#[instrument(level = "info", skip(state, req), fields(message_len = req.message.len()))]
pub async fn chat(state: &AppState, req: &ChatIn) -> Result<String, ApiError> {
  if req.message.trim().is_empty() {
    return Err(ApiError::BadRequest("Este necesară specificarea mesajului".into()));
  }
  let gemini = require_ai(state, MSG_KEY_MISSING)?;
  gemini
    .chat_about_question(&state.prompts, &req.context, req.message.trim())
    .await
    .map_err(|e| {
      error!(target: "assistant", error = %e, "Chat call failed");
      ApiError::internal("Nu am putut procesa întrebarea ta în acest moment. Te rog încearcă din nou.")
    })
}

#[instrument(level = "info", skip(state, req), fields(query_len = req.query.len(), history = req.history.len()))]
pub async fn virtual_assistant(state: &AppState, req: &AssistantIn) -> Result<String, ApiError> {
  if [&req.question, &req.context, &req.query].iter().any(|s| s.trim().is_empty()) {
    return Err(ApiError::BadRequest(
      "Este necesară specificarea întrebării, contextului și interogării".into(),
    ));
  }
  let gemini = require_ai(state, MSG_KEY_MISSING)?;
  let history = history_block(&req.history);

  match gemini.assistant_reply(&state.prompts, &req.context, &req.query, &history).await {
    Ok(text) => Ok(text),
    Err(e) => {
      error!(target: "assistant", error = %e, "Assistant call failed; using local reply.");
      Ok(assistant_reply_local(&req.context, &req.query))
    }
  }
}

/// Recent conversation turns, formatted for the assistant prompt.
pub fn history_block(history: &[HistoryMessage]) -> String {
  if history.is_empty() {
    return String::new();
  }
  let start = history.len().saturating_sub(ASSISTANT_HISTORY_WINDOW);
  let mut out = String::from("\n\nIstoric conversație (cele mai recente 3 mesaje):\n");
  for msg in &history[start..] {
    let who = if msg.role == "user" { "Elev" } else { "Asistent" };
    out.push_str(&format!("{}: {}\n", who, msg.content));
  }
  out
}

/// Keyword-driven reply used when the model is unreachable. The third line of
/// the context carries the official explanation.
pub fn assistant_reply_local(context: &str, query: &str) -> String {
  let explanation = context.split('\n').nth(2).unwrap_or("").replacen("Explicație: ", "", 1);

  if contains_any_ci(query, &["explica", "explică", "detalii", "mai mult"]) {
    format!(
      "Sigur, pot să-ți explic mai detaliat. {} Această informație este importantă pentru înțelegerea corectă a geografiei României.",
      explanation
    )
  } else if contains_any_ci(query, &["de ce", "motivul"]) {
    format!(
      "Motivul este legat de specificul regiunii. {} Acest aspect este relevant pentru examenul de Bacalaureat.",
      explanation
    )
  } else if contains_any_ci(query, &["unde", "localizare", "poziție", "pozitie"]) {
    format!("Din punct de vedere geografic, această regiune/acest fenomen se situează {}", explanation)
  } else if contains_any_ci(query, &["cum", "proces"]) {
    format!(
      "Procesul poate fi înțeles astfel: {} Acest concept este esențial pentru subiectul discutat.",
      explanation
    )
  } else {
    format!(
      "Referitor la întrebarea ta despre \"{}\": {} Sper că această informație te ajută. Poți să-mi pui întrebări suplimentare dacă dorești să aprofundăm subiectul.",
      query, explanation
    )
  }
}

#[instrument(level = "info", skip(state, req), fields(region1 = %req.region1, region2 = %req.region2))]
pub async fn evaluate_comparison(state: &AppState, req: &ComparisonIn) -> Result<ComparisonOut, ApiError> {
  if [&req.region1, &req.region1_notes, &req.region2, &req.region2_notes]
    .iter()
    .any(|s| s.trim().is_empty())
  {
    return Err(ApiError::BadRequest("Este necesară specificarea regiunilor și observațiilor".into()));
  }
  let gemini = require_ai(state, MSG_KEY_MISSING)?;

  let result = gemini
    .evaluate_comparison(
      &state.prompts,
      &req.region1,
      &req.region1_data.to_string(),
      &req.region1_notes,
      &req.region2,
      &req.region2_data.to_string(),
      &req.region2_notes,
    )
    .await;

  match result {
    Ok(feedback) => Ok(ComparisonOut {
      is_correct: true,
      message: "Evaluare completă a comparației:".into(),
      feedback,
      corrections: vec![],
    }),
    Err(e) => {
      error!(target: "assistant", error = %e, "Comparison call failed; using canned feedback.");
      Ok(comparison_fallback())
    }
  }
}

fn comparison_fallback() -> ComparisonOut {
  ComparisonOut {
    is_correct: false,
    message: "Nu am putut evalua comparația ta în acest moment.".into(),
    feedback: "Te rugăm să verifici că ai inclus informații relevante despre relief, râuri și alte caracteristici geografice importante pentru ambele regiuni.".into(),
    corrections: vec![Correction {
      field: "general".into(),
      correction: "Asigură-te că menționezi caracteristicile definitorii ale fiecărei regiuni și faci comparații directe între acestea.".into(),
    }],
  }
}

#[instrument(level = "info", skip(state, req), fields(count = ?req.count, exclude = req.exclude.len()))]
pub async fn generate_geo_items(state: &AppState, req: &GeoItemsIn) -> Result<Vec<GeoItem>, ApiError> {
  let count = clamp_count(req.count);
  let gemini = require_ai(state, MSG_API_MISCONFIGURED)?;
  let text = gemini
    .geo_items_text(&state.prompts, count, &req.exclude)
    .await
    .map_err(|e| {
      error!(target: "game", error = %e, "Geo item generation call failed");
      generation_error(e, "Serviciul de generare elemente nu este disponibil momentan")
    })?;

  let items = parse_geo_items(&text, &req.exclude).map_err(|e| {
    warn!(target: "game", error = %e, "Geo items rejected");
    let message = match e {
      GeoItemsError::Empty => "Nu s-au putut genera elemente valide",
      GeoItemsError::NotArray | GeoItemsError::NotJson(_) => "Formatul răspunsului AI nu este valid JSON",
    };
    ApiError::Unprocessable { message: message.into(), details: preview(&text, 200) }
  })?;

  info!(target: "game", requested = count, valid = items.len(), "Geo items generated");
  Ok(items)
}

fn game_out(session_id: &str, game: &GameSession, verdict: Option<Verdict>) -> GameOut {
  let current = game.current().cloned();
  GameOut {
    session_id: session_id.to_string(),
    hint: current.as_ref().map(|i| i.category.hint().to_string()),
    current_item: current,
    score: game.score(),
    total_items: game.total(),
    remaining: game.remaining(),
    finished: game.is_finished(),
    correct: verdict.as_ref().map(|v| v.correct),
    feedback: verdict.map(|v| v.message),
    summary: game.final_message(),
  }
}

/// Generate items and open a new game session for them. Stale sessions are
/// pruned first so abandoned games do not pile up.
#[instrument(level = "info", skip(state, req))]
pub async fn start_game(state: &AppState, req: &GeoItemsIn) -> Result<GameOut, ApiError> {
  let items = generate_geo_items(state, req).await?;
  let game = GameSession::shuffled(items);
  let id = Uuid::new_v4().to_string();
  let out = game_out(&id, &game, None);
  let mut games = state.games.write().await;
  prune_sessions(&mut games, Instant::now());
  games.insert(id.clone(), game);
  drop(games);
  info!(target: "game", session = %id, total = out.total_items, "Game session started");
  Ok(out)
}

/// Answer the current item of a session. Finished sessions are dropped.
#[instrument(level = "info", skip(state))]
pub async fn answer_game(state: &AppState, session_id: &str, country_iso2: &str) -> Result<GameOut, ApiError> {
  let mut games = state.games.write().await;
  let game = games
    .get_mut(session_id)
    .ok_or_else(|| ApiError::NotFound("Sesiune de joc necunoscută".into()))?;
  let verdict = game
    .answer(country_iso2)
    .ok_or_else(|| ApiError::BadRequest("Jocul s-a terminat".into()))?;
  let out = game_out(session_id, game, Some(verdict));
  if out.finished {
    games.remove(session_id);
    info!(target: "game", session = %session_id, score = out.score, total = out.total_items, "Game session finished");
  }
  Ok(out)
}

/// Client ids key the progress store and end up in a file; keep them tame.
pub fn validate_client_id(client: &str) -> Result<&str, ApiError> {
  let ok = !client.is_empty()
    && client.len() <= 64
    && client.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  if ok {
    Ok(client)
  } else {
    Err(ApiError::BadRequest("Identificator de client invalid".into()))
  }
}
