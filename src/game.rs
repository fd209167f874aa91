//! Country-matching game: validation of AI-generated geo items and the
//! per-round scoring rules.

use std::{
  collections::{HashMap, HashSet},
  time::{Duration, Instant},
};

use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{GeoCategory, GeoItem};
use crate::util::strip_code_fence;

pub const DEFAULT_ITEM_COUNT: usize = 5;
pub const MAX_ITEM_COUNT: usize = 20;
/// Sessions with no answer for this long are dropped.
pub const GAME_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
/// Upper bound on live sessions; the least recently used go first.
pub const MAX_GAME_SESSIONS: usize = 1000;

#[derive(Debug, Error)]
pub enum GeoItemsError {
  #[error("model output is not valid JSON: {0}")]
  NotJson(#[from] serde_json::Error),
  #[error("model output is not a JSON array")]
  NotArray,
  #[error("model output contained no usable items")]
  Empty,
}

/// Loose shape of an item as the model emits it; every field may be missing.
#[derive(Deserialize)]
struct RawItem {
  #[serde(default)]
  label: Option<String>,
  #[serde(default)]
  country_iso2: Option<String>,
  #[serde(default)]
  category: Option<String>,
  #[serde(default)]
  explanation: Option<String>,
}

impl RawItem {
  fn into_item(self) -> Option<GeoItem> {
    let non_empty = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    Some(GeoItem {
      label: non_empty(self.label)?,
      country_iso2: non_empty(self.country_iso2)?.to_uppercase(),
      category: GeoCategory::parse(non_empty(self.category)?.as_str())?,
      explanation: non_empty(self.explanation)?,
    })
  }
}

/// Clamp a requested item count to `1..=MAX_ITEM_COUNT`, defaulting when absent.
pub fn clamp_count(requested: Option<usize>) -> usize {
  requested.unwrap_or(DEFAULT_ITEM_COUNT).clamp(1, MAX_ITEM_COUNT)
}

/// Parse model output into valid items, dropping incomplete ones, unknown
/// categories, and countries listed in `exclude`.
pub fn parse_geo_items(text: &str, exclude: &[String]) -> Result<Vec<GeoItem>, GeoItemsError> {
  let cleaned = strip_code_fence(text);
  let value: serde_json::Value = serde_json::from_str(cleaned)?;
  let serde_json::Value::Array(entries) = value else {
    return Err(GeoItemsError::NotArray);
  };

  let excluded: HashSet<String> = exclude.iter().map(|c| c.trim().to_uppercase()).collect();
  let total = entries.len();
  let items: Vec<GeoItem> = entries
    .into_iter()
    .filter_map(|v| serde_json::from_value::<RawItem>(v).ok())
    .filter_map(RawItem::into_item)
    .filter(|item| !excluded.contains(&item.country_iso2))
    .collect();

  debug!(target: "game", total, valid = items.len(), "Geo items validated");
  if items.is_empty() {
    return Err(GeoItemsError::Empty);
  }
  Ok(items)
}

/// Outcome of clicking a country for the current item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
  pub correct: bool,
  pub message: String,
}

/// Compare a clicked country against the item's target (case-insensitive).
pub fn check_answer(item: &GeoItem, country_iso2: &str) -> Verdict {
  let correct = country_iso2.trim().eq_ignore_ascii_case(item.country_iso2.trim());
  let message = if correct {
    format!("✅ Corect! {}", item.explanation)
  } else {
    format!("❌ Greșit! {}", item.explanation)
  };
  Verdict { correct, message }
}

/// One round of the game: a queue of items, worked through front to back.
#[derive(Clone, Debug)]
pub struct GameSession {
  items: Vec<GeoItem>,
  score: usize,
  total: usize,
  last_active: Instant,
}

impl GameSession {
  pub fn new(items: Vec<GeoItem>) -> Self {
    let total = items.len();
    Self { items, score: 0, total, last_active: Instant::now() }
  }

  /// Same as `new` but in random order.
  pub fn shuffled(mut items: Vec<GeoItem>) -> Self {
    items.shuffle(&mut rand::thread_rng());
    Self::new(items)
  }

  pub fn current(&self) -> Option<&GeoItem> {
    self.items.first()
  }

  pub fn score(&self) -> usize {
    self.score
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn remaining(&self) -> usize {
    self.items.len()
  }

  pub fn is_finished(&self) -> bool {
    self.items.is_empty()
  }

  pub fn last_active(&self) -> Instant {
    self.last_active
  }

  /// Answer the current item. A correct answer scores and advances; a wrong
  /// one leaves the item in place. Returns None when the round is over.
  pub fn answer(&mut self, country_iso2: &str) -> Option<Verdict> {
    let verdict = check_answer(self.current()?, country_iso2);
    self.last_active = Instant::now();
    if verdict.correct {
      self.score += 1;
      self.items.remove(0);
    }
    Some(verdict)
  }

  /// Closing line once every item has been matched.
  pub fn final_message(&self) -> Option<String> {
    self.is_finished().then(|| {
      format!("🎉 Felicitări! Ai terminat jocul cu scorul {}/{}!", self.score, self.total)
    })
  }
}

/// Drop sessions idle past `GAME_SESSION_TTL`, then evict the least recently
/// used until there is room for one more.
pub fn prune_sessions(games: &mut HashMap<String, GameSession>, now: Instant) {
  let before = games.len();
  games.retain(|_, g| now.saturating_duration_since(g.last_active) < GAME_SESSION_TTL);
  while games.len() >= MAX_GAME_SESSIONS {
    let Some(oldest) = games.iter().min_by_key(|(_, g)| g.last_active).map(|(id, _)| id.clone()) else {
      break;
    };
    games.remove(&oldest);
  }
  if games.len() != before {
    debug!(target: "game", dropped = before - games.len(), live = games.len(), "Game sessions pruned");
  }
}
