//! Per-client quiz progress: the active quiz, completion markers and a capped
//! history of finished quizzes.
//!
//! The store keeps everything in memory behind a `RwLock` and rewrites
//! `{data_dir}/progress.json` after each mutation. There is no merging:
//! the last write wins.

use std::{
  collections::{BTreeSet, HashMap},
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{HistoryItem, Quiz, QuizQuestion};

/// Completed quizzes kept per client; older entries fall off the end.
pub const HISTORY_CAP: usize = 20;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("progress file I/O failed: {0}")]
  Io(#[from] std::io::Error),
  #[error("progress file could not be encoded: {0}")]
  Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProgress {
  #[serde(default)]
  pub quiz: Option<Quiz>,
  /// Newest first.
  #[serde(default)]
  pub history: Vec<HistoryItem>,
  /// `region_subject` keys of quizzes already recorded in history.
  #[serde(default)]
  pub completed: BTreeSet<String>,
}

impl ClientProgress {
  /// Replace the active quiz with a fresh one.
  /// Its completion marker is cleared so a retake is recorded again.
  pub fn start_quiz(&mut self, region: String, subject: String, questions: Vec<QuizQuestion>) {
    let quiz = Quiz::new(region, subject, questions);
    self.completed.remove(&quiz.completion_key());
    self.quiz = Some(quiz);
  }

  /// Record `answer` for question `index`. Out-of-range indices are ignored.
  /// Returns the history entry when this answer completed the quiz.
  pub fn select_answer(&mut self, index: usize, answer: String) -> Option<HistoryItem> {
    let quiz = self.quiz.as_mut()?;
    let slot = quiz.user_answers.get_mut(index)?;
    *slot = Some(answer);
    self.auto_complete()
  }

  pub fn next_question(&mut self) {
    if let Some(quiz) = self.quiz.as_mut() {
      if quiz.current_question + 1 < quiz.questions.len() {
        quiz.current_question += 1;
      }
    }
  }

  pub fn previous_question(&mut self) {
    if let Some(quiz) = self.quiz.as_mut() {
      quiz.current_question = quiz.current_question.saturating_sub(1);
    }
  }

  /// Number of answers equal to the option the correct letter points at.
  pub fn score(&self) -> usize {
    let Some(quiz) = &self.quiz else { return 0 };
    quiz
      .user_answers
      .iter()
      .zip(&quiz.questions)
      .filter(|(answer, q)| match answer {
        Some(a) if !a.is_empty() => q.correct_option() == Some(a.as_str()),
        _ => false,
      })
      .count()
  }

  /// Push the active quiz's result onto history (newest first, capped).
  pub fn complete_quiz(&mut self) -> Option<HistoryItem> {
    let quiz = self.quiz.as_ref()?;
    let score = self.score();
    let total = quiz.questions.len();
    let percentage_score = if total == 0 { 0.0 } else { score as f64 / total as f64 * 100.0 };

    let item = HistoryItem {
      id: Uuid::new_v4().to_string(),
      date: Utc::now().to_rfc3339(),
      region: quiz.region.clone(),
      subject: quiz.subject.clone(),
      score,
      total_questions: total,
      percentage_score,
    };
    self.history.insert(0, item.clone());
    self.history.truncate(HISTORY_CAP);
    Some(item)
  }

  /// Complete the quiz once every question is answered, unless its marker is set.
  fn auto_complete(&mut self) -> Option<HistoryItem> {
    let key = {
      let quiz = self.quiz.as_ref()?;
      if !quiz.all_answered() {
        return None;
      }
      quiz.completion_key()
    };
    if !self.completed.insert(key) {
      return None;
    }
    self.complete_quiz()
  }

  /// Drop the active quiz and its completion marker.
  pub fn reset_quiz(&mut self) {
    if let Some(quiz) = self.quiz.take() {
      self.completed.remove(&quiz.completion_key());
    }
  }

  pub fn clear_history(&mut self) {
    self.history.clear();
  }
}

#[derive(Clone)]
pub struct ProgressStore {
  clients: Arc<RwLock<HashMap<String, ClientProgress>>>,
  path: Option<PathBuf>,
}

impl ProgressStore {
  /// Store that never touches disk.
  #[cfg(test)]
  pub fn in_memory() -> Self {
    Self { clients: Arc::new(RwLock::new(HashMap::new())), path: None }
  }

  /// Load `{data_dir}/progress.json` if present. A missing file starts empty;
  /// an unreadable or corrupt file is logged and also starts empty.
  #[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
  pub fn open(data_dir: &Path) -> Self {
    let path = data_dir.join("progress.json");
    let clients = match std::fs::read_to_string(&path) {
      Ok(s) => match serde_json::from_str::<HashMap<String, ClientProgress>>(&s) {
        Ok(map) => {
          info!(target: "progress", clients = map.len(), "Loaded saved progress");
          map
        }
        Err(e) => {
          error!(target: "progress", error = %e, "Saved progress is corrupt; starting empty");
          HashMap::new()
        }
      },
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(target: "progress", "No saved progress yet");
        HashMap::new()
      }
      Err(e) => {
        error!(target: "progress", error = %e, "Failed to read saved progress; starting empty");
        HashMap::new()
      }
    };
    Self { clients: Arc::new(RwLock::new(clients)), path: Some(path) }
  }

  /// Current progress for `client` (empty when unknown).
  pub async fn get(&self, client: &str) -> ClientProgress {
    self.clients.read().await.get(client).cloned().unwrap_or_default()
  }

  /// Apply `f` to a copy of the client's progress, persist, and return `f`'s
  /// result with the updated progress. The change only stays live when the
  /// file was written. The lock is held across the write so files land in order.
  #[instrument(level = "debug", skip(self, f), fields(%client))]
  pub async fn update<F, R>(&self, client: &str, f: F) -> Result<(R, ClientProgress), StoreError>
  where
    F: FnOnce(&mut ClientProgress) -> R,
  {
    let mut clients = self.clients.write().await;
    let mut next = clients.get(client).cloned().unwrap_or_default();
    let out = f(&mut next);
    let previous = clients.insert(client.to_string(), next.clone());

    if let Some(path) = &self.path {
      if let Err(e) = persist(path, &clients).await {
        match previous {
          Some(p) => clients.insert(client.to_string(), p),
          None => clients.remove(client),
        };
        error!(target: "progress", %client, error = %e, "Progress not saved; change rolled back");
        return Err(e);
      }
    }
    Ok((out, next))
  }
}

async fn persist(path: &Path, clients: &HashMap<String, ClientProgress>) -> Result<(), StoreError> {
  if let Some(dir) = path.parent() {
    tokio::fs::create_dir_all(dir).await?;
  }
  let json = serde_json::to_vec_pretty(clients)?;
  let tmp = path.with_extension("json.tmp");
  tokio::fs::write(&tmp, json).await?;
  tokio::fs::rename(&tmp, path).await.map_err(|e| {
    warn!(target: "progress", error = %e, "Failed to move progress file into place");
    StoreError::from(e)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(n: usize, letter: &str) -> QuizQuestion {
    QuizQuestion {
      question: format!("Întrebarea {n}"),
      options: ["A", "B", "C", "D"].iter().map(|o| format!("{o}{n}")).collect(),
      correct_answer: letter.into(),
      explanation: "De ce".into(),
    }
  }

  fn started(n: usize) -> ClientProgress {
    let mut p = ClientProgress::default();
    p.start_quiz("Banat".into(), "Geografie".into(), (0..n).map(|i| question(i, "B")).collect());
    p
  }

  #[test]
  fn score_counts_answers_matching_correct_option() {
    let mut p = started(3);
    p.select_answer(0, "B0".into());
    p.select_answer(1, "A1".into());
    assert_eq!(p.score(), 1);
  }

  #[test]
  fn out_of_range_answer_is_ignored() {
    let mut p = started(2);
    assert!(p.select_answer(5, "B5".into()).is_none());
    assert_eq!(p.quiz.as_ref().unwrap().user_answers, vec![None, None]);
  }

  #[test]
  fn navigation_is_bounded() {
    let mut p = started(2);
    p.previous_question();
    assert_eq!(p.quiz.as_ref().unwrap().current_question, 0);
    p.next_question();
    p.next_question();
    assert_eq!(p.quiz.as_ref().unwrap().current_question, 1);
    p.previous_question();
    assert_eq!(p.quiz.as_ref().unwrap().current_question, 0);
  }

  #[test]
  fn answering_everything_completes_exactly_once() {
    let mut p = started(2);
    assert!(p.select_answer(0, "B0".into()).is_none());
    let item = p.select_answer(1, "C1".into()).expect("auto-complete");
    assert_eq!(item.score, 1);
    assert_eq!(item.total_questions, 2);
    assert_eq!(item.percentage_score, 50.0);
    assert!(p.select_answer(1, "B1".into()).is_none());
    assert_eq!(p.history.len(), 1);
    assert!(p.completed.contains("Banat_Geografie"));
  }

  #[test]
  fn history_is_newest_first_and_capped() {
    let mut p = started(1);
    for _ in 0..(HISTORY_CAP + 5) {
      p.complete_quiz();
    }
    assert_eq!(p.history.len(), HISTORY_CAP);
    p.select_answer(0, "B0".into());
    assert_eq!(p.history.len(), HISTORY_CAP);
    assert_eq!(p.history[0].score, 1);
  }

  #[test]
  fn reset_clears_quiz_and_marker_but_keeps_history() {
    let mut p = started(1);
    p.select_answer(0, "B0".into());
    p.reset_quiz();
    assert!(p.quiz.is_none());
    assert!(p.completed.is_empty());
    assert_eq!(p.history.len(), 1);
    p.clear_history();
    assert!(p.history.is_empty());
  }

  #[test]
  fn operations_without_quiz_are_noops() {
    let mut p = ClientProgress::default();
    p.next_question();
    p.previous_question();
    assert!(p.complete_quiz().is_none());
    assert!(p.select_answer(0, "x".into()).is_none());
    assert_eq!(p.score(), 0);
  }

  #[tokio::test]
  async fn store_persists_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open(dir.path());
    store
      .update("elev-1", |p| {
        p.start_quiz("Moldova".into(), "Istorie".into(), vec![question(0, "A")]);
        p.select_answer(0, "A0".into())
      })
      .await
      .unwrap();

    let reopened = ProgressStore::open(dir.path());
    let p = reopened.get("elev-1").await;
    assert_eq!(p.history.len(), 1);
    assert_eq!(p.history[0].region, "Moldova");
    assert_eq!(reopened.get("necunoscut").await, ClientProgress::default());
  }

  #[tokio::test]
  async fn failed_save_leaves_progress_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    let store = ProgressStore::open(&blocker.join("data"));

    let res = store
      .update("elev-1", |p| p.start_quiz("Banat".into(), "Istorie".into(), vec![question(0, "A")]))
      .await;
    assert!(res.is_err());
    assert_eq!(store.get("elev-1").await, ClientProgress::default());
  }

  #[tokio::test]
  async fn corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("progress.json"), "{not json").unwrap();
    let store = ProgressStore::open(dir.path());
    assert!(store.get("elev-1").await.quiz.is_none());
  }
}
