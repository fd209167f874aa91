//! Domain models used by the backend: quiz questions, quiz sessions, history
//! entries, geo items for the country game, and region reference data.

use serde::{Deserialize, Serialize};

/// One multiple-choice question. `correct_answer` holds the letter (A–D).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  pub explanation: String,
}

impl QuizQuestion {
  /// Index of the correct option. Unknown letters fall back to option A.
  pub fn correct_index(&self) -> usize {
    match self.correct_answer.trim() {
      "B" => 1,
      "C" => 2,
      "D" => 3,
      _ => 0,
    }
  }

  /// Text of the option the correct letter points at.
  pub fn correct_option(&self) -> Option<&str> {
    self.options.get(self.correct_index()).map(String::as_str)
  }

  /// Shape check applied to questions received from clients:
  /// non-empty text, exactly four options, a letter and an explanation.
  pub fn is_well_formed(&self) -> bool {
    !self.question.trim().is_empty()
      && self.options.len() == 4
      && !self.correct_answer.trim().is_empty()
      && !self.explanation.trim().is_empty()
  }
}

/// A quiz in progress for one client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
  pub region: String,
  pub subject: String,
  pub questions: Vec<QuizQuestion>,
  pub user_answers: Vec<Option<String>>,
  pub current_question: usize,
}

impl Quiz {
  /// Fresh quiz: no answers yet, positioned on the first question.
  pub fn new(region: String, subject: String, questions: Vec<QuizQuestion>) -> Self {
    let user_answers = vec![None; questions.len()];
    Self { region, subject, questions, user_answers, current_question: 0 }
  }

  /// Key used for the per region/subject completion marker.
  pub fn completion_key(&self) -> String {
    format!("{}_{}", self.region, self.subject)
  }

  pub fn all_answered(&self) -> bool {
    !self.questions.is_empty() && self.user_answers.iter().all(Option::is_some)
  }
}

/// A completed quiz, as listed on the progress page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
  pub id: String,
  pub date: String,
  pub region: String,
  pub subject: String,
  pub score: usize,
  pub total_questions: usize,
  pub percentage_score: f64,
}

/// Categories of the country-matching game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeoCategory {
  Capital,
  River,
  Relief,
  EuFact,
}

impl GeoCategory {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "CAPITAL" => Some(Self::Capital),
      "RIVER" => Some(Self::River),
      "RELIEF" => Some(Self::Relief),
      "EU_FACT" => Some(Self::EuFact),
      _ => None,
    }
  }

  /// Hint shown next to the card in the game UI.
  pub fn hint(&self) -> &'static str {
    match self {
      Self::Capital => "Caută țara al cărei oraș principal este acesta.",
      Self::River => "Caută țara prin care trece acest râu.",
      Self::Relief => "Caută țara în care se află acest element de relief.",
      Self::EuFact => "Caută țara la care se referă acest fapt despre UE.",
    }
  }
}

/// One AI-generated card for the country-matching game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoItem {
  pub label: String,
  pub country_iso2: String,
  pub category: GeoCategory,
  pub explanation: String,
}

/// Reference sheet used by the region comparator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSheet {
  pub name: String,
  pub relief: String,
  pub rivers: String,
  pub population: String,
  pub resources: String,
  pub climate: String,
  pub economy: String,
}

/// Region shown on the interactive map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
  pub id: String,
  pub name: String,
  pub coordinates: [f64; 2],
  pub description: String,
  pub facts: Vec<String>,
  pub resources: Vec<String>,
  pub protected_areas: Vec<String>,
}

/// Map region with the terrain and population data used by the 3D view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainRegion {
  #[serde(flatten)]
  pub region: MapRegion,
  /// Mean elevation in metres.
  pub elevation: u32,
  pub population: u64,
  pub main_cities: Vec<String>,
  pub climate: String,
  pub vegetation: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourQuiz {
  pub question: String,
  pub options: Vec<String>,
  /// Zero-based index into `options`.
  pub answer: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliefTourStep {
  pub title: String,
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quiz: Option<TourQuiz>,
}
