//! Extraction of multiple-choice questions from free-form model output.
//!
//! The model is asked to answer with blocks shaped like:
//!
//! ```text
//! Q1. <question>
//! A) <option>
//! B) <option>
//! C) <option>
//! D) <option>
//! Correct: <A|B|C|D>
//! Explanation: <text>
//! ```
//!
//! The text is first split on `Q<n>` markers at the start of a line, then each block is matched
//! against a single pattern. Blocks that do not match, or that end up with an
//! empty field, are dropped.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::QuizQuestion;

fn marker_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"(?m)^[ \t]*(?:\*\*)?Q\d+\.?(?:\*\*)?\s+").expect("question marker regex")
  })
}

fn block_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(concat!(
      r"(?s)^(?P<q>.+?)",
      r"\s+(?:\*\*)?A\)(?:\*\*)?\s*(?P<a>.+?)",
      r"\s+(?:\*\*)?B\)(?:\*\*)?\s*(?P<b>.+?)",
      r"\s+(?:\*\*)?C\)(?:\*\*)?\s*(?P<c>.+?)",
      r"\s+(?:\*\*)?D\)(?:\*\*)?\s*(?P<d>.+?)",
      r"\s+(?:\*\*)?(?i:correct)(?:\s+(?i:answer))?:?(?:\*\*)?\s*(?P<correct>[A-Da-d])\)?",
      r"\s+(?:\*\*)?(?i:explanation):?(?:\*\*)?\s*(?P<exp>.+)$",
    ))
    .expect("question block regex")
  })
}

fn clean(s: &str) -> String {
  s.trim().trim_matches('*').trim().to_string()
}

/// Parse one block (the text following a `Q<n>` marker).
fn parse_block(block: &str) -> Option<QuizQuestion> {
  let caps = block_re().captures(block.trim())?;
  let field = |name: &str| caps.name(name).map(|m| clean(m.as_str())).unwrap_or_default();

  let question = field("q");
  let options = vec![field("a"), field("b"), field("c"), field("d")];
  let correct_answer = field("correct").to_uppercase();
  let explanation = field("exp");

  if question.is_empty() || options.iter().any(String::is_empty) || explanation.is_empty() {
    return None;
  }

  Some(QuizQuestion { question, options, correct_answer, explanation })
}

/// Extract every well-formed question from `text`, in order of appearance.
#[instrument(level = "debug", skip(text), fields(text_len = text.len()))]
pub fn parse_quiz_questions(text: &str) -> Vec<QuizQuestion> {
  let markers: Vec<_> = marker_re().find_iter(text).collect();
  let mut questions = Vec::with_capacity(markers.len());

  for (i, m) in markers.iter().enumerate() {
    let end = markers.get(i + 1).map(|next| next.start()).unwrap_or(text.len());
    let block = &text[m.end()..end];
    match parse_block(block) {
      Some(q) => questions.push(q),
      None => debug!(target: "quiz", index = i + 1, "Dropping malformed question block"),
    }
  }

  debug!(target: "quiz", blocks = markers.len(), parsed = questions.len(), "Quiz text parsed");
  questions
}
