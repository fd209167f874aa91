//! Runtime settings (environment variables) and prompt templates (optional TOML).
//!
//! Environment:
//!   PORT                 : u16 (default 3000)
//!   GOOGLE_AI_API_KEY    : enables the generative-language API if present
//!   GEMINI_BASE_URL      : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_QUIZ_MODEL    : default "gemini-2.0-flash" (quiz + game items)
//!   GEMINI_CHAT_MODEL    : default "gemini-1.5-flash" (chat, assistant, comparison)
//!   GEMINI_TIMEOUT_SECS  : default 30
//!   DATA_DIR             : where progress.json lives (default "./data")
//!   STATIC_DIR           : prebuilt UI (default "./static")
//!   PROMPTS_CONFIG_PATH  : TOML file with a `[prompts]` table overriding the defaults

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct Settings {
  pub port: u16,
  pub api_key: Option<String>,
  pub gemini_base_url: String,
  pub quiz_model: String,
  pub chat_model: String,
  pub request_timeout: Duration,
  pub data_dir: PathBuf,
  pub static_dir: PathBuf,
  pub prompts_path: Option<PathBuf>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      port: 3000,
      api_key: None,
      gemini_base_url: DEFAULT_BASE_URL.into(),
      quiz_model: "gemini-2.0-flash".into(),
      chat_model: "gemini-1.5-flash".into(),
      request_timeout: Duration::from_secs(30),
      data_dir: PathBuf::from("./data"),
      static_dir: PathBuf::from("./static"),
      prompts_path: None,
    }
  }
}

impl Settings {
  /// Read settings from the environment, falling back to defaults per field.
  pub fn from_env() -> Self {
    let d = Self::default();
    let var = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());

    Self {
      port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(d.port),
      api_key: var("GOOGLE_AI_API_KEY"),
      gemini_base_url: var("GEMINI_BASE_URL").unwrap_or(d.gemini_base_url),
      quiz_model: var("GEMINI_QUIZ_MODEL").unwrap_or(d.quiz_model),
      chat_model: var("GEMINI_CHAT_MODEL").unwrap_or(d.chat_model),
      request_timeout: var("GEMINI_TIMEOUT_SECS")
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(d.request_timeout),
      data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or(d.data_dir),
      static_dir: var("STATIC_DIR").map(PathBuf::from).unwrap_or(d.static_dir),
      prompts_path: var("PROMPTS_CONFIG_PATH").map(PathBuf::from),
    }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PromptConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt templates sent to the model. `{name}` placeholders are filled per request.
/// Any field missing from the TOML keeps its default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// Vars: {count}, {subject}, {region}, {focus}
  pub quiz_template: String,
  pub quiz_focus_geography: String,
  pub quiz_focus_history: String,
  /// Vars: {question}, {correct_answer}, {explanation}, {subject}, {region}, {message}
  pub chat_template: String,
  /// Vars: {context}, {query}
  pub assistant_template: String,
  /// Vars: {region1}, {region1_data}, {region1_notes}, {region2}, {region2_data}, {region2_notes}
  pub comparison_template: String,
  /// Vars: {count}, {exclude_rule}
  pub geo_items_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_template: r#"Creează {count} întrebări de examen tip grilă pentru Bacalaureat la {subject} despre {region}.
Fiecare întrebare trebuie să respecte EXACT acest format:

Q1. [Întrebare]
A) [Opțiune A]
B) [Opțiune B]
C) [Opțiune C]
D) [Opțiune D]
Correct: [A/B/C/D]
Explanation: [Explicație]

INSTRUCȚIUNI SPECIALE:
- Pentru întrebările formulate negativ (care conțin "NU" sau "nu este"), explicația clarifică de ce răspunsul corect NU este caracteristic regiunii și de ce celelalte opțiuni SUNT.
- Folosește exemple concrete în explicații.
- Evită ambiguitatea în formularea întrebărilor negative.

Concentrează-te pe: {focus}"#
        .into(),
      quiz_focus_geography: "relief, hidrografie, climă, populație, resurse naturale".into(),
      quiz_focus_history: "evenimente istorice, personalități, monumente, tradiții".into(),
      chat_template: r#"Ești un asistent virtual educațional pentru elevi care se pregătesc pentru Bacalaureat în România.
Ajută elevul să înțeleagă materia de geografie, cu un ton prietenos și încurajator.

Context despre întrebarea din quiz:
Întrebarea: "{question}"
Răspunsul corect: "{correct_answer}"
Explicația oficială: "{explanation}"
Subiectul: {subject}
Regiunea: {region}

Dacă întrebarea este formulată negativ (conține "NU" sau "nu este"), explică explicit că se caută ce NU este caracteristic și de ce celelalte opțiuni SUNT caracteristice.

Întrebarea elevului: {message}

Răspunde în limba română, concis dar informativ, cu exemple concrete."#
        .into(),
      assistant_template: r#"Ești un asistent virtual educațional pentru elevi care se pregătesc pentru Bacalaureat în România.

Context despre întrebarea din quiz:
{context}

Întrebarea elevului:
{query}

Răspunde în limba română, oferind informații precise și educative. Menține răspunsul concis dar informativ."#
        .into(),
      comparison_template: r#"Ești un expert în geografia României specializat în educație pentru Bacalaureat.
Evaluează comparația făcută de elev între două regiuni geografice din România.

REGIUNEA 1: {region1}
Date despre {region1}: {region1_data}
Observațiile elevului despre {region1}: "{region1_notes}"

REGIUNEA 2: {region2}
Date despre {region2}: {region2_data}
Observațiile elevului despre {region2}: "{region2_notes}"

Evaluează corectitudinea informațiilor, elementele geografice importante menționate, calitatea comparației și ce lipsește.
Oferă feedback constructiv și 2-3 exemple concrete de comparație eficientă. Răspunde în limba română, pe secțiuni clare."#
        .into(),
      geo_items_template: r#"You create bite-sized items for a European-countries map game used by Romanian high-school students preparing the Bacalaureat (Geografie).

TASK
1. Generate {count} UNIQUE items, each in EXACTLY ONE category:
   CAPITAL (capital city), RIVER (major river through the country), RELIEF (major landform mainly in the country), EU_FACT (EU / Schengen / euro adoption fact).
2. Only use the sovereign states usually counted in Europe (Council of Europe members + Kosovo). No micro-territories.
3. Output MUST be a valid UTF-8 JSON array and nothing else.
{exclude_rule}

FIELDS per item: "label" (max 3 words), "country_iso2" (ISO-3166-1 alpha-2), "category" (CAPITAL | RIVER | RELIEF | EU_FACT), "explanation" (one sentence in Romanian).

EXAMPLE
[{"label": "Ljubljana", "country_iso2": "SI", "category": "CAPITAL", "explanation": "Ljubljana este capitala Sloveniei încă din 1991."}]

Do not repeat a country within the batch. Return exactly the JSON array now."#
        .into(),
    }
  }
}

/// Attempt to load `PromptConfig` from `path`. On any parsing/IO error, returns None.
pub fn load_prompt_config(path: &PathBuf) -> Option<PromptConfig> {
  let shown = path.display().to_string();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<PromptConfig>(&s) {
      Ok(cfg) => {
        info!(target: "bac_geo", path = %shown, "Loaded prompt config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "bac_geo", path = %shown, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "bac_geo", path = %shown, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Prompts from the configured TOML file, or the built-in defaults.
pub fn resolve_prompts(settings: &Settings) -> Prompts {
  settings
    .prompts_path
    .as_ref()
    .and_then(load_prompt_config)
    .map(|c| c.prompts)
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn partial_toml_keeps_other_defaults() {
    let cfg: PromptConfig = toml::from_str(
      r#"
[prompts]
quiz_focus_history = "domnitori"
"#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.quiz_focus_history, "domnitori");
    assert_eq!(cfg.prompts.quiz_focus_geography, Prompts::default().quiz_focus_geography);
  }

  #[test]
  fn broken_toml_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[prompts\nquiz_template = ").unwrap();
    let settings = Settings { prompts_path: Some(file.path().to_path_buf()), ..Settings::default() };
    let prompts = resolve_prompts(&settings);
    assert_eq!(prompts.quiz_template, Prompts::default().quiz_template);
  }

  #[test]
  fn toml_file_overrides_are_applied() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[prompts]\nassistant_template = \"Ctx: {{context}} / {{query}}\"\n").unwrap();
    let settings = Settings { prompts_path: Some(file.path().to_path_buf()), ..Settings::default() };
    assert_eq!(resolve_prompts(&settings).assistant_template, "Ctx: {context} / {query}");
  }

  #[test]
  fn default_templates_carry_their_placeholders() {
    let p = Prompts::default();
    for var in ["{count}", "{subject}", "{region}", "{focus}"] {
      assert!(p.quiz_template.contains(var), "quiz template lacks {var}");
    }
    assert!(p.geo_items_template.contains("{exclude_rule}"));
    assert!(p.chat_template.contains("{message}"));
  }
}
