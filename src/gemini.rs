//! Minimal client for the Google generative-language API (`generateContent`).
//!
//! We send a single user turn and read back `candidates[0].content.parts[0].text`.
//! Calls are instrumented and log model names, latencies, and token usage (not contents).
//!
//! NOTE: The API key travels as a query parameter; it is never logged.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::{Prompts, Settings};
use crate::protocol::ChatContext;
use crate::util::{fill_template, preview};

#[derive(Debug, Error)]
pub enum AiError {
  #[error("request to generative API failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("generative API returned HTTP {status}: {message}")]
  Status { status: u16, message: String },
  #[error("generative API response could not be decoded: {0}")]
  Decode(#[from] serde_json::Error),
  #[error("generative API response carried no text")]
  MissingText { body: String },
}

/// Sampling parameters forwarded as `generationConfig`.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  pub temperature: f32,
  pub max_output_tokens: u32,
  pub top_p: f32,
  pub top_k: u32,
}

impl GenerationConfig {
  pub const QUIZ: Self = Self { temperature: 0.7, max_output_tokens: 2048, top_p: 0.8, top_k: 40 };
  pub const CHAT: Self = Self { temperature: 0.3, max_output_tokens: 1024, top_p: 0.8, top_k: 40 };
  pub const ASSISTANT: Self = Self { temperature: 0.3, max_output_tokens: 800, top_p: 0.8, top_k: 40 };
  pub const GEO_ITEMS: Self = Self { temperature: 0.8, max_output_tokens: 2048, top_p: 0.9, top_k: 40 };
}

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub quiz_model: String,
  pub chat_model: String,
}

impl Gemini {
  /// Construct the client if an API key is configured; otherwise return None.
  pub fn from_settings(settings: &Settings) -> Option<Self> {
    let api_key = settings.api_key.clone()?;
    let client = reqwest::Client::builder()
      .timeout(settings.request_timeout)
      .connect_timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| error!(target: "bac_geo", error = %e, "Failed to build HTTP client"))
      .ok()?;

    Some(Self {
      client,
      api_key,
      base_url: settings.gemini_base_url.trim_end_matches('/').to_string(),
      quiz_model: settings.quiz_model.clone(),
      chat_model: settings.chat_model.clone(),
    })
  }

  /// One-shot text generation.
  #[instrument(level = "info", skip(self, prompt), fields(model = %model, prompt_len = prompt.len()))]
  pub async fn generate(
    &self,
    model: &str,
    prompt: &str,
    generation_config: GenerationConfig,
  ) -> Result<String, AiError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, model);
    let req = GenerateContentRequest {
      contents: vec![ContentReq { parts: vec![PartReq { text: prompt }] }],
      generation_config,
    };

    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .query(&[("key", self.api_key.as_str())])
      .header(USER_AGENT, "bac-geo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      error!(status, elapsed = ?start.elapsed(), "Generative API returned an error status");
      return Err(AiError::Status { status, message });
    }

    let payload = res.text().await?;
    let raw: serde_json::Value = serde_json::from_str(&payload)?;
    let body: GenerateContentResponse = serde_json::from_value(raw.clone())?;
    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidates_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Generative API usage"
      );
    }

    let text = body
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .and_then(|c| c.parts.first())
      .and_then(|p| p.text.clone())
      .unwrap_or_default();

    if text.trim().is_empty() {
      return Err(AiError::MissingText { body: raw.to_string() });
    }

    info!(elapsed = ?start.elapsed(), text_len = text.len(), "Model response received");
    Ok(text)
  }

  // --- High-level helpers (domain-specialized) ---

  /// Raw quiz text for `region` + `subject`; parsing happens in `quiz_parser`.
  #[instrument(level = "info", skip(self, prompts), fields(%region, %subject, model = %self.quiz_model))]
  pub async fn quiz_text(
    &self,
    prompts: &Prompts,
    region: &str,
    subject: &str,
    count: usize,
  ) -> Result<String, AiError> {
    let focus = if subject.to_lowercase().contains("geograf") {
      &prompts.quiz_focus_geography
    } else {
      &prompts.quiz_focus_history
    };
    let count = count.to_string();
    let prompt = fill_template(
      &prompts.quiz_template,
      &[("count", count.as_str()), ("subject", subject), ("region", region), ("focus", focus.as_str())],
    );
    self.generate(&self.quiz_model, &prompt, GenerationConfig::QUIZ).await
  }

  /// Follow-up question about a single quiz item.
  #[instrument(level = "info", skip_all, fields(message_len = message.len(), region = %ctx.region))]
  pub async fn chat_about_question(
    &self,
    prompts: &Prompts,
    ctx: &ChatContext,
    message: &str,
  ) -> Result<String, AiError> {
    let prompt = fill_template(
      &prompts.chat_template,
      &[
        ("question", ctx.question.as_str()),
        ("correct_answer", ctx.correct_answer.as_str()),
        ("explanation", ctx.explanation.as_str()),
        ("subject", ctx.subject.as_str()),
        ("region", ctx.region.as_str()),
        ("message", message),
      ],
    );
    self.generate(&self.chat_model, &prompt, GenerationConfig::CHAT).await
  }

  /// Assistant reply with free-form context; `history_block` is appended verbatim.
  #[instrument(level = "info", skip_all, fields(query_len = query.len(), history_len = history_block.len()))]
  pub async fn assistant_reply(
    &self,
    prompts: &Prompts,
    context: &str,
    query: &str,
    history_block: &str,
  ) -> Result<String, AiError> {
    let mut prompt = fill_template(&prompts.assistant_template, &[("context", context), ("query", query)]);
    prompt.push_str(history_block);
    self.generate(&self.chat_model, &prompt, GenerationConfig::ASSISTANT).await
  }

  /// Feedback on a student's comparison of two regions.
  #[instrument(level = "info", skip_all, fields(%region1, %region2))]
  #[allow(clippy::too_many_arguments)]
  pub async fn evaluate_comparison(
    &self,
    prompts: &Prompts,
    region1: &str,
    region1_data: &str,
    region1_notes: &str,
    region2: &str,
    region2_data: &str,
    region2_notes: &str,
  ) -> Result<String, AiError> {
    let prompt = fill_template(
      &prompts.comparison_template,
      &[
        ("region1", region1),
        ("region1_data", region1_data),
        ("region1_notes", region1_notes),
        ("region2", region2),
        ("region2_data", region2_data),
        ("region2_notes", region2_notes),
      ],
    );
    self.generate(&self.chat_model, &prompt, GenerationConfig::CHAT).await
  }

  /// Raw JSON-ish text for `count` game items, avoiding `exclude` countries.
  #[instrument(level = "info", skip(self, prompts), fields(model = %self.quiz_model))]
  pub async fn geo_items_text(
    &self,
    prompts: &Prompts,
    count: usize,
    exclude: &[String],
  ) -> Result<String, AiError> {
    let exclude_rule = if exclude.is_empty() {
      String::new()
    } else {
      format!("4. Do not use these countries: {}", exclude.join(", "))
    };
    let count = count.to_string();
    let prompt = fill_template(
      &prompts.geo_items_template,
      &[("count", count.as_str()), ("exclude_rule", exclude_rule.as_str())],
    );
    let text = self.generate(&self.quiz_model, &prompt, GenerationConfig::GEO_ITEMS).await?;
    info!(preview = %preview(&text, 200), "Geo items text received");
    Ok(text)
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
  contents: Vec<ContentReq<'a>>,
  #[serde(rename = "generationConfig")]
  generation_config: GenerationConfig,
}
#[derive(Serialize)]
struct ContentReq<'a> {
  parts: Vec<PartReq<'a>>,
}
#[derive(Serialize)]
struct PartReq<'a> {
  text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<PartResp>,
}
#[derive(Deserialize)]
struct PartResp {
  #[serde(default)]
  text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count: Option<u32>,
  #[serde(default)]
  candidates_token_count: Option<u32>,
  #[serde(default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
pub(crate) mod testing {
  //! A throwaway local server standing in for the generative API.

  use axum::{http::StatusCode, routing::post, Json, Router};
  use serde_json::{json, Value};
  use tokio::net::TcpListener;

  use crate::config::Settings;

  /// Serve `status` + `body` for every `generateContent` call; returns the base URL.
  pub async fn spawn_fake(status: StatusCode, body: Value) -> String {
    serve(Router::new().route(
      "/v1beta/models/:call",
      post(move || {
        let body = body.clone();
        async move { (status, Json(body)) }
      }),
    ))
    .await
  }

  /// Like `spawn_fake`, but the body is sent as-is (not necessarily JSON).
  pub async fn spawn_fake_raw(status: StatusCode, body: &'static str) -> String {
    serve(Router::new().route("/v1beta/models/:call", post(move || async move { (status, body) }))).await
  }

  async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1beta")
  }

  pub fn text_reply(text: &str) -> Value {
    json!({
      "candidates": [{ "content": { "parts": [{ "text": text }] } }],
      "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 20, "totalTokenCount": 30 }
    })
  }

  pub fn settings_for(base_url: String) -> Settings {
    Settings { api_key: Some("test-key".into()), gemini_base_url: base_url, ..Settings::default() }
  }
}
