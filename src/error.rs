//! HTTP-facing errors. Every variant renders as `{"error": ..., "details"?: ...}`
//! with the status code the UI expects for that failure.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::warn;

use crate::progress::StoreError;
use crate::protocol::ErrorOut;

#[derive(Debug, Error)]
pub enum ApiError {
  /// 400: the request is missing required fields.
  #[error("{0}")]
  BadRequest(String),
  /// 404: unknown resource id.
  #[error("{0}")]
  NotFound(String),
  /// 422: the model answered but nothing usable could be extracted.
  #[error("{message}")]
  Unprocessable { message: String, details: String },
  /// 503: the generative API refused or could not be reached.
  #[error("{message}")]
  Unavailable { message: String, details: String },
  /// 500: configuration problems and anything unexpected.
  #[error("{message}")]
  Internal { message: String, details: Option<String> },
}

impl ApiError {
  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal { message: message.into(), details: None }
  }

  pub fn internal_with(message: impl Into<String>, details: impl Into<String>) -> Self {
    Self::Internal { message: message.into(), details: Some(details.into()) }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
      Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    Self::internal_with("Nu am putut salva progresul", e.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let error = self.to_string();
    let details = match self {
      Self::Unprocessable { details, .. } | Self::Unavailable { details, .. } => Some(details),
      Self::Internal { details, .. } => details,
      Self::BadRequest(_) | Self::NotFound(_) => None,
    };
    if status.is_server_error() {
      warn!(target: "bac_geo", status = status.as_u16(), %error, "Request failed");
    }
    (status, Json(ErrorOut { error, details })).into_response()
  }
}
