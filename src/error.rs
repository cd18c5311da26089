//! Error taxonomy surfaced by the API.
//!
//! Four kinds, all user-visible (§ error policy: nothing is silently swallowed,
//! no automatic retries):
//!   - `Validation`      : bad caller input (400)
//!   - `GenerationParse` : model output could not be read as a question array (500, raw attached)
//!   - `Network`         : transport failure talking to OpenAI or the table API (500)
//!   - `Save`            : the table API rejected the write (500)

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),

  #[error("failed to parse model output")]
  GenerationParse {
    /// Raw model text, echoed back for diagnostics.
    raw: String,
  },

  #[error("network error: {0}")]
  Network(String),

  #[error("save failed: {0}")]
  Save(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::GenerationParse { .. } | ApiError::Network(_) | ApiError::Save(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::GenerationParse { raw } => serde_json::json!({
        "error": self.to_string(),
        "raw": raw,
      }),
      _ => serde_json::json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
