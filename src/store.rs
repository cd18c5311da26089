//! Persistence collaborator: a single insert into the managed table API
//! (Supabase REST). No update or query interface — saved tests are written
//! once and never touched again by this backend.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domain::{Question, SavedTest};
use crate::error::ApiError;

#[derive(Clone)]
pub struct TestStore {
  pub client: reqwest::Client,
  pub base_url: String,
  pub service_key: String,
}

impl TestStore {
  /// Construct the store if SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are
  /// both present; otherwise return None and saves fail with a clear error.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("SUPABASE_URL").ok()?;
    let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY").ok()?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string(), service_key })
  }

  /// Insert one test row and return the stored record.
  #[instrument(level = "info", skip(self, questions), fields(%lecture_id, n_questions = questions.len()))]
  pub async fn insert_test(
    &self,
    lecture_id: &str,
    questions: &[Question],
  ) -> Result<SavedTest, ApiError> {
    let url = format!("{}/rest/v1/tests", self.base_url);
    let body = serde_json::json!({
      "lecture_id": lecture_id,
      "questions": questions,
    });

    let res = self.client.post(&url)
      .header("apikey", &self.service_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
      .header(CONTENT_TYPE, "application/json")
      // Ask the table API to echo the inserted row back.
      .header("Prefer", "return=representation")
      .json(&body).send().await.map_err(|e| ApiError::Network(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let text = res.text().await.unwrap_or_default();
      let msg = extract_postgrest_error(&text).unwrap_or(text);
      return Err(ApiError::Save(format!("table API HTTP {}: {}", status, msg)));
    }

    // PostgREST returns the representation as a one-element array.
    let mut rows: Vec<SavedTest> =
      res.json().await.map_err(|e| ApiError::Save(format!("unreadable insert response: {e}")))?;
    let saved = rows
      .pop()
      .ok_or_else(|| ApiError::Save("insert returned no rows".into()))?;

    info!(target: "testgen", %lecture_id, "Test persisted");
    Ok(saved)
  }
}

/// Try to extract a clean error message from a PostgREST error body.
fn extract_postgrest_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EObj>(body) {
    Ok(e) => Some(e.message),
    Err(_) => None,
  }
}
