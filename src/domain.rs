//! Domain models used by the backend: canonical questions, correctness markers,
//! and the persisted test record.

use serde::{Deserialize, Serialize};

/// Canonical, validated quiz question. Always exactly 4 options;
/// `options[correct_index]` is the semantically correct answer, before and
/// after shuffling.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub question: String,
  pub options: Vec<String>,
  #[serde(rename = "correctIndex")]
  pub correct_index: usize,
  #[serde(default)]
  pub explanation: String,
}

/// How the model marked the correct option in its raw output.
///
/// Resolution order: exact (trimmed) text match wins; otherwise a single
/// letter A–D (any case); otherwise `Unresolved`, which falls back to
/// index 0 — an explicit, logged decision rather than a hidden default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorrectMarker {
  ExactText(usize),
  Letter(usize),
  Unresolved,
}

impl CorrectMarker {
  /// Classify a raw marker string against the (already padded) options.
  pub fn resolve(marker: &str, options: &[String]) -> Self {
    let wanted = marker.trim();
    if !wanted.is_empty() {
      if let Some(i) = options.iter().position(|o| o.trim() == wanted) {
        return CorrectMarker::ExactText(i);
      }
    }
    match wanted.to_ascii_uppercase().as_str() {
      "A" => CorrectMarker::Letter(0),
      "B" => CorrectMarker::Letter(1),
      "C" => CorrectMarker::Letter(2),
      "D" => CorrectMarker::Letter(3),
      _ => CorrectMarker::Unresolved,
    }
  }

  /// The index this marker points at; `Unresolved` collapses to 0.
  pub fn index_or_default(&self) -> usize {
    match self {
      CorrectMarker::ExactText(i) | CorrectMarker::Letter(i) => *i,
      CorrectMarker::Unresolved => 0,
    }
  }
}

/// Persisted record returned by the table API after a save.
/// Written once per save action; never mutated or deleted by this backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTest {
  pub id: serde_json::Value,
  pub lecture_id: String,
  pub questions: Vec<Question>,
  #[serde(default)]
  pub created_at: Option<String>,
}
