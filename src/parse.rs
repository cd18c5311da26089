//! Turning untrusted model output into canonical questions.
//!
//! Flow:
//! 1) Try a strict JSON parse of the whole completion text.
//! 2) On failure, slice between the first `[` and the last `]` and parse that.
//! 3) Otherwise fail closed with the raw text attached — never guess further.
//!
//! Each array element is then normalized: the question text gets a placeholder
//! when absent, options are coerced to strings and truncated/padded to exactly
//! 4 entries, and the correctness marker is resolved through `CorrectMarker`.

use serde_json::Value;
use tracing::warn;

use crate::domain::{CorrectMarker, Question};
use crate::error::ApiError;
use crate::util::trunc_for_log;

/// Number of options every canonical question carries.
pub const OPTION_COUNT: usize = 4;

/// Extract the JSON array embedded in a completion. The model is asked for a
/// bare array, but wrappers (prose, code fences) are common enough that we
/// tolerate them with the bracket-slice fallback.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, ApiError> {
  if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
    return Ok(items);
  }

  let start = raw.find('[');
  let end = raw.rfind(']');
  if let (Some(start), Some(end)) = (start, end) {
    if end > start {
      if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&raw[start..=end]) {
        return Ok(items);
      }
    }
  }

  warn!(target: "testgen", raw = %trunc_for_log(raw, 200), "Model output not extractable as a JSON array");
  Err(ApiError::GenerationParse { raw: raw.to_string() })
}

/// Coerce any JSON value to display text. Strings pass through; scalars are
/// stringified; null and containers yield None so callers can substitute.
fn coerce_text(v: &Value) -> Option<String> {
  match v {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null | Value::Array(_) | Value::Object(_) => None,
  }
}

/// Normalize one parsed array element into a canonical `Question`
/// (pre-shuffle: the correct index still reflects the model's option order).
/// `position` is zero-based and only used for placeholders.
pub fn normalize_item(item: &Value, position: usize) -> Question {
  let question = item
    .get("question")
    .and_then(coerce_text)
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| format!("Вопрос {}", position + 1));

  let mut options: Vec<String> = item
    .get("options")
    .and_then(Value::as_array)
    .map(|arr| {
      arr
        .iter()
        .take(OPTION_COUNT)
        .enumerate()
        .map(|(i, v)| coerce_text(v).unwrap_or_else(|| format!("Вариант {}", i + 1)))
        .collect()
    })
    .unwrap_or_default();

  let supplied = item
    .get("options")
    .and_then(Value::as_array)
    .map(|a| a.len())
    .unwrap_or(0);
  if supplied != OPTION_COUNT {
    warn!(target: "testgen", position, supplied, "Model supplied an off-size option list; truncating/padding to 4");
  }
  while options.len() < OPTION_COUNT {
    options.push(format!("Вариант {}", options.len() + 1));
  }

  // The marker may live under `correct_answer` or `correct`.
  let marker_text = item
    .get("correct_answer")
    .or_else(|| item.get("correct"))
    .and_then(coerce_text)
    .unwrap_or_default();

  let marker = CorrectMarker::resolve(&marker_text, &options);
  if marker == CorrectMarker::Unresolved {
    warn!(
      target: "testgen",
      position,
      marker = %trunc_for_log(&marker_text, 80),
      "Correct-answer marker did not resolve; defaulting to option 0"
    );
  }
  let correct_index = marker.index_or_default();

  let explanation = item.get("explanation").and_then(coerce_text).unwrap_or_default();

  Question { question, options, correct_index, explanation }
}

/// Full response-to-questions pipeline (pre-shuffle). A shorter list than the
/// requested count is not an error; callers return whatever normalized.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, ApiError> {
  let items = extract_json_array(raw)?;
  Ok(items.iter().enumerate().map(|(i, it)| normalize_item(it, i)).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clean_array_parses_and_marker_matches_text() {
    let raw = r#"[{"question":"Q1","options":["a","b","c","d"],"correct_answer":"b","explanation":"x"}]"#;
    let qs = parse_questions(raw).expect("questions");
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].options, vec!["a", "b", "c", "d"]);
    assert_eq!(qs[0].correct_index, 1);
    assert_eq!(qs[0].explanation, "x");
  }

  #[test]
  fn prose_wrapped_array_is_sliced_padded_and_letter_resolved() {
    let raw = r#"Noise... [{"question":"Q","options":["1","2","3"],"correct_answer":"C"}] trailing"#;
    let qs = parse_questions(raw).expect("questions");
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].options.len(), 4);
    assert_eq!(qs[0].options[3], "Вариант 4");
    // "C" has no text match among the options, so it reads as the letter C.
    assert_eq!(qs[0].correct_index, 2);
  }

  #[test]
  fn bracketless_text_fails_closed_with_raw() {
    let raw = "I could not produce the test, sorry.";
    match parse_questions(raw) {
      Err(ApiError::GenerationParse { raw: got }) => assert_eq!(got, raw),
      other => panic!("expected GenerationParse, got {other:?}"),
    }
  }

  #[test]
  fn parsed_non_array_fails_closed() {
    let raw = r#"{"question":"not an array"}"#;
    assert!(matches!(
      parse_questions(raw),
      Err(ApiError::GenerationParse { .. })
    ));
  }

  #[test]
  fn options_are_always_padded_to_four() {
    for n in 0..=4usize {
      let opts: Vec<String> = (0..n).map(|i| format!("o{i}")).collect();
      let item = serde_json::json!({ "question": "Q", "options": opts, "correct_answer": "o0" });
      let q = normalize_item(&item, 0);
      assert_eq!(q.options.len(), 4, "n={n}");
    }
  }

  #[test]
  fn extra_options_are_truncated_to_four() {
    let item = serde_json::json!({
      "question": "Q",
      "options": ["a", "b", "c", "d", "e", "f"],
      "correct_answer": "d"
    });
    let q = normalize_item(&item, 0);
    assert_eq!(q.options, vec!["a", "b", "c", "d"]);
    assert_eq!(q.correct_index, 3);
  }

  #[test]
  fn missing_question_gets_positional_placeholder() {
    let item = serde_json::json!({ "options": ["a", "b", "c", "d"], "correct": "a" });
    let q = normalize_item(&item, 2);
    assert_eq!(q.question, "Вопрос 3");
    assert_eq!(q.correct_index, 0);
  }

  #[test]
  fn letter_markers_map_to_indices_any_case() {
    for (letter, want) in [("A", 0), ("b", 1), ("C", 2), ("d", 3)] {
      let item = serde_json::json!({
        "question": "Q",
        "options": ["w", "x", "y", "z"],
        "correct_answer": letter
      });
      assert_eq!(normalize_item(&item, 0).correct_index, want, "letter={letter}");
    }
  }

  #[test]
  fn unresolved_marker_defaults_to_first_option() {
    let item = serde_json::json!({
      "question": "Q",
      "options": ["w", "x", "y", "z"],
      "correct_answer": "no such option"
    });
    assert_eq!(normalize_item(&item, 0).correct_index, 0);
  }

  #[test]
  fn numeric_scalars_are_coerced_to_strings() {
    let item = serde_json::json!({
      "question": 42,
      "options": [1, 2, 3, 4],
      "correct_answer": 3
    });
    let q = normalize_item(&item, 0);
    assert_eq!(q.question, "42");
    assert_eq!(q.options, vec!["1", "2", "3", "4"]);
    assert_eq!(q.correct_index, 2);
  }
}
