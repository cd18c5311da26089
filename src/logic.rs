//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Generating a test from lecture text (validate → prompt → parse →
//!     normalize → shuffle → session)
//!   - Persisting a question set for a lecture
//!   - Driving the quiz session state machine (select / check / save)

use tracing::{info, warn, instrument};

use crate::domain::{Question, SavedTest};
use crate::error::ApiError;
use crate::parse::{parse_questions, OPTION_COUNT};
use crate::quiz::{QuestionReview, QuizPhase, QuizSession};
use crate::shuffle::shuffle_question;
use crate::state::AppState;

pub const COUNT_DEFAULT: usize = 5;
pub const COUNT_MIN: usize = 1;
pub const COUNT_MAX: usize = 20;

/// Policy: out-of-range counts are clamped, not rejected (see DESIGN.md).
fn clamp_count(raw: Option<i64>) -> usize {
  let requested = raw.unwrap_or(COUNT_DEFAULT as i64);
  let clamped = requested.clamp(COUNT_MIN as i64, COUNT_MAX as i64) as usize;
  if requested != clamped as i64 {
    warn!(target: "testgen", requested, clamped, "Question count out of range; clamped");
  }
  clamped
}

/// Generate a quiz session from lecture text. Returns the session id and the
/// shuffled question set; the session starts in the `Answering` phase.
#[instrument(level = "info", skip(state, lecture_text), fields(lecture_len = lecture_text.as_deref().map(str::len).unwrap_or(0)))]
pub async fn generate_quiz(
  state: &AppState,
  lecture_text: Option<String>,
  count: Option<i64>,
) -> Result<(String, Vec<Question>), ApiError> {
  let lecture_text = lecture_text
    .as_deref()
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| ApiError::Validation("lectureText required".into()))?
    .to_string();
  let count = clamp_count(count);

  let oa = state
    .openai
    .as_ref()
    .ok_or_else(|| ApiError::Network("OpenAI is not configured (OPENAI_API_KEY missing)".into()))?;

  let raw = oa.generate_test_text(&state.prompts, &lecture_text, count).await?;
  let normalized = parse_questions(&raw)?;
  if normalized.len() < count {
    warn!(target: "testgen", requested = count, got = normalized.len(), "Model returned fewer questions than requested");
  }

  let questions: Vec<Question> = normalized.iter().map(shuffle_question).collect();

  let session = QuizSession::new(questions.clone());
  let quiz_id = session.id.clone();
  state.insert_session(session).await;
  info!(target: "testgen", %quiz_id, n_questions = questions.len(), "Quiz generated");

  Ok((quiz_id, questions))
}

/// Persist a question set for a lecture (write-once insert).
#[instrument(level = "info", skip(state, questions))]
pub async fn save_questions(
  state: &AppState,
  lecture_id: Option<String>,
  questions: Option<Vec<Question>>,
) -> Result<SavedTest, ApiError> {
  let lecture_id = lecture_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::Validation("lectureId required".into()))?
    .to_string();
  let questions = questions
    .filter(|q| !q.is_empty())
    .ok_or_else(|| ApiError::Validation("questions required".into()))?;

  for (i, q) in questions.iter().enumerate() {
    if q.options.len() != OPTION_COUNT || q.correct_index >= q.options.len() {
      return Err(ApiError::Validation(format!("question {i} is malformed")));
    }
  }

  let store = state
    .store
    .as_ref()
    .ok_or_else(|| ApiError::Save("test persistence is not configured".into()))?;
  store.insert_test(&lecture_id, &questions).await
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn select_option(
  state: &AppState,
  quiz_id: &str,
  question: usize,
  option: usize,
) -> Result<(), ApiError> {
  state.with_session_mut(quiz_id, |s| s.select(question, option)).await
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn check_quiz(
  state: &AppState,
  quiz_id: &str,
) -> Result<(QuizPhase, Vec<QuestionReview>), ApiError> {
  let review = state.with_session_mut(quiz_id, |s| s.check()).await?;
  info!(target: "testgen", %quiz_id, "Quiz checked; answers frozen");
  Ok((QuizPhase::Checked, review))
}

/// Save a checked session's question set. A store failure leaves the session
/// in `Checked` so the save can be retried.
#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn save_quiz(
  state: &AppState,
  quiz_id: &str,
  lecture_id: Option<String>,
) -> Result<SavedTest, ApiError> {
  let lecture_id = lecture_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::Validation("lectureId required".into()))?
    .to_string();

  let session = state
    .get_session(quiz_id)
    .await
    .ok_or_else(|| ApiError::Validation(format!("unknown quiz id: {quiz_id}")))?;
  match session.phase() {
    QuizPhase::Answering => {
      return Err(ApiError::Validation("check the quiz before saving".into()))
    }
    QuizPhase::Saved => return Err(ApiError::Validation("test already saved".into())),
    QuizPhase::Checked => {}
  }

  let store = state
    .store
    .as_ref()
    .ok_or_else(|| ApiError::Save("test persistence is not configured".into()))?;
  let saved = store.insert_test(&lecture_id, &session.questions).await?;

  state.with_session_mut(quiz_id, |s| s.mark_saved()).await?;
  info!(target: "testgen", %quiz_id, %lecture_id, "Quiz saved");
  Ok(saved)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn count_defaults_to_five() {
    assert_eq!(clamp_count(None), COUNT_DEFAULT);
  }

  #[test]
  fn count_is_clamped_into_range() {
    assert_eq!(clamp_count(Some(0)), COUNT_MIN);
    assert_eq!(clamp_count(Some(-3)), COUNT_MIN);
    assert_eq!(clamp_count(Some(21)), COUNT_MAX);
    assert_eq!(clamp_count(Some(500)), COUNT_MAX);
    assert_eq!(clamp_count(Some(7)), 7);
  }

  #[test]
  fn parse_then_shuffle_keeps_pointing_at_the_right_answer() {
    let raw = r#"[{"question":"Q1","options":["a","b","c","d"],"correct_answer":"b","explanation":"x"}]"#;
    let normalized = parse_questions(raw).unwrap();
    assert_eq!(normalized.len(), 1);

    for _ in 0..20 {
      let q = shuffle_question(&normalized[0]);
      let mut sorted = q.options.clone();
      sorted.sort();
      assert_eq!(sorted, vec!["a", "b", "c", "d"]);
      assert_eq!(q.options[q.correct_index], "b");
    }
  }

  #[tokio::test]
  async fn generate_requires_lecture_text() {
    let state = AppState::new();
    let err = generate_quiz(&state, Some("   ".into()), None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }

  #[tokio::test]
  async fn direct_save_requires_lecture_id_and_questions() {
    let state = AppState::new();
    let q = Question {
      question: "Q".into(),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_index: 0,
      explanation: String::new(),
    };

    let err = save_questions(&state, None, Some(vec![q.clone()])).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = save_questions(&state, Some("lec-1".into()), Some(vec![])).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }

  #[tokio::test]
  async fn malformed_questions_are_rejected_before_persisting() {
    let state = AppState::new();
    let bad = Question {
      question: "Q".into(),
      options: vec!["a".into(), "b".into()],
      correct_index: 0,
      explanation: String::new(),
    };
    let err = save_questions(&state, Some("lec-1".into()), Some(vec![bad])).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }

  #[tokio::test]
  async fn session_flow_select_check_then_frozen() {
    let state = AppState::new();
    let questions: Vec<Question> = (0..2)
      .map(|i| Question {
        question: format!("Q{i}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_index: 1,
        explanation: "why".into(),
      })
      .collect();
    let session = QuizSession::new(questions);
    let quiz_id = session.id.clone();
    state.insert_session(session).await;

    select_option(&state, &quiz_id, 0, 2).await.unwrap();
    let (phase, review) = check_quiz(&state, &quiz_id).await.unwrap();
    assert_eq!(phase, QuizPhase::Checked);
    assert_eq!(review[0].selected, Some(2));
    assert!(!review[0].correct);
    assert_eq!(review[0].correct_index, 1);

    let err = select_option(&state, &quiz_id, 0, 1).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }

  #[tokio::test]
  async fn session_save_requires_check_first() {
    let state = AppState::new();
    let session = QuizSession::new(vec![Question {
      question: "Q".into(),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_index: 0,
      explanation: String::new(),
    }]);
    let quiz_id = session.id.clone();
    state.insert_session(session).await;

    let err = save_quiz(&state, &quiz_id, Some("lec-1".into())).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }
}
