//! Quiz session finite-state machine.
//!
//! One session per generation request: `Answering → Checked → Saved`.
//! While answering, the user may re-select freely; `check` freezes every
//! selection and reveals correctness; `save` is only reachable from `Checked`
//! and is retryable (a failed write leaves the session in `Checked`).
//! Regenerating simply creates a fresh session; the old one is abandoned.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Question;
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
  Answering,
  Checked,
  Saved,
}

/// Per-question result revealed by `check`.
#[derive(Clone, Debug, Serialize)]
pub struct QuestionReview {
  pub question: String,
  #[serde(rename = "correctIndex")]
  pub correct_index: usize,
  pub selected: Option<usize>,
  pub correct: bool,
  pub explanation: String,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  pub id: String,
  pub questions: Vec<Question>,
  selections: Vec<Option<usize>>,
  phase: QuizPhase,
}

impl QuizSession {
  pub fn new(questions: Vec<Question>) -> Self {
    let selections = vec![None; questions.len()];
    Self {
      id: Uuid::new_v4().to_string(),
      questions,
      selections,
      phase: QuizPhase::Answering,
    }
  }

  pub fn phase(&self) -> QuizPhase {
    self.phase
  }

  /// Select exactly one option for a question, overwriting any prior pick.
  /// Rejected once the session is checked (selections are frozen).
  pub fn select(&mut self, question: usize, option: usize) -> Result<(), ApiError> {
    if self.phase != QuizPhase::Answering {
      return Err(ApiError::Validation("answers are frozen after check".into()));
    }
    let n_options = self
      .questions
      .get(question)
      .map(|q| q.options.len())
      .ok_or_else(|| ApiError::Validation(format!("no question at index {question}")))?;
    if option >= n_options {
      return Err(ApiError::Validation(format!(
        "option index {option} out of range (0..{n_options})"
      )));
    }
    self.selections[question] = Some(option);
    Ok(())
  }

  /// Freeze selections and reveal, per question, the correct option, whether
  /// the user's pick (if any) was right, and the explanation text.
  pub fn check(&mut self) -> Result<Vec<QuestionReview>, ApiError> {
    if self.phase != QuizPhase::Answering {
      return Err(ApiError::Validation("quiz already checked".into()));
    }
    self.phase = QuizPhase::Checked;
    Ok(self.review())
  }

  /// Review of the frozen state. Only meaningful once checked; `check` is the
  /// public way in.
  fn review(&self) -> Vec<QuestionReview> {
    self
      .questions
      .iter()
      .zip(&self.selections)
      .map(|(q, sel)| QuestionReview {
        question: q.question.clone(),
        correct_index: q.correct_index,
        selected: *sel,
        correct: *sel == Some(q.correct_index),
        explanation: q.explanation.clone(),
      })
      .collect()
  }

  /// Transition `Checked → Saved` after the persistence call succeeded.
  pub fn mark_saved(&mut self) -> Result<(), ApiError> {
    match self.phase {
      QuizPhase::Checked => {
        self.phase = QuizPhase::Saved;
        Ok(())
      }
      QuizPhase::Answering => Err(ApiError::Validation("check the quiz before saving".into())),
      QuizPhase::Saved => Err(ApiError::Validation("test already saved".into())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn questions(n: usize) -> Vec<Question> {
    (0..n)
      .map(|i| Question {
        question: format!("Q{i}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_index: i % 4,
        explanation: String::new(),
      })
      .collect()
  }

  #[test]
  fn reselection_overwrites_previous_pick() {
    let mut s = QuizSession::new(questions(1));
    s.select(0, 1).unwrap();
    s.select(0, 3).unwrap();
    let review = s.check().unwrap();
    assert_eq!(review[0].selected, Some(3));
  }

  #[test]
  fn check_freezes_selections_and_reveals_correct_option() {
    let mut s = QuizSession::new(questions(2));
    s.select(0, 2).unwrap();
    let review = s.check().unwrap();
    assert_eq!(s.phase(), QuizPhase::Checked);

    // The correct option is marked regardless of what was selected.
    assert_eq!(review[0].correct_index, 0);
    assert_eq!(review[0].selected, Some(2));
    assert!(!review[0].correct);
    // Unanswered questions stay reviewable.
    assert_eq!(review[1].selected, None);
    assert!(!review[1].correct);

    // Frozen: further selection attempts are rejected.
    assert!(matches!(s.select(0, 1), Err(ApiError::Validation(_))));
  }

  #[test]
  fn matching_selection_is_marked_correct() {
    let mut s = QuizSession::new(questions(1));
    s.select(0, 0).unwrap();
    let review = s.check().unwrap();
    assert!(review[0].correct);
  }

  #[test]
  fn double_check_is_rejected() {
    let mut s = QuizSession::new(questions(1));
    s.check().unwrap();
    assert!(matches!(s.check(), Err(ApiError::Validation(_))));
  }

  #[test]
  fn save_requires_checked_and_is_terminal() {
    let mut s = QuizSession::new(questions(1));
    assert!(matches!(s.mark_saved(), Err(ApiError::Validation(_))));

    s.check().unwrap();
    s.mark_saved().unwrap();
    assert_eq!(s.phase(), QuizPhase::Saved);

    // Saving twice is rejected; the record is written once.
    assert!(matches!(s.mark_saved(), Err(ApiError::Validation(_))));
  }

  #[test]
  fn out_of_range_indices_are_validation_errors() {
    let mut s = QuizSession::new(questions(1));
    assert!(matches!(s.select(5, 0), Err(ApiError::Validation(_))));
    assert!(matches!(s.select(0, 4), Err(ApiError::Validation(_))));
  }
}
