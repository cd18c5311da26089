//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Field names follow the portal's existing wire format (camelCase where the
//! frontend already uses it: `lectureText`, `lectureId`, `quizId`).

use serde::{Deserialize, Serialize};

use crate::domain::{Question, SavedTest};
use crate::quiz::{QuestionReview, QuizPhase};

//
// Generation
//

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    #[serde(rename = "lectureText")]
    pub lecture_text: Option<String>,
    pub count: Option<i64>,
}

#[derive(Serialize)]
pub struct GenerateOut {
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    pub questions: Vec<Question>,
}

//
// Direct save (stateless, as used by the portal pages)
//

#[derive(Debug, Deserialize)]
pub struct SaveIn {
    #[serde(rename = "lectureId")]
    pub lecture_id: Option<String>,
    pub questions: Option<Vec<Question>>,
}

#[derive(Serialize)]
pub struct SaveOut {
    pub success: bool,
    pub test: SavedTest,
}

//
// Quiz session interaction
//

#[derive(Debug, Deserialize)]
pub struct SelectIn {
    pub question: usize,
    pub option: usize,
}

#[derive(Serialize)]
pub struct SelectOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct CheckOut {
    pub phase: QuizPhase,
    pub review: Vec<QuestionReview>,
}

#[derive(Debug, Deserialize)]
pub struct QuizSaveIn {
    #[serde(rename = "lectureId")]
    pub lecture_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
