//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures map to the error taxonomy's JSON body.

use std::sync::Arc;
use axum::{extract::{Path, State}, Json};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> Json<HealthOut> { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(count = ?body.count))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> Result<Json<GenerateOut>, ApiError> {
  let (quiz_id, questions) = generate_quiz(&state, body.lecture_text, body.count).await?;
  info!(target: "testgen", %quiz_id, n_questions = questions.len(), "HTTP generate served");
  Ok(Json(GenerateOut { quiz_id, questions }))
}

#[instrument(level = "info", skip(state, body), fields(lecture_id = ?body.lecture_id))]
pub async fn http_post_save(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SaveIn>,
) -> Result<Json<SaveOut>, ApiError> {
  let test = save_questions(&state, body.lecture_id, body.questions).await?;
  Ok(Json(SaveOut { success: true, test }))
}

#[instrument(level = "info", skip(state, body), fields(%quiz_id, question = body.question, option = body.option))]
pub async fn http_post_quiz_select(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
  Json(body): Json<SelectIn>,
) -> Result<Json<SelectOut>, ApiError> {
  select_option(&state, &quiz_id, body.question, body.option).await?;
  Ok(Json(SelectOut { ok: true }))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_post_quiz_check(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<CheckOut>, ApiError> {
  let (phase, review) = check_quiz(&state, &quiz_id).await?;
  info!(target: "testgen", %quiz_id, "HTTP check served");
  Ok(Json(CheckOut { phase, review }))
}

#[instrument(level = "info", skip(state, body), fields(%quiz_id, lecture_id = ?body.lecture_id))]
pub async fn http_post_quiz_save(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
  Json(body): Json<QuizSaveIn>,
) -> Result<Json<SaveOut>, ApiError> {
  let test = save_quiz(&state, &quiz_id, body.lecture_id).await?;
  Ok(Json(SaveOut { success: true, test }))
}
