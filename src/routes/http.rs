//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument, warn};

use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let matcher = state.matcher().await;
  Json(HealthOut { ok: !matcher.is_empty(), riddles: matcher.len() })
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len()))]
pub async fn http_post_ask(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AskIn>,
) -> impl IntoResponse {
  let out = ask(&state, &body.question).await;
  info!(target: "riddle", matched = out.matched, strategy = ?out.strategy, "HTTP ask answered");
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_riddle(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let riddle = random_riddle(&state).await;
  info!(target: "riddle", id = riddle.id, religion = %riddle.religion, "HTTP riddle served");
  Json(riddle)
}

#[instrument(level = "info", skip(state), fields(riddle_id = %q.riddle_id))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HintQuery>,
) -> impl IntoResponse {
  let Some(id) = q.parsed_id() else {
    warn!(target: "riddle", riddle_id = %q.riddle_id, "HTTP hint with malformed riddleId");
    return Json(HintOut { text: format!("No hint: riddleId must be a number, got {:?}.", q.riddle_id) });
  };
  let text = hint_text(&state, id).await;
  info!(target: "riddle", id, "HTTP hint served");
  Json(HintOut { text })
}

#[instrument(level = "info", skip(state, body), fields(riddle_id = body.riddle_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  let out = submit_answer(&state, body.riddle_id, &body.answer).await;
  info!(target: "riddle", id = body.riddle_id, correct = out.correct, points = out.earned_points, "HTTP answer evaluated");
  Json(out)
}

#[instrument(level = "info", skip(state), fields(religion = %q.religion, content_type = q.content_type.as_str()))]
pub async fn http_get_wisdom(
  State(state): State<Arc<AppState>>,
  Query(q): Query<WisdomQuery>,
) -> impl IntoResponse {
  let out = daily_wisdom(&state, &q.religion, q.content_type, q.language.as_deref()).await;
  info!(target: "wisdom_backend", religion = %out.religion, source = out.source, "HTTP wisdom served");
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len(), beliefs = body.beliefs.len()))]
pub async fn http_post_philosopher(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PhilosopherIn>,
) -> impl IntoResponse {
  Json(philosopher(&state, &body.question, &body.beliefs).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), language = %body.language))]
pub async fn http_post_translate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslateIn>,
) -> impl IntoResponse {
  let (translation, translated) = translate(&state, &body.text, &body.language).await;
  Json(TranslateOut { translation, translated })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reload(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.reload_corpus().await {
    Ok(riddles) => Json(ReloadOut { ok: true, riddles, error: None }),
    Err(e) => {
      let riddles = state.matcher().await.len();
      Json(ReloadOut { ok: false, riddles, error: Some(e) })
    }
  }
}
