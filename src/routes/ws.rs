//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "wisdom_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "wisdom_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "wisdom_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "wisdom_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "wisdom_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Ask { question } => {
      let answer = ask(state, &question).await;
      info!(target: "riddle", matched = answer.matched, strategy = ?answer.strategy, "WS ask answered");
      ServerWsMessage::Answer { answer }
    }

    ClientWsMessage::NewRiddle => {
      let riddle = random_riddle(state).await;
      info!(target: "riddle", id = riddle.id, "WS new_riddle served");
      ServerWsMessage::Riddle { riddle }
    }

    ClientWsMessage::Hint { riddle_id } => {
      let text = hint_text(state, riddle_id).await;
      info!(target: "riddle", id = riddle_id, "WS hint served");
      ServerWsMessage::Hint { text }
    }

    ClientWsMessage::SubmitAnswer { riddle_id, answer } => {
      let result = submit_answer(state, riddle_id, &answer).await;
      info!(target: "riddle", id = riddle_id, correct = result.correct, "WS submit_answer evaluated");
      ServerWsMessage::AnswerResult { result }
    }

    ClientWsMessage::Translate { text, language } => {
      let (translation, translated) = translate(state, &text, &language).await;
      ServerWsMessage::Translate { text, translation, translated }
    }

    ClientWsMessage::Wisdom { religion, content_type, language } => {
      let wisdom = daily_wisdom(state, &religion, content_type, language.as_deref()).await;
      ServerWsMessage::Wisdom { wisdom }
    }
  }
}
