//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - JSON API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/ask", post(http::http_post_ask))
        .route("/api/v1/riddle", get(http::http_get_riddle))
        .route("/api/v1/hint", get(http::http_get_hint))
        .route("/api/v1/answer", post(http::http_post_answer))
        .route("/api/v1/wisdom", get(http::http_get_wisdom))
        .route("/api/v1/philosopher", post(http::http_post_philosopher))
        .route("/api/v1/translate", post(http::http_post_translate))
        .route("/api/v1/admin/reload", post(http::http_post_reload))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;

    // No dataset on disk: the router serves the built-in riddles.
    fn test_router() -> Router {
        let state = AppState::new(
            AppConfig::default(),
            "does-not-exist/riddles.csv".into(),
            None,
        )
        .expect("state builds from seeds");
        build_router(Arc::new(state))
    }

    async fn get_json(path: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("failed to build request");
        send(req).await
    }

    async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        send(req).await
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let resp = test_router().oneshot(req).await.expect("oneshot failed");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .expect("failed to read body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_corpus_size() {
        let (status, body) = get_json("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["riddles"], json!(7));
    }

    #[tokio::test]
    async fn ask_returns_best_matching_answer() {
        let (status, body) = post_json(
            "/api/v1/ask",
            json!({ "question": "Who spoke at Kurukshetra about duty?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], json!(true));
        assert_eq!(body["answer"], json!("Krishna"));
        assert_eq!(body["strategy"], json!("vector_similarity"));
    }

    #[tokio::test]
    async fn ask_always_answers_even_gibberish() {
        let (status, body) = post_json("/api/v1/ask", json!({ "question": "zzqx" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], json!(true));
        assert_eq!(body["strategy"], json!("random_fallback"));
    }

    #[tokio::test]
    async fn riddle_hint_and_answer_flow() {
        let (_, riddle) = get_json("/api/v1/riddle").await;
        let id = riddle["id"].as_u64().expect("riddle id");
        assert!(riddle.get("answer").is_none());

        let (_, hint) = get_json(&format!("/api/v1/hint?riddleId={id}")).await;
        assert!(!hint["text"].as_str().unwrap_or_default().is_empty());

        let (_, result) = post_json(
            "/api/v1/answer",
            json!({ "riddleId": 0, "answer": "  KRISHNA " }),
        )
        .await;
        assert_eq!(result["correct"], json!(true));
        assert_eq!(result["earnedPoints"], json!(10));
        assert_eq!(result["expected"], json!("Brahma Sarovar, Kurukshetra"));
    }

    #[tokio::test]
    async fn unknown_riddle_id_is_reported() {
        let (status, result) = post_json(
            "/api/v1/answer",
            json!({ "riddleId": 999, "answer": "Krishna" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["correct"], json!(false));
        assert!(result["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn wisdom_falls_back_to_corpus_without_model() {
        let (status, body) =
            get_json("/api/v1/wisdom?religion=Sikhism&contentType=Quote").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], json!("corpus"));
        assert_eq!(body["english"], json!("Langar"));
        assert_eq!(body["translated"], json!("Langar"));
        assert_eq!(body["language"], json!("English"));
    }

    #[tokio::test]
    async fn philosopher_answers_each_known_belief() {
        let (_, body) = post_json(
            "/api/v1/philosopher",
            json!({ "question": "How do I find calm?", "beliefs": ["Jainism", "Nonexistent"] }),
        )
        .await;
        let results = body["results"].as_array().expect("results array");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["belief"], json!("Jainism"));
        assert_eq!(results[0]["source"], json!("corpus"));
        assert_eq!(results[0]["answer"], json!("Ahimsa. The first vow of the Jain path"));
    }

    #[tokio::test]
    async fn philosopher_reflection_ignores_other_religions_named_in_question() {
        let (_, body) = post_json(
            "/api/v1/philosopher",
            json!({ "question": "What did Krishna teach about the path?", "beliefs": ["Jainism", "Sikhism"] }),
        )
        .await;
        let results = body["results"].as_array().expect("results array");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["answer"], json!("Ahimsa. The first vow of the Jain path"));
        assert_eq!(
            results[1]["answer"],
            json!("Langar. The community kitchen serves everyone seated together")
        );
    }

    #[tokio::test]
    async fn malformed_hint_id_gets_json_message() {
        let (status, body) = get_json("/api/v1/hint?riddleId=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap_or_default().contains("riddleId"));

        let (status, body) = get_json("/api/v1/hint").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap_or_default().contains("riddleId"));
    }

    #[tokio::test]
    async fn translate_without_model_returns_text() {
        let (_, body) = post_json(
            "/api/v1/translate",
            json!({ "text": "Be still.", "language": "Hindi" }),
        )
        .await;
        assert_eq!(body["translation"], json!("Be still."));
        assert_eq!(body["translated"], json!(false));
    }

    #[tokio::test]
    async fn reload_rebuilds_from_seeds_when_dataset_missing() {
        let (status, body) = post_json("/api/v1/admin/reload", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["riddles"], json!(7));
    }
}
