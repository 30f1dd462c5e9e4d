//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! CORS is permissive so a separately served frontend can call it.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Upload limit: 20 MB decoded is ~27 MB of base64 plus JSON framing.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/welcome", get(endpoints::welcome::welcome))
        .route("/sessions", post(endpoints::sessions::create))
        .route(
            "/sessions/:id",
            axum::routing::delete(endpoints::sessions::end),
        )
        .route(
            "/sessions/:id/generate",
            post(endpoints::generate::generate),
        )
        .route("/sessions/:id/history", get(endpoints::sessions::history))
        .route(
            "/sessions/:id/history/:index",
            get(endpoints::sessions::history_entry),
        )
        .route(
            "/sessions/:id/history/:index/select",
            post(endpoints::sessions::select_entry),
        )
        .route("/sessions/:id/current", get(endpoints::sessions::current))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::pipeline::extraction::{DocumentExtractor, DocxTextExtractor, MockOcrEngine, PdfTextExtractor};
    use crate::pipeline::tutor::{MockLlmClient, TutorPipeline};

    fn test_core(llm: MockLlmClient) -> Arc<CoreState> {
        let extractor = DocumentExtractor::new(
            Box::new(MockOcrEngine::new("Gradient Descent", 0.9)),
            Box::new(PdfTextExtractor),
            Box::new(DocxTextExtractor),
        );
        Arc::new(CoreState::new(TutorPipeline::new(
            Box::new(extractor),
            Box::new(llm),
            "gemini-1.5-pro",
        )))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn start_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::builder().method("POST").uri("/api/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_model() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let response = app.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn welcome_has_title_and_instructions() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let json = body_json(app.oneshot(get_request("/api/welcome")).await.unwrap()).await;
        assert_eq!(json["title"], "Project: Freedom");
        assert_eq!(json["instructions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn topic_is_answered_and_listed_in_history() {
        let app = api_router(test_core(MockLlmClient::scripted(vec![
            Ok("Yes, Markov chains are data science."),
            Ok("A Markov chain is a memoryless process."),
        ])));
        let id = start_session(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({"topic": "What is a Markov Chain?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "recorded");
        assert_eq!(json["response"], "A Markov chain is a memoryless process.");
        assert_eq!(json["history_index"], 0);
        assert_eq!(json["show_image_reference"], false);

        let history = body_json(
            app.clone()
                .oneshot(get_request(&format!("/api/sessions/{id}/history")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(history["entries"][0]["query"], "What is a Markov Chain?");
        assert!(history.get("selected").is_none());

        let entry = body_json(
            app.clone()
                .oneshot(get_request(&format!("/api/sessions/{id}/history/0")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(entry["response"], "A Markov chain is a memoryless process.");

        // Reading an entry leaves the selection alone
        let history = body_json(
            app.clone()
                .oneshot(get_request(&format!("/api/sessions/{id}/history")))
                .await
                .unwrap(),
        )
        .await;
        assert!(history.get("selected").is_none());
    }

    #[tokio::test]
    async fn selecting_history_entry_updates_current_view() {
        let app = api_router(test_core(MockLlmClient::scripted(vec![
            Ok("Yes."),
            Ok("PCA projects onto directions of maximum variance."),
            Ok("Yes."),
            Ok("k-means partitions points into k clusters."),
        ])));
        let id = start_session(&app).await;
        for topic in ["What is PCA?", "Explain k-means"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/sessions/{id}/generate"),
                    serde_json::json!({ "topic": topic }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/sessions/{id}/history/0/select"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["query"], "What is PCA?");

        let current = body_json(
            app.clone()
                .oneshot(get_request(&format!("/api/sessions/{id}/current")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(
            current["current"]["response"],
            "PCA projects onto directions of maximum variance."
        );

        let history = body_json(
            app.oneshot(get_request(&format!("/api/sessions/{id}/history")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(history["selected"], 0);
    }

    #[tokio::test]
    async fn malformed_pdf_falls_back_to_topic_and_session_survives() {
        let app = api_router(test_core(MockLlmClient::new("Yes, data science.")));
        let id = start_session(&app).await;
        let pdf = crate::pipeline::extraction::pdf::tests::make_pdf_without_resources();
        let data = base64::engine::general_purpose::STANDARD.encode(pdf);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({
                    "topic": "Bayes",
                    "artifact": {"file_name": "broken.pdf", "media_type": "application/pdf", "data": data}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "recorded");
        assert_eq!(json["query"], "Bayes");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({"topic": "What is PCA?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(&format!("/api/sessions/{id}/history")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["entries"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn non_numeric_history_index_is_a_json_400() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;
        let response = app
            .oneshot(get_request(&format!("/api/sessions/{id}/history/latest")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn rejected_topic_returns_message() {
        let app = api_router(test_core(MockLlmClient::new(
            "No, this is unrelated to data science.",
        )));
        let id = start_session(&app).await;

        let json = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/sessions/{id}/generate"),
                    serde_json::json!({"topic": "What's the weather today?"}),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["status"], "rejected");
        assert_eq!(
            json["message"],
            "Sorry, I can only answer Data Science-related queries. Here's why: \
             No, this is unrelated to data science."
        );

        let history = body_json(
            app.oneshot(get_request(&format!("/api/sessions/{id}/history")))
                .await
                .unwrap(),
        )
        .await;
        assert!(history["entries"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zip_upload_returns_415() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;
        let data = base64::engine::general_purpose::STANDARD.encode(b"PK\x03\x04zip");

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({
                    "artifact": {"file_name": "data.zip", "media_type": "application/zip", "data": data}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(response).await["error"]["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn image_upload_flags_image_reference() {
        let app = api_router(test_core(MockLlmClient::new("Yes, gradient descent.")));
        let id = start_session(&app).await;
        let data = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(b"\x89PNG not decodable")
        );

        let json = body_json(
            app.oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({"artifact": {"media_type": "image/png", "data": data}}),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert_eq!(json["status"], "recorded");
        assert_eq!(json["query"], "Gradient Descent");
        assert_eq!(json["show_image_reference"], true);
    }

    #[tokio::test]
    async fn bad_base64_returns_400() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({"artifact": {"media_type": "application/pdf", "data": "!!!not base64"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_topic_returns_422() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{id}/generate"),
                serde_json::json!({"topic": "  "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_session_returns_404() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let uri = format!("/api/sessions/{}/history", uuid::Uuid::new_v4());
        let response = app.oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_history_entry_returns_404() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;
        let response = app
            .oneshot(get_request(&format!("/api/sessions/{id}/history/3")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get_request(&format!("/api/sessions/{id}/current")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn current_is_null_before_any_answer() {
        let app = api_router(test_core(MockLlmClient::new("Yes")));
        let id = start_session(&app).await;
        let json = body_json(
            app.oneshot(get_request(&format!("/api/sessions/{id}/current")))
                .await
                .unwrap(),
        )
        .await;
        assert!(json["current"].is_null());
    }
}
