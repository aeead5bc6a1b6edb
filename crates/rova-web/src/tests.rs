//! Router tests driven through `tower::ServiceExt::oneshot`

#[cfg(test)]
mod router_tests {
    use crate::{router, AppState, ChatResponse, HealthResponse};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use insta::assert_json_snapshot;
    use rova_core::testing::{
        FailingCompletion, FailingEmbedder, FailureMode, HashingEmbedder, ScriptedCompletion,
        StaticLoader,
    };
    use rova_core::{Embedder, LLMProvider};
    use rova_rag::{DocumentIndexer, LocalRAGEngine, LocalVectorStore};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const PAGES: [&str; 2] = ["Paris is the capital of France.", "The Eiffel Tower is in Paris."];

    async fn store() -> Arc<LocalVectorStore> {
        let indexer = DocumentIndexer::new(Arc::new(HashingEmbedder::default()));
        let (store, _) = indexer
            .load_or_build(&StaticLoader::new("data.pdf", &PAGES))
            .await
            .unwrap();
        Arc::new(store)
    }

    async fn app(embedder: Arc<dyn Embedder>, llm: Arc<dyn LLMProvider>) -> Router {
        let engine = LocalRAGEngine::new(store().await, embedder, llm);
        router(AppState::new(Arc::new(engine)))
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::post("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_answers_from_document() {
        let embedder = Arc::new(HashingEmbedder::default());
        let llm = Arc::new(ScriptedCompletion::new("Paris is the capital of France."));
        let app = app(embedder.clone(), llm.clone()).await;

        let (status, body) = send(app, chat_request(r#"{"query": "What is the capital of France?"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        assert!(!response.response.trim().is_empty());
        assert_eq!(embedder.calls(), 1);

        let prompt = &llm.prompts()[0];
        for page in PAGES {
            assert!(prompt.contains(page), "prompt is missing {page:?}");
        }
    }

    #[tokio::test]
    async fn test_bad_queries_are_rejected_before_embedding() {
        for body in [
            r#"{}"#,
            r#"{"query": null}"#,
            r#"{"query": ""}"#,
            r#"{"query": "   "}"#,
            r#"{"query": 42}"#,
        ] {
            let embedder = Arc::new(HashingEmbedder::default());
            let app = app(embedder.clone(), Arc::new(ScriptedCompletion::new("ok"))).await;

            let (status, response) = send(app, chat_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(response["error"], "invalid_input", "{body}");
            assert_eq!(embedder.calls(), 0, "{body}");
        }
    }

    #[tokio::test]
    async fn test_missing_query_body() {
        let app = app(
            Arc::new(HashingEmbedder::default()),
            Arc::new(ScriptedCompletion::new("ok")),
        )
        .await;

        let (status, body) = send(app, chat_request(r#"{"question": "hi"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_json_snapshot!(body, @r###"
        {
          "error": "invalid_input",
          "message": "query is required"
        }
        "###);
    }

    #[tokio::test]
    async fn test_unparsable_body() {
        let app = app(
            Arc::new(HashingEmbedder::default()),
            Arc::new(ScriptedCompletion::new("ok")),
        )
        .await;
        let (status, body) = send(app.clone(), chat_request("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let no_content_type = Request::post("/chat")
            .body(Body::from(r#"{"query": "hi"}"#))
            .unwrap();
        let (status, _) = send(app, no_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_failures_map_to_gateway_errors() {
        let cases: [(Arc<dyn Embedder>, Arc<dyn LLMProvider>, StatusCode); 4] = [
            (
                Arc::new(FailingEmbedder::new(FailureMode::Network)),
                Arc::new(ScriptedCompletion::new("ok")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Arc::new(HashingEmbedder::default()),
                Arc::new(FailingCompletion::new(FailureMode::Authentication)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Arc::new(HashingEmbedder::default()),
                Arc::new(FailingCompletion::new(FailureMode::EmptyCompletion)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Arc::new(FailingEmbedder::new(FailureMode::Timeout)),
                Arc::new(ScriptedCompletion::new("ok")),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (embedder, llm, expected) in cases {
            let app = app(embedder, llm).await;
            let (status, body) = send(app, chat_request(r#"{"query": "q"}"#)).await;
            assert_eq!(status, expected);
            assert!(!body["message"].as_str().unwrap().contains("API key"));
        }
    }

    #[tokio::test]
    async fn test_keeps_serving_after_failure() {
        let engine = Arc::new(LocalRAGEngine::new(
            store().await,
            Arc::new(HashingEmbedder::default()),
            Arc::new(FailingCompletion::new(FailureMode::Network)),
        ));
        let app = router(AppState::new(engine));

        let (status, _) = send(app.clone(), chat_request(r#"{"query": "q"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let health = Request::get("/healthz").body(Body::empty()).unwrap();
        let (status, body) = send(app, health).await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.pages, 2);
    }

    #[tokio::test]
    async fn test_landing_page() {
        let app = app(
            Arc::new(HashingEmbedder::default()),
            Arc::new(ScriptedCompletion::new("ok")),
        )
        .await;

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"fetch("/chat""#));
    }
}
