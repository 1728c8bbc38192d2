use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_simple_evaluation_uses_model_verdict() {
    let endpoint =
        common::spawn_chat_stub(StatusCode::OK, common::chat_reply("PASS\nGood use of cat.")).await;
    let app = common::create_test_app_with(common::llm_at(Some(endpoint))).await;

    let (status, body) = app
        .post_json(
            "/api/ai-evaluate-simple",
            None,
            json!({ "word": "cat", "userInput": "My cat sleeps all day." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["passed"], true);
    assert_eq!(body["source"], "ai");
    assert_eq!(body["feedback"], "Good use of cat.");
}

#[tokio::test]
async fn test_simple_evaluation_falls_back_on_quota() {
    let endpoint = common::spawn_chat_stub(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "quota exceeded" } }),
    )
    .await;
    let app = common::create_test_app_with(common::llm_at(Some(endpoint))).await;

    let (status, body) = app
        .post_json(
            "/api/ai-evaluate-simple",
            None,
            json!({ "word": "cat", "userInput": "The CAT is asleep" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "fallback-simple");
    assert_eq!(body["passed"], true);

    let (_, body) = app
        .post_json(
            "/api/ai-evaluate-simple",
            None,
            json!({ "word": "cat", "userInput": "A dog barks" }),
        )
        .await;
    assert_eq!(body["passed"], false);
}

#[tokio::test]
async fn test_simple_evaluation_reports_other_provider_errors() {
    let endpoint =
        common::spawn_chat_stub(StatusCode::UNAUTHORIZED, json!({ "error": "bad key" })).await;
    let app = common::create_test_app_with(common::llm_at(Some(endpoint))).await;

    let (status, body) = app
        .post_json(
            "/api/ai-evaluate-simple",
            None,
            json!({ "word": "cat", "userInput": "My cat sleeps." }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_provider_server_error_is_sent_once() {
    let (endpoint, hits) = common::spawn_counting_chat_stub(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": "down" }),
    )
    .await;
    let app = common::create_test_app_with(common::llm_at(Some(endpoint))).await;

    let (status, _) = app
        .post_json(
            "/api/ai-evaluate-simple",
            None,
            json!({ "word": "cat", "userInput": "My cat sleeps." }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_strict_evaluation_parses_json_and_falls_back_locally() {
    let endpoint = common::spawn_chat_stub(
        StatusCode::OK,
        common::chat_reply(r#"{"passed": false, "score": 35, "feedback": "Wrong meaning."}"#),
    )
    .await;
    let app = common::create_test_app_with(common::llm_at(Some(endpoint))).await;

    let (status, body) = app
        .post_json(
            "/api/ai-evaluate",
            None,
            json!({ "word": "cat", "userInput": "I cat to school." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["passed"], false);
    assert_eq!(body["score"], 35);
    assert_eq!(body["source"], "ai");

    let offline = common::create_test_app().await;
    let (status, body) = offline
        .post_json(
            "/api/ai-evaluate",
            None,
            json!({ "word": "cat", "userInput": "My cat sleeps on the warm sofa." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback-local");
    assert_eq!(body["passed"], true);
    assert_eq!(body["score"], 100);
}

#[tokio::test]
async fn test_evaluation_requires_word_and_input() {
    let app = common::create_test_app().await;
    let (status, body) = app
        .post_json("/api/ai-evaluate-simple", None, json!({ "word": "cat" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
