//! Integration tests for the HTTP API.
//!
//! Drives the real router with `tower::ServiceExt::oneshot`; the remote model
//! is replaced by fake agents so timing can run on a paused clock.
//!
//! **Note on global recorder**: only one `AppState` per process owns the
//! global metrics recorder, so `/metrics` is checked for status and content
//! type rather than specific values.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use emoji_judge::api::HealthResponse;
use emoji_judge::judge::{JudgeStatus, JudgeVerdict, Verdict};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_before_any_judgment() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = read_json(response).await;
    assert_eq!(health.status, "ok");
    assert!(!health.judge_ready);
    assert_eq!(health.last_judge_success_ms, 0);
    assert_eq!(health.last_judge_failure_ms, 0);
}

#[tokio::test]
async fn test_health_uses_camel_case_fields() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    let body: serde_json::Value = read_json(response).await;

    for field in [
        "status",
        "uptimeSeconds",
        "judgeReady",
        "lastJudgeSuccessMs",
        "lastJudgeFailureMs",
    ] {
        assert!(body.get(field).is_some(), "missing field {}", field);
    }
}

#[tokio::test]
async fn test_judge_pass_marks_ready() {
    let agent = FixedAgent::new(r#"[{"score":0.92,"explanation":"Close match"}]"#);
    let (app, _) = app_with_agent(test_config("http://unused"), agent.clone());

    let response = app
        .clone()
        .oneshot(judge_json_request(&valid_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let verdict: JudgeVerdict = read_json(response).await;
    assert_eq!(verdict.status, JudgeStatus::Ok);
    assert_eq!(verdict.verdict, Verdict::Pass);
    assert_eq!(verdict.score, 0.92);
    assert_eq!(verdict.confidence, 0.92);
    assert_eq!(verdict.explanation, "Close match");

    let health: HealthResponse = read_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert!(health.judge_ready);
    assert!(health.last_judge_success_ms > 0);
    assert_eq!(health.last_judge_failure_ms, 0);

    let requests = agent.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].image.mime_type, "image/png");
}

#[tokio::test]
async fn test_judge_fail_verdict_records_failure() {
    let agent = FixedAgent::new(r#"score: 0.65, explanation: "nice try""#);
    let (app, state) = app_with_agent(test_config("http://unused"), agent);

    let verdict: JudgeVerdict = read_json(
        app.oneshot(judge_json_request(&valid_payload()))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(verdict.status, JudgeStatus::Ok);
    assert_eq!(verdict.verdict, Verdict::Fail);
    assert_eq!(verdict.score, 0.65);
    assert_eq!(verdict.explanation, "nice try");

    let snapshot = state.health.snapshot();
    assert_eq!(snapshot.last_success_ms, 0);
    assert!(snapshot.last_failure_ms > 0);
}

#[tokio::test(start_paused = true)]
async fn test_judge_all_attempts_time_out() {
    let agent = Arc::new(HangingAgent::default());
    let (app, _) = app_with_agent(test_config("http://unused"), agent.clone());

    let response = app
        .clone()
        .oneshot(judge_json_request(&valid_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let verdict: JudgeVerdict = read_json(response).await;
    assert_eq!(verdict.status, JudgeStatus::Error);
    assert_eq!(verdict.verdict, Verdict::Fail);
    assert_eq!(verdict.score, 0.0);
    assert_eq!(verdict.confidence, 0.0);
    assert!(verdict.explanation.starts_with("Judge unavailable"));
    assert_eq!(agent.calls(), 2);

    let health: HealthResponse = read_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert!(!health.judge_ready);
    assert!(health.last_judge_failure_ms > 0);
}

#[tokio::test]
async fn test_judge_missing_emoji() {
    let (app, state) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let verdict: JudgeVerdict = read_json(
        app.oneshot(judge_json_request(&json!({"image": PNG_DATA_URL})))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(verdict, JudgeVerdict::error("`emoji` is required."));
    assert!(state.health.snapshot().last_failure_ms > 0);
}

#[tokio::test]
async fn test_judge_missing_image() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let verdict: JudgeVerdict = read_json(
        app.oneshot(judge_json_request(&json!({"emoji": "😀", "image": ""})))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(verdict.explanation, "`image` is required.");
    assert_eq!(verdict.status, JudgeStatus::Error);
}

#[tokio::test]
async fn test_judge_unsupported_content_type() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let request = Request::builder()
        .method("POST")
        .uri("/judge")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("😀"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let verdict: JudgeVerdict = read_json(response).await;
    assert_eq!(
        verdict.explanation,
        "Unsupported content type. Use JSON or multipart form data."
    );
}

#[tokio::test]
async fn test_judge_malformed_json() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let request = Request::builder()
        .method("POST")
        .uri("/judge")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"emoji\": "))
        .unwrap();
    let verdict: JudgeVerdict = read_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(verdict.explanation, "Invalid request payload.");
}

#[tokio::test]
async fn test_judge_oversized_body_is_still_200() {
    let mut config = test_config("http://unused");
    config.server.max_body_bytes = 1024;
    let (app, _) = app_with_agent(config, FixedAgent::new("[]"));

    let payload = json!({"emoji": "😀", "image": "A".repeat(4096)});
    let response = app.oneshot(judge_json_request(&payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let verdict: JudgeVerdict = read_json(response).await;
    assert_eq!(verdict.explanation, "Invalid request payload.");
}

#[tokio::test]
async fn test_judge_multipart_file_upload() {
    let agent = FixedAgent::new(r#"[{"score":0.81,"explanation":"Wide grin"}]"#);
    let (app, _) = app_with_agent(test_config("http://unused"), agent.clone());

    let boundary = "emoji-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"emoji\"\r\n\r\n😀\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"snap.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/judge")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let verdict: JudgeVerdict = read_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(verdict.verdict, Verdict::Pass);

    let requests = agent.requests.lock().unwrap();
    assert_eq!(requests[0].image.mime_type, "image/jpeg");
    assert_eq!(requests[0].image.data, "/9j/4A==");
}

#[tokio::test]
async fn test_judge_missing_api_key() {
    let mut config = test_config("http://unused");
    config.judge.api_key_env = "EMOJI_JUDGE_IT_NEVER_SET".to_string();
    let (app, state) = app_from_config(config);

    let verdict: JudgeVerdict = read_json(
        app.oneshot(judge_json_request(&valid_payload()))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(
        verdict,
        JudgeVerdict::error("Judge unavailable. Please try again shortly.")
    );
    assert!(state.health.snapshot().last_failure_ms > 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn test_cors_allows_browser_origin() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_404() {
    let (app, _) = app_with_agent(test_config("http://unused"), FixedAgent::new("[]"));

    let response = app.oneshot(get_request("/v1/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
