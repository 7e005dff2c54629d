use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tokio::net::TcpListener;

use super::*;

async fn spawn_model(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn gateway_with_key(endpoint: &str) -> GenerativeRiskGateway {
    GenerativeRiskGateway::new(Some("test-key".to_string()), Duration::from_secs(2))
        .expect("gateway")
        .with_endpoint(endpoint)
}

fn model_reply(text: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    }))
}

#[derive(Clone)]
struct CallCounter(Arc<AtomicUsize>);

async fn handle_counted(State(counter): State<CallCounter>) -> Json<serde_json::Value> {
    counter.0.fetch_add(1, Ordering::SeqCst);
    model_reply(r#"{"riskScore":10,"findings":[],"remediation":[]}"#)
}

#[tokio::test]
async fn missing_credential_short_circuits_without_network_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/models/*path", post(handle_counted))
        .with_state(CallCounter(Arc::clone(&calls)));
    let base = spawn_model(app).await;

    let gateway = GenerativeRiskGateway::new(None, Duration::from_secs(2))
        .expect("gateway")
        .with_endpoint(&base);

    let err = gateway
        .analyze("unlabeled syringe on the sterile field")
        .await
        .expect_err("must be degraded");
    assert!(matches!(err, AnalysisError::MissingCredential));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_credential_counts_as_missing() {
    let gateway = GenerativeRiskGateway::new(Some(String::new()), Duration::from_secs(2))
        .expect("gateway");

    let err = gateway.analyze("scenario").await.expect_err("must fail");
    assert!(matches!(err, AnalysisError::MissingCredential));
}

#[tokio::test]
async fn schema_valid_reply_passes_through_unchanged() {
    let app = Router::new().route(
        "/models/*path",
        post(|| async { model_reply(r#"{"riskScore":72,"findings":["A"],"remediation":["B"]}"#) }),
    );
    let base = spawn_model(app).await;
    let gateway = gateway_with_key(&base);

    let result = gateway
        .analyze("possible sterile field contamination")
        .await
        .expect("analysis");
    assert_eq!(result.risk_score, 72.0);
    assert_eq!(result.findings, ["A"]);
    assert_eq!(result.remediation, ["B"]);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let gateway = gateway_with_key("http://127.0.0.1:9");

    let err = gateway.analyze("scenario").await.expect_err("must fail");
    assert!(matches!(err, AnalysisError::Transport(_)));
}

#[tokio::test]
async fn non_2xx_reply_is_a_transport_error() {
    let app = Router::new().route(
        "/models/*path",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
    );
    let base = spawn_model(app).await;
    let gateway = gateway_with_key(&base);

    let err = gateway.analyze("scenario").await.expect_err("must fail");
    match err {
        AnalysisError::Transport(detail) => {
            assert!(detail.contains("429"));
            assert!(detail.contains("quota exceeded"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_candidate_text_is_an_invalid_response() {
    let app = Router::new().route(
        "/models/*path",
        post(|| async { model_reply("the scenario looks risky") }),
    );
    let base = spawn_model(app).await;
    let gateway = gateway_with_key(&base);

    let err = gateway.analyze("scenario").await.expect_err("must fail");
    assert!(matches!(err, AnalysisError::InvalidResponse(_)));
}

#[tokio::test]
async fn reply_without_candidates_is_an_invalid_response() {
    let app = Router::new().route(
        "/models/*path",
        post(|| async { Json(serde_json::json!({"candidates": []})) }),
    );
    let base = spawn_model(app).await;
    let gateway = gateway_with_key(&base);

    let err = gateway.analyze("scenario").await.expect_err("must fail");
    assert!(matches!(err, AnalysisError::InvalidResponse(_)));
}

#[tokio::test]
async fn out_of_range_score_is_rejected() {
    let app = Router::new().route(
        "/models/*path",
        post(|| async { model_reply(r#"{"riskScore":250,"findings":[],"remediation":[]}"#) }),
    );
    let base = spawn_model(app).await;
    let gateway = gateway_with_key(&base);

    let err = gateway.analyze("scenario").await.expect_err("must fail");
    assert!(matches!(err, AnalysisError::InvalidResponse(_)));
}

#[test]
fn degraded_result_for_missing_credential_is_deterministic() {
    let result = degraded_result(&AnalysisError::MissingCredential);
    assert_eq!(result.risk_score, 0.0);
    assert!(result.findings[0].contains("API key missing"));
    assert_eq!(result.remediation, ["Configure GEMINI_API_KEY"]);
}

#[test]
fn degraded_result_for_transport_failure_carries_the_detail() {
    let result = degraded_result(&AnalysisError::Transport("connection reset".to_string()));
    assert_eq!(result.risk_score, 0.0);
    assert_eq!(
        result.findings,
        ["AI Service Connection Failed", "connection reset"]
    );
    assert_eq!(
        result.remediation,
        ["Check API Key", "Check Internet Connection"]
    );
}
