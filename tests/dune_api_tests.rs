//! Tests for the Dune Analytics client against a mock HTTP server
//!
//! These cover the wire contract: the bespoke API-key header, the
//! trigger/poll/fetch endpoint shapes, failure signalling via the `error`
//! field, and the no-result sentinel on fetch.

use lakecore::{DuneClient, DuneError, ExecutionId, JobStatus, PerformanceTier};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-dune-key";

async fn client_for(server: &MockServer) -> DuneClient {
    let base = Url::parse(&server.uri()).expect("mock server uri");
    DuneClient::with_base_url(API_KEY, base).expect("client")
}

#[tokio::test]
async fn test_trigger_returns_execution_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query/3237025/execute"))
        .and(header("x-dune-api-key", API_KEY))
        .and(body_partial_json(json!({
            "performance": "medium",
            "query_parameters": {"contract": "0xabc"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "execution_id": "01HTEST",
            "state": "QUERY_STATE_PENDING",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let execution = client
        .trigger(3237025, &json!({"contract": "0xabc"}), PerformanceTier::Medium)
        .await
        .expect("trigger");
    assert_eq!(execution.as_str(), "01HTEST");
}

#[tokio::test]
async fn test_trigger_propagates_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query/1/execute"))
        .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client
        .trigger(1, &json!({}), PerformanceTier::Large)
        .await
        .expect_err("should fail");
    assert!(matches!(error, DuneError::Transport(_)));
}

#[tokio::test]
async fn test_trigger_without_execution_id_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query/1/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client
        .trigger(1, &json!({}), PerformanceTier::Medium)
        .await
        .expect_err("should fail");
    assert!(matches!(error, DuneError::MissingExecutionId));
}

#[tokio::test]
async fn test_poll_passes_state_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/execution/01HTEST/status"))
        .and(header("x-dune-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "execution_id": "01HTEST",
            "state": "QUERY_STATE_EXECUTING",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let status = client
        .poll(&ExecutionId::from("01HTEST".to_string()))
        .await
        .expect("poll");
    assert_eq!(status, JobStatus::Executing);
    assert!(!status.is_terminal());
}

#[tokio::test]
async fn test_poll_error_field_means_failed() {
    let server = MockServer::start().await;
    // The error field wins even when a non-failed state is present.
    Mock::given(method("GET"))
        .and(path("/api/v1/execution/01HBAD/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "execution_id": "01HBAD",
            "state": "QUERY_STATE_EXECUTING",
            "error": {"type": "FAILED_TYPE_EXECUTION_FAILED"},
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let status = client
        .poll(&ExecutionId::from("01HBAD".to_string()))
        .await
        .expect("poll");
    assert_eq!(status, JobStatus::Failed);
}

#[tokio::test]
async fn test_poll_unknown_state_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/execution/01HNEW/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "QUERY_STATE_PAUSED",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client
        .poll(&ExecutionId::from("01HNEW".to_string()))
        .await
        .expect_err("should fail");
    assert!(matches!(error, DuneError::UnexpectedState { state } if state == "QUERY_STATE_PAUSED"));
}

#[tokio::test]
async fn test_fetch_parses_csv_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/execution/01HTEST/results/csv"))
        .and(header("x-dune-api-key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("chain,volume\nethereum,123.4\nbase,9.9\n"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let table = client
        .fetch(&ExecutionId::from("01HTEST".to_string()))
        .await
        .expect("fetch")
        .expect("results present");
    assert_eq!(table.columns(), ["chain", "volume"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1, "volume"), Some("9.9"));
}

#[tokio::test]
async fn test_fetch_non_200_is_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/execution/01HGONE/results/csv"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .fetch(&ExecutionId::from("01HGONE".to_string()))
        .await
        .expect("fetch");
    assert!(result.is_none());
}
