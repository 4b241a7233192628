//! Execution tests for polling queued operations.

mod common;

use std::time::Duration;

use clcapi::{ClcError, Operation, OperationStatus};
use common::{client, mount_login, status_link};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_status(server: &MockServer, id: &str, status: &str, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/v2/operations/ACME/status/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

#[tokio::test]
async fn test_wait_polls_until_terminal() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_status(&mock_server, "wa1-1", "notStarted", Some(1)).await;
    mount_status(&mock_server, "wa1-1", "executing", Some(1)).await;
    mount_status(&mock_server, "wa1-1", "succeeded", None).await;

    let client = client(&mock_server);
    let operation = Operation::from_response(&client, &status_link("wa1-1"));

    let failed = operation
        .wait_until_complete(Duration::from_millis(5))
        .await
        .unwrap();
    assert_eq!(failed, 0);

    let polls = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().contains("/operations/"))
        .count();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn test_failures_and_refused_items_are_counted() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_status(&mock_server, "wa1-2", "failed", None).await;
    mount_status(&mock_server, "wa1-3", "succeeded", None).await;

    let client = client(&mock_server);
    let response = json!([
        {"server": "WA1ACMEWEB01", "isQueued": true, "links": [
            {"rel": "status", "id": "wa1-2", "href": "/v2/operations/ACME/status/wa1-2"}
        ]},
        {"server": "WA1ACMEWEB02", "isQueued": true, "links": [
            {"rel": "status", "id": "wa1-3"}
        ]},
        {"server": "WA1ACMEWEB03", "isQueued": false, "errorMessage": "The server is already off."}
    ]);
    let operation = Operation::from_response(&client, &response);

    assert_eq!(operation.requests().len(), 2);
    assert_eq!(operation.errors().len(), 1);

    let statuses = operation.status().await.unwrap();
    assert_eq!(
        statuses,
        vec![
            ("wa1-2".to_string(), OperationStatus::Failed),
            ("wa1-3".to_string(), OperationStatus::Succeeded),
        ]
    );

    let failed = operation
        .wait_until_complete(Duration::from_millis(5))
        .await
        .unwrap();
    assert_eq!(failed, 2);
}

#[tokio::test]
async fn test_wait_for_success_rejects_failed_jobs() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_status(&mock_server, "wa1-4", "failed", None).await;
    mount_status(&mock_server, "wa1-5", "succeeded", None).await;

    let client = client(&mock_server);
    let failing = Operation::from_response(
        &client,
        &json!([
            {"isQueued": true, "links": [{"rel": "status", "id": "wa1-4"}]},
            {"isQueued": true, "links": [{"rel": "status", "id": "wa1-5"}]}
        ]),
    );
    let err = failing
        .wait_for_success(Duration::from_millis(5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClcError::OperationFailed {
            failed: 1,
            total: 2
        }
    ));

    let succeeding = Operation::from_response(&client, &status_link("wa1-5"));
    succeeding
        .wait_for_success(Duration::from_millis(5))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_operation_completes_without_requests() {
    let mock_server = MockServer::start().await;

    let client = client(&mock_server);
    let operation = Operation::from_response(&client, &json!({}));

    assert!(operation.is_empty());
    assert_eq!(
        operation
            .wait_until_complete(Duration::from_millis(5))
            .await
            .unwrap(),
        0
    );
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
