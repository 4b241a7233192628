//! Execution tests for disk resizing and management.

mod common;

use clcapi::{ClcError, Collection, Get, Server};
use common::{client, mount_login, mount_server, status_link};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_grow_sends_single_patch_with_full_disk_set() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_server(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/v2/servers/ACME/WA1ACMEWEB01"))
        .and(body_json(json!([{
            "op": "set",
            "member": "disks",
            "value": [
                {"diskId": "0:0", "sizeGB": 1},
                {"diskId": "0:1", "sizeGB": 2},
                {"diskId": "0:2", "sizeGB": 14},
                {"diskId": "0:3", "sizeGB": 50}
            ]
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_link("wa1-100")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await.unwrap();
    let mut disks = server.disks().unwrap();

    let operation = disks.grow(&client, "/data", 50).await.unwrap();

    assert_eq!(operation.requests()[0].id, "wa1-100");
    assert_eq!(disks.get("0:3").unwrap().size_gb(), 50);
    assert_eq!(disks.get("0:3").unwrap().attr("size_g_b").unwrap(), &json!(50));
    assert!(server.is_dirty());
}

#[tokio::test]
async fn test_grow_validation_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_server(&mock_server).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await.unwrap();
    let mut disks = server.disks().unwrap();

    let too_big = disks.grow(&client, "0:3", 1025).await.unwrap_err();
    assert!(matches!(too_big, ClcError::Validation(_)));

    let not_bigger = disks.grow(&client, "0:3", 30).await.unwrap_err();
    assert!(matches!(not_bigger, ClcError::Validation(_)));

    let missing = disks.grow(&client, "/nope", 40).await.unwrap_err();
    assert!(matches!(missing, ClcError::NotFound { .. }));

    assert_eq!(disks.get("0:3").unwrap().size_gb(), 30);
    assert!(!server.is_dirty());
}

#[tokio::test]
async fn test_rejected_grow_keeps_local_size() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_server(&mock_server).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "The server is not in a state that allows this change."
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await.unwrap();
    let mut disks = server.disks().unwrap();

    let err = disks.grow(&client, "0:2", 20).await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(disks.get("0:2").unwrap().size_gb(), 14);
}

#[tokio::test]
async fn test_add_partitioned_disk() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_server(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(body_json(json!([{
            "op": "set",
            "member": "disks",
            "value": [
                {"diskId": "0:0", "sizeGB": 1},
                {"diskId": "0:1", "sizeGB": 2},
                {"diskId": "0:2", "sizeGB": 14},
                {"diskId": "0:3", "sizeGB": 30},
                {"path": "/logs", "sizeGB": 10, "type": "partitioned"}
            ]
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_link("wa1-101")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await.unwrap();
    let disks = server.disks().unwrap();

    disks.add(&client, 10, Some("/logs")).await.unwrap();
    // Not in the collection until the server is refreshed
    assert_eq!(disks.len(), 4);
}

#[tokio::test]
async fn test_delete_then_prune() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;
    mount_server(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(body_json(json!([{
            "op": "set",
            "member": "disks",
            "value": [
                {"diskId": "0:0", "sizeGB": 1},
                {"diskId": "0:1", "sizeGB": 2},
                {"diskId": "0:2", "sizeGB": 14}
            ]
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_link("wa1-102")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await.unwrap();
    let mut disks = server.disks().unwrap();

    disks.delete(&client, "/data").await.unwrap();
    assert!(disks.get("/data").is_some());

    let pruned = disks.prune("/data").unwrap();
    assert_eq!(pruned.id(), "0:3");
    assert_eq!(disks.len(), 3);
    assert!(disks.get("/data").is_none());
}
