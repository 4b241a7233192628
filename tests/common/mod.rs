//! Shared wiremock setup for integration tests.

#![allow(dead_code)]

use clcapi::{ClcClient, Credentials};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-bearer-token";

/// Login response for account ACME in WA1.
pub fn login_body() -> serde_json::Value {
    serde_json::json!({
        "userName": "admin",
        "accountAlias": "ACME",
        "locationAlias": "WA1",
        "roles": ["AccountAdmin"],
        "bearerToken": TOKEN
    })
}

/// Mount a login endpoint that must be hit exactly once.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/authentication/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(server)
        .await;
}

/// Client with credentials pointed at the mock server.
pub fn client(server: &MockServer) -> ClcClient {
    ClcClient::new(&server.uri(), Credentials::new("admin", "secret")).unwrap()
}

/// Status link as returned by mutating calls.
pub fn status_link(id: &str) -> serde_json::Value {
    serde_json::json!({
        "rel": "status",
        "href": format!("/v2/operations/ACME/status/{id}"),
        "id": id
    })
}

/// A server with four disks and one public IP.
pub fn server_body() -> serde_json::Value {
    serde_json::json!({
        "id": "WA1ACMEWEB01",
        "name": "WA1ACMEWEB01",
        "locationId": "WA1",
        "status": "active",
        "details": {
            "ipAddresses": [
                {"internal": "10.80.148.13", "public": "65.39.184.22"},
                {"internal": "10.80.148.14"}
            ],
            "powerState": "started",
            "cpu": 2,
            "memoryMB": 4096,
            "disks": [
                {"id": "0:0", "sizeGB": 1, "partitionPaths": []},
                {"id": "0:1", "sizeGB": 2, "partitionPaths": []},
                {"id": "0:2", "sizeGB": 14, "partitionPaths": []},
                {"id": "0:3", "sizeGB": 30, "partitionPaths": ["/data"]}
            ]
        }
    })
}

/// Mount the server GET.
pub async fn mount_server(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/servers/ACME/WA1ACMEWEB01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_body()))
        .mount(server)
        .await;
}
