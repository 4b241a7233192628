//! Mock CLC API server.
//!
//! Provides an axum-based HTTP server that simulates the CLC v2 API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// A mock CLC API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic, stateful API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with the default scenario.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server that only knows the default login.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new(super::fixtures::ALIAS).with_user(
            super::fixtures::USERNAME,
            super::fixtures::PASSWORD,
            "WA1",
        ))
        .await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating a `ClcClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows inspecting or modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Authentication
            .route("/v2/authentication/login", post(handlers::login))
            // Datacenter routes
            .route("/v2/datacenters/:alias", get(handlers::list_datacenters))
            .route(
                "/v2/datacenters/:alias/:location",
                get(handlers::get_datacenter),
            )
            .route(
                "/v2/datacenters/:alias/:location/deploymentCapabilities",
                get(handlers::get_capabilities),
            )
            .route(
                "/v2/networks/:alias/:location",
                get(handlers::list_networks),
            )
            // Server routes
            .route(
                "/v2/servers/:alias/:id",
                get(handlers::get_server).patch(handlers::patch_server),
            )
            .route(
                "/v2/servers/:alias/:id/publicIPAddresses",
                post(handlers::add_public_ip),
            )
            .route(
                "/v2/servers/:alias/:id/publicIPAddresses/:ip",
                get(handlers::get_public_ip)
                    .put(handlers::update_public_ip)
                    .delete(handlers::delete_public_ip),
            )
            // Operation routes
            .route(
                "/v2/operations/:alias/status/:id",
                get(handlers::get_operation_status),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::fixtures::{PASSWORD, USERNAME};
    use crate::{ClcClient, ClcError, Collection, Credentials, Datacenter, Get, List, Server};

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn client_for(server: &MockServer) -> ClcClient {
        ClcClient::new(server.url(), Credentials::new(USERNAME, PASSWORD)).unwrap()
    }

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_router_rejects_missing_token() {
        let app = MockServer::create_router(Fixtures::default_scenario().shared());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v2/servers/ACME/WA1ACMEWEB01")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body["message"].as_str().unwrap().contains("denied"));
    }

    #[tokio::test]
    async fn test_router_login_form() {
        let app = MockServer::create_router(Fixtures::default_scenario().shared());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v2/authentication/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("username=admin&password=secret"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["accountAlias"], "ACME");
        assert_eq!(body["locationAlias"], "WA1");
    }

    #[tokio::test]
    async fn test_list_datacenters_with_clc_client() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let datacenters = Datacenter::list(&client, &Default::default())
            .await
            .expect("Failed to list datacenters");

        let ids: Vec<_> = datacenters.iter().map(|dc| dc.id()).collect();
        assert_eq!(ids, vec!["UC1", "WA1"]);
        // List responses carry no group links
        assert!(datacenters[0].root_group().is_none());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let server = MockServer::start().await;
        let client = ClcClient::new(server.url(), Credentials::new(USERNAME, "nope")).unwrap();

        let err = Server::get(&client, "WA1ACMEWEB01".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ClcError::InvalidCredentials(_)));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_grow_disk_is_visible_after_refresh() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let mut web = Server::get(&client, "WA1ACMEWEB01".to_string())
            .await
            .unwrap();
        let mut disks = web.disks().unwrap();
        disks
            .grow(&client, "/data", 50)
            .await
            .unwrap()
            .wait_until_complete(std::time::Duration::from_millis(10))
            .await
            .unwrap();
        assert!(web.is_dirty());

        web.refresh(&client).await.unwrap();
        assert!(!web.is_dirty());
        let disks = web.disks().unwrap();
        assert_eq!(disks.len(), 4);
        assert_eq!(disks.get("0:3").unwrap().size_gb(), 50);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new("XYZ")
            .with_user("ops", "pw", "UC1")
            .with_server(Fixtures::server("UC1XYZDB01"));

        let server = MockServer::with_state(state).await;
        let client = ClcClient::new(server.url(), Credentials::new("ops", "pw")).unwrap();

        let db = Server::get(&client, "UC1XYZDB01".to_string())
            .await
            .expect("Failed to get server");

        assert_eq!(db.alias(), "XYZ");
        assert_eq!(client.location().await.unwrap(), "UC1");

        server.shutdown().await;
    }
}
