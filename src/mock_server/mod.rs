//! Mock CLC API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the CLC v2
//! API for integration and end-to-end testing. Unlike wiremock which mocks
//! at the HTTP level per-test, this server maintains state across requests:
//! a disk grown through a PATCH shows its new size on the next GET.
//!
//! # Example
//!
//! ```ignore
//! use clcapi::mock_server::{fixtures, MockServer};
//! use clcapi::{ClcClient, Credentials, Get, Server};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = ClcClient::new(
//!         server.url(),
//!         Credentials::new(fixtures::USERNAME, fixtures::PASSWORD),
//!     )
//!     .unwrap();
//!
//!     // Server comes with default fixtures
//!     let web = Server::get(&client, "WA1ACMEWEB01".to_string()).await.unwrap();
//!     assert_eq!(web.disks().unwrap().len(), 4);
//!
//!     server.shutdown().await;
//! }
//! ```

pub mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{MockState, MockUser};
