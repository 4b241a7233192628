//! CenturyLink Cloud v2 API client library.
//!
//! A Rust library for the CLC management API. A [`ClcClient`] logs in with
//! a username and password, holds the resulting bearer token, and issues
//! calls on behalf of typed resource models: datacenters, servers, disks
//! and public IP addresses.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use clcapi::{ClcClient, Collection, Datacenter, Get, List, Port, Protocol, Server};
//!
//! #[tokio::main]
//! async fn main() -> clcapi::Result<()> {
//!     // Credentials from CLC_V2_API_USERNAME / CLC_V2_API_PASSWD
//!     let client = ClcClient::from_env()?;
//!
//!     // Datacenters visible to the account
//!     for dc in Datacenter::list(&client, &Default::default()).await? {
//!         println!("{} - {}", dc.id(), dc.name());
//!     }
//!
//!     // Grow the disk mounted on /data to 50GB
//!     let server = Server::get(&client, "WA1ACMEWEB01".to_string()).await?;
//!     let mut disks = server.disks()?;
//!     disks.grow(&client, "/data", 50).await?
//!         .wait_until_complete(Duration::from_secs(2))
//!         .await?;
//!
//!     // Open SSH on a new public IP
//!     let public_ips = server.public_ips();
//!     public_ips
//!         .add(&client, &[Port::new(Protocol::Tcp, 22)], &[], None)
//!         .await?;
//!     println!("{} public IPs before the add", public_ips.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Get`] / [`List`] - fetch top-level resources ([`Datacenter`], [`Server`])
//! - [`Collection`] - lookup and search over server-scoped collections
//!   ([`Disks`], [`PublicIps`])
//! - [`Operation`] - handle on the provider jobs a mutation queued
//!
//! Data that needs an extra request (a datacenter's deployment
//! capabilities, a public IP's ports) is held in a [`Lazy`] and fetched on
//! first access. Raw provider keys stay reachable through `attr` methods
//! that translate snake_case names with [`naming`].
//!
//! # Configuration
//!
//! - `CLC_V2_API_USERNAME` / `CLC_V2_API_PASSWD` (required for login)
//! - `CLC_V2_API_URL` (optional) - Endpoint (defaults to `https://api.ctl.io/`)
//! - `CLC_CA_BUNDLE` (optional) - Extra PEM certificates to trust

mod attributes;
mod client;
mod error;
mod models;
pub mod naming;
mod operation;
mod session;
mod traits;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use attributes::{Attributes, Lazy};
pub use client::{ClcClient, Payload};
pub use error::{ClcError, ErrorBody, Result};
pub use operation::{Operation, OperationRequest, OperationStatus, DEFAULT_POLL_INTERVAL};
pub use session::{Credentials, Session, PASSWORD_ENV, USERNAME_ENV};

// Re-export traits
pub use traits::{Collection, Get, Keyed, List};

// Re-export models
pub use models::{
    // Datacenter types
    Datacenter,
    DatacenterListQuery,
    DeploymentCapabilities,
    Link,
    Network,
    Template,
    // Server types
    ChangeInfo,
    IpAddressEntry,
    Server,
    ServerDetails,
    ServerInfo,
    ServerRef,
    // Disk types
    Disk,
    Disks,
    MAX_DISK_SIZE_GB,
    // Public IP types
    Port,
    Protocol,
    PublicIp,
    PublicIpDetails,
    PublicIps,
    SourceRestriction,
};

/// HTTP method type accepted by [`ClcClient::call`].
pub use reqwest::Method;
