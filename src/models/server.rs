//! Server model: the parent of disks and public IP addresses.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::Attributes;
use crate::client::ClcClient;
use crate::error::Result;
use crate::models::disk::Disks;
use crate::models::public_ip::PublicIps;
use crate::traits::Get;

/// Non-owning handle on a server, shared with its collections.
///
/// Carries the path scope for delegated calls and the "dirty" flag that
/// mutations set to signal that the cached server data is stale.
#[derive(Debug, Clone)]
pub struct ServerRef {
    alias: String,
    id: String,
    dirty: Arc<AtomicBool>,
}

impl ServerRef {
    pub fn new(alias: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            id: id.into(),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// API path of the server, relative to the versioned base.
    pub fn path(&self) -> String {
        format!("servers/{}/{}", self.alias, self.id)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }
}

/// Typed view of a server response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub group_id: Option<String>,

    #[serde(default)]
    pub location_id: Option<String>,

    #[serde(default)]
    pub os_type: Option<String>,

    /// Provisioning status (e.g., "active", "underConstruction").
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub details: ServerDetails,

    #[serde(default)]
    pub change_info: Option<ChangeInfo>,
}

/// Hardware and network details of a server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetails {
    #[serde(default)]
    pub ip_addresses: Vec<IpAddressEntry>,

    #[serde(default)]
    pub power_state: Option<String>,

    #[serde(default)]
    pub cpu: Option<u32>,

    #[serde(rename = "memoryMB", default)]
    pub memory_mb: Option<u64>,

    #[serde(rename = "storageGB", default)]
    pub storage_gb: Option<u64>,

    /// Raw disk objects; wrapped by [`Disks`].
    #[serde(default)]
    pub disks: Vec<Value>,
}

/// An internal address and, when NATed, its public address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpAddressEntry {
    #[serde(default)]
    pub internal: Option<String>,
    #[serde(default)]
    pub public: Option<String>,
}

/// Audit information on a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInfo {
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,
}

/// A CLC server.
#[derive(Debug, Clone)]
pub struct Server {
    reference: ServerRef,
    info: ServerInfo,
    data: Attributes,
}

impl Server {
    /// Fetch a server under an explicit account alias.
    #[tracing::instrument(skip(client))]
    pub async fn get_in(client: &ClcClient, alias: &str, id: &str) -> Result<Self> {
        let reference = ServerRef::new(alias, id);
        let response = client.get(&reference.path()).await?;
        Self::from_response(reference, response)
    }

    fn from_response(reference: ServerRef, response: Value) -> Result<Self> {
        let info: ServerInfo = serde_json::from_value(response.clone())?;
        Ok(Self {
            reference,
            info,
            data: Attributes::from_value(response),
        })
    }

    /// Reload the server and clear the dirty flag.
    #[tracing::instrument(skip(self, client), fields(server = %self.reference.id))]
    pub async fn refresh(&mut self, client: &ClcClient) -> Result<()> {
        let response = client.get(&self.reference.path()).await?;
        self.info = serde_json::from_value(response.clone())?;
        self.data = Attributes::from_value(response);
        self.reference.clear_dirty();
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn alias(&self) -> &str {
        self.reference.alias()
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn reference(&self) -> &ServerRef {
        &self.reference
    }

    /// True after a mutation through one of this server's collections,
    /// until the next [`refresh`](Self::refresh).
    pub fn is_dirty(&self) -> bool {
        self.reference.is_dirty()
    }

    /// Raw attribute by snake_case name.
    pub fn attr(&self, name: &str) -> Result<&Value> {
        self.data.get("Server", name)
    }

    /// Disks attached to the server.
    pub fn disks(&self) -> Result<Disks> {
        Disks::from_server(self.reference.clone(), &self.info.details.disks)
    }

    /// Public IP addresses NATed to the server.
    pub fn public_ips(&self) -> PublicIps {
        PublicIps::from_server(self.reference.clone(), &self.info.details.ip_addresses)
    }

    /// Internal addresses of the server.
    pub fn internal_ips(&self) -> Vec<&str> {
        self.info
            .details
            .ip_addresses
            .iter()
            .filter_map(|ip| ip.internal.as_deref())
            .collect()
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info.id)
    }
}

#[async_trait]
impl Get for Server {
    type Id = String; // Server name

    async fn get(client: &ClcClient, id: String) -> Result<Self> {
        let alias = client.alias().await?;
        Self::get_in(client, &alias, &id).await
    }
}
