//! Disk model and the server-scoped disk collection.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::Attributes;
use crate::client::{ClcClient, Payload};
use crate::error::{ClcError, Result};
use crate::models::server::ServerRef;
use crate::operation::Operation;
use crate::traits::{Collection, Keyed};

/// Largest disk the provider accepts, in GB.
pub const MAX_DISK_SIZE_GB: u32 = 1024;

/// A disk attached to a server.
#[derive(Debug, Clone)]
pub struct Disk {
    id: String,
    size_gb: u32,
    partition_paths: Vec<String>,
    data: Attributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiskFields {
    id: String,
    #[serde(rename = "sizeGB")]
    size_gb: u32,
    #[serde(default)]
    partition_paths: Vec<String>,
}

impl Disk {
    /// Wrap a disk object from a server response.
    pub fn from_value(value: Value) -> Result<Self> {
        let fields: DiskFields = serde_json::from_value(value.clone())
            .map_err(|e| ClcError::MalformedResponse(format!("disk: {e}")))?;
        Ok(Self {
            id: fields.id,
            size_gb: fields.size_gb,
            partition_paths: fields.partition_paths,
            data: Attributes::from_value(value),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size_gb(&self) -> u32 {
        self.size_gb
    }

    /// Mount paths of the disk's partitions.
    pub fn partition_paths(&self) -> &[String] {
        &self.partition_paths
    }

    /// Raw attribute by snake_case name (e.g. `size_g_b`).
    pub fn attr(&self, name: &str) -> Result<&Value> {
        self.data.get("Disk", name)
    }

    fn spec(&self) -> DiskSpec {
        DiskSpec::Existing {
            disk_id: self.id.clone(),
            size_gb: self.size_gb,
        }
    }
}

impl Keyed for Disk {
    fn key(&self) -> &str {
        &self.id
    }

    fn matches_secondary(&self, key: &str) -> bool {
        self.partition_paths.iter().any(|p| p == key)
    }
}

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Entry of the `disks` member in a server PATCH.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum DiskSpec {
    #[serde(rename_all = "camelCase")]
    Existing {
        disk_id: String,
        #[serde(rename = "sizeGB")]
        size_gb: u32,
    },
    New {
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(rename = "sizeGB")]
        size_gb: u32,
        #[serde(rename = "type")]
        disk_type: &'static str,
    },
}

#[derive(Serialize)]
struct PatchOp<'a> {
    op: &'static str,
    member: &'static str,
    value: &'a [DiskSpec],
}

/// Disks of one server, in the order the provider listed them.
#[derive(Debug, Clone)]
pub struct Disks {
    server: ServerRef,
    disks: Vec<Disk>,
}

impl Disks {
    /// Build the collection from a server's `details.disks`.
    pub fn from_server(server: ServerRef, disks: &[Value]) -> Result<Self> {
        let disks = disks
            .iter()
            .cloned()
            .map(Disk::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { server, disks })
    }

    pub fn server(&self) -> &ServerRef {
        &self.server
    }

    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    /// Grow a disk to `size_gb`.
    ///
    /// The new size must exceed the current one and stay within
    /// [`MAX_DISK_SIZE_GB`]; both are checked before any request is sent.
    /// The PATCH carries every sibling disk unchanged plus this disk at the
    /// new size. The local size is updated once the provider accepts the
    /// request.
    ///
    /// # Errors
    ///
    /// [`ClcError::NotFound`] for an unknown key, [`ClcError::Validation`]
    /// for an out-of-range size, and any call error.
    #[tracing::instrument(skip(self, client), fields(server = %self.server.id()))]
    pub async fn grow(&mut self, client: &ClcClient, key: &str, size_gb: u32) -> Result<Operation> {
        let index = self.index_of(key)?;
        let current = self.disks[index].size_gb;

        if size_gb > MAX_DISK_SIZE_GB {
            return Err(ClcError::Validation(format!(
                "Cannot grow disk beyond {MAX_DISK_SIZE_GB}GB"
            )));
        }
        if size_gb <= current {
            return Err(ClcError::Validation(format!(
                "New size must exceed current disk size ({current}GB)"
            )));
        }

        let mut disk_set: Vec<DiskSpec> = self
            .disks
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, d)| d.spec())
            .collect();
        disk_set.push(DiskSpec::Existing {
            disk_id: self.disks[index].id.clone(),
            size_gb,
        });

        let operation = self.set_disks(client, &disk_set).await?;
        self.disks[index].size_gb = size_gb;
        self.disks[index]
            .data
            .insert("sizeGB", Value::from(size_gb));
        Ok(operation)
    }

    /// Attach a new disk. A `path` makes it a partitioned disk mounted
    /// there; without one the disk is raw.
    #[tracing::instrument(skip(self, client), fields(server = %self.server.id()))]
    pub async fn add(
        &self,
        client: &ClcClient,
        size_gb: u32,
        path: Option<&str>,
    ) -> Result<Operation> {
        if size_gb == 0 || size_gb > MAX_DISK_SIZE_GB {
            return Err(ClcError::Validation(format!(
                "Disk size must be between 1 and {MAX_DISK_SIZE_GB}GB"
            )));
        }

        let mut disk_set: Vec<DiskSpec> = self.disks.iter().map(Disk::spec).collect();
        disk_set.push(DiskSpec::New {
            path: path.map(str::to_string),
            size_gb,
            disk_type: if path.is_some() { "partitioned" } else { "raw" },
        });

        self.set_disks(client, &disk_set).await
    }

    /// Remove a disk from the server.
    ///
    /// The provider rejects this for protected disks (e.g. the system
    /// disk). The disk stays in this collection; call [`prune`](Self::prune)
    /// once the operation has completed.
    #[tracing::instrument(skip(self, client), fields(server = %self.server.id()))]
    pub async fn delete(&self, client: &ClcClient, key: &str) -> Result<Operation> {
        let index = self.index_of(key)?;
        let disk_set: Vec<DiskSpec> = self
            .disks
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, d)| d.spec())
            .collect();

        self.set_disks(client, &disk_set).await
    }

    /// Drop a disk from the local collection.
    pub fn prune(&mut self, key: &str) -> Option<Disk> {
        let index = self.position(key)?;
        Some(self.disks.remove(index))
    }

    async fn set_disks(&self, client: &ClcClient, disk_set: &[DiskSpec]) -> Result<Operation> {
        let body = [PatchOp {
            op: "set",
            member: "disks",
            value: disk_set,
        }];

        let response = client
            .call(
                Method::PATCH,
                &self.server.path(),
                Payload::json(&body)?,
                false,
            )
            .await?;
        self.server.mark_dirty();
        Ok(Operation::from_response(client, &response))
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.position(key).ok_or_else(|| ClcError::NotFound {
            entity_type: "Disk",
            id: key.to_string(),
        })
    }
}

impl Collection for Disks {
    type Item = Disk;

    fn members(&self) -> &[Disk] {
        &self.disks
    }
}
