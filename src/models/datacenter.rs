//! Datacenter model and trait implementations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::{Attributes, Lazy};
use crate::client::ClcClient;
use crate::error::{ClcError, Result};
use crate::naming;
use crate::traits::{Get, List};

/// Attributes served from deployment capabilities rather than the
/// datacenter object itself.
const CAPABILITY_ATTRIBUTES: &[&str] = &["supportsPremiumStorage", "supportsSharedLoadBalancer"];

/// A hypermedia link in a provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
}

/// A network, either deployable (from capabilities) or from the networks
/// endpoint. The two shapes share a name and an ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(alias = "networkId")]
    pub id: String,

    pub name: String,

    /// Network type (e.g., "private", "publicShared").
    #[serde(rename = "type", default)]
    pub network_type: Option<String>,

    #[serde(rename = "accountID", alias = "accountId", default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub cidr: Option<String>,

    #[serde(default)]
    pub gateway: Option<String>,

    #[serde(default)]
    pub netmask: Option<String>,

    #[serde(default)]
    pub vlan: Option<u32>,

    #[serde(default)]
    pub description: Option<String>,
}

/// An OS template deployable in a datacenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,

    #[serde(default)]
    pub os_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "storageSizeGB", default)]
    pub storage_size_gb: Option<u32>,

    #[serde(default)]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub reserved_drive_paths: Vec<String>,
}

/// What can be deployed in a datacenter.
#[derive(Debug, Clone, Default)]
pub struct DeploymentCapabilities {
    pub supports_premium_storage: bool,
    pub supports_shared_load_balancer: bool,
    pub deployable_networks: Vec<Network>,
    pub templates: Vec<Template>,
    attributes: Attributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapabilityFields {
    #[serde(default)]
    supports_premium_storage: bool,
    #[serde(default)]
    supports_shared_load_balancer: bool,
    #[serde(default)]
    deployable_networks: Vec<Network>,
    #[serde(default)]
    templates: Vec<Template>,
}

impl DeploymentCapabilities {
    fn from_value(value: Value) -> Result<Self> {
        let fields: CapabilityFields = serde_json::from_value(value.clone())?;
        Ok(Self {
            supports_premium_storage: fields.supports_premium_storage,
            supports_shared_load_balancer: fields.supports_shared_load_balancer,
            deployable_networks: fields.deployable_networks,
            templates: fields.templates,
            attributes: Attributes::from_value(value),
        })
    }
}

#[derive(Deserialize)]
struct DatacenterResponse {
    id: String,
    name: String,
    #[serde(default)]
    links: Vec<Link>,
}

/// A CLC datacenter (cloud location).
#[derive(Debug, Clone)]
pub struct Datacenter {
    alias: String,
    location: String,
    name: String,
    links: Vec<Link>,
    capabilities: Lazy<DeploymentCapabilities>,
}

impl Datacenter {
    fn from_response(alias: &str, response: DatacenterResponse) -> Self {
        Self {
            alias: alias.to_string(),
            location: response.id,
            name: response.name,
            links: response.links,
            capabilities: Lazy::Unloaded,
        }
    }

    /// Fetch a datacenter under an explicit account alias.
    #[tracing::instrument(skip(client))]
    pub async fn get_in(client: &ClcClient, alias: &str, location: &str) -> Result<Self> {
        let path = format!("datacenters/{alias}/{location}");
        let response = client
            .get_with_query(&path, [("GroupLinks", "true")])
            .await?;
        let response: DatacenterResponse = serde_json::from_value(response)?;
        Ok(Self::from_response(alias, response))
    }

    /// Location alias; doubles as the datacenter ID.
    pub fn id(&self) -> &str {
        &self.location
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Link to the datacenter's root server group.
    ///
    /// Only present when the datacenter was fetched individually; list
    /// responses omit group links.
    pub fn root_group(&self) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == "group")
    }

    /// Deployment capabilities, fetched on first use and cached.
    /// `forced` fetches again.
    #[tracing::instrument(skip(self, client), fields(location = %self.location))]
    pub async fn capabilities(
        &mut self,
        client: &ClcClient,
        forced: bool,
    ) -> Result<&DeploymentCapabilities> {
        if forced || !self.capabilities.is_loaded() {
            let path = format!(
                "datacenters/{}/{}/deploymentCapabilities",
                self.alias, self.location
            );
            let response = client.get(&path).await?;
            self.capabilities
                .set(DeploymentCapabilities::from_value(response)?);
        }

        self.capabilities.get().ok_or_else(|| {
            ClcError::MalformedResponse("deployment capabilities not loaded".to_string())
        })
    }

    /// Lazy attribute lookup by snake_case name.
    ///
    /// Only `supports_premium_storage` and `supports_shared_load_balancer`
    /// are served; anything else fails with
    /// [`ClcError::AttributeNotFound`].
    pub async fn attr(&mut self, client: &ClcClient, name: &str) -> Result<&Value> {
        let key = naming::to_camel(name);
        if !CAPABILITY_ATTRIBUTES.contains(&key.as_str()) {
            return Err(ClcError::AttributeNotFound {
                kind: "Datacenter",
                attribute: name.to_string(),
            });
        }

        self.capabilities(client, false)
            .await?
            .attributes
            .get("Datacenter", name)
    }

    /// Networks in this datacenter.
    ///
    /// Served from deployment capabilities unless `forced`, in which case
    /// the networks endpoint is queried for the full records.
    pub async fn networks(&mut self, client: &ClcClient, forced: bool) -> Result<Vec<Network>> {
        if forced {
            let path = format!("networks/{}/{}", self.alias, self.location);
            let response = client.get(&path).await?;
            return Ok(serde_json::from_value(response)?);
        }

        Ok(self
            .capabilities(client, false)
            .await?
            .deployable_networks
            .clone())
    }

    /// Templates deployable in this datacenter.
    pub async fn templates(&mut self, client: &ClcClient) -> Result<Vec<Template>> {
        Ok(self.capabilities(client, false).await?.templates.clone())
    }
}

impl fmt::Display for Datacenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Query parameters for listing datacenters.
#[derive(Debug, Clone, Default)]
pub struct DatacenterListQuery {
    /// Account alias; defaults to the session's alias.
    pub alias: Option<String>,
}

#[async_trait]
impl Get for Datacenter {
    type Id = String; // Location alias

    async fn get(client: &ClcClient, location: String) -> Result<Self> {
        let alias = client.alias().await?;
        Self::get_in(client, &alias, &location).await
    }
}

#[async_trait]
impl List for Datacenter {
    type Query = DatacenterListQuery;

    #[tracing::instrument(skip(client))]
    async fn list(client: &ClcClient, query: &Self::Query) -> Result<Vec<Self>> {
        let alias = match &query.alias {
            Some(alias) => alias.clone(),
            None => client.alias().await?,
        };

        let response = client.get(&format!("datacenters/{alias}")).await?;
        let items: Vec<DatacenterResponse> = serde_json::from_value(response)?;
        Ok(items
            .into_iter()
            .map(|item| Datacenter::from_response(&alias, item))
            .collect())
    }
}
