//! Public IP addresses NATed to a server, with their ports and source
//! restrictions.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::{Attributes, Lazy};
use crate::client::{ClcClient, Payload};
use crate::error::{ClcError, Result};
use crate::models::server::{IpAddressEntry, ServerRef};
use crate::operation::Operation;
use crate::traits::{Collection, Keyed};

/// Transport protocol of a port rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Icmp => "ICMP",
        })
    }
}

impl FromStr for Protocol {
    type Err = ClcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Self::Tcp),
            "UDP" => Ok(Self::Udp),
            "ICMP" => Ok(Self::Icmp),
            other => Err(ClcError::Validation(format!(
                "unknown protocol '{other}', expected TCP, UDP or ICMP"
            ))),
        }
    }
}

/// A port, or port range, opened on a public IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub protocol: Protocol,
    pub port: u16,
    /// End of the range when opening several ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_to: Option<u16>,
}

impl Port {
    pub fn new(protocol: Protocol, port: u16) -> Self {
        Self {
            protocol,
            port,
            port_to: None,
        }
    }

    pub fn range(protocol: Protocol, port: u16, port_to: u16) -> Self {
        Self {
            protocol,
            port,
            port_to: Some(port_to),
        }
    }

    fn validate(&self) -> Result<()> {
        match self.port_to {
            Some(to) if to < self.port => Err(ClcError::Validation(format!(
                "port range {}-{} is reversed",
                self.port, to
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port_to {
            Some(to) => write!(f, "{}-{}/{}", self.port, to, self.protocol),
            None => write!(f, "{}/{}", self.port, self.protocol),
        }
    }
}

/// Parses the display form: `22/TCP` or `8000-8080/udp`.
impl FromStr for Port {
    type Err = ClcError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ClcError::Validation(format!("invalid port '{s}', expected PORT[-PORT]/PROTOCOL"));

        let (ports, protocol) = s.split_once('/').ok_or_else(invalid)?;
        let protocol: Protocol = protocol.parse()?;
        let port = match ports.split_once('-') {
            Some((from, to)) => Port::range(
                protocol,
                from.trim().parse().map_err(|_| invalid())?,
                to.trim().parse().map_err(|_| invalid())?,
            ),
            None => Port::new(protocol, ports.trim().parse().map_err(|_| invalid())?),
        };
        port.validate()?;
        Ok(port)
    }
}

/// A CIDR block allowed to reach a public IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRestriction {
    pub cidr: String,
}

impl SourceRestriction {
    pub fn new(cidr: impl Into<String>) -> Self {
        Self { cidr: cidr.into() }
    }
}

/// Full public IP data, fetched on demand.
#[derive(Debug, Clone, Default)]
pub struct PublicIpDetails {
    pub internal_ip_address: Option<String>,
    pub ports: Vec<Port>,
    pub source_restrictions: Vec<SourceRestriction>,
    attributes: Attributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsFields {
    #[serde(rename = "internalIPAddress", default)]
    internal_ip_address: Option<String>,
    #[serde(default)]
    ports: Vec<Port>,
    #[serde(default)]
    source_restrictions: Vec<SourceRestriction>,
}

impl PublicIpDetails {
    fn from_value(value: Value) -> Result<Self> {
        let fields: DetailsFields = serde_json::from_value(value.clone())?;
        Ok(Self {
            internal_ip_address: fields.internal_ip_address,
            ports: fields.ports,
            source_restrictions: fields.source_restrictions,
            attributes: Attributes::from_value(value),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePayload<'a> {
    ports: &'a [Port],
    #[serde(skip_serializing_if = "Option::is_none")]
    source_restrictions: Option<&'a [SourceRestriction]>,
    #[serde(rename = "internalIPAddress", skip_serializing_if = "Option::is_none")]
    internal_ip_address: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload<'a> {
    ports: &'a [Port],
    source_restrictions: &'a [SourceRestriction],
}

/// A public IP address NATed to a server.
///
/// The server response only names the public and internal addresses; ports
/// and source restrictions are fetched on first access.
#[derive(Debug, Clone)]
pub struct PublicIp {
    id: String,
    internal: Option<String>,
    server: ServerRef,
    data: Lazy<PublicIpDetails>,
}

impl PublicIp {
    pub fn new(server: ServerRef, public: impl Into<String>, internal: Option<String>) -> Self {
        Self {
            id: public.into(),
            internal,
            server,
            data: Lazy::Unloaded,
        }
    }

    /// The public address.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The internal address it maps to.
    pub fn internal(&self) -> Option<&str> {
        self.internal.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_loaded()
    }

    fn path(&self) -> String {
        format!("{}/publicIPAddresses/{}", self.server.path(), self.id)
    }

    /// Fetch the full data unless already cached.
    pub async fn ensure_loaded(&mut self, client: &ClcClient) -> Result<&mut PublicIpDetails> {
        if !self.data.is_loaded() {
            self.reload(client).await?;
        }
        self.data
            .get_mut()
            .ok_or_else(|| ClcError::MalformedResponse("public IP data not loaded".to_string()))
    }

    /// Fetch the full data, replacing anything cached.
    #[tracing::instrument(skip(self, client), fields(public_ip = %self.id))]
    pub async fn reload(&mut self, client: &ClcClient) -> Result<()> {
        let response = client.get(&self.path()).await?;
        let details = PublicIpDetails::from_value(response)?;
        if let Some(internal) = &details.internal_ip_address {
            self.internal = Some(internal.clone());
        }
        tracing::debug!(ports = details.ports.len(), "loaded public IP");
        self.data.set(details);
        Ok(())
    }

    /// Raw attribute by snake_case name, loading data on first use.
    pub async fn attr(&mut self, client: &ClcClient, name: &str) -> Result<&Value> {
        let details = self.ensure_loaded(client).await?;
        details.attributes.get("PublicIP", name)
    }

    pub async fn ports(&mut self, client: &ClcClient) -> Result<&[Port]> {
        Ok(&self.ensure_loaded(client).await?.ports)
    }

    pub async fn source_restrictions(&mut self, client: &ClcClient) -> Result<&[SourceRestriction]> {
        Ok(&self.ensure_loaded(client).await?.source_restrictions)
    }

    /// Open a port locally; call [`update`](Self::update) to apply.
    pub async fn add_port(&mut self, client: &ClcClient, port: Port) -> Result<()> {
        port.validate()?;
        self.ensure_loaded(client).await?.ports.push(port);
        Ok(())
    }

    /// Close a port locally; returns false when it was not open.
    pub async fn remove_port(&mut self, client: &ClcClient, port: &Port) -> Result<bool> {
        let details = self.ensure_loaded(client).await?;
        let before = details.ports.len();
        details.ports.retain(|p| p != port);
        Ok(details.ports.len() != before)
    }

    /// Allow a CIDR block locally; call [`update`](Self::update) to apply.
    pub async fn add_source_restriction(&mut self, client: &ClcClient, cidr: &str) -> Result<()> {
        self.ensure_loaded(client)
            .await?
            .source_restrictions
            .push(SourceRestriction::new(cidr));
        Ok(())
    }

    /// Push the local ports and source restrictions to the provider.
    #[tracing::instrument(skip(self, client), fields(public_ip = %self.id))]
    pub async fn update(&mut self, client: &ClcClient) -> Result<Operation> {
        let path = self.path();
        let details = self.ensure_loaded(client).await?;
        let payload = Payload::json(&UpdatePayload {
            ports: &details.ports,
            source_restrictions: &details.source_restrictions,
        })?;

        let response = client.call(Method::PUT, &path, payload, false).await?;
        self.server.mark_dirty();
        Ok(Operation::from_response(client, &response))
    }
}

impl Keyed for PublicIp {
    fn key(&self) -> &str {
        &self.id
    }

    fn matches_secondary(&self, key: &str) -> bool {
        self.internal.as_deref() == Some(key)
    }
}

impl fmt::Display for PublicIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Public IP addresses of one server.
#[derive(Debug, Clone)]
pub struct PublicIps {
    server: ServerRef,
    public_ips: Vec<PublicIp>,
}

impl PublicIps {
    /// Build the collection from a server's `details.ipAddresses`, keeping
    /// only entries that carry a public address.
    pub fn from_server(server: ServerRef, entries: &[IpAddressEntry]) -> Self {
        let public_ips = entries
            .iter()
            .filter_map(|entry| {
                entry
                    .public
                    .as_ref()
                    .map(|public| PublicIp::new(server.clone(), public, entry.internal.clone()))
            })
            .collect();
        Self { server, public_ips }
    }

    pub fn server(&self) -> &ServerRef {
        &self.server
    }

    pub fn public_ips(&self) -> &[PublicIp] {
        &self.public_ips
    }

    /// Mutable lookup, for lazy loads and port edits.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PublicIp> {
        let index = self.position(key)?;
        self.public_ips.get_mut(index)
    }

    /// Claim a new public IP.
    ///
    /// Source restrictions and the private address are only sent when
    /// given; without `private_ip` the provider picks an internal address.
    #[tracing::instrument(skip(self, client), fields(server = %self.server.id()))]
    pub async fn add(
        &self,
        client: &ClcClient,
        ports: &[Port],
        source_restrictions: &[SourceRestriction],
        private_ip: Option<&str>,
    ) -> Result<Operation> {
        if ports.is_empty() {
            return Err(ClcError::Validation(
                "at least one port is required".to_string(),
            ));
        }
        for port in ports {
            port.validate()?;
        }

        let payload = Payload::json(&CreatePayload {
            ports,
            source_restrictions: (!source_restrictions.is_empty()).then_some(source_restrictions),
            internal_ip_address: private_ip.filter(|ip| !ip.is_empty()),
        })?;

        let path = format!("{}/publicIPAddresses", self.server.path());
        let response = client.call(Method::POST, &path, payload, false).await?;
        self.server.mark_dirty();
        Ok(Operation::from_response(client, &response))
    }

    /// Release a public IP.
    ///
    /// The address stays in this collection; call [`prune`](Self::prune)
    /// once the operation has completed.
    #[tracing::instrument(skip(self, client), fields(server = %self.server.id()))]
    pub async fn delete(&self, client: &ClcClient, key: &str) -> Result<Operation> {
        let public_ip = self.get(key).ok_or_else(|| ClcError::NotFound {
            entity_type: "PublicIP",
            id: key.to_string(),
        })?;

        let response = client
            .call(Method::DELETE, &public_ip.path(), Payload::None, false)
            .await?;
        self.server.mark_dirty();
        Ok(Operation::from_response(client, &response))
    }

    /// Drop a public IP from the local collection.
    pub fn prune(&mut self, key: &str) -> Option<PublicIp> {
        let index = self.position(key)?;
        Some(self.public_ips.remove(index))
    }
}

impl Collection for PublicIps {
    type Item = PublicIp;

    fn members(&self) -> &[PublicIp] {
        &self.public_ips
    }
}
