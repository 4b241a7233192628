//! Mock server state management.
//!
//! Provides the in-memory data store for the mock CLC API server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

/// Login accepted by the mock server.
#[derive(Debug, Clone)]
pub struct MockUser {
    pub password: String,
    pub location_alias: String,
}

/// Shared state for the mock server.
///
/// Resources are held as raw provider JSON so that handlers can return
/// and mutate them exactly as the real API would. Everything is scoped to
/// a single account alias.
#[derive(Debug, Default)]
pub struct MockState {
    /// Account alias every path must carry.
    pub alias: String,

    /// Users indexed by username.
    pub users: HashMap<String, MockUser>,

    /// Bearer tokens handed out by login.
    pub tokens: Vec<String>,

    /// Datacenters indexed by location alias (e.g., "WA1").
    pub datacenters: BTreeMap<String, Value>,

    /// Deployment capabilities indexed by location alias.
    pub capabilities: HashMap<String, Value>,

    /// Networks indexed by location alias.
    pub networks: HashMap<String, Vec<Value>>,

    /// Servers indexed by upper-cased name.
    pub servers: HashMap<String, Value>,

    /// Public IP details indexed by public address.
    pub public_ips: HashMap<String, Value>,

    /// Final status of each queued operation, indexed by job ID.
    pub operations: HashMap<String, String>,

    /// When false, mutations report "executing" until polled once.
    pub instant_operations: bool,

    /// Every mutating request received, as `METHOD path`.
    pub mutations: Vec<String>,

    polled: HashSet<String>,
    next_id: u64,
}

impl MockState {
    /// Create a new empty state for `alias`.
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            instant_operations: true,
            ..Self::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Accept a username/password pair.
    pub fn with_user(mut self, username: &str, password: &str, location: &str) -> Self {
        self.users.insert(
            username.to_string(),
            MockUser {
                password: password.to_string(),
                location_alias: location.to_string(),
            },
        );
        self
    }

    /// Add a datacenter, its capabilities and networks.
    pub fn with_datacenter(
        mut self,
        datacenter: Value,
        capabilities: Value,
        networks: Vec<Value>,
    ) -> Self {
        let location = datacenter["id"].as_str().unwrap_or_default().to_string();
        self.capabilities.insert(location.clone(), capabilities);
        self.networks.insert(location.clone(), networks);
        self.datacenters.insert(location, datacenter);
        self
    }

    /// Add a server.
    pub fn with_server(mut self, server: Value) -> Self {
        let name = server["id"].as_str().unwrap_or_default().to_uppercase();
        self.servers.insert(name, server);
        self
    }

    /// Add the details of a public IP already listed on a server.
    pub fn with_public_ip(mut self, public: &str, details: Value) -> Self {
        self.public_ips.insert(public.to_string(), details);
        self
    }

    /// Issue a bearer token for `username` if the password matches.
    pub fn login(&mut self, username: &str, password: &str) -> Option<(String, String)> {
        let user = self.users.get(username)?;
        if user.password != password {
            return None;
        }
        let location = user.location_alias.clone();
        let token = format!("mock-token-{}", self.next_id());
        self.tokens.push(token.clone());
        Some((token, location))
    }

    /// Whether `token` was issued by this server.
    pub fn is_authorized(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn get_server(&self, id: &str) -> Option<&Value> {
        self.servers.get(&id.to_uppercase())
    }

    /// Apply a `disks` PATCH to a server.
    ///
    /// Entries with a `diskId` resize that disk, entries without one add a
    /// disk, and disks left out of the list are removed.
    pub fn set_disks(&mut self, id: &str, specs: &[Value]) -> Result<(), String> {
        let server = self
            .servers
            .get_mut(&id.to_uppercase())
            .ok_or_else(|| format!("server {id} not found"))?;
        let current = server["details"]["disks"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        // New disks never reuse an index, even after deletes.
        let mut next_index = current
            .iter()
            .filter_map(|d| d["id"].as_str()?.rsplit(':').next()?.parse::<usize>().ok())
            .max()
            .map_or(0, |max| max + 1);
        let mut disks = Vec::with_capacity(specs.len());
        for spec in specs {
            let size = spec["sizeGB"].as_u64().ok_or("sizeGB is required")?;
            match spec["diskId"].as_str() {
                Some(disk_id) => {
                    let mut disk = current
                        .iter()
                        .find(|d| d["id"] == disk_id)
                        .cloned()
                        .ok_or_else(|| format!("disk {disk_id} not found"))?;
                    let existing = disk["sizeGB"].as_u64().unwrap_or_default();
                    if size < existing {
                        return Err(format!("disk {disk_id} cannot shrink"));
                    }
                    disk["sizeGB"] = json!(size);
                    disks.push(disk);
                }
                None => {
                    let paths: Vec<Value> = spec["path"].as_str().map(|p| json!(p)).into_iter().collect();
                    disks.push(json!({
                        "id": format!("0:{next_index}"),
                        "sizeGB": size,
                        "partitionPaths": paths,
                    }));
                    next_index += 1;
                }
            }
        }

        server["details"]["disks"] = Value::Array(disks);
        Ok(())
    }

    /// Claim a public IP on a server and return its address.
    pub fn add_public_ip(&mut self, id: &str, request: &Value) -> Result<String, String> {
        let n = self.next_id();
        let server = self
            .servers
            .get_mut(&id.to_uppercase())
            .ok_or_else(|| format!("server {id} not found"))?;

        let public = format!("65.39.184.{}", 100 + n % 150);
        let internal = request["internalIPAddress"]
            .as_str()
            .map_or_else(|| format!("10.80.148.{}", 100 + n % 150), str::to_string);

        let entries = server["details"]["ipAddresses"]
            .as_array_mut()
            .ok_or("server has no ipAddresses")?;
        match entries.iter_mut().find(|e| e["internal"] == internal.as_str()) {
            Some(entry) if entry.get("public").is_some() => {
                return Err(format!("{internal} already has a public IP"));
            }
            Some(entry) => entry["public"] = json!(public),
            None => entries.push(json!({"internal": internal, "public": public})),
        }

        self.public_ips.insert(
            public.clone(),
            json!({
                "internalIPAddress": internal,
                "ports": request.get("ports").cloned().unwrap_or_else(|| json!([])),
                "sourceRestrictions": request.get("sourceRestrictions").cloned().unwrap_or_else(|| json!([])),
            }),
        );
        Ok(public)
    }

    /// Release a public IP from a server.
    pub fn remove_public_ip(&mut self, id: &str, public: &str) -> bool {
        let Some(server) = self.servers.get_mut(&id.to_uppercase()) else {
            return false;
        };
        let Some(entries) = server["details"]["ipAddresses"].as_array_mut() else {
            return false;
        };
        let Some(entry) = entries.iter_mut().find(|e| e["public"] == public) else {
            return false;
        };
        if let Some(fields) = entry.as_object_mut() {
            fields.remove("public");
        }
        self.public_ips.remove(public);
        true
    }

    /// Queue an operation and return its status link.
    pub fn queue_operation(&mut self, outcome: &str) -> Value {
        let id = format!("wa1-{}", self.next_id());
        self.operations.insert(id.clone(), outcome.to_string());
        json!({
            "rel": "status",
            "href": format!("/v2/operations/{}/status/{}", self.alias, id),
            "id": id,
        })
    }

    /// Status of an operation. The first poll of a non-instant operation
    /// reports "executing".
    pub fn poll_operation(&mut self, id: &str) -> Option<String> {
        let outcome = self.operations.get(id)?.clone();
        if self.instant_operations {
            return Some(outcome);
        }
        if self.polled.insert(id.to_string()) {
            Some("executing".to_string())
        } else {
            Some(outcome)
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}
