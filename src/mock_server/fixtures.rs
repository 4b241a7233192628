//! Test data fixtures for the mock server.
//!
//! Provides factory functions for realistic provider JSON.

use serde_json::{json, Value};

use super::state::MockState;

/// Account alias of the default scenario.
pub const ALIAS: &str = "ACME";
/// Username accepted by the default scenario.
pub const USERNAME: &str = "admin";
/// Password accepted by the default scenario.
pub const PASSWORD: &str = "secret";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Datacenter Fixtures
    // =========================================================================

    /// A datacenter with self and root-group links.
    pub fn datacenter(location: &str, name: &str) -> Value {
        let group = format!("{}-837", location.to_lowercase());
        json!({
            "id": location,
            "name": name,
            "links": [
                {"rel": "self", "href": format!("/v2/datacenters/{ALIAS}/{location}")},
                {
                    "rel": "group",
                    "href": format!("/v2/groups/{ALIAS}/{group}"),
                    "id": group,
                    "name": format!("{location} Hardware")
                }
            ]
        })
    }

    /// Deployment capabilities with one network and one template.
    pub fn capabilities(premium_storage: bool) -> Value {
        json!({
            "supportsPremiumStorage": premium_storage,
            "supportsSharedLoadBalancer": true,
            "supportsBareMetalServers": false,
            "deployableNetworks": [
                {
                    "name": "vlan_100_10.80.148",
                    "networkId": "f3b6a2f8e1d24d1c9b8d7e6f5a4b3c2d",
                    "type": "private",
                    "accountID": ALIAS
                }
            ],
            "templates": [
                {
                    "name": "UBUNTU-14-64-TEMPLATE",
                    "osType": "ubuntu14_64Bit",
                    "description": "Ubuntu 14 | 64-bit",
                    "storageSizeGB": 17,
                    "capabilities": ["cpuAutoscale"],
                    "reservedDrivePaths": ["bin", "boot", "dev", "etc"]
                }
            ]
        })
    }

    /// A private network as listed by the networks endpoint.
    pub fn network(vlan: u32) -> Value {
        json!({
            "id": format!("net{vlan:05}"),
            "cidr": format!("10.80.{}.0/24", vlan % 256),
            "description": format!("vlan_{vlan}_10.80.{}", vlan % 256),
            "gateway": format!("10.80.{}.1", vlan % 256),
            "name": format!("vlan_{vlan}_10.80.{}", vlan % 256),
            "netmask": "255.255.255.0",
            "type": "private",
            "vlan": vlan
        })
    }

    // =========================================================================
    // Server Fixtures
    // =========================================================================

    /// A server with four disks and one public IP.
    pub fn server(name: &str) -> Value {
        json!({
            "id": name,
            "name": name,
            "description": "web",
            "groupId": "wa1-837",
            "locationId": "WA1",
            "osType": "Ubuntu 14 64-bit",
            "status": "active",
            "details": {
                "ipAddresses": [
                    {"internal": "10.80.148.13", "public": "65.39.184.22"},
                    {"internal": "10.80.148.14"}
                ],
                "powerState": "started",
                "cpu": 2,
                "memoryMB": 4096,
                "storageGB": 47,
                "disks": [
                    {"id": "0:0", "sizeGB": 1, "partitionPaths": []},
                    {"id": "0:1", "sizeGB": 2, "partitionPaths": []},
                    {"id": "0:2", "sizeGB": 14, "partitionPaths": []},
                    {"id": "0:3", "sizeGB": 30, "partitionPaths": ["/data"]}
                ]
            },
            "changeInfo": {
                "createdBy": "admin",
                "createdDate": "2014-11-03T19:29:31Z",
                "modifiedBy": "admin",
                "modifiedDate": "2014-11-04T10:02:11Z"
            }
        })
    }

    /// Details of a public IP with SSH and HTTP open.
    pub fn public_ip(internal: &str) -> Value {
        json!({
            "internalIPAddress": internal,
            "ports": [
                {"protocol": "TCP", "port": 22},
                {"protocol": "TCP", "port": 80}
            ],
            "sourceRestrictions": [
                {"cidr": "10.1.1.0/24"}
            ]
        })
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Default scenario: one account with two datacenters and one server.
    pub fn default_scenario() -> MockState {
        MockState::new(ALIAS)
            .with_user(USERNAME, PASSWORD, "WA1")
            .with_datacenter(
                Self::datacenter("WA1", "US West (Seattle)"),
                Self::capabilities(true),
                vec![Self::network(100), Self::network(101)],
            )
            .with_datacenter(
                Self::datacenter("UC1", "US West (Santa Clara)"),
                Self::capabilities(false),
                vec![Self::network(200)],
            )
            .with_server(Self::server("WA1ACMEWEB01"))
            .with_public_ip("65.39.184.22", Self::public_ip("10.80.148.13"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_consistent() {
        let state = Fixtures::default_scenario();

        assert_eq!(state.datacenters.len(), 2);
        assert!(state.capabilities.contains_key("UC1"));

        // Every public IP on a server has details
        let server = state.get_server("WA1ACMEWEB01").unwrap();
        for entry in server["details"]["ipAddresses"].as_array().unwrap() {
            if let Some(public) = entry["public"].as_str() {
                assert!(state.public_ips.contains_key(public));
            }
        }
    }
}
