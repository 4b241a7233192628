//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{Datacenter, Disk, PublicIp, Server};

/// Trait for human-readable key-value output.
///
/// Implemented by resource types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Datacenter {
    fn pretty_print(&self) -> String {
        let header = format!("Datacenter: {}", self.id());
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Name:           {}", self.name()),
            format!("Alias:          {}", self.alias()),
        ];

        if let Some(group) = self.root_group() {
            lines.push(format!(
                "Root Group:     {} ({})",
                group.name.as_deref().unwrap_or("-"),
                group.id.as_deref().unwrap_or("-")
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Server {
    fn pretty_print(&self) -> String {
        let info = self.info();
        let header = format!("Server: {}", info.id);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider];

        if let Some(ref description) = info.description {
            lines.push(format!("Description:    {}", description));
        }

        if let Some(ref location) = info.location_id {
            lines.push(format!("Location:       {}", location));
        }

        if let Some(ref status) = info.status {
            let power = info.details.power_state.as_deref().unwrap_or("unknown");
            lines.push(format!("Status:         {} ({})", status, power));
        }

        if let (Some(cpu), Some(memory)) = (info.details.cpu, info.details.memory_mb) {
            lines.push(format!("Hardware:       {} CPU, {} MB", cpu, memory));
        }

        lines.push(format!(
            "Disks:          {}",
            info.details.disks.len()
        ));

        let internal = self.internal_ips();
        if !internal.is_empty() {
            lines.push(format!("Internal IPs:   {}", internal.join(", ")));
        }

        if let Some(modified) = info.change_info.as_ref().and_then(|c| c.modified_date) {
            lines.push(format!("Modified:       {}", modified.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        if self.is_dirty() {
            lines.push("Cached data is stale; refresh to reload".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Disk {
    fn pretty_print(&self) -> String {
        let paths = if self.partition_paths().is_empty() {
            "-".to_string()
        } else {
            self.partition_paths().join(", ")
        };
        format!("{:<8} {:>6} GB  {}", self.id(), self.size_gb(), paths)
    }
}

impl PrettyPrint for PublicIp {
    fn pretty_print(&self) -> String {
        format!(
            "{} -> {}",
            self.id(),
            self.internal().unwrap_or("(unassigned)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ServerRef, Disks, Collection};

    #[test]
    fn test_disk_pretty_print_format() {
        let disks = Disks::from_server(
            ServerRef::new("ACME", "WA1ACMEWEB01"),
            &[serde_json::json!({"id": "0:3", "sizeGB": 30, "partitionPaths": ["/data"]})],
        )
        .unwrap();

        let output = disks.get("0:3").unwrap().pretty_print();
        assert!(output.starts_with("0:3"));
        assert!(output.contains("30 GB"));
        assert!(output.contains("/data"));
    }

    #[test]
    fn test_public_ip_pretty_print_format() {
        let ip = PublicIp::new(
            ServerRef::new("ACME", "WA1ACMEWEB01"),
            "65.39.184.22",
            Some("10.80.148.13".to_string()),
        );
        assert_eq!(ip.pretty_print(), "65.39.184.22 -> 10.80.148.13");
    }
}
