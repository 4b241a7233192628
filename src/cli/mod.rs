//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the clc binary.

use clap::{Parser, Subcommand};

use crate::Port;

/// CenturyLink Cloud v2 API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "clc", about = "CenturyLink Cloud v2 API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Print every request and response verbatim.
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// API endpoint.
    #[arg(long, global = true, env = "CLC_V2_API_URL", default_value = "https://api.ctl.io/")]
    pub endpoint: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List datacenters available to the account.
    Datacenters {
        /// Account alias (defaults to the login alias).
        #[arg(long)]
        alias: Option<String>,
    },

    /// Show one datacenter and its deployment capabilities.
    Datacenter {
        /// Location alias (e.g. WA1).
        location: String,
    },

    /// Show a server.
    Server {
        /// Server name.
        server: String,
    },

    /// List a server's disks.
    Disks {
        /// Server name.
        server: String,
    },

    /// Grow a disk, addressed by ID or mount path.
    GrowDisk {
        /// Server name.
        server: String,

        /// Disk ID (e.g. 0:2) or mount path.
        disk: String,

        /// New size in GB.
        size: u32,

        /// Block until the provider finishes.
        #[arg(long)]
        wait: bool,
    },

    /// List a server's public IP addresses.
    PublicIps {
        /// Server name.
        server: String,
    },

    /// Claim a new public IP address.
    AddPublicIp {
        /// Server name.
        server: String,

        /// Port to open, as PORT[-PORT]/PROTOCOL (repeatable).
        #[arg(long = "port", required = true)]
        ports: Vec<Port>,

        /// CIDR allowed to connect (repeatable).
        #[arg(long = "cidr")]
        cidrs: Vec<String>,

        /// Existing internal address to NAT to.
        #[arg(long)]
        private_ip: Option<String>,

        /// Block until the provider finishes.
        #[arg(long)]
        wait: bool,
    },

    /// Release a public IP address.
    DeletePublicIp {
        /// Server name.
        server: String,

        /// Public or internal address.
        ip: String,

        /// Block until the provider finishes.
        #[arg(long)]
        wait: bool,
    },
}
