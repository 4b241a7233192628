//! CenturyLink Cloud CLI binary.
//!
//! A command-line interface for interacting with the CLC v2 API.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clcapi::cli::{Cli, Command};
use clcapi::output::PrettyPrint;
use clcapi::{
    ClcClient, Collection, Credentials, Datacenter, DatacenterListQuery, Get, List, Operation,
    Port, Server, SourceRestriction, DEFAULT_POLL_INTERVAL,
};
use serde_json::json;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ clcapi::ClcError::ConfigMissing(_)) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set CLC_V2_API_USERNAME and CLC_V2_API_PASSWD environment variables");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_client(cli: &Cli) -> clcapi::Result<ClcClient> {
    let client = ClcClient::new(&cli.endpoint, Credentials::from_env())?.with_debug(cli.debug);
    match std::env::var_os("CLC_CA_BUNDLE") {
        Some(path) => client.with_ca_bundle(PathBuf::from(path)),
        None => Ok(client),
    }
}

async fn run(client: &ClcClient, cli: Cli) -> clcapi::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Datacenters { alias } => handle_datacenters(client, alias, json).await,
        Command::Datacenter { location } => handle_datacenter(client, location, json).await,
        Command::Server { server } => {
            let server = Server::get(client, server).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(server.info())?);
            } else {
                println!("{}", server.pretty_print());
            }
            Ok(())
        }
        Command::Disks { server } => handle_disks(client, server, json).await,
        Command::GrowDisk {
            server,
            disk,
            size,
            wait,
        } => {
            let server = Server::get(client, server).await?;
            let mut disks = server.disks()?;
            let operation = disks.grow(client, &disk, size).await?;
            report(&operation, wait).await
        }
        Command::PublicIps { server } => handle_public_ips(client, server, json).await,
        Command::AddPublicIp {
            server,
            ports,
            cidrs,
            private_ip,
            wait,
        } => handle_add_public_ip(client, server, ports, cidrs, private_ip, wait).await,
        Command::DeletePublicIp { server, ip, wait } => {
            let server = Server::get(client, server).await?;
            let operation = server.public_ips().delete(client, &ip).await?;
            report(&operation, wait).await
        }
    }
}

async fn handle_datacenters(
    client: &ClcClient,
    alias: Option<String>,
    json: bool,
) -> clcapi::Result<()> {
    let datacenters = Datacenter::list(client, &DatacenterListQuery { alias }).await?;

    if json {
        let items: Vec<_> = datacenters
            .iter()
            .map(|dc| json!({"id": dc.id(), "name": dc.name()}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let rows: Vec<DatacenterRow> = datacenters.iter().map(DatacenterRow::from).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

async fn handle_datacenter(client: &ClcClient, location: String, json: bool) -> clcapi::Result<()> {
    let mut datacenter = Datacenter::get(client, location).await?;
    let capabilities = datacenter.capabilities(client, false).await?.clone();

    if json {
        let value = json!({
            "id": datacenter.id(),
            "name": datacenter.name(),
            "links": datacenter.links(),
            "supportsPremiumStorage": capabilities.supports_premium_storage,
            "supportsSharedLoadBalancer": capabilities.supports_shared_load_balancer,
            "deployableNetworks": capabilities.deployable_networks,
            "templates": capabilities.templates,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", datacenter.pretty_print());
        println!("Premium Storage: {}", capabilities.supports_premium_storage);
        println!("Shared LB:       {}", capabilities.supports_shared_load_balancer);
        println!("Networks:        {}", capabilities.deployable_networks.len());
        println!("Templates:       {}", capabilities.templates.len());
    }
    Ok(())
}

async fn handle_disks(client: &ClcClient, server: String, json: bool) -> clcapi::Result<()> {
    let server = Server::get(client, server).await?;
    let disks = server.disks()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&server.info().details.disks)?
        );
    } else {
        let rows: Vec<DiskRow> = disks.members().iter().map(DiskRow::from).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

async fn handle_public_ips(client: &ClcClient, server: String, json: bool) -> clcapi::Result<()> {
    let server = Server::get(client, server).await?;
    let mut public_ips = server.public_ips();
    let keys: Vec<String> = public_ips
        .members()
        .iter()
        .map(|ip| ip.id().to_string())
        .collect();

    let mut rows = Vec::with_capacity(keys.len());
    let mut items = Vec::with_capacity(keys.len());
    for key in &keys {
        let Some(ip) = public_ips.get_mut(key) else {
            continue;
        };
        let public = ip.id().to_string();
        let internal = ip.internal().unwrap_or_default().to_string();
        let ports = ip.ports(client).await?.to_vec();
        let restrictions = ip.source_restrictions(client).await?.to_vec();

        if json {
            items.push(json!({
                "publicIPAddress": public,
                "internalIPAddress": internal,
                "ports": ports,
                "sourceRestrictions": restrictions,
            }));
        } else {
            rows.push(PublicIpRow {
                public,
                internal,
                ports: join(&ports),
                restrictions: restrictions
                    .iter()
                    .map(|r| r.cidr.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

async fn handle_add_public_ip(
    client: &ClcClient,
    server: String,
    ports: Vec<Port>,
    cidrs: Vec<String>,
    private_ip: Option<String>,
    wait: bool,
) -> clcapi::Result<()> {
    let server = Server::get(client, server).await?;
    let restrictions: Vec<SourceRestriction> = cidrs.into_iter().map(SourceRestriction::new).collect();
    let operation = server
        .public_ips()
        .add(client, &ports, &restrictions, private_ip.as_deref())
        .await?;
    report(&operation, wait).await
}

/// Print queued requests and optionally block until they finish.
async fn report(operation: &Operation, wait: bool) -> clcapi::Result<()> {
    for request in operation.requests() {
        println!("Queued: {}", request.id);
    }
    for error in operation.errors() {
        eprintln!("Not queued: {error}");
    }

    if wait && !operation.is_empty() {
        operation.wait_for_success(DEFAULT_POLL_INTERVAL).await?;
        println!("Completed");
    }
    Ok(())
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct DatacenterRow {
    id: String,
    name: String,
}

impl From<&Datacenter> for DatacenterRow {
    fn from(dc: &Datacenter) -> Self {
        Self {
            id: dc.id().to_string(),
            name: dc.name().to_string(),
        }
    }
}

#[derive(Tabled)]
struct DiskRow {
    id: String,
    #[tabled(rename = "size (GB)")]
    size_gb: u32,
    paths: String,
}

impl From<&clcapi::Disk> for DiskRow {
    fn from(d: &clcapi::Disk) -> Self {
        Self {
            id: d.id().to_string(),
            size_gb: d.size_gb(),
            paths: join(d.partition_paths()),
        }
    }
}

#[derive(Tabled)]
struct PublicIpRow {
    public: String,
    internal: String,
    ports: String,
    restrictions: String,
}
