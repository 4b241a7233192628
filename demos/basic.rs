//! Basic example demonstrating the CLC API client.
//!
//! Run with:
//! ```
//! CLC_V2_API_USERNAME=user CLC_V2_API_PASSWD=secret cargo run --example basic -- WA1ACMEWEB01
//! ```

use clcapi::{ClcClient, Collection, Datacenter, Get, List, Server};

#[tokio::main]
async fn main() -> clcapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating CLC client...");
    let client = ClcClient::from_env()?;
    println!("Connected to: {}", client.base_url());
    println!("Account: {} (home {})", client.alias().await?, client.location().await?);

    // List datacenters
    println!("\n--- Listing Datacenters ---");
    let datacenters = Datacenter::list(&client, &Default::default()).await?;
    for dc in &datacenters {
        println!("  - {} ({})", dc.name(), dc.id());
    }

    // Capabilities of the home datacenter
    println!("\n--- Home Datacenter ---");
    let mut home = Datacenter::get(&client, client.location().await?).await?;
    let caps = home.capabilities(&client, false).await?;
    println!("  Premium storage: {}", caps.supports_premium_storage);
    println!("  Shared load balancer: {}", caps.supports_shared_load_balancer);
    println!("  Templates: {}", caps.templates.len());

    // Inspect a server given on the command line
    let Some(name) = std::env::args().nth(1) else {
        println!("\nPass a server name to inspect its disks and public IPs.");
        return Ok(());
    };

    println!("\n--- Server {name} ---");
    let server = Server::get(&client, name).await?;
    for disk in server.disks()?.members() {
        println!(
            "  disk {} {}GB {}",
            disk.id(),
            disk.size_gb(),
            disk.partition_paths().join(",")
        );
    }

    let mut public_ips = server.public_ips();
    let ids: Vec<String> = public_ips.members().iter().map(|ip| ip.id().to_string()).collect();
    for id in ids {
        if let Some(ip) = public_ips.get_mut(&id) {
            let ports: Vec<String> = ip.ports(&client).await?.iter().map(ToString::to_string).collect();
            println!("  public IP {} -> {} [{}]", id, ip.internal().unwrap_or("-"), ports.join(" "));
        }
    }

    Ok(())
}
