use std::fmt::Write as _;

use stratus_cluster::BlockingStatusClient;
use stratus_core::{Category, ClientConfig, ClusterStatusSnapshot, StatusOptions};
use tracing::debug;

/// Query the master and print the snapshot.
pub fn run(config: &ClientConfig, exclude: &[Category], format: &str) -> anyhow::Result<()> {
    let options = build_options(exclude);
    debug!(endpoint = %config.endpoint, ?options, "querying cluster status");

    let client = BlockingStatusClient::from_config(config)?;
    let snapshot = client.get_status_with(options)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        "text" => print!("{}", render_text(&snapshot)),
        other => anyhow::bail!("unknown output format {other:?}: expected text or json"),
    }
    Ok(())
}

fn build_options(exclude: &[Category]) -> StatusOptions {
    exclude
        .iter()
        .fold(StatusOptions::default(), |options, category| options.exclude(*category))
}

/// Human-readable rendering. Absent categories are left out.
fn render_text(snapshot: &ClusterStatusSnapshot) -> String {
    let mut out = String::new();

    if let Some(version) = snapshot.version() {
        let _ = writeln!(out, "version:        {version}");
    }
    if let Some(id) = snapshot.cluster_id() {
        let _ = writeln!(out, "cluster id:     {id}");
    }
    if let Some(master) = snapshot.master() {
        let _ = writeln!(out, "active master:  {master}");
    }
    if !snapshot.backup_masters().is_empty() {
        let _ = writeln!(out, "backup masters: {}", snapshot.backup_masters_size());
        for backup in snapshot.backup_masters() {
            let _ = writeln!(out, "    {backup}");
        }
    }
    if let Some(on) = snapshot.balancer_on() {
        let _ = writeln!(out, "balancer:       {}", if on { "on" } else { "off" });
    }
    if !snapshot.master_coprocessors().is_empty() {
        let _ = writeln!(out, "coprocessors:   {}", snapshot.master_coprocessors().join(", "));
    }

    let _ = writeln!(out, "live servers:   {}", snapshot.servers_size());
    for (server, load) in snapshot.live_servers() {
        let _ = writeln!(
            out,
            "    {server}  regions={} rps={} heap={}/{}MB",
            load.regions, load.requests_per_second, load.used_heap_mb, load.max_heap_mb
        );
    }
    let _ = writeln!(out, "dead servers:   {}", snapshot.dead_servers_size());
    for server in snapshot.dead_servers() {
        let _ = writeln!(out, "    {server}");
    }
    let _ = writeln!(
        out,
        "regions:        {} (average load {:.2})",
        snapshot.region_count(),
        snapshot.average_load()
    );

    out
}
