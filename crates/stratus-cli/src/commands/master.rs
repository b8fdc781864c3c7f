//! Development master — a single master with in-memory subsystems.
//!
//! Registers itself as the active master and serves the status RPC
//! until Ctrl-C. No region servers join it, so live and dead sets stay
//! empty; it exists to exercise clients against a real endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use stratus_cluster::{
    BalancerSwitch, MasterInfo, MasterTracker, RegionAssignment, ServerManager, StatusAggregator,
    StatusServer,
};
use stratus_core::{ClusterId, MasterConfig, ServerIdentity};
use tracing::info;

pub fn run(config: MasterConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config))
}

async fn serve(config: MasterConfig) -> anyhow::Result<()> {
    let start_code = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let identity = ServerIdentity::new(config.host.clone(), config.port, start_code)?;

    let cluster_id = match config.cluster_id {
        Some(id) => ClusterId::from(id),
        None => ClusterId::generate(),
    };
    info!(%identity, %cluster_id, "master starting");

    // ── Subsystems ─────────────────────────────────────────────
    let servers = Arc::new(ServerManager::with_dead_capacity(config.dead_history_capacity));
    let masters = Arc::new(MasterTracker::new());
    masters.register(identity.clone());
    let loads = Arc::new(RegionAssignment::new());
    let balancer = Arc::new(match config.balancer_on {
        Some(on) => BalancerSwitch::with_state(on),
        None => BalancerSwitch::new(),
    });

    let info = MasterInfo::new(identity, cluster_id).with_coprocessors(config.coprocessors);
    let aggregator = StatusAggregator::new(info)
        .with_membership(servers.clone())
        .with_failure_detector(servers)
        .with_election(masters)
        .with_loads(loads)
        .with_balancer(balancer);

    // ── gRPC server ────────────────────────────────────────────
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "status service starting");

    tonic::transport::Server::builder()
        .add_service(StatusServer::new(Arc::new(aggregator)).into_service())
        .serve_with_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("master stopped");
    Ok(())
}
