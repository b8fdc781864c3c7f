//! Status aggregator — assembles a snapshot on the active master.
//!
//! Only the categories a query asks for are read. Region state is the
//! expensive one: without it, live servers carry a zero placeholder
//! load and no load lookups happen at all.
//!
//! A subsystem that has not been attached yet (the master is still
//! bootstrapping) leaves its categories empty instead of failing the
//! query.

use std::sync::Arc;

use stratus_core::{Category, ClusterId, ClusterStatusSnapshot, ServerIdentity, ServerLoad, StatusOptions};
use tracing::debug;

use crate::collaborators::{BalancerState, FailureDetector, LoadSource, MasterElection, MembershipTracker};

/// Facts about the master process itself.
#[derive(Debug, Clone)]
pub struct MasterInfo {
    /// This master's own identity; never listed among live servers.
    pub identity: Option<ServerIdentity>,
    pub version: String,
    pub cluster_id: Option<ClusterId>,
    pub coprocessors: Vec<String>,
}

impl MasterInfo {
    pub fn new(identity: ServerIdentity, cluster_id: ClusterId) -> Self {
        Self {
            identity: Some(identity),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cluster_id: Some(cluster_id),
            coprocessors: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_coprocessors(mut self, names: Vec<String>) -> Self {
        self.coprocessors = names;
        self
    }
}

/// Builds [`ClusterStatusSnapshot`]s from the master's local subsystems.
#[derive(Clone)]
pub struct StatusAggregator {
    info: MasterInfo,
    membership: Option<Arc<dyn MembershipTracker>>,
    failures: Option<Arc<dyn FailureDetector>>,
    election: Option<Arc<dyn MasterElection>>,
    loads: Option<Arc<dyn LoadSource>>,
    balancer: Option<Arc<dyn BalancerState>>,
}

impl StatusAggregator {
    /// An aggregator with no subsystems attached.
    pub fn new(info: MasterInfo) -> Self {
        Self {
            info,
            membership: None,
            failures: None,
            election: None,
            loads: None,
            balancer: None,
        }
    }

    pub fn with_membership(mut self, membership: Arc<dyn MembershipTracker>) -> Self {
        self.membership = Some(membership);
        self
    }

    pub fn with_failure_detector(mut self, failures: Arc<dyn FailureDetector>) -> Self {
        self.failures = Some(failures);
        self
    }

    pub fn with_election(mut self, election: Arc<dyn MasterElection>) -> Self {
        self.election = Some(election);
        self
    }

    pub fn with_loads(mut self, loads: Arc<dyn LoadSource>) -> Self {
        self.loads = Some(loads);
        self
    }

    pub fn with_balancer(mut self, balancer: Arc<dyn BalancerState>) -> Self {
        self.balancer = Some(balancer);
        self
    }

    pub fn master_info(&self) -> &MasterInfo {
        &self.info
    }

    /// Assemble a snapshot holding exactly the categories in `options`.
    ///
    /// Reads local state only and never fails.
    pub fn compute_snapshot(&self, options: &StatusOptions) -> ClusterStatusSnapshot {
        let mut builder = ClusterStatusSnapshot::builder();

        if options.includes(Category::Version) {
            builder = builder.version(self.info.version.clone());
        }

        if options.includes(Category::ClusterId) {
            if let Some(id) = &self.info.cluster_id {
                builder = builder.cluster_id(id.as_str());
            }
        }

        if options.includes(Category::LiveServers) {
            builder = builder.live_servers(self.live_servers(options.includes(Category::RegionState)));
        }

        if options.includes(Category::DeadServers) {
            if let Some(failures) = &self.failures {
                builder = builder.dead_servers(failures.dead_servers());
            }
        }

        if let Some(election) = &self.election {
            if options.includes(Category::Master) {
                if let Some(master) = election.active_master() {
                    builder = builder.master(master);
                }
            }
            if options.includes(Category::BackupMasters) {
                builder = builder.backup_masters(election.backup_masters());
            }
        }

        if options.includes(Category::MasterCoprocessors) {
            builder = builder.master_coprocessors(self.info.coprocessors.iter().cloned());
        }

        if options.includes(Category::BalancerOn) {
            if let Some(on) = self.balancer.as_ref().and_then(|b| b.is_balancer_on()) {
                builder = builder.balancer_on(on);
            }
        }

        let snapshot = builder.build();
        debug!(
            ?options,
            live = snapshot.servers_size(),
            dead = snapshot.dead_servers_size(),
            backups = snapshot.backup_masters_size(),
            regions = snapshot.region_count(),
            "computed cluster status"
        );
        snapshot
    }

    fn live_servers(&self, with_region_state: bool) -> Vec<(ServerIdentity, ServerLoad)> {
        let Some(membership) = &self.membership else {
            return Vec::new();
        };

        let loads = if with_region_state { self.loads.as_ref() } else { None };

        membership
            .live_servers()
            .into_iter()
            .filter(|server| self.info.identity.as_ref() != Some(server))
            .map(|server| {
                let load = loads
                    .and_then(|l| l.server_load(&server))
                    .unwrap_or_default();
                (server, load)
            })
            .collect()
    }
}
