//! Point-in-time cluster status snapshot.
//!
//! A snapshot is assembled once through [`SnapshotBuilder`] and never
//! changes afterwards. Categories that were not requested keep their
//! empty form: `None`, an empty collection, or zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::identity::{ServerIdentity, ServerLoad};

/// Immutable view of cluster status as returned by a status query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterStatusSnapshot {
    version: Option<String>,
    cluster_id: Option<String>,
    live_servers: BTreeMap<ServerIdentity, ServerLoad>,
    dead_servers: BTreeSet<ServerIdentity>,
    master: Option<ServerIdentity>,
    backup_masters: Vec<ServerIdentity>,
    master_coprocessors: Vec<String>,
    balancer_on: Option<bool>,
    region_count: u64,
    average_load: f64,
}

impl ClusterStatusSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Software version of the active master.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn cluster_id(&self) -> Option<&str> {
        self.cluster_id.as_deref()
    }

    /// Live region servers and their loads. Never contains the master.
    pub fn live_servers(&self) -> &BTreeMap<ServerIdentity, ServerLoad> {
        &self.live_servers
    }

    pub fn servers_size(&self) -> usize {
        self.live_servers.len()
    }

    /// Region servers that failed and have not rejoined.
    pub fn dead_servers(&self) -> &BTreeSet<ServerIdentity> {
        &self.dead_servers
    }

    pub fn dead_servers_size(&self) -> usize {
        self.dead_servers.len()
    }

    /// The active master.
    pub fn master(&self) -> Option<&ServerIdentity> {
        self.master.as_ref()
    }

    /// Standby masters in registration order.
    pub fn backup_masters(&self) -> &[ServerIdentity] {
        &self.backup_masters
    }

    pub fn backup_masters_size(&self) -> usize {
        self.backup_masters.len()
    }

    pub fn master_coprocessors(&self) -> &[String] {
        &self.master_coprocessors
    }

    pub fn balancer_on(&self) -> Option<bool> {
        self.balancer_on
    }

    /// Sum of regions over `live_servers`.
    pub fn region_count(&self) -> u64 {
        self.region_count
    }

    /// `region_count / servers_size`, or 0.0 with no live servers.
    pub fn average_load(&self) -> f64 {
        self.average_load
    }
}

/// Collects snapshot fields; derived totals are computed in [`build`].
///
/// [`build`]: SnapshotBuilder::build
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    version: Option<String>,
    cluster_id: Option<String>,
    live_servers: BTreeMap<ServerIdentity, ServerLoad>,
    dead_servers: BTreeSet<ServerIdentity>,
    master: Option<ServerIdentity>,
    backup_masters: Vec<ServerIdentity>,
    master_coprocessors: Vec<String>,
    balancer_on: Option<bool>,
}

impl SnapshotBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }

    pub fn live_server(mut self, server: ServerIdentity, load: ServerLoad) -> Self {
        self.live_servers.insert(server, load);
        self
    }

    pub fn live_servers(
        mut self,
        servers: impl IntoIterator<Item = (ServerIdentity, ServerLoad)>,
    ) -> Self {
        self.live_servers.extend(servers);
        self
    }

    pub fn dead_servers(mut self, servers: impl IntoIterator<Item = ServerIdentity>) -> Self {
        self.dead_servers.extend(servers);
        self
    }

    pub fn master(mut self, master: ServerIdentity) -> Self {
        self.master = Some(master);
        self
    }

    pub fn backup_masters(mut self, masters: impl IntoIterator<Item = ServerIdentity>) -> Self {
        self.backup_masters.extend(masters);
        self
    }

    pub fn master_coprocessors(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.master_coprocessors.extend(names);
        self
    }

    pub fn balancer_on(mut self, on: bool) -> Self {
        self.balancer_on = Some(on);
        self
    }

    /// Freeze the snapshot, deriving `region_count` and `average_load`
    /// from the live-server loads.
    pub fn build(self) -> ClusterStatusSnapshot {
        let region_count: u64 = self
            .live_servers
            .values()
            .map(|load| u64::from(load.regions))
            .sum();
        let average_load = if self.live_servers.is_empty() {
            0.0
        } else {
            region_count as f64 / self.live_servers.len() as f64
        };

        ClusterStatusSnapshot {
            version: self.version,
            cluster_id: self.cluster_id,
            live_servers: self.live_servers,
            dead_servers: self.dead_servers,
            master: self.master,
            backup_masters: self.backup_masters,
            master_coprocessors: self.master_coprocessors,
            balancer_on: self.balancer_on,
            region_count,
            average_load,
        }
    }
}
