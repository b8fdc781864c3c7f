//! Region assignment table — per-server load as reported by heartbeats.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use stratus_core::{ServerIdentity, ServerLoad};
use tracing::debug;

use crate::collaborators::LoadSource;

/// In-memory per-server load table.
#[derive(Debug, Default)]
pub struct RegionAssignment {
    loads: RwLock<HashMap<ServerIdentity, ServerLoad>>,
}

impl RegionAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the load reported by `server`.
    pub fn report_load(&self, server: &ServerIdentity, load: ServerLoad) {
        let mut loads = self.loads.write().unwrap_or_else(PoisonError::into_inner);
        debug!(%server, regions = load.regions, "load reported");
        loads.insert(server.clone(), load);
    }

    /// Record a region opened on `server`.
    pub fn region_opened(&self, server: &ServerIdentity) {
        let mut loads = self.loads.write().unwrap_or_else(PoisonError::into_inner);
        let load = loads.entry(server.clone()).or_default();
        load.regions = load.regions.saturating_add(1);
    }

    /// Record a region closed on `server`.
    pub fn region_closed(&self, server: &ServerIdentity) {
        let mut loads = self.loads.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(load) = loads.get_mut(server) {
            load.regions = load.regions.saturating_sub(1);
        }
    }

    /// Forget a server, e.g. after it expired. Returns its last load.
    pub fn remove_server(&self, server: &ServerIdentity) -> Option<ServerLoad> {
        let mut loads = self.loads.write().unwrap_or_else(PoisonError::into_inner);
        loads.remove(server)
    }

    /// Regions across every tracked server.
    pub fn total_regions(&self) -> u64 {
        let loads = self.loads.read().unwrap_or_else(PoisonError::into_inner);
        loads.values().map(|l| u64::from(l.regions)).sum()
    }
}

impl LoadSource for RegionAssignment {
    fn server_load(&self, server: &ServerIdentity) -> Option<ServerLoad> {
        let loads = self.loads.read().unwrap_or_else(PoisonError::into_inner);
        loads.get(server).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(n: u16) -> ServerIdentity {
        ServerIdentity::new(format!("rs{n}"), 16020, 1).unwrap()
    }

    #[test]
    fn report_replaces_load() {
        let table = RegionAssignment::new();
        table.report_load(&rs(1), ServerLoad::with_regions(4));
        table.report_load(&rs(1), ServerLoad::with_regions(6));

        assert_eq!(table.server_load(&rs(1)).unwrap().regions, 6);
        assert!(table.server_load(&rs(2)).is_none());
    }

    #[test]
    fn open_and_close_adjust_region_count() {
        let table = RegionAssignment::new();
        table.region_opened(&rs(1));
        table.region_opened(&rs(1));
        table.region_opened(&rs(2));
        table.region_closed(&rs(1));

        assert_eq!(table.server_load(&rs(1)).unwrap().regions, 1);
        assert_eq!(table.total_regions(), 2);
    }

    #[test]
    fn close_never_underflows() {
        let table = RegionAssignment::new();
        table.report_load(&rs(1), ServerLoad::default());
        table.region_closed(&rs(1));
        table.region_closed(&rs(9));

        assert_eq!(table.server_load(&rs(1)).unwrap().regions, 0);
    }

    #[test]
    fn remove_server_returns_last_load() {
        let table = RegionAssignment::new();
        table.report_load(&rs(1), ServerLoad::with_regions(3));

        assert_eq!(table.remove_server(&rs(1)).unwrap().regions, 3);
        assert_eq!(table.total_regions(), 0);
    }
}
