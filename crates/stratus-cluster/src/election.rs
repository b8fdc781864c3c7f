//! Master tracker — active master and standbys.
//!
//! Masters register in order. The first registered master becomes
//! active; on failover the earliest-registered standby takes over.

use std::sync::{PoisonError, RwLock};

use stratus_core::ServerIdentity;
use tracing::{info, warn};

use crate::collaborators::MasterElection;

#[derive(Debug, Default)]
struct Masters {
    /// All known masters in registration order.
    registered: Vec<ServerIdentity>,
    active: Option<ServerIdentity>,
}

/// In-memory master election state.
#[derive(Debug, Default)]
pub struct MasterTracker {
    masters: RwLock<Masters>,
}

impl MasterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a master process. The first one becomes active.
    pub fn register(&self, master: ServerIdentity) {
        let mut masters = self.masters.write().unwrap_or_else(PoisonError::into_inner);
        if masters.registered.contains(&master) {
            return;
        }
        masters.registered.push(master.clone());

        if masters.active.is_none() {
            info!(%master, "master became active");
            masters.active = Some(master);
        } else {
            info!(%master, "backup master registered");
        }
    }

    /// Force `master` to become the active master.
    ///
    /// Returns `false` if it was never registered.
    pub fn elect(&self, master: &ServerIdentity) -> bool {
        let mut masters = self.masters.write().unwrap_or_else(PoisonError::into_inner);
        if !masters.registered.contains(master) {
            return false;
        }
        info!(%master, "master elected");
        masters.active = Some(master.clone());
        true
    }

    /// Drop the active master and promote the earliest standby.
    ///
    /// Returns the new active master, if any standby was left.
    pub fn fail_over(&self) -> Option<ServerIdentity> {
        let mut masters = self.masters.write().unwrap_or_else(PoisonError::into_inner);
        let failed = masters.active.take()?;
        masters.registered.retain(|m| *m != failed);

        let next = masters.registered.first().cloned();
        match &next {
            Some(master) => warn!(%failed, new_active = %master, "master failover"),
            None => warn!(%failed, "active master lost with no standby"),
        }
        masters.active = next.clone();
        next
    }

    /// Total registered masters, active included.
    pub fn master_count(&self) -> usize {
        let masters = self.masters.read().unwrap_or_else(PoisonError::into_inner);
        masters.registered.len()
    }
}

impl MasterElection for MasterTracker {
    fn active_master(&self) -> Option<ServerIdentity> {
        let masters = self.masters.read().unwrap_or_else(PoisonError::into_inner);
        masters.active.clone()
    }

    fn backup_masters(&self) -> Vec<ServerIdentity> {
        let masters = self.masters.read().unwrap_or_else(PoisonError::into_inner);
        masters
            .registered
            .iter()
            .filter(|m| masters.active.as_ref() != Some(*m))
            .cloned()
            .collect()
    }
}
