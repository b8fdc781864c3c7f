//! Server manager — live region servers and recent failures.
//!
//! Live set and dead history sit behind a single lock. A server that
//! registers is removed from dead history in the same update that makes
//! it live, so no reader sees it in both.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use stratus_core::ServerIdentity;
use tracing::{debug, info, warn};

use crate::collaborators::{FailureDetector, MembershipTracker};

/// Default number of dead servers remembered.
pub const DEFAULT_DEAD_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeadEntry {
    /// Epoch millis when the server was declared dead.
    died_at: u64,
}

#[derive(Debug, Default)]
struct ServerTable {
    /// Live server → epoch millis of registration.
    online: BTreeMap<ServerIdentity, u64>,
    dead: BTreeMap<ServerIdentity, DeadEntry>,
    /// Dead servers oldest first, for eviction.
    dead_order: VecDeque<ServerIdentity>,
}

impl ServerTable {
    fn forget_dead(&mut self, server: &ServerIdentity) {
        if self.dead.remove(server).is_some() {
            self.dead_order.retain(|s| s != server);
        }
    }
}

/// Tracks region server membership on the master.
#[derive(Debug)]
pub struct ServerManager {
    table: RwLock<ServerTable>,
    dead_capacity: usize,
}

impl ServerManager {
    /// Create a manager remembering up to `DEFAULT_DEAD_HISTORY` failures.
    pub fn new() -> Self {
        Self::with_dead_capacity(DEFAULT_DEAD_HISTORY)
    }

    /// Create a manager with a custom dead-history bound (minimum 1).
    pub fn with_dead_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(ServerTable::default()),
            dead_capacity: capacity.max(1),
        }
    }

    /// Register a region server as live.
    ///
    /// Any dead entry at the same host:port (an earlier incarnation or
    /// this very identity) is dropped in the same update, as is a live
    /// entry at that address with an older start code. Returns `false`
    /// when the server was already live, or when a newer incarnation at
    /// the same address is.
    pub fn register(&self, server: ServerIdentity) -> bool {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);

        if table
            .online
            .keys()
            .any(|live| live.same_address(&server) && live.start_code() > server.start_code())
        {
            debug!(%server, "stale registration ignored, newer incarnation is live");
            return false;
        }

        let replaced: Vec<ServerIdentity> = table
            .online
            .keys()
            .filter(|live| live.same_address(&server) && live.start_code() < server.start_code())
            .cloned()
            .collect();
        for old in &replaced {
            table.online.remove(old);
            info!(
                address = %server.address(),
                old_start = old.start_code(),
                new_start = server.start_code(),
                "region server restarted, dropping old incarnation"
            );
        }

        let stale: Vec<ServerIdentity> = table
            .dead
            .keys()
            .filter(|dead| dead.same_address(&server))
            .cloned()
            .collect();
        for dead in &stale {
            table.forget_dead(dead);
            debug!(server = %dead, "cleared dead entry on rejoin");
        }

        if table.online.contains_key(&server) {
            return false;
        }
        table.online.insert(server.clone(), epoch_millis());
        info!(%server, live = table.online.len(), "region server registered");
        true
    }

    /// Declare a live server dead, moving it into dead history.
    ///
    /// Returns `false` if the server was not live.
    pub fn expire(&self, server: &ServerIdentity) -> bool {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);

        if table.online.remove(server).is_none() {
            debug!(%server, "expire of unknown server ignored");
            return false;
        }

        table.forget_dead(server);
        table.dead.insert(
            server.clone(),
            DeadEntry {
                died_at: epoch_millis(),
            },
        );
        table.dead_order.push_back(server.clone());

        while table.dead_order.len() > self.dead_capacity {
            if let Some(oldest) = table.dead_order.pop_front() {
                table.dead.remove(&oldest);
                debug!(server = %oldest, "evicted from dead history");
            }
        }

        warn!(%server, dead = table.dead.len(), "region server expired");
        true
    }

    /// Remove a server that shut down cleanly. It is not recorded as dead.
    pub fn deregister(&self, server: &ServerIdentity) -> bool {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let removed = table.online.remove(server).is_some();
        if removed {
            info!(%server, "region server deregistered");
        }
        removed
    }

    /// Epoch millis when `server` was declared dead, if it is in history.
    pub fn died_at(&self, server: &ServerIdentity) -> Option<u64> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.dead.get(server).map(|e| e.died_at)
    }

    pub fn live_count(&self) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.online.len()
    }

    pub fn dead_count(&self) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.dead.len()
    }
}

impl Default for ServerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MembershipTracker for ServerManager {
    fn live_servers(&self) -> Vec<ServerIdentity> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.online.keys().cloned().collect()
    }

    fn is_alive(&self, server: &ServerIdentity) -> bool {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.online.contains_key(server)
    }
}

impl FailureDetector for ServerManager {
    fn dead_servers(&self) -> BTreeSet<ServerIdentity> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.dead.keys().cloned().collect()
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(host: &str, start: u64) -> ServerIdentity {
        ServerIdentity::new(host, 16020, start).unwrap()
    }

    #[test]
    fn register_adds_live_server() {
        let mgr = ServerManager::new();
        assert!(mgr.register(rs("rs1", 1)));
        assert!(!mgr.register(rs("rs1", 1)));

        assert_eq!(mgr.live_count(), 1);
        assert!(mgr.is_alive(&rs("rs1", 1)));
        assert!(!mgr.is_alive(&rs("rs1", 2)));
    }

    #[test]
    fn expire_moves_server_to_dead() {
        let mgr = ServerManager::new();
        mgr.register(rs("rs1", 1));
        mgr.register(rs("rs2", 1));

        assert!(mgr.expire(&rs("rs2", 1)));

        assert_eq!(mgr.live_servers(), vec![rs("rs1", 1)]);
        assert_eq!(mgr.dead_servers().into_iter().collect::<Vec<_>>(), vec![rs("rs2", 1)]);
        assert!(mgr.died_at(&rs("rs2", 1)).is_some());
    }

    #[test]
    fn expire_unknown_server_is_noop() {
        let mgr = ServerManager::new();
        assert!(!mgr.expire(&rs("ghost", 1)));
        assert_eq!(mgr.dead_count(), 0);
    }

    #[test]
    fn rejoin_with_same_identity_clears_dead_entry() {
        let mgr = ServerManager::new();
        mgr.register(rs("rs1", 1));
        mgr.expire(&rs("rs1", 1));
        assert_eq!(mgr.dead_count(), 1);

        mgr.register(rs("rs1", 1));

        assert!(mgr.dead_servers().is_empty());
        assert!(mgr.is_alive(&rs("rs1", 1)));
    }

    #[test]
    fn restart_at_same_address_clears_old_incarnation() {
        let mgr = ServerManager::new();
        mgr.register(rs("rs1", 1));
        mgr.expire(&rs("rs1", 1));

        mgr.register(rs("rs1", 2));

        assert!(mgr.dead_servers().is_empty());
        assert_eq!(mgr.live_servers(), vec![rs("rs1", 2)]);
    }

    #[test]
    fn restart_before_expiry_replaces_live_incarnation() {
        let mgr = ServerManager::new();
        mgr.register(rs("rs1", 1));
        mgr.register(rs("rs2", 1));

        assert!(mgr.register(rs("rs1", 2)));

        assert_eq!(mgr.live_count(), 2);
        assert!(!mgr.is_alive(&rs("rs1", 1)));
        assert!(mgr.is_alive(&rs("rs1", 2)));
        assert!(mgr.is_alive(&rs("rs2", 1)));
        assert!(mgr.dead_servers().is_empty());
    }

    #[test]
    fn stale_registration_does_not_replace_newer_incarnation() {
        let mgr = ServerManager::new();
        mgr.register(rs("rs1", 2));

        assert!(!mgr.register(rs("rs1", 1)));
        assert_eq!(mgr.live_servers(), vec![rs("rs1", 2)]);
    }

    #[test]
    fn dead_history_is_bounded() {
        let mgr = ServerManager::with_dead_capacity(2);
        for host in ["rs1", "rs2", "rs3"] {
            mgr.register(rs(host, 1));
        }
        for host in ["rs1", "rs2", "rs3"] {
            mgr.expire(&rs(host, 1));
        }

        let dead = mgr.dead_servers();
        assert_eq!(dead.len(), 2);
        assert!(!dead.contains(&rs("rs1", 1)), "oldest entry evicted first");
        assert!(dead.contains(&rs("rs3", 1)));
    }

    #[test]
    fn deregister_does_not_record_death() {
        let mgr = ServerManager::new();
        mgr.register(rs("rs1", 1));

        assert!(mgr.deregister(&rs("rs1", 1)));
        assert_eq!(mgr.live_count(), 0);
        assert_eq!(mgr.dead_count(), 0);
    }

    #[test]
    fn concurrent_rejoin_never_shows_server_in_both_sets() {
        use std::sync::Arc;
        use std::thread;

        let mgr = Arc::new(ServerManager::new());
        let server = rs("flappy", 1);
        mgr.register(server.clone());

        let writer = {
            let mgr = Arc::clone(&mgr);
            let server = server.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    mgr.expire(&server);
                    mgr.register(server.clone());
                }
            })
        };

        for _ in 0..500 {
            // Each read is a consistent view of one table state.
            let table = mgr.table.read().unwrap();
            let live = table.online.contains_key(&server);
            let dead = table.dead.contains_key(&server);
            assert!(!(live && dead));
        }

        writer.join().unwrap();
    }
}
