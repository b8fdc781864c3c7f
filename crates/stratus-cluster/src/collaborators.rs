//! Master-side subsystems the status aggregator reads from.
//!
//! Each trait is a read-only view. Implementations take their own lock
//! per call and hand back owned data, so one category is never observed
//! half-updated.

use std::collections::BTreeSet;

use stratus_core::{ServerIdentity, ServerLoad};

/// Tracks which region servers are currently live.
pub trait MembershipTracker: Send + Sync {
    /// Identities of all live servers.
    fn live_servers(&self) -> Vec<ServerIdentity>;

    fn is_alive(&self, server: &ServerIdentity) -> bool;
}

/// Remembers servers that failed and have not rejoined.
pub trait FailureDetector: Send + Sync {
    /// Bounded set of recently dead servers.
    fn dead_servers(&self) -> BTreeSet<ServerIdentity>;
}

/// Master election state.
pub trait MasterElection: Send + Sync {
    /// The active master, if one has been elected.
    fn active_master(&self) -> Option<ServerIdentity>;

    /// Standby masters in registration order.
    fn backup_masters(&self) -> Vec<ServerIdentity>;
}

/// Per-server load as seen by region assignment.
pub trait LoadSource: Send + Sync {
    fn server_load(&self, server: &ServerIdentity) -> Option<ServerLoad>;
}

/// Automatic rebalancing switch.
pub trait BalancerState: Send + Sync {
    /// `None` until the switch state is known.
    fn is_balancer_on(&self) -> Option<bool>;
}
