//! stratus-cluster — cluster status reporting for Stratus masters.
//!
//! Provides the master-side aggregation of cluster status, the gRPC
//! service exposing it, and the clients that query it.
//!
//! # Architecture
//!
//! ```text
//! Active master
//!   ├── StatusServer (gRPC)
//!   │   └── GetClusterStatus(include_mask) → ClusterStatusResponse
//!   └── StatusAggregator
//!       ├── MembershipTracker  (ServerManager: live servers)
//!       ├── FailureDetector    (ServerManager: bounded dead history)
//!       ├── MasterElection     (MasterTracker: active + backups)
//!       ├── LoadSource         (RegionAssignment: per-server regions)
//!       └── BalancerState      (BalancerSwitch)
//!
//! Client
//!   ├── StatusClient          (async)
//!   └── BlockingStatusClient  (blocking + PendingStatus future)
//! ```

pub mod aggregator;
pub mod assignment;
pub mod balancer;
pub mod client;
pub mod codec;
pub mod collaborators;
pub mod election;
pub mod error;
pub mod membership;
pub mod server;

/// Generated protobuf types and gRPC service stubs.
pub mod proto {
    tonic::include_proto!("stratus.status");
}

pub use aggregator::{MasterInfo, StatusAggregator};
pub use assignment::RegionAssignment;
pub use balancer::BalancerSwitch;
pub use client::{BlockingStatusClient, PendingStatus, StatusClient};
pub use collaborators::{BalancerState, FailureDetector, LoadSource, MasterElection, MembershipTracker};
pub use election::MasterTracker;
pub use error::{ClientError, ClientResult, DecodeError};
pub use membership::ServerManager;
pub use server::StatusServer;
