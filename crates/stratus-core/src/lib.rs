//! stratus-core — value types shared by the Stratus master and clients.
//!
//! Nothing in this crate talks to the network. It defines what a status
//! query asks for ([`StatusOptions`]) and what it gets back
//! ([`ClusterStatusSnapshot`]), plus the identities and loads those
//! snapshots are built from.

pub mod config;
pub mod error;
pub mod identity;
pub mod options;
pub mod snapshot;

pub use config::{ClientConfig, MasterConfig, StratusConfig};
pub use error::{CoreError, CoreResult};
pub use identity::{ClusterId, ServerIdentity, ServerLoad};
pub use options::{Category, StatusOptions};
pub use snapshot::{ClusterStatusSnapshot, SnapshotBuilder};
