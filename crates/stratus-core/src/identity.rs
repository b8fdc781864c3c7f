//! Server identities, per-server loads, and the cluster identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Identity of one server process in the cluster.
///
/// Equality covers host, port and start code, so a process restarted on
/// the same host:port is a different identity. Renders as
/// `host,port,start_code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerIdentity {
    host: String,
    port: u16,
    start_code: u64,
}

impl ServerIdentity {
    /// Create an identity, rejecting an empty host.
    pub fn new(host: impl Into<String>, port: u16, start_code: u64) -> CoreResult<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(CoreError::EmptyHost);
        }
        Ok(Self {
            host,
            port,
            start_code,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Process start timestamp (epoch millis).
    pub fn start_code(&self) -> u64 {
        self.start_code
    }

    /// Whether `other` runs at the same host:port, regardless of start code.
    pub fn same_address(&self, other: &ServerIdentity) -> bool {
        self.host == other.host && self.port == other.port
    }

    /// `host:port` without the start code.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.host, self.port, self.start_code)
    }
}

impl FromStr for ServerIdentity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidServerName(s.to_string());

        // Split from the right: hosts never contain commas, but keep the
        // host side permissive for IPv6 literals.
        let mut parts = s.rsplitn(3, ',');
        let start_code = parts.next().ok_or_else(invalid)?;
        let port = parts.next().ok_or_else(invalid)?;
        let host = parts.next().ok_or_else(invalid)?;

        let port: u64 = port.trim().parse().map_err(|_| invalid())?;
        let port = u16::try_from(port).map_err(|_| CoreError::InvalidPort(port))?;
        let start_code = start_code.trim().parse().map_err(|_| invalid())?;

        ServerIdentity::new(host.trim(), port, start_code)
    }
}

impl Serialize for ServerIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServerIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Metrics reported by one region server.
///
/// `Default` is the zero placeholder used when region state was not
/// requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLoad {
    /// Number of regions hosted.
    pub regions: u32,
    pub requests_per_second: u64,
    pub used_heap_mb: u32,
    pub max_heap_mb: u32,
}

impl ServerLoad {
    /// A load carrying only a region count.
    pub fn with_regions(regions: u32) -> Self {
        Self {
            regions,
            ..Self::default()
        }
    }
}

/// Cluster-unique identifier, generated once at cluster creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClusterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(host: &str, port: u16, start: u64) -> ServerIdentity {
        ServerIdentity::new(host, port, start).unwrap()
    }

    #[test]
    fn restarted_process_is_a_different_identity() {
        let before = rs("rs1.example", 16020, 1000);
        let after = rs("rs1.example", 16020, 2000);

        assert_ne!(before, after);
        assert!(before.same_address(&after));
        assert_eq!(before.address(), after.address());
        assert_eq!(after.address(), "rs1.example:16020");
    }

    #[test]
    fn display_and_parse_agree() {
        let id = rs("10.0.0.7", 16020, 1_700_000_000_000);
        assert_eq!(id.to_string(), "10.0.0.7,16020,1700000000000");

        let back: ServerIdentity = id.to_string().parse().unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parse_rejects_malformed_names() {
        assert!(matches!(
            "no-commas".parse::<ServerIdentity>(),
            Err(CoreError::InvalidServerName(_))
        ));
        assert!(matches!(
            "host,notaport,1".parse::<ServerIdentity>(),
            Err(CoreError::InvalidServerName(_))
        ));
        assert_eq!(
            "host,70000,1".parse::<ServerIdentity>(),
            Err(CoreError::InvalidPort(70000))
        );
        assert_eq!(",16020,1".parse::<ServerIdentity>(), Err(CoreError::EmptyHost));
    }

    #[test]
    fn identities_order_by_host_then_port_then_start_code() {
        let mut ids = vec![
            rs("b", 1, 1),
            rs("a", 2, 1),
            rs("a", 1, 5),
            rs("a", 1, 3),
        ];
        ids.sort();

        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["a,1,3", "a,1,5", "a,2,1", "b,1,1"]);
    }

    #[test]
    fn identity_serializes_as_string() {
        let id = rs("rs1", 16020, 42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"rs1,16020,42\"");

        let back: ServerIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn default_load_is_zero() {
        let load = ServerLoad::default();
        assert_eq!(load.regions, 0);
        assert_eq!(ServerLoad::with_regions(4).regions, 4);
    }

    #[test]
    fn generated_cluster_ids_are_unique() {
        assert_ne!(ClusterId::generate(), ClusterId::generate());
    }
}
