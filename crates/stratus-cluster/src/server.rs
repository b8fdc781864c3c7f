//! Status gRPC server — master side.
//!
//! Implements the `ClusterStatusService` gRPC interface. Each call
//! decodes the requested categories, asks the aggregator for a
//! snapshot, and encodes it back.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use crate::aggregator::StatusAggregator;
use crate::codec;
use crate::proto;
use crate::proto::cluster_status_service_server::ClusterStatusService;

/// gRPC implementation of the cluster status service.
pub struct StatusServer {
    aggregator: Arc<StatusAggregator>,
}

impl StatusServer {
    /// Create a new status server.
    pub fn new(aggregator: Arc<StatusAggregator>) -> Self {
        Self { aggregator }
    }

    /// Get the tonic service for mounting on a gRPC server.
    pub fn into_service(
        self,
    ) -> proto::cluster_status_service_server::ClusterStatusServiceServer<Self> {
        proto::cluster_status_service_server::ClusterStatusServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl ClusterStatusService for StatusServer {
    async fn get_cluster_status(
        &self,
        request: Request<proto::ClusterStatusRequest>,
    ) -> Result<Response<proto::ClusterStatusResponse>, Status> {
        let remote = request.remote_addr();
        let options = codec::decode_request(request.get_ref());
        debug!(?remote, ?options, "cluster status requested");

        let snapshot = self.aggregator.compute_snapshot(&options);
        Ok(Response::new(codec::encode_snapshot(&snapshot)))
    }
}

#[cfg(test)]
mod tests {
    use stratus_core::{Category, ClusterId, ServerIdentity, StatusOptions};

    use super::*;
    use crate::aggregator::MasterInfo;
    use crate::election::MasterTracker;

    fn server() -> StatusServer {
        let master = ServerIdentity::new("master1", 16000, 1).unwrap();
        let masters = Arc::new(MasterTracker::new());
        masters.register(master.clone());

        let info = MasterInfo::new(master, ClusterId::from("cluster-a".to_string()));
        StatusServer::new(Arc::new(StatusAggregator::new(info).with_election(masters)))
    }

    #[tokio::test]
    async fn handler_honours_include_mask() {
        let version_only = StatusOptions::from_mask(1 << Category::Version.bit());
        let request = Request::new(codec::encode_request(&version_only));

        let response = server().get_cluster_status(request).await.unwrap().into_inner();

        assert!(response.version.is_some());
        assert!(response.cluster_id.is_none());
        assert!(response.master.is_none());
    }

    #[tokio::test]
    async fn handler_returns_full_snapshot_by_default() {
        let request = Request::new(codec::encode_request(&StatusOptions::default()));
        let response = server().get_cluster_status(request).await.unwrap().into_inner();

        let snapshot = codec::decode_snapshot(response).unwrap();
        assert_eq!(snapshot.cluster_id(), Some("cluster-a"));
        assert_eq!(snapshot.master().map(|m| m.host()), Some("master1"));
        assert!(snapshot.backup_masters().is_empty());
    }
}
