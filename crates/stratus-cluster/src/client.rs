//! Status clients — query the active master for a cluster snapshot.
//!
//! [`StatusClient`] is the async client for callers already running on
//! tokio. [`BlockingStatusClient`] owns a small dedicated runtime and
//! offers both a blocking call and [`get_status_async`], which returns a
//! [`PendingStatus`] future without blocking the calling thread.
//!
//! Every path encodes options and decodes responses through
//! [`crate::codec`], so they agree field for field on the same state.
//!
//! [`get_status_async`]: BlockingStatusClient::get_status_async

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use stratus_core::{ClientConfig, ClusterStatusSnapshot, StatusOptions};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

use crate::codec;
use crate::error::{ClientError, ClientResult};
use crate::proto::cluster_status_service_client::ClusterStatusServiceClient;

/// Async status client. Cheap to clone; clones share one channel.
#[derive(Debug, Clone)]
pub struct StatusClient {
    inner: ClusterStatusServiceClient<Channel>,
}

impl StatusClient {
    /// Connect to the master at `endpoint` (e.g. `http://10.0.0.1:16000`).
    ///
    /// `timeout` bounds both connection setup and each call.
    pub async fn connect(endpoint: &str, timeout: Duration) -> ClientResult<Self> {
        let ep = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| ClientError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?
            .connect_timeout(timeout)
            .timeout(timeout);

        let channel = ep.connect().await?;
        info!(%endpoint, "connected to master");
        Ok(Self::from_channel(channel))
    }

    /// Connect using a `[client]` config section.
    pub async fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::connect(&config.endpoint, Duration::from_millis(config.timeout_ms)).await
    }

    /// Wrap an existing channel.
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: ClusterStatusServiceClient::new(channel),
        }
    }

    /// Fetch a full snapshot.
    pub async fn get_status(&self) -> ClientResult<ClusterStatusSnapshot> {
        self.get_status_with(StatusOptions::default_options()).await
    }

    /// Fetch a snapshot holding only the categories in `options`.
    pub async fn get_status_with(
        &self,
        options: StatusOptions,
    ) -> ClientResult<ClusterStatusSnapshot> {
        let mut client = self.inner.clone();
        let response = client
            .get_cluster_status(codec::encode_request(&options))
            .await?;

        let snapshot = codec::decode_snapshot(response.into_inner())?;
        debug!(
            ?options,
            live = snapshot.servers_size(),
            dead = snapshot.dead_servers_size(),
            "cluster status received"
        );
        Ok(snapshot)
    }
}

/// Status client for callers outside any async runtime.
///
/// Must not be created, used for blocking calls, or dropped from within
/// an async context.
#[derive(Debug)]
pub struct BlockingStatusClient {
    client: StatusClient,
    runtime: Runtime,
}

impl BlockingStatusClient {
    /// Start the client runtime and connect to the master.
    pub fn connect(endpoint: &str, timeout: Duration) -> ClientResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("stratus-status-client")
            .enable_all()
            .build()?;

        let client = runtime.block_on(StatusClient::connect(endpoint, timeout))?;
        Ok(Self { client, runtime })
    }

    /// Connect using a `[client]` config section.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::connect(&config.endpoint, Duration::from_millis(config.timeout_ms))
    }

    /// Fetch a full snapshot, blocking until it arrives.
    pub fn get_status(&self) -> ClientResult<ClusterStatusSnapshot> {
        self.get_status_with(StatusOptions::default_options())
    }

    /// Fetch a snapshot for `options`, blocking until it arrives.
    pub fn get_status_with(&self, options: StatusOptions) -> ClientResult<ClusterStatusSnapshot> {
        self.runtime.block_on(self.client.get_status_with(options))
    }

    /// Start fetching a snapshot for `options` and return immediately.
    ///
    /// The request runs on the client runtime; the returned future
    /// resolves once the response is decoded.
    pub fn get_status_async(&self, options: StatusOptions) -> PendingStatus {
        let client = self.client.clone();
        let handle = self
            .runtime
            .spawn(async move { client.get_status_with(options).await });

        PendingStatus {
            handle,
            runtime: self.runtime.handle().clone(),
        }
    }

    /// The async client this wraps.
    pub fn async_client(&self) -> &StatusClient {
        &self.client
    }
}

/// An in-flight status request.
///
/// Await it, [`wait`](PendingStatus::wait) on it, or
/// [`cancel`](PendingStatus::cancel) it. Dropping it stops waiting for
/// the response.
#[derive(Debug)]
pub struct PendingStatus {
    handle: JoinHandle<ClientResult<ClusterStatusSnapshot>>,
    runtime: Handle,
}

impl PendingStatus {
    /// Block the current thread until the snapshot is available.
    ///
    /// Must not be called from within an async context.
    pub fn wait(mut self) -> ClientResult<ClusterStatusSnapshot> {
        let runtime = self.runtime.clone();
        runtime.block_on(&mut self)
    }

    /// Stop waiting for the response.
    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Whether the response has already been handled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingStatus {
    type Output = ClientResult<ClusterStatusSnapshot>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(ClientError::Cancelled)),
            Poll::Ready(Err(e)) => std::panic::resume_unwind(e.into_panic()),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for PendingStatus {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_endpoint_is_reported() {
        let err = StatusClient::connect("not a uri", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn unreachable_master_fails_the_call() {
        // Nothing listens on port 1.
        let err = StatusClient::connect("http://127.0.0.1:1", Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
    }

    #[tokio::test]
    async fn lazy_channel_surfaces_transport_failure_as_rpc_error() {
        let channel = Endpoint::from_static("http://127.0.0.1:1")
            .timeout(Duration::from_millis(500))
            .connect_lazy();
        let client = StatusClient::from_channel(channel);

        let err = client.get_status().await.unwrap_err();
        assert!(matches!(err, ClientError::Rpc(_)));
    }

    #[test]
    fn blocking_connect_failure_is_an_error() {
        let err = BlockingStatusClient::connect("http://127.0.0.1:1", Duration::from_millis(500))
            .unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
    }
}
