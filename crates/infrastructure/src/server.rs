//! Ephemeral test server.
//!
//! Serves an `axum::Router` on a random local port so a recorder can talk to
//! an in-process handler over real HTTP. The listener is stopped by
//! [`TestServer::shutdown`], or on drop.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use wirecheck_application::RecorderError;

/// How long a graceful shutdown may take before the server task is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A running HTTP server bound to `127.0.0.1` on an ephemeral port.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Binds a listener and starts serving `router` in a background task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Server`] if the listener cannot be bound.
    pub async fn start(router: Router) -> Result<Self, RecorderError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(|e| RecorderError::Server(format!("bind TCP listener: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| RecorderError::Server(format!("get listener socket address: {e}")))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                error!(%addr, error = %e, "test server stopped with an error");
            }
        });

        info!(%addr, "test server listening");

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Returns the socket address the server is listening on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Whether the server has not been shut down yet.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops accepting connections and waits for the server task to end.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        let Some(mut handle) = self.handle.take() else {
            return;
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
            Ok(Ok(())) => info!(addr = %self.addr, "test server stopped"),
            Ok(Err(e)) => warn!(addr = %self.addr, error = %e, "test server task failed"),
            Err(_) => {
                warn!(addr = %self.addr, "test server did not stop in time, aborting");
                handle.abort();
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
