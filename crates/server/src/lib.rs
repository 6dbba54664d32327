//! HTTP front-end for the tailgate log search engine.
//!
//! Wires the reverse line finder from `tailgate-logs` into a single
//! `GET /logs` endpoint that streams the newest matching lines back to
//! the client with backpressure, and provides the server lifecycle
//! (bind, serve, graceful shutdown).
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod handlers;

pub use error::{Error, Result};

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{any, get};
use tailgate_logs::LogsConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Route constants for the public endpoints.
pub mod routes {
    /// Log search endpoint.
    pub const LOGS: &str = "/logs";
}

/// Builds the service router around an immutable configuration.
///
/// Every path other than the log endpoint falls through to a 404.
#[must_use]
pub fn router(config: Arc<LogsConfig>) -> Router {
    Router::new()
        .route(routes::LOGS, get(handlers::logs_handler))
        .fallback(any(|| async { (StatusCode::NOT_FOUND, "") }))
        .with_state(config)
}

/// HTTP server for the log service.
pub struct Server {
    listen_addr: SocketAddr,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl Server {
    /// Creates a server that will listen on `listen_addr`.
    #[must_use]
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        }
    }

    /// Binds the listener and serves `router` until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server was already started or the listen
    /// address cannot be bound.
    pub async fn start(&self, router: Router) -> Result<JoinHandle<()>> {
        if self.task_tracker.is_closed() {
            return Err(Error::AlreadyStarted);
        }

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(Error::Bind)?;

        info!("listening on {}", self.listen_addr);

        let shutdown_token = self.shutdown_token.clone();
        let handle = self.task_tracker.spawn(async move {
            tokio::select! {
                e = axum::serve(listener, router.into_make_service()).into_future() => {
                    info!("http server exited {e:?}");
                }
                () = shutdown_token.cancelled() => {}
            }
        });

        self.task_tracker.close();

        Ok(handle)
    }

    /// Cancels the serve task and waits for it to finish.
    pub async fn shutdown(&self) {
        info!("http server shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.wait().await;

        info!("http server shutdown");
    }
}
