//! HTTP surface over [`ChatService`].
//!
//! Each request opens its own connection through the service; the router
//! holds no per-request state.

/// Error-to-response mapping.
pub mod error;
/// Request handlers.
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use snafu::{ResultExt, Snafu};
use tokio::net::TcpListener;

use crate::service::ChatService;

pub use error::ApiError;

/// Failures starting or running the listener.
#[derive(Debug, Snafu)]
pub enum ServerError {
    /// The address could not be bound.
    #[snafu(display("failed to bind {addr}: {source}"))]
    Bind {
        /// Requested address.
        addr: String,
        /// I/O failure.
        source: std::io::Error,
    },

    /// The server loop stopped with an error.
    #[snafu(display("server error: {source}"))]
    Serve {
        /// I/O failure.
        source: std::io::Error,
    },
}

/// Build the application router.
pub fn router(service: ChatService) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/upload-csv", post(handlers::upload_csv))
        .with_state(Arc::new(service))
}

/// Serve on an already-bound listener until the process is interrupted.
pub async fn serve_on(listener: TcpListener, service: ChatService) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu)
}

/// Bind `bind_addr:port` and serve.
pub async fn serve(service: ChatService, bind_addr: &str, port: u16) -> Result<(), ServerError> {
    let addr = format!("{bind_addr}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .context(BindSnafu { addr: addr.as_str() })?;
    serve_on(listener, service).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    } else {
        // No signal handler available; run until the task is dropped.
        std::future::pending::<()>().await;
    }
}
