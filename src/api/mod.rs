//! HTTP listener for webhook mode

mod health;
mod webhook;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::dispatch::Dispatcher;

/// Shared state for request handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the router: `POST /webhook` and `/health`
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(webhook::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}

/// Webhook listener
#[derive(Debug)]
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, port: u16) -> Self {
        Self {
            state: Arc::new(ApiState { dispatcher }),
            port,
        }
    }

    /// Serve until `shutdown` flips to `true`
    ///
    /// Stops accepting new connections on shutdown; requests already being
    /// handled run to completion.
    ///
    /// # Errors
    ///
    /// Returns error if the listener fails to bind or the server fails
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .inspect_err(|e| tracing::error!(%addr, error = %e, "failed to bind webhook listener"))?;

        tracing::info!(port = self.port, "webhook listener started");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
                tracing::info!("webhook listener shutting down");
            })
            .await?;

        Ok(())
    }
}
