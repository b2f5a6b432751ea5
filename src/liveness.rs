//! Keep-alive HTTP endpoint
//!
//! Hosting platforms that sleep idle services poll this endpoint to keep the
//! process warm. It exposes a single route and shares no state with the
//! engine.

use crate::config::Config;
use crate::error::{Error, Result};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Serve the liveness endpoint until the task is dropped
pub async fn serve(config: Arc<Config>) -> Result<()> {
    let app = Router::new().route("/", get(alive));

    let listener = tokio::net::TcpListener::bind(config.liveness.bind_address)
        .await
        .map_err(Error::Io)?;
    tracing::info!(address = %config.liveness.bind_address, "Liveness endpoint listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(e.to_string()))
}

async fn alive() -> &'static str {
    "tune-dl is alive"
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_the_liveness_route() {
        let mut config = Config::default();
        // Port 0 lets the OS choose a free port; bind directly to learn it
        config.liveness.bind_address = "127.0.0.1:0".parse().unwrap();
        let listener = tokio::net::TcpListener::bind(config.liveness.bind_address)
            .await
            .unwrap();
        let address = listener.local_addr().unwrap();

        let app = Router::new().route("/", get(alive));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let body = reqwest::get(format!("http://{address}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "tune-dl is alive");
    }
}
