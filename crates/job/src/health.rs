//! Liveness endpoint served for the duration of a run.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// A running health server. Call [`shutdown`](Self::shutdown) once the job
/// is done.
pub struct HealthServer {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl HealthServer {
    /// Bind `addr` and serve [`router`] in a background task.
    pub async fn spawn(addr: &str) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let shutdown = Arc::new(Notify::new());

        let signal = shutdown.clone();
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router())
                .with_graceful_shutdown(async move { signal.notified().await })
                .await;
            if let Err(e) = served {
                warn!(error = %e, "health server stopped with error");
            }
        });

        info!(addr = %local_addr, "health server listening");
        Ok(Self {
            local_addr,
            shutdown,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) {
        // notify_one stores a permit if the server has not started waiting yet
        self.shutdown.notify_one();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "health server task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_returns_ok_json() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = router()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn spawned_server_shuts_down() {
        let server = HealthServer::spawn("127.0.0.1:0").await.unwrap();
        assert_ne!(server.local_addr().port(), 0);
        tokio::time::timeout(std::time::Duration::from_secs(5), server.shutdown())
            .await
            .unwrap();
    }
}
