//! Sandbox records backend
//!
//! An in-memory stand-in for the records REST API, built with Axum. It serves
//! the same resource paths the remote repositories call, so the whole stack
//! can run without the real backend. Faults are injected through
//! [`SandboxState`].
//!
//! # Endpoints
//!
//! ## Blotter
//! - `GET /api/blotter` - All reports
//! - `GET /api/blotter/pending` - Reports awaiting review
//! - `POST /api/blotter` - Submit a report
//! - `GET /api/blotter/:id` - One report (`?admin=1` for reporter details)
//! - `PATCH /api/blotter/:id` - Partial update
//! - `DELETE /api/blotter/:id` - Delete a report
//!
//! ## Documents
//! - `GET /api/documents` - All requests
//! - `POST /api/documents` - Submit a request
//! - `GET /api/documents/:id` - One request
//! - `PATCH /api/documents/:id` - Partial update
//! - `DELETE /api/documents/:id` - Delete a request
//! - `GET /api/documents/track/by-number/:number` - Lookup by tracking number
//!
//! ## Health
//! - `GET /health` - Liveness and record counts
//!
//! # Example
//!
//! ```rust,ignore
//! use barangay_records::sandbox::{spawn, SandboxState};
//!
//! let state = SandboxState::new();
//! let running = spawn(state.clone()).await?;
//! println!("API at {}", running.api_url());
//! state.set_offline(true);
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{SandboxError, SandboxResult};
pub use state::{SandboxConfig, SandboxState};

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the sandbox router with all routes and middleware
pub fn build_router(state: SandboxState) -> Router {
    let api_routes = Router::new()
        // Blotter routes
        .route(
            "/blotter",
            get(routes::blotter::list_reports).post(routes::blotter::create_report),
        )
        .route("/blotter/pending", get(routes::blotter::list_pending))
        .route(
            "/blotter/:id",
            get(routes::blotter::get_report)
                .patch(routes::blotter::update_report)
                .delete(routes::blotter::delete_report),
        )
        // Document routes
        .route(
            "/documents",
            get(routes::documents::list_documents).post(routes::documents::create_document),
        )
        .route(
            "/documents/:id",
            get(routes::documents::get_document)
                .patch(routes::documents::update_document)
                .delete(routes::documents::delete_document),
        )
        .route(
            "/documents/track/by-number/:number",
            get(routes::documents::track_by_number),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the sandbox and serve until Ctrl+C or SIGTERM
pub async fn serve(state: SandboxState, config: &SandboxConfig) -> SandboxResult<()> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Records sandbox listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Records sandbox shut down gracefully");
    Ok(())
}

/// A sandbox running on a background task
pub struct RunningSandbox {
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
}

impl RunningSandbox {
    /// Base URL for [`ClientConfig`](crate::client::ClientConfig)
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Serve on an ephemeral port of 127.0.0.1 in a background task
pub async fn spawn(state: SandboxState) -> SandboxResult<RunningSandbox> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = build_router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Sandbox server stopped");
        }
    });

    tracing::debug!(%addr, "Spawned records sandbox");
    Ok(RunningSandbox { addr, handle })
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(SandboxState::new());
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_offline_returns_503() {
        let state = SandboxState::new();
        state.set_offline(true);
        let app = build_router(state);

        let response = app.clone().oneshot(get("/api/blotter")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_create_document_issues_tracking_number() {
        let app = build_router(SandboxState::new());
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/documents",
                r#"{"residentName": "Juan Dela Cruz", "documentType": "Barangay Clearance",
                    "formFields": {"purpose": "employment"}, "pickup": false}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let doc = body_json(response).await;
        let number = doc["trackingNumber"].as_str().unwrap().to_string();
        assert!(number.starts_with("ABIS-"));
        assert!(doc.get("pickupCode").is_none());

        let response = app
            .oneshot(get(&format!(
                "/api/documents/track/by-number/{}",
                number.to_lowercase()
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_document_validates() {
        let app = build_router(SandboxState::new());
        let response = app
            .oneshot(post_json(
                "/api/documents",
                r#"{"residentName": "", "documentType": "Certificate of Residency"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tracking_number_is_404() {
        let app = build_router(SandboxState::new());
        let response = app
            .oneshot(get("/api/documents/track/by-number/ABIS-20240101-000000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_lifecycle_and_redaction() {
        let state = SandboxState::new();
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/blotter",
                r#"{"title": "Noise", "description": "Karaoke", "reporterName": "Maria",
                    "status": "published"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let report = body_json(response).await;
        assert_eq!(report["status"], "pending");
        let id = report["id"].as_str().unwrap().to_string();

        let pending = body_json(app.clone().oneshot(get("/api/blotter/pending")).await.unwrap()).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let public = body_json(
            app.clone()
                .oneshot(get(&format!("/api/blotter/{}", id)))
                .await
                .unwrap(),
        )
        .await;
        assert!(public.get("reporterName").is_none());

        let admin = body_json(
            app.clone()
                .oneshot(get(&format!("/api/blotter/{}?admin=1", id)))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(admin["reporterName"], "Maria");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/blotter/{}", id))
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"status": "published", "showReporter": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.reports.read().await[0].status.as_str(), "published");

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/blotter/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.reports.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_record_returns_500() {
        let state = SandboxState::new();
        state.fail_record("abc").await;
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/blotter/abc")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"status": "rejected"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
