//! HTTP adapters - REST and WebSocket API.
//!
//! `api_router` assembles the assessment and registry routes plus a
//! liveness probe, each under its own deadline. Trace and CORS layers are
//! applied by the binary.

pub mod assessment;

pub use assessment::{
    assessment_routes, status_for, topic_routes, AssessmentHandlers, AssessmentPorts,
};

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;

/// Per-route request deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTimeouts {
    /// Every route except report generation.
    pub request: Duration,
    /// `POST /api/assessments/:id/report`, which waits on the narrative delegate.
    pub report: Duration,
}

impl RouteTimeouts {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            request: Duration::from_secs(server.request_timeout_secs),
            report: Duration::from_secs(server.report_timeout_secs),
        }
    }
}

impl Default for RouteTimeouts {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Builds the full API router.
pub fn api_router(handlers: AssessmentHandlers, timeouts: RouteTimeouts) -> Router {
    Router::new()
        .nest("/api/assessments", assessment_routes(handlers, timeouts))
        .nest(
            "/api/topics",
            topic_routes().layer(TimeoutLayer::new(timeouts.request)),
        )
        .route(
            "/health",
            get(health).layer(TimeoutLayer::new(timeouts.request)),
        )
}

async fn health() -> &'static str {
    "ok"
}
