//! HTTP routes for assessment endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use super::handlers::{
    abandon_assessment, create_assessment, generate_report, get_progress, get_report,
    list_topics, resume_assessment, AssessmentHandlers,
};
use super::ws_handler::turns_ws_handler;
use crate::adapters::http::RouteTimeouts;

/// Creates the assessment router, mounted under `/api/assessments`.
///
/// Report generation gets its own deadline; every other route uses the
/// plain request timeout.
pub fn assessment_routes(handlers: AssessmentHandlers, timeouts: RouteTimeouts) -> Router {
    let request = TimeoutLayer::new(timeouts.request);
    Router::new()
        .route("/", post(create_assessment).layer(request.clone()))
        .route("/:id/resume", post(resume_assessment).layer(request.clone()))
        .route("/:id/abandon", post(abandon_assessment).layer(request.clone()))
        .route("/:id/progress", get(get_progress).layer(request.clone()))
        .route("/:id/turns", get(turns_ws_handler).layer(request.clone()))
        .route(
            "/:id/report",
            post(generate_report)
                .layer(TimeoutLayer::new(timeouts.report))
                .merge(get(get_report).layer(request)),
        )
        .with_state(handlers)
}

/// Creates the registry router, mounted under `/api/topics`.
pub fn topic_routes() -> Router {
    Router::new().route("/", get(list_topics))
}
