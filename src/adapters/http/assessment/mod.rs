//! HTTP adapter for assessment endpoints.

mod dto;
mod handlers;
mod routes;
mod ws_handler;

pub use dto::{
    AbandonResponse, ClientMessage, CreateAssessmentRequest, CreateAssessmentResponse,
    ErrorResponse, ResumeAssessmentRequest, TopicCatalogueResponse,
};
pub use handlers::{status_for, AssessmentHandlers, AssessmentPorts};
pub use routes::{assessment_routes, topic_routes};
