//! HTTP handlers for assessment endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::conversation::{
    AssessmentTools, ConfidenceClassifier, TopicLedger, TurnConfig, TurnGate,
};
use crate::application::handlers::report::{
    GenerateReportCommand, GenerateReportHandler, GetReportHandler, GetReportQuery,
    NarrativeGenerator,
};
use crate::application::handlers::session::{
    AbandonSessionCommand, AbandonSessionHandler, CreateSessionCommand, CreateSessionHandler,
    GetProgressHandler, GetProgressQuery, ResumeSessionCommand, ResumeSessionHandler,
};
use crate::application::handlers::StartTurnHandler;
use crate::config::AssessmentConfig;
use crate::domain::foundation::{AssessmentError, ErrorCode, SessionId};
use crate::domain::registry::TopicRegistry;
use crate::ports::{
    ConversationRepository, DialogueProvider, LedgerRepository, ReportRepository,
    SessionRepository, StructuredOutputProvider,
};

use super::dto::{
    AbandonResponse, CreateAssessmentRequest, CreateAssessmentResponse, ErrorResponse,
    ResumeAssessmentRequest, TopicCatalogueResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// The port implementations the handlers are built from.
#[derive(Clone)]
pub struct AssessmentPorts {
    pub sessions: Arc<dyn SessionRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub dialogue: Arc<dyn DialogueProvider>,
    pub structured: Arc<dyn StructuredOutputProvider>,
}

#[derive(Clone)]
pub struct AssessmentHandlers {
    pub(super) create_handler: Arc<CreateSessionHandler>,
    pub(super) resume_handler: Arc<ResumeSessionHandler>,
    pub(super) abandon_handler: Arc<AbandonSessionHandler>,
    pub(super) progress_handler: Arc<GetProgressHandler>,
    pub(super) turn_handler: Arc<StartTurnHandler>,
    pub(super) generate_report_handler: Arc<GenerateReportHandler>,
    pub(super) get_report_handler: Arc<GetReportHandler>,
}

impl AssessmentHandlers {
    pub fn new(
        create_handler: Arc<CreateSessionHandler>,
        resume_handler: Arc<ResumeSessionHandler>,
        abandon_handler: Arc<AbandonSessionHandler>,
        progress_handler: Arc<GetProgressHandler>,
        turn_handler: Arc<StartTurnHandler>,
        generate_report_handler: Arc<GenerateReportHandler>,
        get_report_handler: Arc<GetReportHandler>,
    ) -> Self {
        Self {
            create_handler,
            resume_handler,
            abandon_handler,
            progress_handler,
            turn_handler,
            generate_report_handler,
            get_report_handler,
        }
    }

    /// Wires every handler from one set of ports.
    pub fn from_ports(ports: AssessmentPorts, config: &AssessmentConfig) -> Self {
        let topic_ledger = TopicLedger::new(Arc::clone(&ports.ledger));
        let classifier = ConfidenceClassifier::new(Arc::clone(&ports.structured));
        let tools = AssessmentTools::new(
            Arc::clone(&ports.sessions),
            topic_ledger.clone(),
            classifier,
            config.annotation_fallback_chars,
        );
        let turn_config = TurnConfig {
            max_message_chars: config.max_message_chars,
            max_history_messages: config.max_history_messages,
        };

        Self::new(
            Arc::new(CreateSessionHandler::new(
                Arc::clone(&ports.sessions),
                config.session_ttl_days,
            )),
            Arc::new(ResumeSessionHandler::new(
                Arc::clone(&ports.sessions),
                Arc::clone(&ports.ledger),
            )),
            Arc::new(AbandonSessionHandler::new(Arc::clone(&ports.sessions))),
            Arc::new(GetProgressHandler::new(
                Arc::clone(&ports.sessions),
                Arc::clone(&ports.ledger),
            )),
            Arc::new(StartTurnHandler::new(
                Arc::clone(&ports.sessions),
                topic_ledger,
                Arc::clone(&ports.conversations),
                Arc::clone(&ports.dialogue),
                tools,
                TurnGate::new(),
                turn_config,
            )),
            Arc::new(GenerateReportHandler::new(
                Arc::clone(&ports.sessions),
                Arc::clone(&ports.ledger),
                Arc::clone(&ports.reports),
                NarrativeGenerator::new(Arc::clone(&ports.structured)),
            )),
            Arc::new(GetReportHandler::new(ports.sessions, ports.reports)),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/assessments - Start an assessment
pub async fn create_assessment(
    State(handlers): State<AssessmentHandlers>,
    Json(req): Json<CreateAssessmentRequest>,
) -> Response {
    let cmd = CreateSessionCommand { email: req.email };

    match handlers.create_handler.handle(cmd).await {
        Ok(result) => {
            let response = CreateAssessmentResponse::from(result);
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_assessment_error(e),
    }
}

/// POST /api/assessments/:id/resume - Resume with the recovery token
pub async fn resume_assessment(
    State(handlers): State<AssessmentHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<ResumeAssessmentRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = ResumeSessionCommand {
        session_id,
        recovery_token: req.recovery_token,
    };

    match handlers.resume_handler.handle(cmd).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => handle_assessment_error(e),
    }
}

/// POST /api/assessments/:id/abandon - Abandon an assessment
pub async fn abandon_assessment(
    State(handlers): State<AssessmentHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .abandon_handler
        .handle(AbandonSessionCommand { session_id })
        .await
    {
        Ok(status) => {
            let response = AbandonResponse {
                session_id: session_id.to_string(),
                status,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_assessment_error(e),
    }
}

/// GET /api/assessments/:id/progress - Coverage per domain
pub async fn get_progress(
    State(handlers): State<AssessmentHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .progress_handler
        .handle(GetProgressQuery { session_id })
        .await
    {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => handle_assessment_error(e),
    }
}

/// POST /api/assessments/:id/report - Generate the readiness report
pub async fn generate_report(
    State(handlers): State<AssessmentHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .generate_report_handler
        .handle(GenerateReportCommand { session_id })
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => handle_assessment_error(e),
    }
}

/// GET /api/assessments/:id/report - Latest generated report
pub async fn get_report(
    State(handlers): State<AssessmentHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .get_report_handler
        .handle(GetReportQuery { session_id })
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => handle_assessment_error(e),
    }
}

/// GET /api/topics - Registry catalogue
pub async fn list_topics() -> Json<TopicCatalogueResponse> {
    Json(TopicCatalogueResponse::from_registry(TopicRegistry::global()))
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

/// Maps an error code to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidTopic => StatusCode::BAD_REQUEST,
        ErrorCode::SessionNotFound | ErrorCode::ReportNotFound => StatusCode::NOT_FOUND,
        ErrorCode::SessionExpired => StatusCode::GONE,
        ErrorCode::SessionAbandoned
        | ErrorCode::InvalidStateTransition
        | ErrorCode::StateConflict
        | ErrorCode::TurnInProgress => StatusCode::CONFLICT,
        ErrorCode::NoInputsCaptured => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::DelegateError | ErrorCode::NoResponse => StatusCode::BAD_GATEWAY,
        ErrorCode::DatabaseError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(super) fn handle_assessment_error(error: AssessmentError) -> Response {
    let status = status_for(error.code());
    if status.is_server_error() {
        tracing::error!(code = %error.code(), "request failed: {}", error);
    }
    (status, Json(ErrorResponse::from(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainArea;

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_assessment_error(AssessmentError::NotFound(SessionId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn expired_maps_to_410() {
        let response = handle_assessment_error(AssessmentError::Expired(SessionId::new()));
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn conflicts_map_to_409() {
        let response = handle_assessment_error(AssessmentError::uncovered_topics(
            DomainArea::Product,
            vec!["pricing".to_string()],
        ));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::TurnInProgress), StatusCode::CONFLICT);
    }

    #[test]
    fn remaining_codes_map_to_their_statuses() {
        assert_eq!(status_for(ErrorCode::InvalidTopic), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::ReportNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorCode::NoInputsCaptured),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorCode::DelegateError), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(ErrorCode::DatabaseError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn malformed_session_id_is_400() {
        let response = parse_session_id("not-a-uuid").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
