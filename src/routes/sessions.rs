use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    ErrorResponse, HealthResponse, IntakeRequest, MatchResultBody, PreferencesRequest,
    RankedMatchBody, SessionCreatedResponse, SessionStateResponse,
};
use crate::session::{MatchPipeline, PipelineError, SessionError, SessionView};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: MatchPipeline,
}

/// Configure all session-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/sessions", web::post().to(submit_case))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}/intake", web::post().to(submit_intake))
        .route("/sessions/{id}/preferences", web::post().to(submit_preferences))
        .route("/sessions/{id}/cancel", web::post().to(cancel_session))
        .route("/sessions/{id}/refine", web::post().to(refine_session))
        .route("/sessions/{id}/new-search", web::post().to(new_search));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Begin a matching session
///
/// POST /api/v1/sessions
///
/// Request body:
/// ```json
/// {
///   "caseType": "Employment Law",
///   "location": "New York",
///   "description": "at least 50 characters of case description"
/// }
/// ```
async fn submit_case(
    state: web::Data<AppState>,
    req: web::Json<IntakeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for submit_case request: {:?}", errors);
        return validation_failed(errors.to_string());
    }

    match state.pipeline.submit_case(&req).await {
        Ok(view) => {
            tracing::info!("Session {} created, state: {}", view.id, view.state);
            HttpResponse::Ok().json(SessionCreatedResponse {
                session_id: view.id,
                state: view.state.name().to_string(),
            })
        }
        Err(e) => pipeline_error(e),
    }
}

/// Re-submit intake into an existing session after a "new search"
///
/// POST /api/v1/sessions/{id}/intake
async fn submit_intake(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<IntakeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors.to_string());
    }

    match state.pipeline.submit_intake(path.into_inner(), &req).await {
        Ok(view) => HttpResponse::Ok().json(to_state_response(&view)),
        Err(e) => pipeline_error(e),
    }
}

/// Submit preferences and start analysis
///
/// POST /api/v1/sessions/{id}/preferences
///
/// Request body:
/// ```json
/// {
///   "urgency": "standard",
///   "budget": "premium",
///   "preferredLanguages": ["English"],
///   "location": "New York"
/// }
/// ```
async fn submit_preferences(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<PreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for submit_preferences request: {:?}", errors);
        return validation_failed(errors.to_string());
    }

    let id = path.into_inner();
    match state.pipeline.submit_preferences(id, &req).await {
        Ok(view) => {
            tracing::info!("Session {} entered analysis", id);
            HttpResponse::Ok().json(to_state_response(&view))
        }
        Err(e) => pipeline_error(e),
    }
}

/// Poll session state and, once complete, the ranked result
///
/// GET /api/v1/sessions/{id}
async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.pipeline.session(path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(to_state_response(&view)),
        Err(e) => pipeline_error(e),
    }
}

/// Cancel an in-flight analysis
///
/// POST /api/v1/sessions/{id}/cancel
async fn cancel_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match state.pipeline.cancel(id).await {
        Ok(view) => {
            tracing::info!("Session {} cancelled", id);
            HttpResponse::Ok().json(to_state_response(&view))
        }
        Err(e) => pipeline_error(e),
    }
}

/// Discard the result and preferences, back to Preferences
///
/// POST /api/v1/sessions/{id}/refine
async fn refine_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.pipeline.refine(path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(to_state_response(&view)),
        Err(e) => pipeline_error(e),
    }
}

/// Discard everything, back to Intake
///
/// POST /api/v1/sessions/{id}/new-search
async fn new_search(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.pipeline.new_search(path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(to_state_response(&view)),
        Err(e) => pipeline_error(e),
    }
}

fn to_state_response(view: &SessionView) -> SessionStateResponse {
    let result = view.result.as_ref().map(|r| MatchResultBody {
        matches: r
            .matches
            .iter()
            .map(|m| {
                RankedMatchBody::from_score(m.attorney.id.clone(), m.attorney.name.clone(), &m.score)
            })
            .collect(),
        total_candidates: r.total_candidates,
        skipped: r.skipped,
    });

    SessionStateResponse {
        session_id: view.id,
        state: view.state.name().to_string(),
        result,
        degraded: view.degraded,
        error: view.failure.map(|f| f.to_string()),
        started_at: view.started_at,
        cancelled_at: view.cancelled_at,
    }
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message,
        status_code: 400,
    })
}

fn pipeline_error(err: PipelineError) -> HttpResponse {
    match err {
        PipelineError::Validation(e) => validation_failed(e.to_string()),
        PipelineError::Session(SessionError::NotFound) => {
            HttpResponse::NotFound().json(ErrorResponse {
                error: "session_not_found".to_string(),
                message: "No such session".to_string(),
                status_code: 404,
            })
        }
        PipelineError::Session(e @ SessionError::InvalidTransition { .. }) => {
            HttpResponse::Conflict().json(ErrorResponse {
                error: "invalid_transition".to_string(),
                message: e.to_string(),
                status_code: 409,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_pipeline_error_status_codes() {
        let not_found = pipeline_error(PipelineError::Session(SessionError::NotFound));
        assert_eq!(not_found.status(), actix_web::http::StatusCode::NOT_FOUND);

        let conflict = pipeline_error(PipelineError::Session(SessionError::InvalidTransition {
            from: crate::session::SessionState::Intake,
            action: "cancel",
        }));
        assert_eq!(conflict.status(), actix_web::http::StatusCode::CONFLICT);
    }
}
