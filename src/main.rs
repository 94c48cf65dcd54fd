mod config;
mod core;
mod models;
mod routes;
mod services;
mod session;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::Settings;
use crate::core::Matcher;
use models::{BudgetBand, BudgetBands, ScoringWeights};
use routes::sessions::AppState;
use services::{HttpCandidateDirectory, HttpFeatureService};
use session::{MatchPipeline, SessionStore};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Lexora matching service (log level: {})...", log_level);

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the attorney directory client
    let directory = Arc::new(HttpCandidateDirectory::new(
        settings.directory.endpoint.clone(),
        settings.directory.api_key.clone(),
        Duration::from_secs(settings.directory.timeout_secs),
    ));

    info!("Attorney directory client initialized ({})", settings.directory.endpoint);

    // Initialize the feature-extraction client
    let extractor = Arc::new(HttpFeatureService::new(
        settings.nlp.endpoint.clone(),
        Duration::from_millis(settings.nlp.timeout_ms),
    ));

    info!(
        "Feature service client initialized ({}, sub-timeout: {}ms)",
        settings.nlp.endpoint, settings.nlp.timeout_ms
    );

    // Initialize matcher with configured weights and bands
    let weights = ScoringWeights {
        specialization: settings.scoring.weights.specialization,
        experience: settings.scoring.weights.experience,
        track_record: settings.scoring.weights.track_record,
        language: settings.scoring.weights.language,
        availability: settings.scoring.weights.availability,
        budget_fit: settings.scoring.weights.budget_fit,
    };

    let bands = BudgetBands {
        economy: band(settings.scoring.bands.economy),
        standard: band(settings.scoring.bands.standard),
        premium: band(settings.scoring.bands.premium),
        elite: band(settings.scoring.bands.elite),
    };

    let matcher = Matcher::new(
        weights,
        bands,
        settings.scoring.reason_threshold,
        settings.matching.top_n,
        settings.matching.pool_size,
        Duration::from_secs(settings.matching.batch_deadline_secs),
    );

    info!(
        "Matcher initialized (top-N: {}, pool: {}, deadline: {}s)",
        settings.matching.top_n, settings.matching.pool_size, settings.matching.batch_deadline_secs
    );

    // Build the session store and pipeline
    let store = Arc::new(SessionStore::new(Duration::from_secs(
        settings.matching.session_ttl_secs,
    )));
    let pipeline = MatchPipeline::new(store, directory, extractor, matcher);

    let app_state = AppState { pipeline };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

fn band(pair: [f64; 2]) -> BudgetBand {
    BudgetBand {
        min: pair[0],
        max: pair[1],
    }
}
