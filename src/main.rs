use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use event_match::config::Settings;
use event_match::core::{build_scorer, LocationPolicy, MatchMaker};
use event_match::models::ScoringWeights;
use event_match::routes::{self, AppState};
use event_match::services::{
    DisabledGeocoder, Geocoder, HttpMailNotifier, InMemoryRegistry, LogNotifier,
    NominatimGeocoder, Notifier, SvgQrRenderer,
};

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
            .json(self)
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

/// Handle path parameter errors (malformed attendee or match ids)
pub fn handle_path_error(err: error::PathError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 404,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting EventMatch service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    let geocoder: Arc<dyn Geocoder> = if settings.geocoder.enabled {
        let geocoder = NominatimGeocoder::new(
            settings.geocoder.endpoint.clone(),
            settings.geocoder.user_agent.clone(),
            Duration::from_secs(settings.geocoder.timeout_secs.unwrap_or(10)),
            settings.geocoder.retry_policy(),
            settings.geocoder.cache_capacity.unwrap_or(1000),
            Duration::from_secs(settings.geocoder.cache_ttl_secs.unwrap_or(86_400)),
        )
        .map_err(|e| startup_error("Failed to build geocoder", e))?;
        info!("Geocoding via {}", settings.geocoder.endpoint);
        Arc::new(geocoder)
    } else {
        warn!("Geocoding disabled, events will be stored without coordinates");
        Arc::new(DisabledGeocoder)
    };

    let notifier: Arc<dyn Notifier> = match &settings.mail.relay_url {
        Some(relay_url) => {
            let notifier = HttpMailNotifier::new(
                relay_url.clone(),
                settings.mail.api_key.clone(),
                settings.mail.sender.clone(),
            )
            .map_err(|e| startup_error("Failed to build mail notifier", e))?;
            info!("Sending confirmation mail through {}", relay_url);
            Arc::new(notifier)
        }
        None => {
            warn!("No mail relay configured, confirmations will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // Initialize matchmaker with configured scorer
    let weights = ScoringWeights::from(&settings.matching.weights);
    let matchmaker = MatchMaker::new(build_scorer(settings.matching.scorer, weights));

    info!(
        "Matchmaker initialized with {} scorer, weights: {:?}",
        matchmaker.scorer_name(),
        weights
    );

    // Build application state
    let app_state = AppState {
        registry: Arc::new(InMemoryRegistry::new()),
        matchmaker,
        geocoder,
        notifier,
        qr: Arc::new(SvgQrRenderer::default()),
        location_policy: LocationPolicy::new(settings.location.enforce_radius),
        public_url: settings.server.public_url.clone(),
        max_code_attempts: settings.registry.max_code_attempts.unwrap_or(16),
    };

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
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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
