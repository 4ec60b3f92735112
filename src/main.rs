use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use tupconnect_match::config::Settings;
use tupconnect_match::core::{MatchPipeline, OrgMatcher, Taxonomy};
use tupconnect_match::models::RankingWeights;
use tupconnect_match::routes::matches::AppState;
use tupconnect_match::routes::{self, handle_json_payload_error, handle_query_payload_error};
use tupconnect_match::services::{GeminiClient, SupabaseClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting TUPConnect match service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // A missing key is not fatal at boot; match requests answer with a
    // configuration error until it shows up
    if settings.gemini.api_key.trim().is_empty() {
        warn!("Gemini API key is not configured, match requests will fail until it is set");
    }
    if settings.supabase.url.trim().is_empty() {
        warn!("Supabase URL is not configured, directory requests will fail until it is set");
    }

    // Initialize Gemini client
    let gemini = Arc::new(GeminiClient::new(
        settings.gemini.endpoint.clone(),
        settings.gemini.api_key.clone(),
        Duration::from_secs(settings.gemini.request_timeout_secs),
    ));

    info!("Gemini client initialized ({})", settings.gemini.endpoint);

    // Initialize Supabase client
    let supabase = Arc::new(SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.service_key.clone(),
    ));

    info!("Supabase client initialized");

    // Build the classification pipeline
    let taxonomy = Taxonomy::from_labels(settings.classifier.categories.clone());
    let pipeline = Arc::new(MatchPipeline::new(
        gemini,
        taxonomy,
        settings.classifier.shape,
        settings.gemini.max_attempts,
    ));

    info!(
        "Classification pipeline ready (shape: {:?}, max attempts: {})",
        settings.classifier.shape, settings.gemini.max_attempts
    );

    // Initialize matcher with configured weights
    let weights = RankingWeights::from(settings.matching.weights.clone());
    let matcher = OrgMatcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        supabase,
        pipeline,
        matcher,
        default_limit: settings.matching.default_limit,
        max_limit: settings.matching.max_limit,
        expose_error_details: settings.server.expose_error_details,
        activation_redirect: settings.supabase.activation_redirect.clone(),
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
