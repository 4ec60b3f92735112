use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{MatchError, MatchPipeline, OrgMatcher};
use crate::models::{
    ErrorResponse, HealthResponse, MatchRequest, OrganizationMatchRequest,
    OrganizationMatchesResponse,
};
use crate::services::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub pipeline: Arc<MatchPipeline>,
    pub matcher: OrgMatcher,
    pub default_limit: u16,
    pub max_limit: u16,
    pub expose_error_details: bool,
    pub activation_redirect: Option<String>,
}

/// Configure match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .service(
            web::resource("/match")
                .route(web::post().to(find_match))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/match/organizations")
                .route(web::post().to(find_organization_matches))
                .route(web::route().to(method_not_allowed)),
        );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    // Check Supabase reachability
    let supabase_healthy = state.supabase.health_check().await.unwrap_or(false);

    let status = if supabase_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Catch-all for unsupported methods on the match resources
async fn method_not_allowed() -> impl Responder {
    HttpResponse::MethodNotAllowed()
        .insert_header(("Allow", "POST"))
        .json(ErrorResponse {
            error: "Method not allowed".to_string(),
            details: Some("Use POST with a JSON body".to_string()),
            status_code: 405,
        })
}

/// Classify interests endpoint
///
/// POST /api/match
///
/// Request body:
/// ```json
/// {
///   "student_interest": "string"
/// }
/// ```
async fn find_match(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "student_interest is required and must be a non-empty string".to_string(),
            details: Some(errors.to_string()),
            status_code: 400,
        });
    }

    let interest = req.student_interest.trim();
    if interest.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "student_interest is required and must be a non-empty string".to_string(),
            details: None,
            status_code: 400,
        });
    }

    let request_id = uuid::Uuid::new_v4();
    tracing::info!("Match request {} ({} chars of interest text)", request_id, interest.len());

    match state.pipeline.classify(interest).await {
        Ok(profile) => {
            tracing::info!(
                "Match request {} resolved to {} categories",
                request_id,
                profile.matched_categories.len()
            );
            HttpResponse::Ok().json(profile)
        }
        Err(e) => match_error_response(&e, state.expose_error_details),
    }
}

/// Classify interests and rank the directory against them
///
/// POST /api/match/organizations
///
/// Request body:
/// ```json
/// {
///   "student_interest": "string",
///   "limit": 20
/// }
/// ```
async fn find_organization_matches(
    state: web::Data<AppState>,
    req: web::Json<OrganizationMatchRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for organization match request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "student_interest is required and must be a non-empty string".to_string(),
            details: Some(errors.to_string()),
            status_code: 400,
        });
    }

    let interest = req.student_interest.trim();
    if interest.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "student_interest is required and must be a non-empty string".to_string(),
            details: None,
            status_code: 400,
        });
    }

    // Cap limit to prevent oversized responses
    let limit = req
        .limit
        .unwrap_or(state.default_limit)
        .min(state.max_limit) as usize;

    let profile = match state.pipeline.classify(interest).await {
        Ok(profile) => profile,
        Err(e) => return match_error_response(&e, state.expose_error_details),
    };

    let organizations = match state.supabase.list_organizations().await {
        Ok(orgs) => orgs,
        Err(e) => {
            tracing::error!("Failed to fetch organizations for matching: {}", e);
            return store_error_response(&e, state.expose_error_details);
        }
    };

    let result = state.matcher.rank(&profile, organizations, limit);

    tracing::info!(
        "Returning {} organization matches (from {} candidates)",
        result.matches.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(OrganizationMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        profile,
    })
}

/// Map a pipeline failure onto the public error contract
pub(crate) fn match_error_response(error: &MatchError, expose_details: bool) -> HttpResponse {
    tracing::error!("Match pipeline failed: {}", error);

    let message = match error {
        MatchError::Configuration(_) => "Server configuration error",
        MatchError::Credential(_) => {
            "AI provider API key was reported as compromised. Revoke it and configure a new one."
        }
        MatchError::Permission(_) => {
            "AI provider API key does not have permission. Check that the key is valid and the API is enabled."
        }
        MatchError::Parse(_) => "AI returned an unreadable response. Please try again.",
        MatchError::Exhausted { .. } => {
            "Failed to process request with AI. Please try again later."
        }
    };

    HttpResponse::InternalServerError().json(ErrorResponse {
        error: message.to_string(),
        details: expose_details.then(|| error.to_string()),
        status_code: 500,
    })
}

/// Map a Supabase failure onto the public error contract
pub(crate) fn store_error_response(error: &SupabaseError, expose_details: bool) -> HttpResponse {
    let details = expose_details.then(|| error.to_string());

    match error {
        SupabaseError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Organization not found".to_string(),
            details,
            status_code: 404,
        }),
        SupabaseError::NotConfigured => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Server configuration error".to_string(),
            details,
            status_code: 500,
        }),
        _ => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Directory request failed".to_string(),
            details,
            status_code: 500,
        }),
    }
}
