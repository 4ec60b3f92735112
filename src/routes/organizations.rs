use actix_web::{web, HttpResponse, Responder};
use std::collections::BTreeMap;
use validator::Validate;

use crate::core::taxonomy::DEFAULT_CATEGORY;
use crate::models::responses::AffiliationSection;
use crate::models::{
    ActivationRequest, DirectoryResponse, ErrorResponse, NewOrganizationRequest,
    NewOrganizationRow, Organization,
};
use crate::routes::matches::{store_error_response, AppState};
use crate::routes::JsonError;

/// Configure organization directory routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/organizations")
            .route(web::get().to(list_directory))
            .route(web::post().to(add_organization)),
    )
    .route("/organizations/{id}", web::delete().to(delete_organization))
    .route(
        "/organizations/{id}/activation",
        web::post().to(send_activation),
    );
}

/// Section heading shown above each affiliation group
fn affiliation_title(code: &str) -> &str {
    match code {
        "COS" => "College of Science (COS)",
        "COE" => "College of Engineering (COE)",
        "CIT" => "College of Industrial Technology (CIT)",
        "CAFA" => "College of Architecture and Fine Arts (CAFA)",
        "CLA" => "College of Liberal Arts (CLA)",
        "CIE" => "College of Industrial Education (CIE)",
        "NON_COLLEGE" => "Non-College Based Organizations",
        "RELIGIOUS" => "Religious Organizations",
        other => other,
    }
}

/// Trimmed optional form field, empty collapsing to None
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Directory listing grouped by affiliation
///
/// GET /api/organizations
async fn list_directory(state: web::Data<AppState>) -> impl Responder {
    let organizations = match state.supabase.list_organizations().await {
        Ok(orgs) => orgs,
        Err(e) => {
            tracing::error!("Failed to fetch directory: {}", e);
            return store_error_response(&e, state.expose_error_details);
        }
    };

    let total = organizations.len();

    // Group by affiliation code; rows arrive name-sorted and stay that way.
    // Rows without an affiliation belong to the non-college section.
    let mut grouped: BTreeMap<String, Vec<Organization>> = BTreeMap::new();
    for org in organizations {
        let key = org
            .affiliation
            .clone()
            .unwrap_or_else(|| "NON_COLLEGE".to_string());
        grouped.entry(key).or_default().push(org);
    }

    let sections: Vec<AffiliationSection> = grouped
        .into_iter()
        .map(|(affiliation, organizations)| AffiliationSection {
            title: affiliation_title(&affiliation).to_string(),
            affiliation,
            organizations,
        })
        .collect();

    HttpResponse::Ok().json(DirectoryResponse { sections, total })
}

/// Register a new organization
///
/// POST /api/organizations
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "affiliation": "COS",
///   "category": "Academic/Research",
///   "official_email": "org@tup.edu.ph"
/// }
/// ```
async fn add_organization(
    state: web::Data<AppState>,
    req: web::Json<NewOrganizationRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for new organization: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            details: Some(errors.to_string()),
            status_code: 400,
        });
    }

    let mut categories = req.categories();
    if categories.is_empty() {
        categories.push(DEFAULT_CATEGORY.to_string());
    }

    let row = NewOrganizationRow {
        name: req.name.trim().to_string(),
        affiliation: req.affiliation.trim().to_string(),
        abbreviation: clean(&req.abbreviation),
        categories,
        email: clean(&req.official_email),
        description: clean(&req.description),
        url: clean(&req.url),
        logo: clean(&req.logo),
        is_active: false,
        account_status: "No Account".to_string(),
    };

    match state.supabase.insert_organization(&row).await {
        Ok(org) => {
            tracing::info!("Registered organization {} ({})", org.name, org.id);
            HttpResponse::Created().json(org)
        }
        Err(e) => {
            tracing::error!("Failed to insert organization: {}", e);
            store_error_response(&e, state.expose_error_details)
        }
    }
}

/// Remove an organization from the directory
///
/// DELETE /api/organizations/{id}
async fn delete_organization(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    match state.supabase.delete_organization(&id).await {
        Ok(()) => {
            tracing::info!("Deleted organization {}", id);
            HttpResponse::Ok().json(serde_json::json!({ "deleted": id }))
        }
        Err(e) => {
            tracing::error!("Failed to delete organization {}: {}", id, e);
            store_error_response(&e, state.expose_error_details)
        }
    }
}

/// Send an account activation email to an organization
///
/// POST /api/organizations/{id}/activation
///
/// Optional request body:
/// ```json
/// {
///   "redirect_url": "string"
/// }
/// ```
async fn send_activation(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let id = path.into_inner();

    // The body is optional, but a present one has to be valid JSON
    let request: Option<ActivationRequest> = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice(&body) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::info!("Invalid activation body for {}: {}", id, e);
                return HttpResponse::BadRequest().json(JsonError {
                    error: "invalid_json".to_string(),
                    message: format!("Invalid JSON: {}", e),
                    status_code: 400,
                });
            }
        }
    };

    let organization = match state.supabase.get_organization(&id).await {
        Ok(org) => org,
        Err(e) => {
            tracing::error!("Failed to look up organization {}: {}", id, e);
            return store_error_response(&e, state.expose_error_details);
        }
    };

    let email = match clean(&organization.email) {
        Some(email) => email,
        None => {
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "Organization has no email address on file".to_string(),
                details: None,
                status_code: 409,
            });
        }
    };

    let redirect = request
        .and_then(|r| r.redirect_url)
        .or_else(|| state.activation_redirect.clone());

    match state
        .supabase
        .send_activation_email(&email, redirect.as_deref())
        .await
    {
        Ok(()) => {
            tracing::info!("Activation email sent for organization {}", id);
            HttpResponse::Ok().json(serde_json::json!({
                "sent": true,
                "email": email,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to send activation email for {}: {}", id, e);
            store_error_response(&e, state.expose_error_details)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affiliation_titles() {
        assert_eq!(affiliation_title("COS"), "College of Science (COS)");
        assert_eq!(affiliation_title("RELIGIOUS"), "Religious Organizations");
        assert_eq!(
            affiliation_title("NON_COLLEGE"),
            "Non-College Based Organizations"
        );
        assert_eq!(affiliation_title("WEIRD"), "WEIRD");
    }

    #[test]
    fn test_clean_collapses_blank_fields() {
        assert_eq!(clean(&Some("  TUP  ".to_string())), Some("TUP".to_string()));
        assert_eq!(clean(&Some("   ".to_string())), None);
        assert_eq!(clean(&None), None);
    }
}
