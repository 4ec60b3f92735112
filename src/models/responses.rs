use serde::{Deserialize, Serialize};

use crate::models::domain::{InterestProfile, Organization, ScoredOrganization};

/// Error response
///
/// `details` carries the underlying error text and is only populated
/// when the server is configured to expose it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub status_code: u16,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One affiliation group in the directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliationSection {
    pub affiliation: String,
    pub title: String,
    pub organizations: Vec<Organization>,
}

/// Directory listing grouped by college affiliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub sections: Vec<AffiliationSection>,
    pub total: usize,
}

/// Response for the organization matching endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMatchesResponse {
    pub matches: Vec<ScoredOrganization>,
    pub total_candidates: usize,
    pub profile: InterestProfile,
}
