// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{InterestProfile, NewOrganizationRow, Organization, OutputShape, RankingWeights, ScoredOrganization};
pub use requests::{ActivationRequest, MatchRequest, NewOrganizationRequest, OrganizationMatchRequest};
pub use responses::{DirectoryResponse, ErrorResponse, HealthResponse, OrganizationMatchesResponse};
