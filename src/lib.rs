//! TUPConnect Match - interest classification service for the TUPConnect
//! student organization directory
//!
//! This library turns free-form interest text into a validated category
//! profile through a Gemini model fallback pipeline, and ranks directory
//! organizations against that profile.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{merge_candidates, MatchError, MatchPipeline, OrgMatcher, Taxonomy};
pub use crate::models::{InterestProfile, MatchRequest, Organization, OutputShape, ScoredOrganization};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let taxonomy = Taxonomy::canonical();
        assert!(taxonomy.contains_category("Academic/Research"));

        let merged = merge_candidates(&[], crate::core::PREFERRED_MODELS);
        assert!(!merged.is_empty());
    }
}
