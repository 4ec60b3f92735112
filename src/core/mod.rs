// Core pipeline exports
pub mod candidates;
pub mod extraction;
pub mod pipeline;
pub mod ranking;
pub mod taxonomy;

pub use candidates::{merge_candidates, PREFERRED_MODELS};
pub use extraction::{extract_profile, strip_code_fences, ExtractionError};
pub use pipeline::{MatchError, MatchPipeline};
pub use ranking::{score_organization, OrgMatcher, RankResult};
pub use taxonomy::{validate_affiliation, Taxonomy, AFFILIATIONS, CATEGORIES};
