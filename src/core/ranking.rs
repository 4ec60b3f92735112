use crate::core::taxonomy::NO_AFFILIATION;
use crate::models::domain::{InterestProfile, Organization, RankingWeights, ScoredOrganization};

/// Result of ranking organizations against an interest profile
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<ScoredOrganization>,
    pub total_candidates: usize,
}

/// Organization ranking orchestrator
///
/// # Ranking Stages
/// 1. Category overlap with the profile
/// 2. Affiliation agreement
/// 3. Keyword hits minus negative keyword hits
/// 4. Weighted combination, threshold filter, sort and limit
#[derive(Debug, Clone)]
pub struct OrgMatcher {
    weights: RankingWeights,
}

impl OrgMatcher {
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: RankingWeights::default(),
        }
    }

    /// Rank organizations against a classified interest profile
    ///
    /// # Arguments
    /// * `profile` - The validated classification result
    /// * `organizations` - All candidate organizations from the directory
    /// * `limit` - Maximum number of matches to return
    ///
    /// # Returns
    /// RankResult containing scored and ranked organizations
    pub fn rank(
        &self,
        profile: &InterestProfile,
        organizations: Vec<Organization>,
        limit: usize,
    ) -> RankResult {
        let total_candidates = organizations.len();

        let mut matches: Vec<ScoredOrganization> = organizations
            .into_iter()
            .filter_map(|org| {
                let (score, matched_categories) =
                    score_organization(&org, profile, &self.weights);

                // Only include organizations with a minimum score
                if score >= 5.0 {
                    Some(ScoredOrganization {
                        id: org.id,
                        name: org.name,
                        abbreviation: org.abbreviation,
                        affiliation: org.affiliation,
                        categories: org.categories,
                        description: org.description,
                        logo: org.logo,
                        match_percentage: score.round() as u8,
                        matched_categories,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Sort by percentage (descending) and then by name (ascending)
        matches.sort_by(|a, b| {
            b.match_percentage
                .cmp(&a.match_percentage)
                .then_with(|| a.name.cmp(&b.name))
        });

        // Limit results
        matches.truncate(limit);

        RankResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for OrgMatcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Calculate a match score (0-100) for an organization against a profile
///
/// Scoring formula:
/// score = (
///     category_score * 0.60 +      # Fraction of profile categories covered
///     affiliation_score * 0.20 +   # Same college as the student
///     keyword_score * 0.20         # Keyword hits minus negative hits
/// )
pub fn score_organization(
    org: &Organization,
    profile: &InterestProfile,
    weights: &RankingWeights,
) -> (f64, Vec<String>) {
    // Stage 1: Category overlap
    let matched_categories: Vec<String> = org
        .categories
        .iter()
        .filter(|c| profile.matched_categories.contains(c))
        .cloned()
        .collect();

    let category_score = if profile.matched_categories.is_empty() {
        0.0
    } else {
        matched_categories.len() as f64 / profile.matched_categories.len() as f64
    };

    // Stage 2: Affiliation agreement
    let affiliation_score =
        calculate_affiliation_score(org.affiliation_code(), profile.affiliation());

    // Stage 3: Keyword hits over the searchable text
    let haystack = search_text(org);
    let keyword_score = calculate_keyword_score(&haystack, profile.keywords(), profile.negatives());

    // Weighted combination
    let total_score = (category_score * weights.categories
        + affiliation_score * weights.affiliation
        + keyword_score * weights.keywords)
        * 100.0;

    (total_score.min(100.0).max(0.0), matched_categories)
}

/// Calculate affiliation score (0-1)
/// Same college counts; a NONE affiliation never earns the bonus
#[inline]
fn calculate_affiliation_score(org_affiliation: &str, user_affiliation: &str) -> f64 {
    if user_affiliation != NO_AFFILIATION && org_affiliation == user_affiliation {
        1.0
    } else {
        0.0
    }
}

/// Lowercased text the keyword scan runs over
fn search_text(org: &Organization) -> String {
    let mut text = org.name.to_lowercase();
    if let Some(abbreviation) = &org.abbreviation {
        text.push(' ');
        text.push_str(&abbreviation.to_lowercase());
    }
    if let Some(description) = &org.description {
        text.push(' ');
        text.push_str(&description.to_lowercase());
    }
    text
}

/// Calculate keyword score (-1 to 1)
/// Fraction of keywords found minus fraction of negative keywords found
#[inline]
fn calculate_keyword_score(haystack: &str, keywords: &[String], negatives: &[String]) -> f64 {
    let hit_fraction = |words: &[String]| -> f64 {
        if words.is_empty() {
            return 0.0;
        }
        let hits = words
            .iter()
            .filter(|w| haystack.contains(&w.to_lowercase()))
            .count();
        hits as f64 / words.len() as f64
    };

    hit_fraction(keywords) - hit_fraction(negatives)
}
