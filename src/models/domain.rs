use serde::{Deserialize, Serialize};

/// Student organization row as stored in Supabase
///
/// Only `id` and `name` are guaranteed; every other column is nullable
/// and defaults so older rows keep deserializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Organization {
    /// Helper to get the affiliation code, defaulting to NONE
    pub fn affiliation_code(&self) -> &str {
        self.affiliation.as_deref().unwrap_or("NONE")
    }
}

/// Insert payload for a newly registered organization
///
/// New rows always start inactive with no portal account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganizationRow {
    pub name: String,
    pub affiliation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub is_active: bool,
    pub account_status: String,
}

/// Payload shape the classifier is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    Categories,
    Profile,
}

impl Default for OutputShape {
    fn default() -> Self {
        OutputShape::Profile
    }
}

/// Validated result of classifying a student's interest text
///
/// In `Categories` shape only `matched_categories` is populated and the
/// optional fields are omitted from responses. In `Profile` shape every
/// field is present, with NONE / empty-list defaults where the model
/// left something out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestProfile {
    pub matched_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_keywords: Option<Vec<String>>,
}

impl InterestProfile {
    /// Helper to get the affiliation code, treating absent as NONE
    pub fn affiliation(&self) -> &str {
        self.user_affiliation.as_deref().unwrap_or("NONE")
    }

    /// Helper to get specific keywords, defaulting to empty
    pub fn keywords(&self) -> &[String] {
        self.specific_keywords.as_deref().unwrap_or(&[])
    }

    /// Helper to get negative keywords, defaulting to empty
    pub fn negatives(&self) -> &[String] {
        self.negative_keywords.as_deref().unwrap_or(&[])
    }
}

/// Organization scored against an interest profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredOrganization {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub match_percentage: u8,
    pub matched_categories: Vec<String>,
}

/// Ranking weights
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RankingWeights {
    pub categories: f64,
    pub affiliation: f64,
    pub keywords: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            categories: 0.60,
            affiliation: 0.20,
            keywords: 0.20,
        }
    }
}
