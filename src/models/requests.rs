use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to classify a student's interests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1))]
    pub student_interest: String,
}

/// Request to classify interests and rank organizations against them
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrganizationMatchRequest {
    #[validate(length(min = 1))]
    pub student_interest: String,
    pub limit: Option<u16>,
}

/// Category field on the admin form, which ships either a single string
/// or a list depending on the form control
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryField {
    One(String),
    Many(Vec<String>),
}

impl CategoryField {
    /// Normalize to a trimmed, non-empty list
    pub fn into_categories(self) -> Vec<String> {
        let raw = match self {
            CategoryField::One(value) => vec![value],
            CategoryField::Many(values) => values,
        };
        raw.into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Request to register a new organization
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrganizationRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub affiliation: String,
    pub abbreviation: Option<String>,
    #[validate(email)]
    pub official_email: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryField>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub logo: Option<String>,
}

impl NewOrganizationRequest {
    /// Normalized category list, empty when the form sent nothing
    pub fn categories(&self) -> Vec<String> {
        self.category
            .clone()
            .map(CategoryField::into_categories)
            .unwrap_or_default()
    }
}

/// Request to send an activation email to an organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub redirect_url: Option<String>,
}
