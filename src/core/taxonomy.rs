/// Canonical category labels an interest classification may carry.
///
/// Order matters: it is the order categories are presented to the model,
/// and the first label doubles as the default for organizations stored
/// without any category.
pub const CATEGORIES: &[&str] = &[
    "Academic/Research",
    "Technology/IT/Gaming",
    "Engineering/Built Env.",
    "Arts/Design/Media",
    "Leadership/Governance",
    "Service/Welfare/Outreach",
    "Entrepreneurship/Finance",
    "Industrial/Applied Skills",
    "Social Justice/Advocacy",
    "Culture/Religion",
];

/// College affiliation codes a classification may carry.
pub const AFFILIATIONS: &[&str] = &["COS", "COE", "CIT", "CAFA", "CLA", "CIE", "NONE"];

/// Affiliation used when the model returns nothing usable.
pub const NO_AFFILIATION: &str = "NONE";

/// Category applied to organizations stored without one.
pub const DEFAULT_CATEGORY: &str = "Academic/Research";

/// The fixed set of category labels used to filter AI output.
///
/// The label list is configurable (deployments have shipped 10- and
/// 15-label sets), but membership checks and filtering behave the same
/// for any list: values outside the set are dropped, never rejected.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<String>,
}

impl Taxonomy {
    /// The canonical 10-label taxonomy.
    pub fn canonical() -> Self {
        Self {
            categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Build a taxonomy from configured labels, falling back to the
    /// canonical set when the list is empty.
    pub fn from_labels(labels: Vec<String>) -> Self {
        let categories: Vec<String> = labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if categories.is_empty() {
            Self::canonical()
        } else {
            Self { categories }
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn contains_category(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c == label)
    }

    /// Keep only labels that belong to the taxonomy, preserving order.
    pub fn filter_categories<I>(&self, raw: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        raw.into_iter()
            .filter(|c| self.contains_category(c))
            .collect()
    }

    /// Numbered list of categories for the instruction prompt.
    pub fn prompt_list(&self) -> String {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Check whether a code is a known affiliation.
#[inline]
pub fn is_affiliation(code: &str) -> bool {
    AFFILIATIONS.contains(&code)
}

/// Normalize a model-provided affiliation: unknown values become `NONE`.
pub fn validate_affiliation(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_affiliation(trimmed) {
        trimmed.to_string()
    } else {
        NO_AFFILIATION.to_string()
    }
}
