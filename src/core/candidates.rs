use std::collections::HashSet;

/// Model identifiers tried when discovery returns nothing, newest first.
///
/// Google retires Gemini versions on short notice, so the static list
/// spans several generations. Discovery results take precedence; this
/// list is the safety net.
pub const PREFERRED_MODELS: &[&str] = &[
    "gemini-1.5-flash-latest",
    "gemini-1.5-flash-002",
    "gemini-1.5-flash-001",
    "gemini-1.5-flash",
    "gemini-1.5-pro-latest",
    "gemini-1.5-pro-002",
    "gemini-1.5-pro-001",
    "gemini-1.5-pro",
    "gemini-1.0-pro-latest",
    "gemini-1.0-pro-001",
    "gemini-1.0-pro",
    "gemini-pro-latest",
    "gemini-pro",
];

/// Merge discovered model ids with the static preference list.
///
/// Discovered models come first so a live listing wins over stale
/// hard-coded ids. Duplicates keep their first position. The result is
/// never empty as long as `preferred` is not.
pub fn merge_candidates(discovered: &[String], preferred: &[&str]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<String> = Vec::with_capacity(discovered.len() + preferred.len());

    for model in discovered {
        if seen.insert(model.as_str()) {
            merged.push(model.clone());
        }
    }

    for model in preferred {
        if seen.insert(model) {
            merged.push((*model).to_string());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_models_come_first() {
        let discovered = vec!["m1".to_string(), "m2".to_string()];
        let merged = merge_candidates(&discovered, &["m2", "m3"]);
        assert_eq!(merged, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_empty_discovery_falls_back_to_preferred() {
        let merged = merge_candidates(&[], PREFERRED_MODELS);
        assert_eq!(merged.len(), PREFERRED_MODELS.len());
        assert_eq!(merged[0], "gemini-1.5-flash-latest");
    }

    #[test]
    fn test_duplicates_within_discovery_are_dropped() {
        let discovered = vec!["m1".to_string(), "m1".to_string(), "m2".to_string()];
        let merged = merge_candidates(&discovered, &[]);
        assert_eq!(merged, vec!["m1", "m2"]);
    }

    #[test]
    fn test_merge_never_empty_with_static_list() {
        let merged = merge_candidates(&[], PREFERRED_MODELS);
        assert!(!merged.is_empty());
    }
}
