use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::taxonomy::{validate_affiliation, Taxonomy, NO_AFFILIATION};
use crate::models::domain::{InterestProfile, OutputShape};

/// Errors raised while pulling a usable payload out of model text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no JSON {0} found in model response")]
    MissingJson(&'static str),
    #[error("model response contained invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Remove a Markdown code fence wrapper, if present.
///
/// Models frequently wrap JSON in ```` ```json ... ``` ```` despite
/// instructions not to. The info string on the opening fence line is
/// discarded along with the fences themselves.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest,
        };
    }

    text = text.trim_end();
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Locate the first balanced `open`..`close` region in `text`.
///
/// Only the chosen bracket pair is counted, and brackets inside JSON
/// string literals (including escaped quotes) are ignored, so chatty
/// prose around the payload does not break the scan.
fn find_json_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(&text[start..start + i + ch.len_utf8()]);
            }
        }
    }

    None
}

/// Look a field up under both its wire name and the camelCase variant
/// models tend to produce regardless of instructions.
fn field<'a>(object: &'a Map<String, Value>, names: [&'a str; 2]) -> Option<&'a Value> {
    names.iter().find_map(|name| object.get(*name))
}

/// Collect the string items of a JSON array, dropping everything else.
fn string_items(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Turn raw model output into a validated [`InterestProfile`].
///
/// The payload is located with a fence strip plus bracket scan, parsed,
/// then filtered against the taxonomy. Unknown categories are dropped
/// silently and an unknown affiliation falls back to `NONE`; only a
/// missing or unparseable payload is an error.
pub fn extract_profile(
    raw: &str,
    shape: OutputShape,
    taxonomy: &Taxonomy,
) -> Result<InterestProfile, ExtractionError> {
    let text = strip_code_fences(raw);

    match shape {
        OutputShape::Categories => {
            let slice =
                find_json_slice(text, '[', ']').ok_or(ExtractionError::MissingJson("array"))?;
            let items: Vec<Value> = serde_json::from_str(slice)?;
            let labels: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();

            Ok(InterestProfile {
                matched_categories: taxonomy.filter_categories(labels),
                user_affiliation: None,
                specific_keywords: None,
                negative_keywords: None,
            })
        }
        OutputShape::Profile => {
            let slice =
                find_json_slice(text, '{', '}').ok_or(ExtractionError::MissingJson("object"))?;
            let object: Map<String, Value> = serde_json::from_str(slice)?;

            let categories = field(&object, ["matched_categories", "matchedCategories"])
                .map(string_items)
                .unwrap_or_default();
            let affiliation = field(&object, ["user_affiliation", "userAffiliation"])
                .and_then(Value::as_str)
                .map(validate_affiliation)
                .unwrap_or_else(|| NO_AFFILIATION.to_string());
            let keywords = field(&object, ["specific_keywords", "specificKeywords"])
                .map(string_items)
                .unwrap_or_default();
            let negatives = field(&object, ["negative_keywords", "negativeKeywords"])
                .map(string_items)
                .unwrap_or_default();

            Ok(InterestProfile {
                matched_categories: taxonomy.filter_categories(categories),
                user_affiliation: Some(affiliation),
                specific_keywords: Some(keywords),
                negative_keywords: Some(negatives),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::canonical()
    }

    #[test]
    fn test_strip_fences_with_language_tag() {
        let raw = "```json\n[\"Academic/Research\"]\n```";
        assert_eq!(strip_code_fences(raw), "[\"Academic/Research\"]");
    }

    #[test]
    fn test_strip_fences_without_language_tag() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fences_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn test_extract_array_from_fenced_response() {
        let raw = "```json\n[\"Academic/Research\", \"Arts/Design/Media\"]\n```";
        let profile = extract_profile(raw, OutputShape::Categories, &taxonomy()).unwrap();
        assert_eq!(
            profile.matched_categories,
            vec!["Academic/Research", "Arts/Design/Media"]
        );
        assert!(profile.user_affiliation.is_none());
    }

    #[test]
    fn test_extract_array_surrounded_by_prose() {
        let raw = "Sure! Here are the matches:\n[\"Technology/IT/Gaming\"]\nHope that helps.";
        let profile = extract_profile(raw, OutputShape::Categories, &taxonomy()).unwrap();
        assert_eq!(profile.matched_categories, vec!["Technology/IT/Gaming"]);
    }

    #[test]
    fn test_brackets_inside_strings_do_not_confuse_the_scan() {
        let raw = "[\"Academic/Research\", \"has ] bracket\", \"Culture/Religion\"]";
        let profile = extract_profile(raw, OutputShape::Categories, &taxonomy()).unwrap();
        assert_eq!(
            profile.matched_categories,
            vec!["Academic/Research", "Culture/Religion"]
        );
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let raw = "[\"Academic/Research\", \"quote \\\" then ] bracket\"]";
        let profile = extract_profile(raw, OutputShape::Categories, &taxonomy()).unwrap();
        assert_eq!(profile.matched_categories, vec!["Academic/Research"]);
    }

    #[test]
    fn test_unknown_categories_are_dropped_silently() {
        let raw = "[\"Academic/Research\", \"Sports\", 42, null]";
        let profile = extract_profile(raw, OutputShape::Categories, &taxonomy()).unwrap();
        assert_eq!(profile.matched_categories, vec!["Academic/Research"]);
    }

    #[test]
    fn test_missing_array_is_an_error() {
        let err = extract_profile("no json here", OutputShape::Categories, &taxonomy())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MissingJson("array")));
    }

    #[test]
    fn test_unterminated_array_is_an_error() {
        let err = extract_profile("[\"Academic/Research\"", OutputShape::Categories, &taxonomy())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MissingJson("array")));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = extract_profile("[not json]", OutputShape::Categories, &taxonomy()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
    }

    #[test]
    fn test_extract_full_profile_object() {
        let raw = concat!(
            "```json\n",
            "{\"matched_categories\": [\"Technology/IT/Gaming\"], ",
            "\"user_affiliation\": \"COS\", ",
            "\"specific_keywords\": [\"robotics\", \"ai\"], ",
            "\"negative_keywords\": [\"sports\"]}\n",
            "```"
        );
        let profile = extract_profile(raw, OutputShape::Profile, &taxonomy()).unwrap();
        assert_eq!(profile.matched_categories, vec!["Technology/IT/Gaming"]);
        assert_eq!(profile.user_affiliation.as_deref(), Some("COS"));
        assert_eq!(
            profile.specific_keywords,
            Some(vec!["robotics".to_string(), "ai".to_string()])
        );
        assert_eq!(profile.negative_keywords, Some(vec!["sports".to_string()]));
    }

    #[test]
    fn test_profile_defaults_for_missing_fields() {
        let profile = extract_profile("{}", OutputShape::Profile, &taxonomy()).unwrap();
        assert!(profile.matched_categories.is_empty());
        assert_eq!(profile.user_affiliation.as_deref(), Some("NONE"));
        assert_eq!(profile.specific_keywords, Some(vec![]));
        assert_eq!(profile.negative_keywords, Some(vec![]));
    }

    #[test]
    fn test_profile_unknown_affiliation_becomes_none() {
        let raw = "{\"matched_categories\": [], \"user_affiliation\": \"Harvard\"}";
        let profile = extract_profile(raw, OutputShape::Profile, &taxonomy()).unwrap();
        assert_eq!(profile.user_affiliation.as_deref(), Some("NONE"));
    }

    #[test]
    fn test_profile_accepts_camel_case_keys() {
        let raw = "{\"matchedCategories\": [\"Culture/Religion\"], \"userAffiliation\": \"CLA\"}";
        let profile = extract_profile(raw, OutputShape::Profile, &taxonomy()).unwrap();
        assert_eq!(profile.matched_categories, vec!["Culture/Religion"]);
        assert_eq!(profile.user_affiliation.as_deref(), Some("CLA"));
    }

    #[test]
    fn test_profile_non_array_keywords_become_empty() {
        let raw = "{\"specific_keywords\": \"robotics\"}";
        let profile = extract_profile(raw, OutputShape::Profile, &taxonomy()).unwrap();
        assert_eq!(profile.specific_keywords, Some(vec![]));
    }

    #[test]
    fn test_nested_object_inside_profile() {
        let raw = "Result: {\"matched_categories\": [\"Academic/Research\"], \"extra\": {\"a\": \"}\"}} trailing";
        let profile = extract_profile(raw, OutputShape::Profile, &taxonomy()).unwrap();
        assert_eq!(profile.matched_categories, vec!["Academic/Research"]);
    }
}
