// Unit tests for the TUPConnect match service

use tupconnect_match::core::{
    candidates::{merge_candidates, PREFERRED_MODELS},
    extraction::{extract_profile, strip_code_fences},
    ranking::{score_organization, OrgMatcher},
    taxonomy::{validate_affiliation, Taxonomy},
};
use tupconnect_match::models::{
    InterestProfile, Organization, OutputShape, RankingWeights,
};
use tupconnect_match::services::gemini::{classify_failure, FailureKind};

fn canonical() -> Taxonomy {
    Taxonomy::canonical()
}

#[test]
fn test_merge_keeps_discovered_models_first() {
    let discovered = vec!["m1".to_string(), "m2".to_string()];
    let merged = merge_candidates(&discovered, &["m2", "m3"]);

    assert_eq!(merged, vec!["m1", "m2", "m3"]);
}

#[test]
fn test_merge_with_empty_discovery_uses_static_list() {
    let merged = merge_candidates(&[], PREFERRED_MODELS);

    assert_eq!(merged.len(), PREFERRED_MODELS.len());
    assert_eq!(merged[0], "gemini-1.5-flash-latest");
    assert_eq!(merged.last().map(String::as_str), Some("gemini-pro"));
}

#[test]
fn test_merge_never_returns_empty_candidates() {
    // Discovery can fail outright; the static list keeps the loop alive
    let merged = merge_candidates(&[], PREFERRED_MODELS);
    assert!(!merged.is_empty());
}

#[test]
fn test_static_model_list_has_no_duplicates() {
    let unique: std::collections::HashSet<&&str> = PREFERRED_MODELS.iter().collect();
    assert_eq!(unique.len(), PREFERRED_MODELS.len());
}

#[test]
fn test_strip_code_fences() {
    assert_eq!(
        strip_code_fences("```json\n[\"a\"]\n```"),
        "[\"a\"]"
    );
    assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    assert_eq!(strip_code_fences("  plain text  "), "plain text");
}

#[test]
fn test_extract_categories_from_fenced_response() {
    let raw = "```json\n[\"Academic/Research\", \"Arts/Design/Media\"]\n```";
    let profile = extract_profile(raw, OutputShape::Categories, &canonical()).unwrap();

    assert_eq!(
        profile.matched_categories,
        vec!["Academic/Research", "Arts/Design/Media"]
    );
}

#[test]
fn test_extract_survives_prose_and_brackets_in_strings() {
    let raw = "Here you go:\n[\"Technology/IT/Gaming\", \"label with ] inside\"]\nCheers!";
    let profile = extract_profile(raw, OutputShape::Categories, &canonical()).unwrap();

    assert_eq!(profile.matched_categories, vec!["Technology/IT/Gaming"]);
}

#[test]
fn test_unknown_categories_are_dropped_not_rejected() {
    let raw = "[\"Academic/Research\", \"Quidditch\", \"Culture/Religion\"]";
    let profile = extract_profile(raw, OutputShape::Categories, &canonical()).unwrap();

    assert_eq!(
        profile.matched_categories,
        vec!["Academic/Research", "Culture/Religion"]
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let raw = "```json\n{\"matched_categories\": [\"Academic/Research\"], \"user_affiliation\": \"COS\"}\n```";

    let first = extract_profile(raw, OutputShape::Profile, &canonical()).unwrap();
    let second = extract_profile(raw, OutputShape::Profile, &canonical()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_profile_shape_fills_defaults() {
    let profile = extract_profile("{}", OutputShape::Profile, &canonical()).unwrap();

    assert!(profile.matched_categories.is_empty());
    assert_eq!(profile.user_affiliation.as_deref(), Some("NONE"));
    assert_eq!(profile.specific_keywords, Some(vec![]));
    assert_eq!(profile.negative_keywords, Some(vec![]));
}

#[test]
fn test_categories_shape_omits_profile_fields_on_the_wire() {
    let raw = "[\"Academic/Research\"]";
    let profile = extract_profile(raw, OutputShape::Categories, &canonical()).unwrap();

    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("matched_categories").is_some());
    assert!(json.get("user_affiliation").is_none());
    assert!(json.get("specific_keywords").is_none());
}

#[test]
fn test_affiliation_validation() {
    assert_eq!(validate_affiliation("COE"), "COE");
    assert_eq!(validate_affiliation("Harvard"), "NONE");
    assert_eq!(validate_affiliation(""), "NONE");
}

#[test]
fn test_failure_classification_decision_table() {
    // Missing model: move on to the next candidate
    assert_eq!(
        classify_failure(Some(404), "whatever"),
        FailureKind::ModelUnavailable
    );
    assert_eq!(
        classify_failure(None, "model is not found for API version v1beta"),
        FailureKind::ModelUnavailable
    );

    // Revoked key: abort, nothing else can succeed
    assert_eq!(
        classify_failure(Some(403), "API key was reported as leaked"),
        FailureKind::CredentialRevoked
    );

    // Access problem: abort with remediation guidance
    assert_eq!(
        classify_failure(Some(403), "caller lacks IAM permission"),
        FailureKind::PermissionDenied
    );
    assert_eq!(
        classify_failure(None, "API key not valid"),
        FailureKind::PermissionDenied
    );

    // Everything else: log and keep trying
    assert_eq!(classify_failure(Some(500), "boom"), FailureKind::Transient);
    assert_eq!(classify_failure(Some(429), "quota"), FailureKind::Transient);
}

#[test]
fn test_model_missing_outranks_leaked_wording() {
    assert_eq!(
        classify_failure(Some(404), "leaked model not found"),
        FailureKind::ModelUnavailable
    );
}

#[test]
fn test_organization_deserializes_with_missing_columns() {
    let json = r#"{"id": "org-1", "name": "Robotics Guild"}"#;
    let org: Organization = serde_json::from_str(json).unwrap();

    assert_eq!(org.name, "Robotics Guild");
    assert!(org.categories.is_empty());
    assert!(!org.is_active);
    assert!(org.created_at.is_none());
}

#[test]
fn test_ranking_prefers_better_category_coverage() {
    let matcher = OrgMatcher::with_default_weights();

    let profile = InterestProfile {
        matched_categories: vec![
            "Technology/IT/Gaming".to_string(),
            "Academic/Research".to_string(),
        ],
        user_affiliation: Some("NONE".to_string()),
        specific_keywords: Some(vec![]),
        negative_keywords: Some(vec![]),
    };

    let both = Organization {
        id: "both".to_string(),
        name: "Computer Research Society".to_string(),
        affiliation: Some("COS".to_string()),
        abbreviation: None,
        categories: vec![
            "Technology/IT/Gaming".to_string(),
            "Academic/Research".to_string(),
        ],
        email: None,
        description: None,
        url: None,
        logo: None,
        is_active: true,
        account_status: None,
        created_at: None,
    };

    let mut one = both.clone();
    one.id = "one".to_string();
    one.name = "Gaming Guild".to_string();
    one.categories = vec!["Technology/IT/Gaming".to_string()];

    let result = matcher.rank(&profile, vec![one, both], 10);

    assert_eq!(result.matches.len(), 2);
    assert_eq!(result.matches[0].id, "both");
    assert!(result.matches[0].match_percentage > result.matches[1].match_percentage);
}

#[test]
fn test_score_is_bounded() {
    let profile = InterestProfile {
        matched_categories: vec!["Technology/IT/Gaming".to_string()],
        user_affiliation: Some("COS".to_string()),
        specific_keywords: Some(vec!["robots".to_string()]),
        negative_keywords: Some(vec![]),
    };

    let org = Organization {
        id: "1".to_string(),
        name: "Robots robots robots".to_string(),
        affiliation: Some("COS".to_string()),
        abbreviation: None,
        categories: vec!["Technology/IT/Gaming".to_string()],
        email: None,
        description: Some("robots".to_string()),
        url: None,
        logo: None,
        is_active: true,
        account_status: None,
        created_at: None,
    };

    let (score, _) = score_organization(&org, &profile, &RankingWeights::default());
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(score, 100.0);
}
