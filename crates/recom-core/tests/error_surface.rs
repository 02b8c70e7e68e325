use recom_core::errors::{ErrorInfo, RecomError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("district", 3)
        .with_context("reason", "example")
}

#[test]
fn oracle_error_surface() {
    let err = RecomError::Oracle(sample_info("no-balanced-cut", "split failed"));
    assert_eq!(err.code(), "no-balanced-cut");
    assert!(err.is_oracle_failure());
    assert_eq!(err.info().context.get("district").map(String::as_str), Some("3"));
}

#[test]
fn config_error_surface() {
    let err = RecomError::Config(sample_info("zero-districts", "k must be positive"));
    assert_eq!(err.code(), "zero-districts");
    assert!(!err.is_oracle_failure());
}

#[test]
fn display_includes_context_and_hint() {
    let err = RecomError::Chain(
        ErrorInfo::new("proposal-budget-exhausted", "no valid proposal")
            .with_context("step", 7)
            .with_hint("raise max_redraws_per_step"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("chain error: no valid proposal"));
    assert!(rendered.contains("step=7"));
    assert!(rendered.contains("hint: raise max_redraws_per_step"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = RecomError::Graph(ErrorInfo::new("self-loop", "edge joins a unit to itself"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Graph");
    assert_eq!(json["detail"]["code"], "self-loop");
    let restored: RecomError = serde_json::from_value(json).unwrap();
    assert_eq!(restored, err);
}
