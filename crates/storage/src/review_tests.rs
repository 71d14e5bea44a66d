use super::*;

#[test]
fn new_tallies_errors_and_warnings() {
    let report = ReviewReport::new(
        "2025-01-01T00:00:00Z".to_string(),
        vec![
            FileReview {
                file: "main.py".to_string(),
                errors: vec!["syntax error".to_string()],
                warnings: vec![],
            },
            FileReview {
                file: "api.py".to_string(),
                errors: vec![],
                warnings: vec!["unused import".to_string(), "long line".to_string()],
            },
        ],
    );
    assert_eq!(report.total_errors, 1);
    assert_eq!(report.total_warnings, 2);
    assert!(report.summary.contains("2 files reviewed"));
}

#[test]
fn save_writes_json_and_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join(".state");
    let report = ReviewReport::new(
        "2025-01-01T00:00:00Z".to_string(),
        vec![FileReview {
            file: "main.py".to_string(),
            errors: vec![],
            warnings: vec![],
        }],
    );
    report.save(&state_dir).unwrap();

    let json = std::fs::read_to_string(state_dir.join("code_review.json")).unwrap();
    let parsed: ReviewReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let doc = std::fs::read_to_string(state_dir.join("CODE_DOCUMENTATION.md")).unwrap();
    assert!(doc.starts_with("# Code Documentation"));
    assert!(doc.contains("## main.py"));
    assert!(doc.contains("- clean"));
}
