use super::*;

fn write(project: &Path, rel: &str, content: &str, index: &mut FileIndex) {
    let full = project.join(rel);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(&full, content).unwrap();
    index.record(rel, content.len() as u64);
}

#[test]
fn shadow_files_are_swept() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = FileIndex::default();
    // a shadow file that slipped in through an earlier schema
    write(dir.path(), "backend/sqlalchemy.py", &"x = 1\n".repeat(40), &mut index);
    write(
        dir.path(),
        "backend/api.py",
        &"def handler():\n    return 1\n".repeat(10),
        &mut index,
    );

    let (summary, _) =
        consolidate(dir.path(), &mut index, "2025-01-01T00:00:00Z".to_string()).unwrap();

    assert_eq!(summary.removed, vec!["backend/sqlalchemy.py"]);
    assert!(!dir.path().join("backend/sqlalchemy.py").exists());
    assert!(dir.path().join("backend/api.py").exists());
    assert!(!index.contains("backend/sqlalchemy.py"));
}

#[test]
fn roleless_stubs_are_dropped_but_roled_ones_stay() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = FileIndex::default();
    write(dir.path(), "scratch.py", "x=1\n", &mut index);
    write(dir.path(), "main.py", "print(1)\n", &mut index);
    index.set_role("main.py", "entrypoint");

    let (summary, _) =
        consolidate(dir.path(), &mut index, "2025-01-01T00:00:00Z".to_string()).unwrap();

    assert_eq!(summary.removed, vec!["scratch.py"]);
    assert!(dir.path().join("main.py").exists());
    assert!(index.contains("main.py"));
}

#[test]
fn stub_rule_only_applies_to_source_and_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = FileIndex::default();
    write(dir.path(), "data.json", "{\"a\":1}", &mut index);

    let (summary, _) =
        consolidate(dir.path(), &mut index, "2025-01-01T00:00:00Z".to_string()).unwrap();

    assert!(summary.removed.is_empty());
    assert!(dir.path().join("data.json").exists());
}

#[test]
fn review_report_separates_clean_and_broken() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = FileIndex::default();
    write(
        dir.path(),
        "good.py",
        &"def ok():\n    return 1\n".repeat(10),
        &mut index,
    );
    write(
        dir.path(),
        "bad.py",
        &format!("def broken(\n{}", "x = 1\n".repeat(20)),
        &mut index,
    );

    let (summary, report) =
        consolidate(dir.path(), &mut index, "2025-01-01T00:00:00Z".to_string()).unwrap();

    assert_eq!(summary.clean_files, vec!["good.py"]);
    assert_eq!(summary.files_with_issues, vec!["bad.py"]);
    assert_eq!(report.total_errors, 1);
}

#[test]
fn placeholder_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = FileIndex::default();
    write(
        dir.path(),
        "draft.py",
        &format!("# TODO finish this module\n{}", "x = 1\n".repeat(20)),
        &mut index,
    );
    let (summary, _) =
        consolidate(dir.path(), &mut index, "2025-01-01T00:00:00Z".to_string()).unwrap();
    assert_eq!(summary.placeholder_files, vec!["draft.py"]);
}
