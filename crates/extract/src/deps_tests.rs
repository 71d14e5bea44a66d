use super::*;

#[test]
fn stdlib_and_known_packages_are_not_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    let content = "import os\nimport json\nimport requests\nfrom fastapi import FastAPI\n";
    assert!(auditor.audit_file("main.py", content, dir.path()).is_empty());
}

#[test]
fn unknown_python_module_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    let content = "import helpers\nfrom helpers import thing\n";
    let missing = auditor.audit_file("main.py", content, dir.path());
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].module, "helpers");
    assert_eq!(missing[0].file, "main.py");
}

#[test]
fn local_module_presence_resolves_the_import() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("helpers.py"), "x = 1").unwrap();
    let mut auditor = DependencyAuditor::new();
    let missing = auditor.audit_file("main.py", "import helpers\n", dir.path());
    assert!(missing.is_empty());
}

#[test]
fn backend_subfolder_counts_as_local() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("backend")).unwrap();
    std::fs::write(dir.path().join("backend/models.py"), "x = 1").unwrap();
    let mut auditor = DependencyAuditor::new();
    assert!(auditor
        .audit_file("backend/api.py", "from models import User\n", dir.path())
        .is_empty());
}

#[test]
fn dotted_import_checks_top_level_package() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    assert!(auditor
        .audit_file("m.py", "from os.path import join\n", dir.path())
        .is_empty());
}

#[test]
fn relative_js_imports_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    let content = "import App from './App';\nimport helper from '../lib/helper';\n";
    assert!(auditor.audit_file("src/index.js", content, dir.path()).is_empty());
}

#[test]
fn unknown_js_package_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    let content = "import { chart } from 'chartomatic';\nconst x = require('express');\n";
    let missing = auditor.audit_file("src/app.js", content, dir.path());
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].module, "chartomatic");
}

#[test]
fn scoped_js_packages_keep_their_scope() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    let missing = auditor.audit_file(
        "src/app.js",
        "import x from '@acme/widgets/button';\n",
        dir.path(),
    );
    assert_eq!(missing[0].module, "@acme/widgets");
}

#[test]
fn mark_verified_suppresses_future_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    assert_eq!(
        auditor
            .audit_file("a.py", "import helpers\n", dir.path())
            .len(),
        1
    );
    auditor.mark_verified("helpers");
    assert!(auditor
        .audit_file("b.py", "import helpers\n", dir.path())
        .is_empty());
}

#[test]
fn non_source_files_are_not_audited() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = DependencyAuditor::new();
    assert!(auditor
        .audit_file("notes.md", "import nothing\n", dir.path())
        .is_empty());
}
