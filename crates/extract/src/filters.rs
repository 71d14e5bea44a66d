//! Path filters: stdlib-shadow names, junk files, and path escapes.
//!
//! Local models love re-implementing the standard library. A file named
//! `asyncio.py` or `base64.py` inside the project shadows the real
//! module and breaks every later import, so those names are refused
//! outright, even when the model asks for them by explicit filename.

use crate::SkipReason;

/// Base names (without extension) that shadow standard-library or
/// ubiquitous package modules.
const SHADOW_NAMES: &[&str] = &[
    // python stdlib
    "asyncio", "base64", "collections", "contextlib", "dataclasses", "datetime", "enum",
    "functools", "hashlib", "io", "itertools", "json", "logging", "os", "pathlib", "re",
    "secrets", "sqlite3", "string", "subprocess", "sys", "typing", "unittest", "uuid",
    // packages the generated code imports
    "cryptography", "dotenv", "flask", "jose", "jwt", "numpy", "pandas", "passlib", "pydantic",
    "pytest", "requests", "sqlalchemy",
    // js ecosystem equivalents
    "react", "express", "axios",
];

/// Names that are re-implementations of language features rather than
/// project code.
const JUNK_FILES: &[&str] = &[
    "generator_context_manager",
    "run_until_complete",
    "wait_for_task",
    "create_task",
    "event_loop",
    "async_context_manager",
    "run_in_executor",
    "gather_tasks",
];

/// Validate a relative artifact path against all filters.
pub fn check_path(path: &str) -> Result<(), SkipReason> {
    if path.is_empty() {
        return Err(SkipReason::NoTarget);
    }
    if path.contains("..") {
        return Err(SkipReason::PathEscape);
    }
    if path.starts_with('/') || path.starts_with('\\') || has_drive_prefix(path) {
        return Err(SkipReason::PathEscape);
    }

    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
        .to_lowercase();

    if SHADOW_NAMES.contains(&stem.as_str()) {
        return Err(SkipReason::ShadowName);
    }
    if JUNK_FILES.contains(&stem.as_str()) {
        return Err(SkipReason::JunkFile);
    }
    Ok(())
}

/// True when a base name belongs to the shadow or junk sets. Used by
/// the finalizer's consolidation sweep.
pub fn is_shadow_or_junk(file_name: &str) -> bool {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
        .to_lowercase();
    SHADOW_NAMES.contains(&stem.as_str()) || JUNK_FILES.contains(&stem.as_str())
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod tests;
