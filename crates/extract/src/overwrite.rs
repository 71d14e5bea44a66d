//! Overwrite policy for recovered artifacts.
//!
//! Models regress: a later step can emit a stripped-down rewrite of a
//! file an earlier step already finished. The policy refuses shrinking
//! rewrites of source/markdown, guards a few protected documents, and
//! never lets placeholder content replace finished content.

use crate::SkipReason;
use regex::Regex;
use std::sync::OnceLock;

/// Documents that accumulate across many steps and must not be
/// casually replaced.
pub const PROTECTED_NAMES: &[&str] = &["paper.md", "README.md", "glossary.md"];

/// Substring markers of unfinished content.
const PLACEHOLDER_MARKERS: &[&str] = &["TODO", "TBD", "FIXME", "NotImplementedError", "[Insert"];

/// Extensions subject to the shrinking-rewrite rule.
const SOURCE_OR_MARKDOWN: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "rs", "go", "rb", "java", "c", "cpp", "h", "css", "html",
    "sh", "md", "markdown",
];

/// The verdict for one prospective write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteDecision {
    Write,
    Skip(SkipReason),
}

fn stub_body_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| match Regex::new(r"(?m)^\s*(pass|\.\.\.)\s*$") {
        Ok(re) => re,
        Err(_) => unreachable!("invalid literal regex"),
    })
}

/// True when content carries placeholder markers or stub bodies.
pub fn has_placeholder_markers(content: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|m| content.contains(m))
        || stub_body_re().is_match(content)
}

/// Decide whether `new` may replace `existing` at the given file name.
///
/// Rules, in order:
/// 1. no existing file → write
/// 2. new ≤ 50 % of existing size, source/markdown extension → skip
/// 3. protected name, existing is clean, new not > 20 % larger → skip
/// 4. new has placeholders, existing does not → skip
/// 5. otherwise → write
pub fn decide(file_name: &str, existing: Option<&str>, new: &str) -> OverwriteDecision {
    let existing = match existing {
        Some(existing) => existing,
        None => return OverwriteDecision::Write,
    };

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if SOURCE_OR_MARKDOWN.contains(&ext.as_str()) && new.len() * 2 <= existing.len() {
        return OverwriteDecision::Skip(SkipReason::SmallerRewrite);
    }

    if PROTECTED_NAMES.contains(&file_name)
        && !has_placeholder_markers(existing)
        && new.len() * 10 <= existing.len() * 12
    {
        return OverwriteDecision::Skip(SkipReason::ProtectedFile);
    }

    if has_placeholder_markers(new) && !has_placeholder_markers(existing) {
        return OverwriteDecision::Skip(SkipReason::PlaceholderContent);
    }

    OverwriteDecision::Write
}

#[cfg(test)]
#[path = "overwrite_tests.rs"]
mod tests;
