//! Trailing-prose stripper.
//!
//! Models routinely append narration after the code ("This implements
//! the API…", "Let me know if…") and stray closing fences. Those lines
//! are peeled off the end of an artifact body before it is written.

/// Sentence openers that mark a line as narration, not code.
const PROSE_PREFIXES: &[&str] = &[
    "this implements",
    "this code",
    "this file",
    "this function",
    "this module",
    "let me know",
    "note:",
    "here's",
    "here is",
    "hope this",
    "feel free",
    "in summary",
    "i have",
    "i've",
];

/// Strip trailing prose lines from an artifact body.
///
/// Markdown targets keep their bullets (bullets are content there);
/// code targets also drop trailing bullet lines.
pub fn strip_trailing_prose(content: &str, is_markdown: bool) -> String {
    let mut lines: Vec<&str> = content.lines().collect();
    loop {
        let last = match lines.last() {
            Some(last) => last.trim(),
            None => break,
        };
        let is_prose = last.is_empty()
            || last == "```"
            || PROSE_PREFIXES
                .iter()
                .any(|p| last.to_lowercase().starts_with(p))
            || (!is_markdown && (last.starts_with("- ") || last.starts_with("* ")));
        if is_prose {
            lines.pop();
        } else {
            break;
        }
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "prose_tests.rs"]
mod tests;
