//! Artifact recovery from a raw model response.
//!
//! Strategies, tried per the response shape:
//! 1. responses without fences: comment-header split (`// path` / `# path`)
//! 2. fenced block with `filename="..."` on the opening line
//! 3. fenced block whose first body line is a comment naming a path
//! 4. fenced block routed by language tag and content keywords
//!
//! `[COMMAND]: …` lines anywhere in the response are collected for the
//! sandbox.

use crate::filters::check_path;
use crate::prose::strip_trailing_prose;
use crate::routing::route;
use crate::{Skip, SkipReason};
use regex::Regex;
use std::sync::OnceLock;

/// A recovered (path, content, language) triple. Paths are always
/// relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: String,
    pub content: String,
    pub language: String,
    /// True when the model named the path itself (header or filename
    /// attribute) rather than the routing table choosing one. Explicit
    /// artifacts get a declared role in the file index and are exempt
    /// from the finalizer's stub sweep.
    pub explicit: bool,
}

/// Everything recovered from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub artifacts: Vec<Artifact>,
    pub commands: Vec<String>,
    pub skips: Vec<Skip>,
}

struct FencedBlock {
    language: String,
    info: String,
    body: String,
}

// Patterns are literals; construction cannot fail.
fn literal_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => unreachable!("invalid literal regex"),
    }
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| literal_regex(r"^(?://|#)\s*([A-Za-z0-9_\-./\\]+\.[A-Za-z0-9]{1,4})\s*$"))
}

fn filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| literal_regex(r#"filename="([^"]+)""#))
}

fn first_line_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        literal_regex(r"^\s*(?://|#|/\*|<!--|--)\s*([A-Za-z0-9_\-./\\]+\.[A-Za-z0-9]{1,4})\b")
    })
}

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| literal_regex(r"(?m)^\s*\[COMMAND\]:\s*(.+)$"))
}

/// Recover artifacts and commands from a model response.
pub fn extract(response: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for cap in command_re().captures_iter(response) {
        if let Some(m) = cap.get(1) {
            extraction.commands.push(m.as_str().trim().to_string());
        }
    }

    let blocks = fenced_blocks(response);
    if blocks.is_empty() {
        extract_by_headers(response, &mut extraction);
    } else {
        for block in blocks {
            resolve_block(block, &mut extraction);
        }
    }

    extraction
}

/// Strategy 1: split a fence-less response on `// path` / `# path` lines.
fn extract_by_headers(response: &str, extraction: &mut Extraction) {
    let mut current: Option<(String, Vec<&str>)> = None;
    for line in response.lines() {
        if let Some(cap) = header_re().captures(line) {
            if let Some((path, lines)) = current.take() {
                push_artifact(extraction, path, lines.join("\n"), String::new(), true);
            }
            if let Some(m) = cap.get(1) {
                current = Some((normalize(m.as_str()), Vec::new()));
            }
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((path, lines)) = current.take() {
        push_artifact(extraction, path, lines.join("\n"), String::new(), true);
    }
}

/// Strategies 2–4 applied to one fenced block.
fn resolve_block(block: FencedBlock, extraction: &mut Extraction) {
    // 2: explicit filename attribute
    if let Some(cap) = filename_re().captures(&block.info) {
        if let Some(m) = cap.get(1) {
            push_artifact(extraction, normalize(m.as_str()), block.body, block.language, true);
            return;
        }
    }

    // 3: first body line is a comment naming a path
    if let Some(first) = block.body.lines().next() {
        if let Some(cap) = first_line_path_re().captures(first) {
            if let Some(m) = cap.get(1) {
                let body = block
                    .body
                    .lines()
                    .skip(1)
                    .collect::<Vec<_>>()
                    .join("\n");
                push_artifact(extraction, normalize(m.as_str()), body, block.language, true);
                return;
            }
        }
    }

    // 4: heuristic routing by language and content
    match route(&block.language, &block.body) {
        Some(target) => {
            push_artifact(extraction, target.to_string(), block.body, block.language, false)
        }
        None => extraction.skips.push(Skip {
            path: format!("<{} block>", if block.language.is_empty() { "untagged" } else { &block.language }),
            reason: SkipReason::NoTarget,
        }),
    }
}

fn push_artifact(
    extraction: &mut Extraction,
    path: String,
    body: String,
    language: String,
    explicit: bool,
) {
    if let Err(reason) = check_path(&path) {
        tracing::debug!(%path, %reason, "artifact refused");
        extraction.skips.push(Skip { path, reason });
        return;
    }
    let is_markdown = path.ends_with(".md") || path.ends_with(".markdown");
    let content = strip_trailing_prose(&body, is_markdown);
    extraction
        .artifacts
        .push(Artifact { path, content, language, explicit });
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn fenced_blocks(response: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, String, Vec<&str>)> = None;
    for line in response.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("```") {
            match current.take() {
                Some((language, info, lines)) => {
                    blocks.push(FencedBlock {
                        language,
                        info,
                        body: lines.join("\n"),
                    });
                    // a closing fence carrying an info string opens a new block
                    if !rest.trim().is_empty() {
                        let (language, info) = split_info(rest);
                        current = Some((language, info, Vec::new()));
                    }
                }
                None => {
                    let (language, info) = split_info(rest);
                    current = Some((language, info, Vec::new()));
                }
            }
        } else if let Some((_, _, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    // an unterminated block still counts; models forget closing fences
    if let Some((language, info, lines)) = current {
        blocks.push(FencedBlock {
            language,
            info,
            body: lines.join("\n"),
        });
    }
    blocks
}

fn split_info(rest: &str) -> (String, String) {
    let info = rest.trim().to_string();
    let language = info
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();
    (language, info)
}

#[cfg(test)]
#[path = "recover_tests.rs"]
mod tests;
