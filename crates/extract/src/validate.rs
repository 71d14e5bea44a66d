//! Advisory syntax pass over generated source files.
//!
//! A syntax-only scan: bracket balance, string termination, and Python
//! block headers. Findings feed a repair prompt; they never abort the
//! run, and nothing here executes or imports the checked code.

use serde::Serialize;

/// One syntax finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxIssue {
    pub file: String,
    pub line: usize,
    pub message: String,
}

/// Check one file by extension. Unknown extensions produce no findings.
pub fn check_file(rel_path: &str, content: &str) -> Vec<SyntaxIssue> {
    let ext = rel_path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "py" => check_python(rel_path, content),
        "js" | "jsx" | "ts" | "tsx" | "css" => check_braces(rel_path, content),
        "json" => check_json(rel_path, content),
        _ => Vec::new(),
    }
}

const PY_BLOCK_KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "try", "except", "finally", "for", "while", "with",
];

fn check_python(file: &str, content: &str) -> Vec<SyntaxIssue> {
    let mut issues = Vec::new();
    let mut depth: i32 = 0;
    let mut open_line = 0;
    // quote char of a triple-quoted string that is still open; lines
    // inside it are docstring prose, not statements
    let mut triple: Option<char> = None;
    let mut triple_open_line = 0;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let depth_at_start = depth;
        let in_string_at_start = triple.is_some();
        let code = scan_python_line(line, &mut depth, &mut triple, &mut issues, file, line_no);
        if triple.is_some() && !in_string_at_start {
            triple_open_line = line_no;
        }

        // block headers need a colon, but only when the whole statement
        // fits on this physical line and the line is real code, not the
        // inside of a docstring (string contents are blanked, so a ':'
        // here is structural)
        if !in_string_at_start && depth_at_start == 0 && depth == 0 {
            let trimmed = code.trim();
            let head = trimmed
                .split(|c: char| c.is_whitespace() || c == ':' || c == '(')
                .next()
                .unwrap_or("");
            if PY_BLOCK_KEYWORDS.contains(&head)
                && !trimmed.contains(':')
                && !trimmed.ends_with('\\')
            {
                issues.push(SyntaxIssue {
                    file: file.to_string(),
                    line: line_no,
                    message: format!("expected ':' at end of '{head}' statement"),
                });
            }
        }
        if depth > 0 && depth_at_start == 0 {
            open_line = line_no;
        }
        if depth < 0 {
            issues.push(SyntaxIssue {
                file: file.to_string(),
                line: line_no,
                message: "unbalanced closing bracket".to_string(),
            });
            depth = 0;
        }
    }

    if triple.is_some() {
        issues.push(SyntaxIssue {
            file: file.to_string(),
            line: triple_open_line,
            message: "unterminated triple-quoted string".to_string(),
        });
    }
    if depth > 0 {
        issues.push(SyntaxIssue {
            file: file.to_string(),
            line: open_line,
            message: "unclosed bracket at end of file".to_string(),
        });
    }
    issues
}

/// Strip comments/strings from one Python line while tracking bracket
/// depth. Returns the code portion with string contents blanked.
///
/// `triple` carries open-triple-quote state across lines: when set on
/// entry the line starts inside a docstring, and when set on return
/// the string is still open at the end of the line.
fn scan_python_line(
    line: &str,
    depth: &mut i32,
    triple: &mut Option<char>,
    issues: &mut Vec<SyntaxIssue>,
    file: &str,
    line_no: usize,
) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut code = String::with_capacity(line.len());
    let mut single: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // inside a (possibly multi-line) triple-quoted string
        if let Some(quote) = *triple {
            if c == quote && chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                *triple = None;
                i += 3;
            } else {
                i += 1;
            }
            continue;
        }

        // inside a single-line string literal
        if let Some(quote) = single {
            if c == '\\' {
                i += 2;
            } else {
                if c == quote {
                    single = None;
                }
                i += 1;
            }
            continue;
        }

        match c {
            '#' => break,
            '\'' | '"' => {
                if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c) {
                    *triple = Some(c);
                    i += 3;
                } else if chars.get(i + 1) == Some(&c) {
                    // empty string literal
                    i += 2;
                } else {
                    single = Some(c);
                    i += 1;
                }
            }
            '(' | '[' | '{' => {
                *depth += 1;
                code.push(c);
                i += 1;
            }
            ')' | ']' | '}' => {
                *depth -= 1;
                code.push(c);
                i += 1;
            }
            _ => {
                code.push(c);
                i += 1;
            }
        }
    }

    if single.is_some() {
        issues.push(SyntaxIssue {
            file: file.to_string(),
            line: line_no,
            message: "unterminated string literal".to_string(),
        });
    }
    code
}

fn check_braces(file: &str, content: &str) -> Vec<SyntaxIssue> {
    let mut issues = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut in_string: Option<char> = None;
    let mut in_block_comment = false;
    let mut prev = '\0';

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let mut chars = line.chars().peekable();
        // line comments and single-quote strings reset at EOL
        if in_string == Some('\'') || in_string == Some('"') {
            in_string = None;
        }
        while let Some(c) = chars.next() {
            if in_block_comment {
                if prev == '*' && c == '/' {
                    in_block_comment = false;
                }
                prev = c;
                continue;
            }
            match in_string {
                Some(quote) => {
                    if c == '\\' {
                        chars.next();
                    } else if c == quote {
                        in_string = None;
                    }
                }
                None => match c {
                    '/' if chars.peek() == Some(&'/') => break,
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        in_block_comment = true;
                    }
                    '\'' | '"' | '`' => in_string = Some(c),
                    '(' | '[' | '{' => stack.push((c, line_no)),
                    ')' | ']' | '}' => {
                        let expected = match c {
                            ')' => '(',
                            ']' => '[',
                            _ => '{',
                        };
                        match stack.pop() {
                            Some((open, _)) if open == expected => {}
                            _ => issues.push(SyntaxIssue {
                                file: file.to_string(),
                                line: line_no,
                                message: format!("unmatched '{c}'"),
                            }),
                        }
                    }
                    _ => {}
                },
            }
            prev = c;
        }
    }

    for (open, line) in stack {
        issues.push(SyntaxIssue {
            file: file.to_string(),
            line,
            message: format!("unclosed '{open}'"),
        });
    }
    issues
}

fn check_json(file: &str, content: &str) -> Vec<SyntaxIssue> {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(_) => Vec::new(),
        Err(e) => vec![SyntaxIssue {
            file: file.to_string(),
            line: e.line(),
            message: format!("invalid JSON: {e}"),
        }],
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
