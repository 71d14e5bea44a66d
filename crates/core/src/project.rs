//! Project type detection and per-type policy tables.
//!
//! The type is detected once from the objective at intake and locked for
//! the run. Each type declares the file extensions it accepts, the
//! scaffold folders it wants, and a short fragment injected into every
//! dispatched prompt.

use serde::{Deserialize, Serialize};

/// Keyword tables for type detection, checked in order. First hit wins;
/// the fallthrough is `Python`.
const DETECTION: &[(ProjectType, &[&str])] = &[
    (
        ProjectType::Research,
        &["research", "paper", "study", "hypothesis", "benchmark", "simulation", "analyze"],
    ),
    (
        ProjectType::Landing,
        &["landing page", "landing", "marketing site", "homepage", "portfolio site"],
    ),
    (
        ProjectType::Fullstack,
        &["fullstack", "full-stack", "full stack", "web app", "webapp", "saas", "website"],
    ),
    (
        ProjectType::React,
        &["react", "component", "frontend", "dashboard", "spa"],
    ),
];

/// Detected shape of the project, locked at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    React,
    Python,
    Fullstack,
    Research,
    Landing,
}

crate::simple_display! {
    ProjectType {
        React => "react",
        Python => "python",
        Fullstack => "fullstack",
        Research => "research",
        Landing => "landing",
    }
}

impl ProjectType {
    /// Classify an objective. First keyword-table hit wins.
    pub fn detect(objective: &str) -> Self {
        let lower = objective.to_lowercase();
        for (kind, keywords) in DETECTION {
            if keywords.iter().any(|k| lower.contains(k)) {
                return *kind;
            }
        }
        ProjectType::Python
    }

    /// File extensions artifacts of this type may carry.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            ProjectType::React => &["js", "jsx", "ts", "tsx", "css", "html", "json", "md"],
            ProjectType::Python => &["py", "md", "txt", "json", "toml", "cfg", "sh"],
            ProjectType::Fullstack => {
                &["py", "js", "jsx", "ts", "tsx", "css", "html", "json", "md", "sql", "sh"]
            }
            ProjectType::Research => &["py", "md", "json", "csv", "txt", "bib"],
            ProjectType::Landing => &["html", "css", "js", "md", "json", "svg"],
        }
    }

    /// Extensions this type refuses outright.
    pub fn forbidden_extensions(&self) -> &'static [&'static str] {
        match self {
            ProjectType::React => &["py", "sql"],
            ProjectType::Python => &["jsx", "tsx"],
            ProjectType::Fullstack => &[],
            ProjectType::Research => &["jsx", "tsx", "html", "css"],
            ProjectType::Landing => &["py", "sql"],
        }
    }

    /// Standard subfolders scaffolded under the project root.
    pub fn scaffold_dirs(&self) -> &'static [&'static str] {
        match self {
            ProjectType::React => &["src", "src/components", "public", "tests"],
            ProjectType::Python => &["src", "tests", "docs"],
            ProjectType::Fullstack => &["backend", "src", "src/components", "tests", "docs"],
            ProjectType::Research => &["scripts", "results", "docs"],
            ProjectType::Landing => &["src", "assets"],
        }
    }

    /// Short prompt fragment injected into every dispatch for this type.
    pub fn prompt_fragment(&self) -> &'static str {
        match self {
            ProjectType::React => {
                "PROJECT TYPE: React. Output .jsx/.tsx components and CSS only; \
                 no Python files."
            }
            ProjectType::Python => {
                "PROJECT TYPE: Python. Output .py modules with tests; no web \
                 frontend files."
            }
            ProjectType::Fullstack => {
                "PROJECT TYPE: Fullstack. Backend code under backend/, frontend \
                 code under src/."
            }
            ProjectType::Research => {
                "PROJECT TYPE: Research. Produce complete analysis scripts and \
                 markdown documents (glossary, algorithm, paper); no UI code."
            }
            ProjectType::Landing => {
                "PROJECT TYPE: Landing. A static site: index.html, styles and \
                 minimal JS only."
            }
        }
    }

    /// Whether an extension is acceptable for this type.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        if self.forbidden_extensions().iter().any(|e| *e == ext) {
            return false;
        }
        self.allowed_extensions().iter().any(|e| *e == ext)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
