//! Dependency audit: scan imports for modules that exist nowhere.
//!
//! Non-relative imports are checked against the language's builtin
//! list, a cache of already-verified installable packages, and local
//! module presence. Anything left is a missing module the engine asks
//! the model to generate.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// A module imported somewhere but resolvable nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingModule {
    pub file: String,
    pub module: String,
}

const PYTHON_STDLIB: &[&str] = &[
    "abc", "argparse", "ast", "asyncio", "base64", "collections", "contextlib", "copy", "csv",
    "dataclasses", "datetime", "decimal", "enum", "functools", "glob", "hashlib", "heapq", "hmac",
    "html", "http", "importlib", "inspect", "io", "itertools", "json", "logging", "math",
    "multiprocessing", "os", "pathlib", "pickle", "platform", "queue", "random", "re", "secrets",
    "shutil", "signal", "socket", "sqlite3", "statistics", "string", "struct", "subprocess",
    "sys", "tempfile", "textwrap", "threading", "time", "traceback", "types", "typing",
    "unittest", "urllib", "uuid", "warnings", "xml", "zipfile",
];

const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "crypto", "events", "fs", "http", "https", "net", "os",
    "path", "process", "querystring", "readline", "stream", "url", "util", "zlib",
];

/// Packages known to be installable; seeds the verified cache.
const KNOWN_PACKAGES: &[&str] = &[
    // python
    "aiohttp", "bcrypt", "fastapi", "flask", "jinja2", "jose", "jwt", "matplotlib", "numpy",
    "pandas", "passlib", "pydantic", "pytest", "requests", "scipy", "sklearn", "sqlalchemy",
    "starlette", "uvicorn", "websockets",
    // js
    "axios", "express", "react", "react-dom", "react-router-dom", "vite", "vitest", "jest",
    "tailwindcss",
];

// Patterns are literals; construction cannot fail.
fn literal_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => unreachable!("invalid literal regex"),
    }
}

fn python_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        literal_regex(r"(?m)^\s*(?:import\s+([A-Za-z_]\w*)|from\s+([A-Za-z_][\w.]*)\s+import)")
    })
}

fn js_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| literal_regex(r#"(?:from\s+|require\()\s*['"]([^'"]+)['"]"#))
}

/// Audit state for one run. The verified cache persists across files so
/// a package is only resolved once.
pub struct DependencyAuditor {
    verified: HashSet<String>,
}

impl Default for DependencyAuditor {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyAuditor {
    pub fn new() -> Self {
        Self {
            verified: KNOWN_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Mark a module as resolvable (e.g. after the engine generated it).
    pub fn mark_verified(&mut self, module: impl Into<String>) {
        self.verified.insert(module.into());
    }

    /// Audit one file's imports against builtins, the verified cache,
    /// and local module presence under `project_dir`.
    pub fn audit_file(
        &mut self,
        rel_path: &str,
        content: &str,
        project_dir: &Path,
    ) -> Vec<MissingModule> {
        let ext = rel_path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let modules: Vec<String> = match ext.as_str() {
            "py" => python_imports(content),
            "js" | "jsx" | "ts" | "tsx" => js_imports(content),
            _ => return Vec::new(),
        };

        let mut missing = Vec::new();
        for module in modules {
            if self.verified.contains(&module) {
                continue;
            }
            let builtin = match ext.as_str() {
                "py" => PYTHON_STDLIB.contains(&module.as_str()),
                _ => NODE_BUILTINS.contains(&module.as_str()),
            };
            if builtin {
                continue;
            }
            if local_module_exists(project_dir, &module, &ext) {
                self.verified.insert(module);
                continue;
            }
            missing.push(MissingModule {
                file: rel_path.to_string(),
                module,
            });
        }
        missing
    }
}

fn python_imports(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut modules = Vec::new();
    for cap in python_import_re().captures_iter(content) {
        let name = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str());
        if let Some(name) = name {
            // top-level package only
            let top = name.split('.').next().unwrap_or(name).to_string();
            if seen.insert(top.clone()) {
                modules.push(top);
            }
        }
    }
    modules
}

fn js_imports(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut modules = Vec::new();
    for cap in js_import_re().captures_iter(content) {
        let spec = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        // relative imports resolve within the project
        if spec.starts_with('.') || spec.starts_with('/') {
            continue;
        }
        let package = if let Some(rest) = spec.strip_prefix('@') {
            // scoped package: @scope/name
            let mut parts = rest.splitn(2, '/');
            let scope = parts.next().unwrap_or("");
            match parts.next().map(|n| n.split('/').next().unwrap_or(n)) {
                Some(name) => format!("@{scope}/{name}"),
                None => format!("@{scope}"),
            }
        } else {
            spec.split('/').next().unwrap_or(spec).to_string()
        };
        if seen.insert(package.clone()) {
            modules.push(package);
        }
    }
    modules
}

fn local_module_exists(project_dir: &Path, module: &str, ext: &str) -> bool {
    let candidates: Vec<std::path::PathBuf> = match ext {
        "py" => vec![
            project_dir.join(format!("{module}.py")),
            project_dir.join(module),
            project_dir.join("backend").join(format!("{module}.py")),
            project_dir.join("src").join(format!("{module}.py")),
            project_dir.join("scripts").join(format!("{module}.py")),
        ],
        _ => vec![
            project_dir.join("src").join(format!("{module}.js")),
            project_dir.join("src").join(format!("{module}.jsx")),
            project_dir.join("src/components").join(format!("{module}.jsx")),
        ],
    };
    candidates.iter().any(|p| p.exists())
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
