//! Heuristic routing for code blocks without an explicit filename.
//!
//! The table maps (language tag, content keywords) to a default target
//! path. First matching row wins; rows with keywords are checked
//! against the lowercased body.

struct Route {
    languages: &'static [&'static str],
    keywords: &'static [&'static str],
    /// Extra structural check for rows whose pattern is not a plain
    /// substring (e.g. a `class …Model` definition).
    extra: Option<fn(&str) -> bool>,
    target: &'static str,
}

const ROUTES: &[Route] = &[
    Route {
        languages: &["python", "py"],
        keywords: &["@app.", "@router.", "fastapi", "flask("],
        extra: None,
        target: "backend/api.py",
    },
    Route {
        languages: &["python", "py"],
        keywords: &["password", "jwt", "token", "bcrypt", "hash"],
        extra: None,
        target: "backend/auth.py",
    },
    Route {
        languages: &["python", "py"],
        keywords: &["sqlalchemy", "create table", "sqlite3", "session.query"],
        extra: None,
        target: "backend/database.py",
    },
    Route {
        languages: &["python", "py"],
        keywords: &["basemodel", "@dataclass"],
        extra: Some(declares_model_class),
        target: "backend/models.py",
    },
    Route {
        languages: &["python", "py"],
        keywords: &["def test_", "unittest", "pytest"],
        extra: None,
        target: "tests/test_generated.py",
    },
    Route {
        languages: &["python", "py"],
        keywords: &[],
        extra: None,
        target: "main.py",
    },
    Route {
        languages: &["jsx", "tsx", "react"],
        keywords: &[],
        extra: None,
        target: "src/components/Component.jsx",
    },
    Route {
        languages: &["javascript", "js", "typescript", "ts"],
        keywords: &[],
        extra: None,
        target: "src/app.js",
    },
    Route {
        languages: &["html"],
        keywords: &[],
        extra: None,
        target: "index.html",
    },
    Route {
        languages: &["css"],
        keywords: &[],
        extra: None,
        target: "src/styles.css",
    },
    Route {
        languages: &["json"],
        keywords: &["\"dependencies\"", "\"scripts\""],
        extra: None,
        target: "package.json",
    },
    Route {
        languages: &["json"],
        keywords: &[],
        extra: None,
        target: "data.json",
    },
    Route {
        languages: &["markdown", "md"],
        keywords: &[],
        extra: None,
        target: "docs/notes.md",
    },
    Route {
        languages: &["bash", "sh", "shell"],
        keywords: &[],
        extra: None,
        target: "scripts/run.sh",
    },
];

/// True when the body declares a `class …Model` (`class UserModel:`,
/// `class Order(models.Model):`). The body is already lowercased by
/// `route`.
fn declares_model_class(body: &str) -> bool {
    body.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with("class ") && trimmed.contains("model")
    })
}

/// Pick a default path for a block by language tag and content.
pub fn route(language: &str, body: &str) -> Option<&'static str> {
    let language = language.to_lowercase();
    let body = body.to_lowercase();
    for row in ROUTES {
        if !row.languages.contains(&language.as_str()) {
            continue;
        }
        let matched = (row.keywords.is_empty() && row.extra.is_none())
            || row.keywords.iter().any(|k| body.contains(k))
            || row.extra.map(|check| check(&body)).unwrap_or(false);
        if matched {
            return Some(row.target);
        }
    }
    None
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
