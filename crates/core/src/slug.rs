//! Slugify objective text for use as filesystem-safe project names.

/// Filler words skipped when picking the content words of a slug.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "be", "can", "could", "do", "for", "from", "has", "have", "i", "in",
    "is", "it", "me", "my", "of", "on", "or", "our", "please", "should", "so", "that", "the",
    "this", "to", "want", "we", "will", "with", "would", "you",
];

/// Slugify a string into at most `max_words` lowercase content words
/// joined by hyphens.
///
/// Non-alphanumeric runs become word boundaries; stop words and empty
/// fragments are skipped. Returns `"task"` when nothing survives.
pub fn slugify(input: &str, max_words: usize) -> String {
    let lower = input.to_lowercase();
    let mut words: Vec<&str> = Vec::new();
    for word in lower.split(|c: char| !c.is_ascii_alphanumeric()) {
        if word.is_empty() || STOP_WORDS.contains(&word) {
            continue;
        }
        words.push(word);
        if words.len() == max_words {
            break;
        }
    }
    if words.is_empty() {
        "task".to_string()
    } else {
        words.join("-")
    }
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
