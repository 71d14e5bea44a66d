use super::*;
use proptest::prelude::*;

#[yare::parameterized(
    simple       = { "Build a React dashboard", 3, "build-react-dashboard" },
    stop_words   = { "I want to analyze the business", 3, "analyze-business" },
    punctuation  = { "research: AI trends!!", 3, "research-ai-trends" },
    truncation   = { "one two three four five", 2, "one-two" },
    empty        = { "", 3, "task" },
    only_stops   = { "the a an of", 3, "task" },
)]
fn slugify_cases(input: &str, max_words: usize, expected: &str) {
    assert_eq!(slugify(input, max_words), expected);
}

#[test]
fn slug_is_filesystem_safe() {
    let slug = slugify("deploy/my app: v2.0 (beta)", 5);
    assert!(slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-'));
}

proptest! {
    #[test]
    fn slugify_never_exceeds_word_budget(input in ".*", n in 1usize..6) {
        let slug = slugify(&input, n);
        prop_assert!(slug.split('-').count() <= n.max(1));
    }
}
