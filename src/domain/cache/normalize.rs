//! Query normalization and tokenization shared by every cache level

use std::collections::HashSet;

use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
        "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor",
        "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
        "tell", "please", "explain",
    ]
    .into_iter()
    .collect()
});

/// Trim, lowercase and collapse internal whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Words of already-normalized text, punctuation dropped
pub fn words(normalized: &str) -> Vec<&str> {
    normalized.unicode_words().collect()
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Distinct non-stopword words of at least `min_chars` characters, in order
pub fn content_words<'a>(words: &[&'a str], min_chars: usize) -> Vec<&'a str> {
    let mut seen = HashSet::new();

    words
        .iter()
        .copied()
        .filter(|w| !is_stopword(w) && w.chars().count() >= min_chars)
        .filter(|w| seen.insert(*w))
        .collect()
}

/// Word n-grams of `min_words..=max_words`, longest first
pub fn ngrams(words: &[&str], min_words: usize, max_words: usize) -> Vec<String> {
    let min_words = min_words.max(1);
    let max_words = max_words.min(words.len());

    (min_words..=max_words)
        .rev()
        .flat_map(|n| words.windows(n).map(|window| window.join(" ")))
        .collect()
}

/// Phrase worth caching: carries at least one content word and enough text
pub fn is_salient_phrase(phrase: &str, min_chars: usize) -> bool {
    phrase.chars().count() >= min_chars && phrase.split(' ').any(|w| !is_stopword(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  What   IS\tCreativity?\n"), "what is creativity?");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("  Hello   World ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_words_drop_punctuation() {
        assert_eq!(
            words("what's the capital, of france?"),
            vec!["what's", "the", "capital", "of", "france"]
        );
    }

    #[test]
    fn test_content_words() {
        let w = words("what is the speed of light and light years");
        assert_eq!(content_words(&w, 3), vec!["speed", "light", "years"]);
    }

    #[test]
    fn test_content_words_min_chars() {
        let w = words("go ai rust");
        assert_eq!(content_words(&w, 3), vec!["rust"]);
    }

    #[test]
    fn test_ngrams_longest_first() {
        let w = words("a b c d");
        let grams = ngrams(&w, 2, 3);

        assert_eq!(grams, vec!["a b c", "b c d", "a b", "b c", "c d"]);
    }

    #[test]
    fn test_ngrams_short_input() {
        let w = words("hello world");
        assert!(ngrams(&w, 3, 5).is_empty());
    }

    #[test]
    fn test_salient_phrase() {
        assert!(is_salient_phrase("speed of light", 8));
        assert!(!is_salient_phrase("what is the", 8));
        assert!(!is_salient_phrase("a cat", 8));
    }
}
