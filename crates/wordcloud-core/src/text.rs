use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::wordlist::Frequencies;

/// Minimum number of times a word pair must occur to be kept as a collocation.
const MIN_COLLOCATION_COUNT: u64 = 2;

pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
    "ever", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no",
    "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought",
    "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w[\w']+").unwrap())
}

pub fn default_stopwords() -> HashSet<String> {
    DEFAULT_STOPWORDS.iter().map(|word| word.to_string()).collect()
}

fn tokenize(text: &str) -> Vec<&str> {
    word_pattern()
        .find_iter(text)
        .map(|m| m.as_str())
        .map(|word| {
            word.strip_suffix("'s")
                .or_else(|| word.strip_suffix("'S"))
                .unwrap_or(word)
        })
        .filter(|word| !word.chars().all(char::is_numeric))
        .collect()
}

/// Counts words in `text`, dropping stopwords case-insensitively.
///
/// Words that differ only by case are merged under their first spelling.
/// With `collocations`, word pairs seen at least twice are counted as their
/// own entries and their occurrences are taken out of the single words.
pub fn count_words(text: &str, stopwords: &HashSet<String>, collocations: bool) -> Frequencies {
    let stopwords: HashSet<String> = stopwords.iter().map(|word| word.to_lowercase()).collect();
    let tokens = tokenize(text);

    let mut counts: HashMap<String, (String, u64)> = HashMap::new();
    for token in &tokens {
        let key = token.to_lowercase();
        if stopwords.contains(&key) {
            continue;
        }
        counts.entry(key).or_insert_with(|| (token.to_string(), 0)).1 += 1;
    }

    let mut pairs = Vec::new();
    if collocations {
        let mut pair_counts: HashMap<(String, String), u64> = HashMap::new();
        for window in tokens.windows(2) {
            let (first, second) = (window[0].to_lowercase(), window[1].to_lowercase());
            if stopwords.contains(&first) || stopwords.contains(&second) {
                continue;
            }
            *pair_counts.entry((first, second)).or_insert(0) += 1;
        }

        for ((first, second), count) in pair_counts {
            if count < MIN_COLLOCATION_COUNT {
                continue;
            }
            let mut spelled = Vec::with_capacity(2);
            for key in [&first, &second] {
                if let Some((spelling, single)) = counts.get_mut(key) {
                    *single = single.saturating_sub(count);
                    spelled.push(spelling.clone());
                }
            }
            pairs.push((spelled.join(" "), count));
        }
    }

    counts
        .into_values()
        .filter(|(_, count)| *count > 0)
        .chain(pairs)
        .collect()
}
