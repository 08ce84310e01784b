use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::stopwords::ENGLISH_STOP_WORDS;

// two or more word characters between word boundaries
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Set of lowercased words dropped before counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl Default for StopWords {
    fn default() -> Self {
        StopWords::english()
    }
}

impl StopWords {
    pub fn english() -> Self {
        StopWords {
            words: ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn none() -> Self {
        StopWords {
            words: HashSet::new(),
        }
    }

    /// Add words from a `.txt` file, one per line. Blank lines and `#` comments are skipped.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        self.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        );
        Ok(())
    }

    pub fn extend<'a, I: IntoIterator<Item = &'a str>>(&mut self, words: I) {
        self.words
            .extend(words.into_iter().map(|w| w.to_lowercase()));
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

///Splits text into lowercased tokens of at least two word characters and drops stop words.
/// # Example
/// ```
/// use sentiment_dashboard::{StopWords, tokenize};
/// let tokens = tokenize("The service was GREAT, a real 10/10!", &StopWords::english());
/// assert_eq!(tokens, vec!["service", "great", "real", "10", "10"]);
/// ```
pub fn tokenize(text: &str, stop_words: &StopWords) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !stop_words.contains(t))
        .map(String::from)
        .collect()
}

///Counts the quantity of each token.
/// # Example
/// ```
/// use sentiment_dashboard::count_words;
/// let words = vec!["one".to_string(), "two".to_string(), "two".to_string()];
/// let counted = count_words(&words);
/// assert_eq!(counted["two"], 2);
/// assert_eq!(counted["one"], 1);
/// ```
pub fn count_words(words: &[String]) -> HashMap<String, usize> {
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for word in words {
        *frequency.entry(word.to_owned()).or_insert(0) += 1;
    }
    frequency
}

///Sort a frequency map into a Vec: count descending, ties by token ascending.
/// # Example
/// ```
/// use sentiment_dashboard::sort_map_to_vec;
/// use std::collections::HashMap;
/// let mut words_map = HashMap::new();
/// words_map.insert("b".to_string(), 2);
/// words_map.insert("a".to_string(), 2);
/// words_map.insert("c".to_string(), 3);
/// let sorted = sort_map_to_vec(words_map);
/// assert_eq!(sorted, vec![("c".to_string(), 3), ("a".to_string(), 2), ("b".to_string(), 2)]);
/// ```
pub fn sort_map_to_vec(frequency: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut vec_sorted: Vec<(String, usize)> = frequency.into_iter().collect();
    vec_sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    vec_sorted
}

/// Neutralize spreadsheet formulas in exported cells.
///
/// A cell starting with `=`, `+`, `-`, `@`, tab or carriage return gets a leading `'`.
/// Cells that already start with `'` are returned unchanged.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}
