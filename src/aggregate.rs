//! Pure reductions of a filtered view into chart-ready tables.
//!
//! Every aggregator accepts an empty view and returns zero counts or an empty list.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::categories::{MONTHS, SENTIMENTS, WEEKDAYS, sentiment_rank};
use crate::filter::{FilterDomain, FilteredView};
use crate::store::Record;
use crate::text::{StopWords, count_words, sort_map_to_vec, tokenize};

/// Rows per canonical sentiment class. Always three entries, zero when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Rows in the view, including labels outside the three classes.
    pub total: usize,
}

impl SentimentCounts {
    /// `(label, count)` in canonical order.
    pub fn entries(&self) -> [(&'static str, usize); 3] {
        [
            (SENTIMENTS[0], self.positive),
            (SENTIMENTS[1], self.neutral),
            (SENTIMENTS[2], self.negative),
        ]
    }

    pub fn get(&self, sentiment: &str) -> Option<usize> {
        self.entries()
            .into_iter()
            .find(|(s, _)| *s == sentiment)
            .map(|(_, c)| c)
    }
}

pub fn sentiment_counts(view: &FilteredView<'_>) -> SentimentCounts {
    let mut counts = SentimentCounts {
        total: view.len(),
        ..SentimentCounts::default()
    };
    for r in view.iter() {
        match r.sentiment.as_str() {
            "positive" => counts.positive += 1,
            "neutral" => counts.neutral += 1,
            "negative" => counts.negative += 1,
            _ => {}
        }
    }
    counts
}

/// Grouping dimension for the time cross-tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    Year,
    Month,
    DayOfWeek,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Year, Dimension::Month, Dimension::DayOfWeek];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::Month => "Month",
            Dimension::DayOfWeek => "Day_of_Week",
        }
    }

    fn value(self, record: &Record) -> &str {
        match self {
            Dimension::Year => &record.year,
            Dimension::Month => &record.month,
            Dimension::DayOfWeek => &record.day_of_week,
        }
    }

    /// Axis categories: the dataset's years, or the calendar tables.
    fn categories(self, domain: &FilterDomain) -> Vec<String> {
        match self {
            Dimension::Year => domain.years.clone(),
            Dimension::Month => MONTHS.iter().map(|m| m.to_string()).collect(),
            Dimension::DayOfWeek => WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts by (category, sentiment). `counts[i][j]` is category `i`, sentiment `j`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub dimension: Dimension,
    pub categories: Vec<String>,
    pub sentiments: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, category: &str, sentiment: &str) -> usize {
        let i = self.categories.iter().position(|c| c == category);
        let j = self.sentiments.iter().position(|s| s == sentiment);
        match (i, j) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    pub fn category_total(&self, category: &str) -> usize {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| self.counts[i].iter().sum())
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn max_cell(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Sentiment columns: the canonical three, then any other label in the dataset, sorted.
pub fn sentiment_columns(domain: &FilterDomain) -> Vec<String> {
    let mut cols: Vec<String> = SENTIMENTS.iter().map(|s| s.to_string()).collect();
    cols.extend(
        domain
            .sentiments
            .iter()
            .filter(|s| sentiment_rank(s).is_none())
            .cloned(),
    );
    cols
}

/// Cross-tab of `dimension` by sentiment, every axis category present even at zero.
///
/// Rows whose value is not an axis category (a misspelt month, an empty year) are not counted.
pub fn cross_tab(view: &FilteredView<'_>, dimension: Dimension, domain: &FilterDomain) -> CrossTab {
    let categories = dimension.categories(domain);
    let sentiments = sentiment_columns(domain);
    let mut counts = vec![vec![0usize; sentiments.len()]; categories.len()];

    let cat_index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let sent_index: HashMap<&str, usize> = sentiments
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    for r in view.iter() {
        if let (Some(&i), Some(&j)) = (
            cat_index.get(dimension.value(r)),
            sent_index.get(r.sentiment.as_str()),
        ) {
            counts[i][j] += 1;
        }
    }

    CrossTab {
        dimension,
        categories,
        sentiments,
        counts,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoCount {
    pub country: String,
    pub sentiment: String,
    pub count: usize,
}

/// Counts by (country, sentiment). Rows without a country are excluded and tallied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GeoCrossTab {
    /// Sorted by country, then canonical sentiment order, then label.
    pub entries: Vec<GeoCount>,
    /// Rows left out because they carry no country.
    pub excluded: usize,
}

impl GeoCrossTab {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Sentiments with at least one entry, canonical ones first.
    pub fn sentiments(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for e in &self.entries {
            if !out.contains(&e.sentiment) {
                out.push(e.sentiment.clone());
            }
        }
        out.sort_by(|a, b| sentiment_order(a, b));
        out
    }

    /// One animation frame: `(country, count)` for a sentiment, count desc then name.
    pub fn frame(&self, sentiment: &str) -> Vec<(String, usize)> {
        let mut frame: Vec<(String, usize)> = self
            .entries
            .iter()
            .filter(|e| e.sentiment == sentiment)
            .map(|e| (e.country.clone(), e.count))
            .collect();
        frame.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        frame
    }
}

fn sentiment_order(a: &str, b: &str) -> std::cmp::Ordering {
    let rank = |s: &str| sentiment_rank(s).unwrap_or(SENTIMENTS.len());
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

pub fn geo_cross_tab(view: &FilteredView<'_>) -> GeoCrossTab {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut excluded = 0;
    for r in view.iter() {
        match r.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => {
                *counts.entry((country, r.sentiment.as_str())).or_insert(0) += 1;
            }
            _ => excluded += 1,
        }
    }

    let mut entries: Vec<GeoCount> = counts
        .into_iter()
        .map(|((country, sentiment), count)| GeoCount {
            country: country.to_string(),
            sentiment: sentiment.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| {
        a.country
            .cmp(&b.country)
            .then_with(|| sentiment_order(&a.sentiment, &b.sentiment))
    });
    GeoCrossTab { entries, excluded }
}

/// Rows per platform, most frequent first, ties by name. Rows without a platform are skipped.
pub fn platform_counts(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    let platforms: Vec<String> = view
        .iter()
        .filter_map(|r| r.platform.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    sort_map_to_vec(count_words(&platforms))
}

/// Keyword extraction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordOptions {
    pub top_n: usize,
    /// Vocabulary cap applied before ranking, `None` for unbounded.
    pub max_features: Option<usize>,
    pub stop_words: StopWords,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        KeywordOptions {
            top_n: 10,
            max_features: Some(1000),
            stop_words: StopWords::english(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub count: usize,
}

/// Ranked token frequencies over the non-empty texts of one sentiment.
fn ranked_terms(
    view: &FilteredView<'_>,
    sentiment: &str,
    stop_words: &StopWords,
) -> Vec<(String, usize)> {
    let mut tokens = Vec::new();
    for r in view.iter().filter(|r| r.sentiment == sentiment) {
        if r.text.trim().is_empty() {
            continue;
        }
        tokens.extend(tokenize(&r.text, stop_words));
    }
    sort_map_to_vec(count_words(&tokens))
}

/// The `top_n` most frequent tokens for `sentiment`; count desc, ties by token asc.
///
/// Empty when no row of that sentiment has text left after stop-word removal.
pub fn top_keywords(
    view: &FilteredView<'_>,
    sentiment: &str,
    options: &KeywordOptions,
) -> Vec<Keyword> {
    let mut ranked = ranked_terms(view, sentiment, &options.stop_words);
    if let Some(cap) = options.max_features {
        ranked.truncate(cap);
    }
    ranked.truncate(options.top_n);
    ranked
        .into_iter()
        .map(|(term, count)| Keyword { term, count })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedTerm {
    pub term: String,
    pub count: usize,
    /// count / max count, in (0, 1].
    pub weight: f64,
}

/// Word-cloud input: up to `max_words` terms with weights relative to the most frequent one.
pub fn word_cloud_terms(
    view: &FilteredView<'_>,
    sentiment: &str,
    max_words: usize,
    stop_words: &StopWords,
) -> Vec<WeightedTerm> {
    let mut ranked = ranked_terms(view, sentiment, stop_words);
    ranked.truncate(max_words);
    let max = ranked.first().map(|(_, c)| *c).unwrap_or(0);
    ranked
        .into_iter()
        .map(|(term, count)| WeightedTerm {
            weight: count as f64 / max as f64,
            term,
            count,
        })
        .collect()
}
