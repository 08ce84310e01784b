//! Ordered category tables shared by the aggregators and the renderers.
//!
//! Chart category order is taken from here and nowhere else, so a month axis
//! or a sentiment legend reads the same on every page and for every filter.

use plotters::style::RGBColor;

/// The three sentiment classes reported by every KPI and chart, in display order.
pub const SENTIMENTS: [&str; 3] = ["positive", "neutral", "negative"];

/// Calendar order.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Monday-first week.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Sentiment colours applied consistently across all chart types.
pub struct SentimentPalette;

impl SentimentPalette {
    pub const POSITIVE: RGBColor = RGBColor(0, 128, 0);
    pub const NEUTRAL: RGBColor = RGBColor(0, 0, 255);
    pub const NEGATIVE: RGBColor = RGBColor(255, 0, 0);
    /// Labels outside the three canonical classes.
    pub const OTHER: RGBColor = RGBColor(128, 128, 128);

    pub fn color(sentiment: &str) -> RGBColor {
        match sentiment {
            "positive" => Self::POSITIVE,
            "neutral" => Self::NEUTRAL,
            "negative" => Self::NEGATIVE,
            _ => Self::OTHER,
        }
    }

    /// CSS name used in HTML legends.
    pub fn css_name(sentiment: &str) -> &'static str {
        match sentiment {
            "positive" => "green",
            "neutral" => "blue",
            "negative" => "red",
            _ => "grey",
        }
    }
}

/// Position of a sentiment in the canonical order, `None` for other labels.
pub fn sentiment_rank(sentiment: &str) -> Option<usize> {
    SENTIMENTS.iter().position(|s| *s == sentiment)
}

/// "positive" -> "Positive"
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
