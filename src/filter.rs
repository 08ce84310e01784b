//! Filter engine: conjunctive equality filters over the dataset.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::categories::{MONTHS, WEEKDAYS};
use crate::error::{DashboardError, Result};
use crate::store::{Dataset, Record, normalize_year};

/// Label shown for the wildcard in selectors.
pub const WILDCARD: &str = "All";

/// One filter dimension: either no constraint or an exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterValue {
    #[default]
    Wildcard,
    Exact(String),
}

impl FilterValue {
    pub fn exact<S: Into<String>>(value: S) -> Self {
        FilterValue::Exact(value.into())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, FilterValue::Wildcard)
    }

    pub fn as_exact(&self) -> Option<&str> {
        match self {
            FilterValue::Wildcard => None,
            FilterValue::Exact(v) => Some(v),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            FilterValue::Wildcard => true,
            FilterValue::Exact(v) => v == value,
        }
    }
}

impl FromStr for FilterValue {
    type Err = std::convert::Infallible;

    /// `All` (any case) and the empty string mean no constraint.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(WILDCARD) {
            Ok(FilterValue::Wildcard)
        } else {
            Ok(FilterValue::Exact(s.to_string()))
        }
    }
}

// serialized as the selector label, `All` for the wildcard
impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Wildcard => f.write_str(WILDCARD),
            FilterValue::Exact(v) => f.write_str(v),
        }
    }
}

/// The four independent filter constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub sentiment: FilterValue,
    pub year: FilterValue,
    pub month: FilterValue,
    pub day_of_week: FilterValue,
}

impl Selection {
    /// All four dimensions unconstrained.
    pub fn all() -> Self {
        Selection::default()
    }

    pub fn is_all(&self) -> bool {
        self.sentiment.is_wildcard()
            && self.year.is_wildcard()
            && self.month.is_wildcard()
            && self.day_of_week.is_wildcard()
    }

    fn matches(&self, record: &Record, year: &FilterValue) -> bool {
        self.sentiment.matches(&record.sentiment)
            && year.matches(&record.year)
            && self.month.matches(&record.month)
            && self.day_of_week.matches(&record.day_of_week)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sentiment: {} | Year: {} | Month: {} | Day of Week: {}",
            self.sentiment, self.year, self.month, self.day_of_week
        )
    }
}

/// Selector choices, derived once from the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDomain {
    pub sentiments: Vec<String>,
    pub years: Vec<String>,
    pub months: Vec<String>,
    pub weekdays: Vec<String>,
}

impl FilterDomain {
    /// Sorted distinct sentiments and years from the data; months and weekdays are the
    /// canonical lists whether or not they occur.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut sentiments = BTreeSet::new();
        let mut years = BTreeSet::new();
        for r in dataset.records() {
            if !r.sentiment.is_empty() {
                sentiments.insert(r.sentiment.as_str());
            }
            if !r.year.is_empty() {
                years.insert(r.year.as_str());
            }
        }
        FilterDomain {
            sentiments: sentiments.into_iter().map(String::from).collect(),
            years: years.into_iter().map(String::from).collect(),
            months: MONTHS.iter().map(|m| m.to_string()).collect(),
            weekdays: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Reject values that are not among the selector choices.
    pub fn validate(&self, selection: &Selection) -> Result<()> {
        check("sentiment", &selection.sentiment, &self.sentiments)?;
        let year = normalized_year(&selection.year);
        check("year", &year, &self.years)?;
        check("month", &selection.month, &self.months)?;
        check("day of week", &selection.day_of_week, &self.weekdays)?;
        Ok(())
    }
}

fn check(name: &str, value: &FilterValue, domain: &[String]) -> Result<()> {
    match value {
        FilterValue::Wildcard => Ok(()),
        FilterValue::Exact(v) if domain.iter().any(|d| d == v) => Ok(()),
        FilterValue::Exact(v) => Err(DashboardError::InvalidSelection(format!(
            "unknown {name} '{v}' (choose from: {WILDCARD}, {})",
            domain.join(", ")
        ))),
    }
}

fn normalized_year(year: &FilterValue) -> FilterValue {
    match year {
        FilterValue::Wildcard => FilterValue::Wildcard,
        FilterValue::Exact(v) => FilterValue::Exact(normalize_year(v)),
    }
}

/// Rows of a dataset that satisfy a selection. Borrows; never copies or mutates rows.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> From<Vec<&'a Record>> for FilteredView<'a> {
    fn from(rows: Vec<&'a Record>) -> Self {
        FilteredView { rows }
    }
}

/// Apply all active constraints with logical AND.
///
/// An empty result is a normal outcome. Year is compared on its normalised form, so
/// `2021` and `2021.0` select the same rows.
pub fn apply<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    let year = normalized_year(&selection.year);
    let rows = dataset
        .records()
        .iter()
        .filter(|r| selection.matches(r, &year))
        .collect();
    FilteredView { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ColumnAvailability;

    fn rec(sentiment: &str, year: &str, month: &str, day: &str) -> Record {
        Record {
            sentiment: sentiment.into(),
            text: String::new(),
            year: year.into(),
            month: month.into(),
            day_of_week: day.into(),
            platform: None,
            country: None,
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(
            vec![
                rec("positive", "2021", "January", "Monday"),
                rec("negative", "2021", "January", "Monday"),
                rec("neutral", "2022", "March", "Friday"),
                rec("positive", "2023", "March", "Sunday"),
            ],
            ColumnAvailability::default(),
        )
    }

    #[test]
    fn wildcard_selection_returns_everything() {
        let ds = dataset();
        let view = apply(&ds, &Selection::all());
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn constraints_are_conjunctive() {
        let ds = dataset();
        let sel = Selection {
            sentiment: FilterValue::exact("positive"),
            month: FilterValue::exact("March"),
            ..Selection::all()
        };
        let view = apply(&ds, &sel);
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].year, "2023");
    }

    #[test]
    fn year_compares_normalized() {
        let ds = dataset();
        let sel = Selection {
            year: FilterValue::exact("2021.0"),
            ..Selection::all()
        };
        assert_eq!(apply(&ds, &sel).len(), 2);
    }

    #[test]
    fn disjoint_filters_give_empty_view() {
        let ds = dataset();
        let sel = Selection {
            month: FilterValue::exact("December"),
            ..Selection::all()
        };
        assert!(apply(&ds, &sel).is_empty());
    }

    #[test]
    fn parse_wildcard() {
        assert_eq!("All".parse::<FilterValue>().unwrap(), FilterValue::Wildcard);
        assert_eq!("all".parse::<FilterValue>().unwrap(), FilterValue::Wildcard);
        assert_eq!(
            " May ".parse::<FilterValue>().unwrap(),
            FilterValue::exact("May")
        );
    }

    #[test]
    fn domain_and_validation() {
        let ds = dataset();
        let domain = FilterDomain::from_dataset(&ds);
        assert_eq!(domain.sentiments, vec!["negative", "neutral", "positive"]);
        assert_eq!(domain.years, vec!["2021", "2022", "2023"]);
        assert_eq!(domain.months.len(), 12);
        assert_eq!(domain.weekdays[0], "Monday");

        // months are canonical even when absent from the data
        let ok = Selection {
            month: FilterValue::exact("December"),
            ..Selection::all()
        };
        assert!(domain.validate(&ok).is_ok());

        let bad = Selection {
            year: FilterValue::exact("1999"),
            ..Selection::all()
        };
        assert!(matches!(
            domain.validate(&bad),
            Err(DashboardError::InvalidSelection(_))
        ));
    }
}
