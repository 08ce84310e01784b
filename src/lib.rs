#![forbid(unsafe_code)]
//! # sentiment_dashboard
//!
//! Filterable analytics over a table of sentiment-labelled text records.
//!
//! The pipeline is: [`RecordStore`] loads the dataset once, [`apply`] narrows it to a
//! [`FilteredView`] for a [`Selection`], the aggregators in [`aggregate`] reduce the view,
//! [`render`] turns the results into SVG charts, and [`build_page`] assembles one of the
//! four [`Page`]s. [`export_report`] writes a page as HTML, JSON, CSV/TSV or text.
//!
//! ## Example
//! ```
//! use sentiment_dashboard::{Dataset, Selection, FilterValue, apply, sentiment_counts};
//! use std::path::Path;
//!
//! let csv = "Sentiment,Text,Year,Month,Day_of_Week\n\
//!            positive,great service,2021,January,Monday\n\
//!            negative,bad support,2021,January,Monday\n";
//! let ds = Dataset::from_reader(csv.as_bytes(), b',', Path::new("inline.csv")).unwrap();
//! let sel = Selection { year: FilterValue::exact("2021"), ..Selection::all() };
//! let counts = sentiment_counts(&apply(&ds, &sel));
//! assert_eq!((counts.positive, counts.neutral, counts.negative), (1, 0, 1));
//! ```

pub mod aggregate;
pub mod categories;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod page;
pub mod render;
pub mod stopwords;
pub mod store;
pub mod text;

pub use aggregate::{
    CrossTab, Dimension, GeoCount, GeoCrossTab, Keyword, KeywordOptions, SentimentCounts,
    WeightedTerm, cross_tab, geo_cross_tab, platform_counts, sentiment_counts, top_keywords,
    word_cloud_terms,
};
pub use categories::{MONTHS, SENTIMENTS, SentimentPalette, WEEKDAYS};
pub use config::{CliConfig, Config};
pub use error::{DashboardError, Result};
pub use export::{ExportFormat, export_report, render_html, summary};
pub use filter::{FilterDomain, FilterValue, FilteredView, Selection, apply};
pub use page::{Page, PageOptions, PageReport, Section, build_page};
pub use store::{Column, ColumnAvailability, Dataset, Record, RecordStore};
pub use text::{StopWords, count_words, csv_safe_cell, sort_map_to_vec, tokenize};

/// Load (once), validate the selection against the filter domain, filter, and build `page`.
pub fn dashboard_page(
    store: &RecordStore,
    page: Page,
    selection: &Selection,
    options: &PageOptions,
) -> Result<PageReport> {
    let dataset = store.load()?;
    FilterDomain::from_dataset(dataset).validate(selection)?;
    let view = apply(dataset, selection);
    build_page(page, dataset, &view, selection, options)
}
