//! Page controller: which aggregators and renderers run for each page.

use std::fmt;

use clap::ValueEnum;
use log::{debug, warn};
use serde::Serialize;

use crate::aggregate::{
    CrossTab, Dimension, GeoCrossTab, Keyword, KeywordOptions, SentimentCounts, WeightedTerm,
    cross_tab, geo_cross_tab, platform_counts, sentiment_counts, top_keywords, word_cloud_terms,
};
use crate::categories::{SENTIMENTS, SentimentPalette, capitalize};
use crate::error::{DashboardError, Result};
use crate::filter::{FilterDomain, FilterValue, FilteredView, Selection};
use crate::render::{self, ColorScale};
use crate::store::{Column, Dataset};

/// The four pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Dashboard,
    Visualizations,
    GeoMap,
    Keywords,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Dashboard,
        Page::Visualizations,
        Page::GeoMap,
        Page::Keywords,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Sentiment Analysis Dashboard",
            Page::Visualizations => "Sentiment Trends Over Time",
            Page::GeoMap => "Geographic Sentiment Distribution",
            Page::Keywords => "Textual Data Insights",
        }
    }

    /// Short name used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Visualizations => "visualizations",
            Page::GeoMap => "geo_map",
            Page::Keywords => "keywords",
        }
    }

    /// Panels rendered for this page, in display order.
    pub fn panels(self) -> &'static [Panel] {
        match self {
            Page::Dashboard => &[Panel::Kpis, Panel::SentimentPie, Panel::Platforms],
            Page::Visualizations => &[
                Panel::Trend(Dimension::Year),
                Panel::Trend(Dimension::Month),
                Panel::Trend(Dimension::DayOfWeek),
            ],
            Page::GeoMap => &[Panel::Geo],
            Page::Keywords => &[Panel::TopKeywords, Panel::WordClouds],
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One aggregator plus its renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Kpis,
    SentimentPie,
    Platforms,
    Trend(Dimension),
    Geo,
    TopKeywords,
    WordClouds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: usize,
}

/// A block of page output, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Metrics { metrics: Vec<Metric> },
    Chart { heading: String, svg: String },
    Legend { entries: Vec<(String, String)> },
    /// A panel disabled by a missing optional column.
    Notice { message: String },
    /// An empty result shown in place of a chart.
    Placeholder { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordSet {
    pub sentiment: String,
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloudSet {
    pub sentiment: String,
    pub terms: Vec<WeightedTerm>,
}

/// Aggregator outputs computed for a page. Only the page's panels are filled.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_counts: Option<SentimentCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<(String, usize)>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cross_tabs: Vec<CrossTab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoCrossTab>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<KeywordSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub word_clouds: Vec<WordCloudSet>,
}

/// Everything needed to display or export one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub page: Page,
    pub title: String,
    pub selection: Selection,
    pub rows: usize,
    pub notices: Vec<String>,
    #[serde(skip)]
    pub sections: Vec<Section>,
    pub data: PageData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub keywords: KeywordOptions,
    pub word_cloud_words: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions {
            keywords: KeywordOptions::default(),
            word_cloud_words: 200,
        }
    }
}

struct PageBuilder<'v, 'a> {
    dataset: &'a Dataset,
    domain: FilterDomain,
    view: &'v FilteredView<'a>,
    selection: &'v Selection,
    options: &'v PageOptions,
    sections: Vec<Section>,
    notices: Vec<String>,
    data: PageData,
}

/// Run the page's panels over the current view.
pub fn build_page(
    page: Page,
    dataset: &Dataset,
    view: &FilteredView<'_>,
    selection: &Selection,
    options: &PageOptions,
) -> Result<PageReport> {
    debug!("Building page '{}' over {} rows ({selection})", page.slug(), view.len());
    let mut b = PageBuilder {
        dataset,
        domain: FilterDomain::from_dataset(dataset),
        view,
        selection,
        options,
        sections: Vec::new(),
        notices: Vec::new(),
        data: PageData::default(),
    };
    for panel in page.panels() {
        b.panel(*panel)?;
    }
    Ok(PageReport {
        page,
        title: page.title().to_string(),
        selection: selection.clone(),
        rows: view.len(),
        notices: b.notices,
        sections: b.sections,
        data: b.data,
    })
}

impl PageBuilder<'_, '_> {
    fn panel(&mut self, panel: Panel) -> Result<()> {
        match panel {
            Panel::Kpis => self.kpis(),
            Panel::SentimentPie => self.sentiment_pie(),
            Panel::Platforms => self.platforms(),
            Panel::Trend(dimension) => self.trend(dimension),
            Panel::Geo => self.geo(),
            Panel::TopKeywords => self.top_keywords(),
            Panel::WordClouds => self.word_clouds(),
        }
    }

    fn counts(&mut self) -> SentimentCounts {
        *self
            .data
            .sentiment_counts
            .get_or_insert_with(|| sentiment_counts(self.view))
    }

    fn kpis(&mut self) -> Result<()> {
        let counts = self.counts();
        let mut metrics = vec![Metric {
            label: "Total Records".into(),
            value: counts.total,
        }];
        metrics.extend(counts.entries().iter().map(|(s, c)| Metric {
            label: capitalize(s),
            value: *c,
        }));
        self.sections.push(Section::Metrics { metrics });
        Ok(())
    }

    fn sentiment_pie(&mut self) -> Result<()> {
        let counts = self.counts();
        let heading = "Sentiment Distribution".to_string();
        let svg = render::sentiment_pie(&counts, &heading)?;
        self.sections.push(Section::Chart { heading, svg });
        Ok(())
    }

    fn missing(&mut self, column: Column, message: String) {
        warn!("{}", DashboardError::MissingOptionalColumn(column));
        self.notices.push(message.clone());
        self.sections.push(Section::Notice { message });
    }

    fn platforms(&mut self) -> Result<()> {
        if !self.dataset.columns().platform {
            self.missing(
                Column::Platform,
                "No 'Platform' column available; the platform panel is disabled.".into(),
            );
            return Ok(());
        }
        let platforms = platform_counts(self.view);
        let heading = "Top Platforms by Total Reviews".to_string();
        let svg = render::horizontal_bars("Top Platforms by Review Volume", &platforms, ColorScale::Blues)?;
        self.sections.push(Section::Chart { heading, svg });
        self.data.platforms = Some(platforms);
        Ok(())
    }

    fn trend(&mut self, dimension: Dimension) -> Result<()> {
        let tab = cross_tab(self.view, dimension, &self.domain);
        let heading = format!("Sentiment by {}", dimension.label().replace('_', " "));
        let svg = render::cross_tab_chart(&tab, &heading)?;
        self.sections.push(Section::Chart { heading, svg });
        self.data.cross_tabs.push(tab);
        Ok(())
    }

    fn geo(&mut self) -> Result<()> {
        if !self.dataset.columns().country {
            self.missing(
                Column::Country,
                "No 'Country' column available for map visualization.".into(),
            );
            return Ok(());
        }
        self.sections.push(Section::Legend {
            entries: SENTIMENTS
                .iter()
                .map(|s| (capitalize(s), SentimentPalette::css_name(s).to_string()))
                .collect(),
        });

        let geo = geo_cross_tab(self.view);
        let sentiments = geo.sentiments();
        if sentiments.is_empty() {
            self.sections.push(Section::Placeholder {
                message: "No geo-located records for the current filters.".into(),
            });
        }
        for sentiment in sentiments {
            let heading = format!("Country-wise Mentions - {}", capitalize(&sentiment));
            let svg = render::horizontal_bars(&heading, &geo.frame(&sentiment), ColorScale::Viridis)?;
            self.sections.push(Section::Chart { heading, svg });
        }
        if geo.excluded > 0 {
            self.sections.push(Section::Placeholder {
                message: format!("{} records without a country are not shown.", geo.excluded),
            });
        }
        self.data.geo = Some(geo);
        Ok(())
    }

    /// The selected sentiment, or all three when the filter is the wildcard.
    fn text_sentiments(&self) -> Vec<String> {
        match &self.selection.sentiment {
            FilterValue::Exact(s) => vec![s.clone()],
            FilterValue::Wildcard => SENTIMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn top_keywords(&mut self) -> Result<()> {
        let top_n = self.options.keywords.top_n;
        for sentiment in self.text_sentiments() {
            let keywords = top_keywords(self.view, &sentiment, &self.options.keywords);
            if keywords.is_empty() {
                self.sections.push(Section::Placeholder {
                    message: format!("No text data for {sentiment} sentiment."),
                });
            } else {
                let heading = format!("Top {top_n} Keywords - {}", capitalize(&sentiment));
                let svg = render::keyword_bars(&sentiment, &keywords, top_n)?;
                self.sections.push(Section::Chart { heading, svg });
            }
            self.data.keywords.push(KeywordSet { sentiment, keywords });
        }
        Ok(())
    }

    fn word_clouds(&mut self) -> Result<()> {
        for sentiment in self.text_sentiments() {
            let terms = word_cloud_terms(
                self.view,
                &sentiment,
                self.options.word_cloud_words,
                &self.options.keywords.stop_words,
            );
            if terms.is_empty() {
                self.sections.push(Section::Placeholder {
                    message: format!("No text data for {sentiment} sentiment."),
                });
            } else {
                let heading = format!("Word Cloud - {}", capitalize(&sentiment));
                let svg = render::word_cloud(&sentiment, &terms)?;
                self.sections.push(Section::Chart { heading, svg });
            }
            self.data.word_clouds.push(WordCloudSet { sentiment, terms });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply;
    use crate::store::{ColumnAvailability, Record};

    fn dataset(columns: ColumnAvailability) -> Dataset {
        let rec = |s: &str, text: &str, country: Option<&str>| Record {
            sentiment: s.into(),
            text: text.into(),
            year: "2021".into(),
            month: "January".into(),
            day_of_week: "Monday".into(),
            platform: Some("Twitter".into()),
            country: country.map(String::from),
        };
        Dataset::from_records(
            vec![
                rec("positive", "great service", Some("USA")),
                rec("negative", "bad support", None),
            ],
            columns,
        )
    }

    fn build(page: Page, ds: &Dataset, sel: &Selection) -> PageReport {
        let view = apply(ds, sel);
        build_page(page, ds, &view, sel, &PageOptions::default()).unwrap()
    }

    #[test]
    fn dashboard_has_kpis_pie_and_platforms() {
        let ds = dataset(ColumnAvailability::all());
        let r = build(Page::Dashboard, &ds, &Selection::all());
        assert_eq!(r.sections.len(), 3);
        match &r.sections[0] {
            Section::Metrics { metrics } => {
                assert_eq!(metrics[0].value, 2);
                assert_eq!(metrics[2].label, "Neutral");
                assert_eq!(metrics[2].value, 0);
            }
            other => panic!("expected metrics, got {other:?}"),
        }
        assert_eq!(r.data.platforms, Some(vec![("Twitter".to_string(), 2)]));
        assert!(r.notices.is_empty());
    }

    #[test]
    fn missing_optional_columns_become_notices() {
        let ds = dataset(ColumnAvailability::default());
        let dash = build(Page::Dashboard, &ds, &Selection::all());
        assert_eq!(dash.notices.len(), 1);
        assert!(dash.data.platforms.is_none());

        let geo = build(Page::GeoMap, &ds, &Selection::all());
        assert_eq!(
            geo.sections,
            vec![Section::Notice {
                message: "No 'Country' column available for map visualization.".into()
            }]
        );
    }

    #[test]
    fn visualizations_cover_three_dimensions() {
        let ds = dataset(ColumnAvailability::all());
        let r = build(Page::Visualizations, &ds, &Selection::all());
        let dims: Vec<Dimension> = r.data.cross_tabs.iter().map(|t| t.dimension).collect();
        assert_eq!(dims, Dimension::ALL.to_vec());
    }

    #[test]
    fn keywords_follow_sentiment_filter() {
        let ds = dataset(ColumnAvailability::all());
        let all = build(Page::Keywords, &ds, &Selection::all());
        assert_eq!(all.data.keywords.len(), 3);
        assert!(all.data.keywords[1].keywords.is_empty());
        assert!(all.sections.contains(&Section::Placeholder {
            message: "No text data for neutral sentiment.".into()
        }));

        let sel = Selection {
            sentiment: FilterValue::exact("negative"),
            ..Selection::all()
        };
        let one = build(Page::Keywords, &ds, &sel);
        assert_eq!(one.data.keywords.len(), 1);
        assert_eq!(one.data.keywords[0].keywords[0].term, "bad");
        assert_eq!(one.data.word_clouds.len(), 1);
    }

    #[test]
    fn geo_reports_excluded_rows() {
        let ds = dataset(ColumnAvailability::all());
        let r = build(Page::GeoMap, &ds, &Selection::all());
        let geo = r.data.geo.unwrap();
        assert_eq!(geo.excluded, 1);
        assert_eq!(geo.total(), 1);
    }
}
