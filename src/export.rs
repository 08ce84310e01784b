//! Writing a built page to disk: HTML page, JSON, CSV/TSV tables, or a plain-text summary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;
use log::info;
use serde::{Deserialize, Serialize};

use crate::aggregate::Dimension;
use crate::categories::capitalize;
use crate::error::Result;
use crate::page::{PageReport, Section};
use crate::text::csv_safe_cell;

/// Output format for export (html, json, csv, tsv, txt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Html,
    Json,
    Csv,
    Tsv,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Txt => "txt",
        }
    }
}

/// Write `report` into `out_dir` and return the created files.
pub fn export_report(
    report: &PageReport,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let base = format!(
        "{}_{}",
        report.page.slug(),
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let stem = free_stem(report, format, out_dir, &base);

    let written = match format {
        ExportFormat::Html => {
            let path = out_dir.join(format!("{stem}.html"));
            fs::write(&path, render_html(report))?;
            vec![path]
        }
        ExportFormat::Json => {
            let path = out_dir.join(format!("{stem}.json"));
            fs::write(&path, serde_json::to_string_pretty(report)?)?;
            vec![path]
        }
        ExportFormat::Txt => {
            let path = out_dir.join(format!("{stem}.txt"));
            fs::write(&path, summary(report))?;
            vec![path]
        }
        ExportFormat::Csv => write_tables(report, out_dir, &stem, b',', format.extension())?,
        ExportFormat::Tsv => write_tables(report, out_dir, &stem, b'\t', format.extension())?,
    };

    for p in &written {
        info!("Wrote {}", p.display());
    }
    Ok(written)
}

/// File names an export of `report` with `stem` would create.
fn planned_files(report: &PageReport, format: ExportFormat, stem: &str) -> Vec<String> {
    let ext = format.extension();
    match format {
        ExportFormat::Csv | ExportFormat::Tsv => tables(report)
            .into_iter()
            .map(|(name, _, _)| format!("{stem}_{name}.{ext}"))
            .collect(),
        _ => vec![format!("{stem}.{ext}")],
    }
}

/// `base`, or `base_1`, `base_2`, ... when an earlier export in the same second
/// already used one of the file names.
fn free_stem(report: &PageReport, format: ExportFormat, out_dir: &Path, base: &str) -> String {
    let mut stem = base.to_string();
    let mut n = 1;
    while planned_files(report, format, &stem)
        .iter()
        .any(|f| out_dir.join(f).exists())
    {
        stem = format!("{base}_{n}");
        n += 1;
    }
    stem
}

type Table = (String, Vec<&'static str>, Vec<Vec<String>>);

/// Flatten the page data into `(name, header, rows)` tables.
fn tables(report: &PageReport) -> Vec<Table> {
    let data = &report.data;
    let mut out: Vec<Table> = Vec::new();

    if let Some(counts) = &data.sentiment_counts {
        let mut rows: Vec<Vec<String>> = counts
            .entries()
            .iter()
            .map(|(s, c)| vec![s.to_string(), c.to_string()])
            .collect();
        rows.push(vec!["total".into(), counts.total.to_string()]);
        out.push(("sentiment".into(), vec!["sentiment", "count"], rows));
    }
    if let Some(platforms) = &data.platforms {
        let rows = platforms
            .iter()
            .map(|(p, c)| vec![p.clone(), c.to_string()])
            .collect();
        out.push(("platforms".into(), vec!["platform", "count"], rows));
    }
    for tab in &data.cross_tabs {
        let mut rows = Vec::new();
        for (i, category) in tab.categories.iter().enumerate() {
            for (j, sentiment) in tab.sentiments.iter().enumerate() {
                rows.push(vec![
                    category.clone(),
                    sentiment.clone(),
                    tab.counts[i][j].to_string(),
                ]);
            }
        }
        let header = match tab.dimension {
            Dimension::Year => "year",
            Dimension::Month => "month",
            Dimension::DayOfWeek => "day_of_week",
        };
        out.push((
            format!("by_{header}"),
            vec![header, "sentiment", "count"],
            rows,
        ));
    }
    if let Some(geo) = &data.geo {
        let rows = geo
            .entries
            .iter()
            .map(|e| vec![e.country.clone(), e.sentiment.clone(), e.count.to_string()])
            .collect();
        out.push(("geo".into(), vec!["country", "sentiment", "count"], rows));
    }
    if !data.keywords.is_empty() {
        let mut rows = Vec::new();
        for set in &data.keywords {
            for (rank, k) in set.keywords.iter().enumerate() {
                rows.push(vec![
                    set.sentiment.clone(),
                    (rank + 1).to_string(),
                    k.term.clone(),
                    k.count.to_string(),
                ]);
            }
        }
        out.push((
            "keywords".into(),
            vec!["sentiment", "rank", "term", "count"],
            rows,
        ));
    }
    if !data.word_clouds.is_empty() {
        let mut rows = Vec::new();
        for set in &data.word_clouds {
            for t in &set.terms {
                rows.push(vec![
                    set.sentiment.clone(),
                    t.term.clone(),
                    t.count.to_string(),
                    format!("{:.4}", t.weight),
                ]);
            }
        }
        out.push((
            "wordcloud".into(),
            vec!["sentiment", "term", "count", "weight"],
            rows,
        ));
    }
    out
}

fn write_tables(
    report: &PageReport,
    out_dir: &Path,
    stem: &str,
    delimiter: u8,
    ext: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, header, rows) in tables(report) {
        let path = out_dir.join(format!("{stem}_{name}.{ext}"));
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(&path)?;
        wtr.write_record(&header)?;
        for row in rows {
            wtr.write_record(row.into_iter().map(csv_safe_cell))?;
        }
        wtr.flush()?;
        written.push(path);
    }
    Ok(written)
}

/// Word-cloud terms listed per sentiment in the text summary.
const SUMMARY_CLOUD_TERMS: usize = 15;

/// Plain-text summary of a page, as printed to stdout.
pub fn summary(report: &PageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.title);
    let _ = writeln!(out, "Filters: {}", report.selection);
    let _ = writeln!(out, "Records: {}", report.rows);

    for notice in &report.notices {
        let _ = writeln!(out, "Notice: {notice}");
    }

    let data = &report.data;
    if let Some(counts) = &data.sentiment_counts {
        let _ = writeln!(out, "\nSentiment counts:");
        for (s, c) in counts.entries() {
            let _ = writeln!(out, "  {}\t{}", capitalize(s), c);
        }
    }
    if let Some(platforms) = &data.platforms {
        let _ = writeln!(out, "\nTop platforms:");
        for (p, c) in platforms {
            let _ = writeln!(out, "  {p}\t{c}");
        }
    }
    for tab in &data.cross_tabs {
        let _ = writeln!(out, "\nBy {} ({}):", tab.dimension.label(), tab.sentiments.join("/"));
        for (i, category) in tab.categories.iter().enumerate() {
            let cells: Vec<String> = tab.counts[i].iter().map(|c| c.to_string()).collect();
            let _ = writeln!(out, "  {category}\t{}", cells.join("\t"));
        }
    }
    if let Some(geo) = &data.geo {
        let _ = writeln!(out, "\nCountry-wise mentions:");
        for e in &geo.entries {
            let _ = writeln!(out, "  {}\t{}\t{}", e.country, e.sentiment, e.count);
        }
        if geo.excluded > 0 {
            let _ = writeln!(out, "  ({} records without a country)", geo.excluded);
        }
    }
    for set in &data.keywords {
        let _ = writeln!(out, "\nTop keywords - {}:", capitalize(&set.sentiment));
        if set.keywords.is_empty() {
            let _ = writeln!(out, "  No text data for {} sentiment.", set.sentiment);
        }
        for k in &set.keywords {
            let _ = writeln!(out, "  {}\t{}", k.term, k.count);
        }
    }
    for set in &data.word_clouds {
        let _ = writeln!(out, "\nWord cloud - {}:", capitalize(&set.sentiment));
        if set.terms.is_empty() {
            let _ = writeln!(out, "  No text data for {} sentiment.", set.sentiment);
            continue;
        }
        let terms: Vec<&str> = set
            .terms
            .iter()
            .take(SUMMARY_CLOUD_TERMS)
            .map(|t| t.term.as_str())
            .collect();
        let _ = writeln!(out, "  {}", terms.join(", "));
    }
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Self-contained HTML page with inline SVG charts.
pub fn render_html(report: &PageReport) -> String {
    let mut body = String::new();
    for section in &report.sections {
        match section {
            Section::Metrics { metrics } => {
                body.push_str("<div class=\"kpis\">");
                for m in metrics {
                    let _ = write!(
                        body,
                        "<div class=\"kpi\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
                        escape(&m.label),
                        m.value
                    );
                }
                body.push_str("</div>\n");
            }
            Section::Chart { heading, svg } => {
                let _ = writeln!(
                    body,
                    "<section class=\"chart\"><h2>{}</h2>{}</section>",
                    escape(heading),
                    svg
                );
            }
            Section::Legend { entries } => {
                let items: Vec<String> = entries
                    .iter()
                    .map(|(label, color)| {
                        format!(
                            "<span class=\"swatch\" style=\"background:{}\"></span>{}",
                            escape(color),
                            escape(label)
                        )
                    })
                    .collect();
                let _ = writeln!(
                    body,
                    "<p class=\"legend\"><strong>Sentiment Color Legend:</strong> {}</p>",
                    items.join(" | ")
                );
            }
            Section::Notice { message } => {
                let _ = writeln!(body, "<p class=\"notice\">{}</p>", escape(message));
            }
            Section::Placeholder { message } => {
                let _ = writeln!(body, "<p class=\"placeholder\">{}</p>", escape(message));
            }
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <p class="filters">{filters} &middot; {rows} records</p>
        {body}
        <footer>Generated {generated}</footer>
    </div>
</body>
</html>"#,
        title = escape(&report.title),
        css = inline_css(),
        filters = escape(&report.selection.to_string()),
        rows = report.rows,
        body = body,
        generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
}

fn inline_css() -> &'static str {
    "body{font-family:sans-serif;margin:0;background:#fafafa;color:#222}\
.container{max-width:1000px;margin:0 auto;padding:24px}\
.filters{color:#555}\
.kpis{display:flex;gap:16px;margin:16px 0}\
.kpi{flex:1;background:#fff;border:1px solid #ddd;border-radius:6px;padding:12px}\
.kpi .label{color:#666;font-size:14px}.kpi .value{font-size:28px;font-weight:bold}\
.chart{background:#fff;border:1px solid #ddd;border-radius:6px;margin:16px 0;padding:8px}\
.chart svg{max-width:100%;height:auto}\
.swatch{display:inline-block;width:12px;height:12px;margin:0 4px}\
.notice{background:#fff3cd;border:1px solid #ffe08a;padding:8px;border-radius:4px}\
.placeholder{background:#e7f1ff;border:1px solid #b6d4fe;padding:8px;border-radius:4px}\
footer{color:#888;font-size:12px;margin-top:24px}"
}
