//! SVG renderers on top of `plotters`.
//!
//! Each function takes one aggregator output shape and returns a standalone SVG
//! document as a string. Empty inputs produce a "No data" placeholder instead of a chart.

use std::f64::consts::PI;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::aggregate::{CrossTab, Keyword, SentimentCounts, WeightedTerm};
use crate::categories::{SentimentPalette, capitalize};
use crate::error::{DashboardError, Result};

pub const CHART_SIZE: (u32, u32) = (900, 450);
pub const WORD_CLOUD_SIZE: (u32, u32) = (800, 400);
const FONT: &str = "sans-serif";

/// Continuous colour scales for count-coloured bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Blues,
    Viridis,
}

impl ColorScale {
    /// `t` in [0, 1].
    pub fn color(self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            ColorScale::Blues => interpolate(&[(198, 219, 239), (107, 174, 214), (8, 48, 107)], t),
            ColorScale::Viridis => interpolate(
                &[
                    (68, 1, 84),
                    (59, 82, 139),
                    (33, 145, 140),
                    (94, 201, 98),
                    (253, 231, 37),
                ],
                t,
            ),
        }
    }
}

fn interpolate(stops: &[(u8, u8, u8)], t: f64) -> RGBColor {
    let last = stops.len() - 1;
    let pos = t * last as f64;
    let i = (pos.floor() as usize).min(last.saturating_sub(1));
    let f = pos - i as f64;
    let (a, b) = (stops[i], stops[(i + 1).min(last)]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn render_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Render(e.to_string())
}

fn centered() -> Pos {
    Pos::new(HPos::Center, VPos::Center)
}

/// Title plus a centred message, used wherever a chart would be empty.
pub fn placeholder(title: &str, message: &str) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        root.draw(&Text::new(
            title.to_string(),
            (CHART_SIZE.0 as i32 / 2, 24),
            (FONT, 22).into_font().color(&BLACK).pos(centered()),
        ))
        .map_err(render_err)?;
        root.draw(&Text::new(
            message.to_string(),
            (CHART_SIZE.0 as i32 / 2, CHART_SIZE.1 as i32 / 2),
            (FONT, 18).into_font().color(&RGBColor(120, 120, 120)).pos(centered()),
        ))
        .map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Donut chart of the three sentiment classes, hole at 60% of the radius.
pub fn sentiment_pie(counts: &SentimentCounts, title: &str) -> Result<String> {
    let entries = counts.entries();
    let total: usize = entries.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return placeholder(title, "No data");
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        root.draw(&Text::new(
            title.to_string(),
            (CHART_SIZE.0 as i32 / 2, 24),
            (FONT, 22).into_font().color(&BLACK).pos(centered()),
        ))
        .map_err(render_err)?;

        let center = (CHART_SIZE.0 as i32 / 3, CHART_SIZE.1 as i32 / 2 + 15);
        let radius = 160.0;
        // start at twelve o'clock, clockwise
        let mut start = -PI / 2.0;
        for (label, count) in entries {
            if count == 0 {
                continue;
            }
            let sweep = 2.0 * PI * count as f64 / total as f64;
            let steps = ((sweep / (2.0 * PI)) * 360.0).ceil().max(2.0) as usize;
            let mut points = vec![center];
            for s in 0..=steps {
                let a = start + sweep * s as f64 / steps as f64;
                points.push((
                    center.0 + (radius * a.cos()).round() as i32,
                    center.1 + (radius * a.sin()).round() as i32,
                ));
            }
            root.draw(&Polygon::new(points, SentimentPalette::color(label).filled()))
                .map_err(render_err)?;
            start += sweep;
        }
        root.draw(&Circle::new(center, (radius * 0.6) as i32, WHITE.filled()))
            .map_err(render_err)?;

        let legend_x = CHART_SIZE.0 as i32 * 2 / 3;
        for (i, (label, count)) in entries.iter().enumerate() {
            let y = 150 + i as i32 * 40;
            root.draw(&Rectangle::new(
                [(legend_x, y - 8), (legend_x + 16, y + 8)],
                SentimentPalette::color(label).filled(),
            ))
            .map_err(render_err)?;
            let share = 100.0 * *count as f64 / total as f64;
            root.draw(&Text::new(
                format!("{}: {} ({:.1}%)", capitalize(label), count, share),
                (legend_x + 26, y),
                (FONT, 16)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Left, VPos::Center)),
            ))
            .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Grouped bar chart: one group per category, one bar per sentiment column.
pub fn cross_tab_chart(tab: &CrossTab, title: &str) -> Result<String> {
    if tab.total() == 0 {
        return placeholder(title, "No data");
    }

    let n = tab.categories.len();
    let groups = tab.sentiments.len().max(1);
    let y_max = tab.max_cell() as f64 * 1.15;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..n as f64, 0f64..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_desc("Count")
            .draw()
            .map_err(render_err)?;

        let slot = 0.8 / groups as f64;
        for (j, sentiment) in tab.sentiments.iter().enumerate() {
            let color = SentimentPalette::color(sentiment);
            chart
                .draw_series(tab.counts.iter().enumerate().map(|(i, row)| {
                    let x0 = i as f64 + 0.1 + slot * j as f64;
                    Rectangle::new([(x0, 0.0), (x0 + slot, row[j] as f64)], color.filled())
                }))
                .map_err(render_err)?
                .label(sentiment.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        for (i, category) in tab.categories.iter().enumerate() {
            let (px, py) = chart.backend_coord(&(i as f64 + 0.5, 0.0));
            root.draw(&Text::new(
                category.clone(),
                (px, py + 14),
                (FONT, 13).into_font().color(&BLACK).pos(centered()),
            ))
            .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Horizontal bars, first item on top, coloured by count on `scale`.
pub fn horizontal_bars(title: &str, items: &[(String, usize)], scale: ColorScale) -> Result<String> {
    if items.is_empty() {
        return placeholder(title, "No data");
    }

    let n = items.len();
    let max = items.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let height = CHART_SIZE.1.max(80 + 28 * n as u32);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_SIZE.0, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(160)
            .build_cartesian_2d(0f64..max as f64 * 1.1, 0f64..n as f64)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_label_formatter(&|_| String::new())
            .x_desc("Count")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(items.iter().enumerate().map(|(rank, (_, count))| {
                let y = (n - 1 - rank) as f64;
                let color = scale.color(*count as f64 / max as f64);
                Rectangle::new([(0.0, y + 0.15), (*count as f64, y + 0.85)], color.filled())
            }))
            .map_err(render_err)?;

        for (rank, (name, count)) in items.iter().enumerate() {
            let y = (n - 1 - rank) as f64 + 0.5;
            let (px, py) = chart.backend_coord(&(0.0, y));
            root.draw(&Text::new(
                format!("{name} ({count})"),
                (px - 8, py),
                (FONT, 13)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Right, VPos::Center)),
            ))
            .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Vertical keyword bars in the sentiment's colour.
pub fn keyword_bars(sentiment: &str, keywords: &[Keyword], top_n: usize) -> Result<String> {
    let title = format!("Top {top_n} Keywords - {}", capitalize(sentiment));
    if keywords.is_empty() {
        return placeholder(&title, &format!("No text data for {sentiment} sentiment."));
    }

    let n = keywords.len();
    let max = keywords.iter().map(|k| k.count).max().unwrap_or(0).max(1);
    let color = SentimentPalette::color(sentiment);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, 22))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..n as f64, 0f64..max as f64 * 1.15)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_desc("Frequency")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(keywords.iter().enumerate().map(|(i, k)| {
                Rectangle::new(
                    [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, k.count as f64)],
                    color.filled(),
                )
            }))
            .map_err(render_err)?;

        for (i, k) in keywords.iter().enumerate() {
            let (px, py) = chart.backend_coord(&(i as f64 + 0.5, 0.0));
            root.draw(&Text::new(
                k.term.clone(),
                (px, py + 14),
                (FONT, 13).into_font().color(&BLACK).pos(centered()),
            ))
            .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Word cloud: terms laid out in rows, largest first, font size scaled by weight.
pub fn word_cloud(sentiment: &str, terms: &[WeightedTerm]) -> Result<String> {
    let title = capitalize(sentiment);
    if terms.is_empty() {
        return placeholder(&title, &format!("No text data for {sentiment} sentiment."));
    }

    let (w, h) = (WORD_CLOUD_SIZE.0 as i32, WORD_CLOUD_SIZE.1 as i32);
    let base = SentimentPalette::color(sentiment);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, WORD_CLOUD_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let pad = 10;
        let (mut x, mut y) = (pad, pad);
        let mut row_height = 0;
        for term in terms {
            let size = (12.0 + 52.0 * term.weight).round() as i32;
            // rough advance width of a proportional font
            let width = (term.term.chars().count() as f64 * size as f64 * 0.6).ceil() as i32;
            if x + width > w - pad && x > pad {
                x = pad;
                y += row_height + 6;
                row_height = 0;
            }
            if y + size > h - pad {
                break;
            }
            let alpha = 0.45 + 0.55 * term.weight;
            let color = base.mix(alpha);
            root.draw(&Text::new(
                term.term.clone(),
                (x, y),
                (FONT, size as u32)
                    .into_font()
                    .color(&color)
                    .pos(Pos::new(HPos::Left, VPos::Top)),
            ))
            .map_err(render_err)?;
            x += width + 10;
            row_height = row_height.max(size);
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}
