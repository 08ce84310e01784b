#![forbid(unsafe_code)]
//! # Sentiment Dashboard CLI
//!
//! Command-line front end for the `sentiment_dashboard` crate.
//! One run renders one page of the dashboard for one filter selection.
//!
//! ## Features
//! - Four pages: dashboard KPIs, time trends, geographic breakdown, keywords and word clouds.
//! - Sentiment, year, month, and day-of-week filters (`All` disables a filter).
//! - Export as a self-contained HTML page, JSON, CSV/TSV tables, or a text summary.
//! - Optional `sentiment_dashboard.toml` config; CLI flags take precedence.
//!
//! ## Example
//! ```bash
//! cargo run --release -- --data clean_sentimentdataset.csv --page keywords --sentiment positive
//! ```
//!
//! See `--help` for all available options.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, error, info};
use sentiment_dashboard::{
    CliConfig, Config, DashboardError, ExportFormat, FilterDomain, FilterValue, Page,
    RecordStore, Selection, dashboard_page, export_report, summary,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Dataset file (CSV; .tsv files are read tab-delimited)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Config file (default: ./sentiment_dashboard.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page to render
    #[arg(long, value_enum, default_value = "dashboard")]
    page: Page,

    /// Render every page
    #[arg(long, default_value_t = false, conflicts_with = "page")]
    all_pages: bool,

    /// Sentiment filter
    #[arg(long, default_value = "All")]
    sentiment: String,

    /// Year filter
    #[arg(long, default_value = "All")]
    year: String,

    /// Month filter
    #[arg(long, default_value = "All")]
    month: String,

    /// Day-of-week filter
    #[arg(long, default_value = "All")]
    day: String,

    /// Output format for export (html, json, csv, tsv, txt)
    #[arg(long, value_enum)]
    export_format: Option<ExportFormat>,

    /// Directory for exported files
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Number of keywords per sentiment
    #[arg(long)]
    top_n: Option<usize>,

    /// Vocabulary cap before keyword ranking
    #[arg(long)]
    max_features: Option<usize>,

    /// Number of terms per word cloud
    #[arg(long)]
    word_cloud_words: Option<usize>,

    /// Optional path to additional stopword file (.txt, one word per line)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Print the available filter values and exit
    #[arg(long, default_value_t = false)]
    list_filters: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// No logging and no summary on stdout
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn selection(&self) -> Selection {
        let parse = |s: &str| s.parse::<FilterValue>().unwrap_or_default();
        Selection {
            sentiment: parse(&self.sentiment),
            year: parse(&self.year),
            month: parse(&self.month),
            day_of_week: parse(&self.day),
        }
    }

    fn cli_config(&self) -> CliConfig {
        CliConfig {
            data: self.data.clone(),
            top_n: self.top_n,
            max_features: self.max_features,
            word_cloud_words: self.word_cloud_words,
            output_dir: self.out_dir.clone(),
            stopwords: self.stopwords.clone(),
            export_format: self.export_format,
        }
    }
}

fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), DashboardError> {
    let mut config = Config::resolve(cli.config.as_deref())?;
    config.merge_with_cli(&cli.cli_config());
    let options = config.page_options()?;

    let store = RecordStore::new(config.data_path());

    if cli.list_filters {
        let domain = FilterDomain::from_dataset(store.load()?);
        println!("Sentiment: All, {}", domain.sentiments.join(", "));
        println!("Year: All, {}", domain.years.join(", "));
        println!("Month: All, {}", domain.months.join(", "));
        println!("Day of Week: All, {}", domain.weekdays.join(", "));
        return Ok(());
    }

    let selection = cli.selection();
    debug!("Selection: {selection}");
    let pages: Vec<Page> = if cli.all_pages {
        Page::ALL.to_vec()
    } else {
        vec![cli.page]
    };

    for page in pages {
        let report = dashboard_page(&store, page, &selection, &options)?;
        let written = export_report(&report, config.export_format(), &config.output_dir())?;
        info!("{}: {} file(s) written", page.slug(), written.len());
        if !cli.quiet {
            println!("{}", summary(&report));
            for p in written {
                println!("Saved {}", p.display());
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        error!("{e}");
        process::exit(1);
    }
}
