use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::aggregate::KeywordOptions;
use crate::error::{DashboardError, Result};
use crate::export::ExportFormat;
use crate::page::PageOptions;
use crate::text::StopWords;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sentiment_dashboard.toml";
pub const DEFAULT_DATA_FILE: &str = "clean_sentimentdataset.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dataset file (CSV, or TSV by extension)
    pub data: Option<PathBuf>,

    /// Keywords shown per sentiment
    pub top_n: Option<usize>,

    /// Vocabulary cap before keyword ranking
    pub max_features: Option<usize>,

    /// Terms per word cloud
    pub word_cloud_words: Option<usize>,

    /// Directory for exported files
    pub output_dir: Option<PathBuf>,

    /// Extra stop words, one per line
    pub stopwords: Option<PathBuf>,

    /// Output format (html, json, csv, tsv, txt)
    pub export_format: Option<ExportFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: Some(PathBuf::from(DEFAULT_DATA_FILE)),
            top_n: Some(10),
            max_features: Some(1000),
            word_cloud_words: Some(200),
            output_dir: Some(PathBuf::from(".")),
            stopwords: None,
            export_format: Some(ExportFormat::Html),
        }
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    pub data: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub max_features: Option<usize>,
    pub word_cloud_words: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub stopwords: Option<PathBuf>,
    pub export_format: Option<ExportFormat>,
}

impl Config {
    /// Parse a TOML config file. Missing keys stay `None`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| DashboardError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults, overlaid with the given file, or with `sentiment_dashboard.toml` if present.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        match explicit {
            Some(path) => config.overlay(Config::load_from_file(path)?),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                debug!("Using {DEFAULT_CONFIG_FILE}");
                config.overlay(Config::load_from_file(DEFAULT_CONFIG_FILE)?)
            }
            None => {}
        }
        Ok(config)
    }

    fn overlay(&mut self, file: Config) {
        self.data = file.data.or(self.data.take());
        self.top_n = file.top_n.or(self.top_n);
        self.max_features = file.max_features.or(self.max_features);
        self.word_cloud_words = file.word_cloud_words.or(self.word_cloud_words);
        self.output_dir = file.output_dir.or(self.output_dir.take());
        self.stopwords = file.stopwords.or(self.stopwords.take());
        self.export_format = file.export_format.or(self.export_format);
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        if let Some(ref data) = cli_config.data {
            self.data = Some(data.clone());
        }
        if let Some(top_n) = cli_config.top_n {
            self.top_n = Some(top_n);
        }
        if let Some(max_features) = cli_config.max_features {
            self.max_features = Some(max_features);
        }
        if let Some(words) = cli_config.word_cloud_words {
            self.word_cloud_words = Some(words);
        }
        if let Some(ref dir) = cli_config.output_dir {
            self.output_dir = Some(dir.clone());
        }
        if let Some(ref stopwords) = cli_config.stopwords {
            self.stopwords = Some(stopwords.clone());
        }
        if let Some(format) = cli_config.export_format {
            self.export_format = Some(format);
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.data
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn export_format(&self) -> ExportFormat {
        self.export_format.unwrap_or(ExportFormat::Html)
    }

    /// Keyword and word-cloud settings, loading the extra stop-word file if configured.
    pub fn page_options(&self) -> Result<PageOptions> {
        let top_n = self.top_n.unwrap_or(10);
        if top_n == 0 {
            return Err(DashboardError::Config("top_n must be at least 1".into()));
        }
        let max_features = self.max_features.unwrap_or(1000);
        if max_features == 0 {
            return Err(DashboardError::Config(
                "max_features must be at least 1".into(),
            ));
        }
        let mut stop_words = StopWords::english();
        if let Some(ref path) = self.stopwords {
            stop_words.extend_from_file(path)?;
        }
        Ok(PageOptions {
            keywords: KeywordOptions {
                top_n,
                max_features: Some(max_features),
                stop_words,
            },
            word_cloud_words: self.word_cloud_words.unwrap_or(200),
        })
    }
}
