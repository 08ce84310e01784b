//! Record store: the immutable dataset, read once per process.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Dataset columns the dashboard knows about, named exactly as in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Sentiment,
    Text,
    Year,
    Month,
    DayOfWeek,
    Platform,
    Country,
}

impl Column {
    pub const REQUIRED: [Column; 5] = [
        Column::Sentiment,
        Column::Text,
        Column::Year,
        Column::Month,
        Column::DayOfWeek,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Sentiment => "Sentiment",
            Column::Text => "Text",
            Column::Year => "Year",
            Column::Month => "Month",
            Column::DayOfWeek => "Day_of_Week",
            Column::Platform => "Platform",
            Column::Country => "Country",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub sentiment: String,
    pub text: String,
    pub year: String,
    pub month: String,
    pub day_of_week: String,
    pub platform: Option<String>,
    pub country: Option<String>,
}

/// Row shape as it comes out of the CSV reader. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Sentiment")]
    sentiment: Option<String>,
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Month")]
    month: Option<String>,
    #[serde(rename = "Day_of_Week")]
    day_of_week: Option<String>,
    #[serde(rename = "Platform", default)]
    platform: Option<String>,
    #[serde(rename = "Country", default)]
    country: Option<String>,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        Record {
            sentiment: raw.sentiment.unwrap_or_default(),
            text: raw.text.unwrap_or_default(),
            year: raw.year.as_deref().map(normalize_year).unwrap_or_default(),
            month: raw.month.unwrap_or_default(),
            day_of_week: raw.day_of_week.unwrap_or_default(),
            platform: raw.platform.filter(|p| !p.is_empty()),
            country: raw.country.filter(|c| !c.is_empty()),
        }
    }
}

/// Which optional columns were present in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ColumnAvailability {
    pub platform: bool,
    pub country: bool,
}

impl ColumnAvailability {
    pub fn all() -> Self {
        ColumnAvailability {
            platform: true,
            country: true,
        }
    }

    /// Optional columns that are absent, in header order.
    pub fn missing(&self) -> Vec<Column> {
        let mut out = Vec::new();
        if !self.platform {
            out.push(Column::Platform);
        }
        if !self.country {
            out.push(Column::Country);
        }
        out
    }
}

/// The loaded table. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
    columns: ColumnAvailability,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>, columns: ColumnAvailability) -> Self {
        Dataset { records, columns }
    }

    /// Parse a delimited table. `origin` only labels errors.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, origin: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| unavailable(origin, format!("unreadable header row: {e}")))?
            .clone();
        let has = |col: Column| headers.iter().any(|h| h == col.header());

        for col in Column::REQUIRED {
            if !has(col) {
                return Err(unavailable(
                    origin,
                    format!("missing required column '{col}'"),
                ));
            }
        }
        let columns = ColumnAvailability {
            platform: has(Column::Platform),
            country: has(Column::Country),
        };

        let mut records = Vec::new();
        for (i, row) in rdr.deserialize::<RawRecord>().enumerate() {
            // +2: header is line 1
            let raw = row.map_err(|e| unavailable(origin, format!("row {}: {e}", i + 2)))?;
            records.push(Record::from(raw));
        }
        Ok(Dataset { records, columns })
    }

    /// Read a dataset file. `.tsv` files are tab-delimited, everything else comma-delimited.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| unavailable(path, e.to_string()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        Dataset::from_reader(file, delimiter, path)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> ColumnAvailability {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load-once handle around the dataset file.
///
/// Construct one per process and pass it by reference; the first successful
/// [`RecordStore::load`] is cached and every later call returns the same dataset.
/// A failed load is not cached.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    cell: OnceCell<Dataset>,
}

impl RecordStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        RecordStore {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<&Dataset> {
        self.cell.get_or_try_init(|| {
            debug!("Reading dataset from {}", self.path.display());
            let dataset = Dataset::from_path(&self.path)?;
            info!(
                "Loaded {} records from {} (platform: {}, country: {})",
                dataset.len(),
                self.path.display(),
                dataset.columns.platform,
                dataset.columns.country
            );
            Ok(dataset)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Years may arrive as `2021`, ` 2021 ` or `2021.0`; all become `"2021"`.
pub fn normalize_year(raw: &str) -> String {
    let t = raw.trim();
    if let Ok(v) = t.parse::<f64>() {
        if v.is_finite() && v.fract() == 0.0 {
            return format!("{}", v as i64);
        }
    }
    t.to_string()
}

fn unavailable(path: &Path, reason: String) -> DashboardError {
    DashboardError::DataUnavailable {
        path: path.to_path_buf(),
        reason,
    }
}
