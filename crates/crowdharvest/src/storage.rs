//! Per-project output layout and the CSV / JSON writers behind it.
//!
//! ```text
//! <project>/story.json
//! <project>/updates/<poster>_<date>.json
//! <project>/funds_data/daily_funding_<platform>.csv
//! <project>/funds_data/daily_backers_<platform>.csv
//! <project>/funds_data/funding_progress_<platform>.csv
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::text::sanitize_key;
use crate::types::{FundingProgressEntry, HarvestError, HarvestResult, SeriesEntry};

pub const STORY_FILE: &str = "story.json";
pub const UPDATES_DIR: &str = "updates";
pub const FUNDS_DIR: &str = "funds_data";

const PROGRESS_HEADERS: [&str; 7] = [
    "Date",
    "Funds Raised",
    "Goal",
    "Trend",
    "Projection Low",
    "Projection High",
    "Tooltip",
];

/// File locations for one project directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout for `<output_root>/<id>`.
    ///
    /// The id must name a single directory directly under `output_root`.
    pub fn for_project(output_root: &Path, id: &str) -> HarvestResult<Self> {
        let id = id.trim();
        let single_component = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && Path::new(id).is_relative();
        if !single_component {
            return Err(HarvestError::InvalidInput(format!(
                "project id {id:?} is not a plain directory name"
            )));
        }
        Ok(Self::new(output_root.join(id)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the project directory if it does not exist yet.
    pub fn ensure_root(&self) -> HarvestResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn story_path(&self) -> PathBuf {
        self.root.join(STORY_FILE)
    }

    pub fn updates_dir(&self) -> PathBuf {
        self.root.join(UPDATES_DIR)
    }

    /// Record path for an update post, keyed by sanitized poster and date.
    pub fn update_path(&self, poster_name: &str, post_date: &str) -> PathBuf {
        let key = format!("{}_{}", sanitize_key(poster_name), sanitize_key(post_date));
        self.updates_dir().join(format!("{key}.json"))
    }

    pub fn funds_dir(&self) -> PathBuf {
        self.root.join(FUNDS_DIR)
    }

    pub fn daily_funding_path(&self, platform: &str) -> PathBuf {
        self.funds_dir().join(format!("daily_funding_{platform}.csv"))
    }

    pub fn daily_backers_path(&self, platform: &str) -> PathBuf {
        self.funds_dir().join(format!("daily_backers_{platform}.csv"))
    }

    pub fn funding_progress_path(&self, platform: &str) -> PathBuf {
        self.funds_dir().join(format!("funding_progress_{platform}.csv"))
    }
}

/// Render a number the way a spreadsheet would show it: `100`, `12.5`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

fn format_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn create_parent(path: &Path) -> HarvestResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writer for the tabular chart outputs.
pub struct TableWriter;

impl TableWriter {
    /// Write a `Date,<value_header>` series to any writer.
    pub fn write_series_to<W: Write>(
        writer: W,
        value_header: &str,
        entries: &[SeriesEntry],
    ) -> HarvestResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Date", value_header])?;
        for entry in entries {
            let value = entry.value.map(format_number).unwrap_or_default();
            csv.write_record([format_date(entry.date), value])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write a series to a file, creating parent directories.
    pub fn write_series_file(
        path: &Path,
        value_header: &str,
        entries: &[SeriesEntry],
    ) -> HarvestResult<()> {
        create_parent(path)?;
        let file = std::fs::File::create(path)?;
        Self::write_series_to(file, value_header, entries)
    }

    /// Write funding-progress rows to any writer.
    pub fn write_progress_to<W: Write>(
        writer: W,
        entries: &[FundingProgressEntry],
    ) -> HarvestResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(PROGRESS_HEADERS)?;
        for e in entries {
            csv.write_record([
                format_date(e.date),
                format_number(e.funds_raised),
                format_number(e.goal),
                format_number(e.trend),
                format_number(e.projection_low),
                format_number(e.projection_high),
                e.tooltip.clone(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write funding-progress rows to a file, creating parent directories.
    pub fn write_progress_file(path: &Path, entries: &[FundingProgressEntry]) -> HarvestResult<()> {
        create_parent(path)?;
        let file = std::fs::File::create(path)?;
        Self::write_progress_to(file, entries)
    }
}

/// Serialize a record as pretty JSON, replacing any existing file.
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> HarvestResult<()> {
    create_parent(path)?;
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, record)?;
    Ok(())
}

/// Read back a record written by [`write_record`].
pub fn read_record<T: DeserializeOwned>(path: &Path) -> HarvestResult<T> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
