//! Core data types for campaign records, extracted series, and outcomes.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the input manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    pub url_fragment: String,
}

/// A (date, value) pair from a daily chart.
///
/// Used for both the daily-funds and daily-backers charts. Either field is
/// `None` when the source value could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
}

/// One row of the funding-progress chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingProgressEntry {
    pub date: Option<NaiveDate>,
    pub funds_raised: f64,
    pub goal: f64,
    pub trend: f64,
    pub projection_low: f64,
    pub projection_high: f64,
    pub tooltip: String,
}

/// Whether a campaign is still collecting funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Ongoing,
    Ended,
}

/// The cleaned narrative text of a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub content: String,
}

/// A single update post published by the campaign creators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePost {
    pub poster_name: String,
    pub post_date: String,
    pub post_content: String,
}

/// How much of an extraction made it to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Complete,
    Partial,
    Unavailable,
}

/// Files written by one extractor, plus notes on what could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOutcome {
    pub written: Vec<PathBuf>,
    pub missing: Vec<String>,
}

impl ExtractOutcome {
    /// An outcome where nothing was written.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            written: Vec::new(),
            missing: vec![reason.into()],
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        match (self.written.is_empty(), self.missing.is_empty()) {
            (true, _) => OutcomeStatus::Unavailable,
            (false, true) => OutcomeStatus::Complete,
            (false, false) => OutcomeStatus::Partial,
        }
    }

    /// Merge another outcome into this one.
    pub fn absorb(&mut self, other: ExtractOutcome) {
        self.written.extend(other.written);
        self.missing.extend(other.missing);
    }
}

/// Errors that can occur in the extraction library.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed literal in {context}: {message}")]
    Literal { context: String, message: String },

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
