//! Funding chart extraction from a rendered pledge-platform page.
//!
//! Three independent sources live on the page:
//! - a `Chartkick` column chart for funds raised per day (`chart-1`),
//! - a second column chart for backers per day (`chart-2`),
//! - a `data-chart` attribute on `#fundingData` with cumulative progress.
//!
//! Each source is parsed on its own. A missing or malformed source only
//! drops its own table and is reported in [`FundingCharts::missing`].

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::coerce::{coerce_date, coerce_number, coerce_text};
use crate::literal::parse_rows;
use crate::storage::{ProjectLayout, TableWriter};
use crate::types::{
    CampaignStatus, ExtractOutcome, FundingProgressEntry, HarvestResult, SeriesEntry,
};

pub const DAILY_FUNDS_CHART: &str = "chart-1";
pub const DAILY_BACKERS_CHART: &str = "chart-2";

const FUNDING_DATA_SELECTOR: &str = "div#fundingData";
const FUNDING_DATA_ATTR: &str = "data-chart";
const COUNTDOWN_SELECTOR: &str =
    ".campaign-countdown, .countdown, .campaign-status, .ending-message, [data-countdown]";

/// Tooltip markers for projected rows that are not real data points.
const TREND_MARKERS: &[&str] = &["Trending:", "Trend:"];

/// Ongoing charts always end with two non-data trailer rows.
const ONGOING_TRAILER_ROWS: usize = 2;

/// Everything extracted from one funding page.
#[derive(Debug, Clone)]
pub struct FundingCharts {
    pub status: CampaignStatus,
    pub daily_funds: Option<Vec<SeriesEntry>>,
    pub daily_backers: Option<Vec<SeriesEntry>>,
    pub progress: Option<Vec<FundingProgressEntry>>,
    pub missing: Vec<String>,
}

fn chart_marker(chart_id: &str) -> String {
    format!(r#"new Chartkick["ColumnChart"]("{chart_id}""#)
}

fn chart_pattern(chart_id: &str) -> Regex {
    let pattern = format!(
        r#"(?s)new Chartkick\["ColumnChart"\]\("{}",\s*(\[\[.*?\]\])"#,
        regex::escape(chart_id)
    );
    Regex::new(&pattern).expect("valid regex")
}

fn days_left_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bdays?\s+(left|remaining|to\s+go)\b").expect("valid regex")
    })
}

/// Find the array literal passed to a chart's initialization call.
///
/// Returns `None` if no inline script mentions the chart or the call has no
/// nested-array argument.
pub fn chart_literal(document: &Html, chart_id: &str) -> Option<String> {
    let scripts = Selector::parse("script").expect("valid selector");
    let marker = chart_marker(chart_id);
    let body = document
        .select(&scripts)
        .map(|s| s.text().collect::<String>())
        .find(|text| text.contains(&marker))?;

    chart_pattern(chart_id)
        .captures(&body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a daily chart literal into (date, value) entries, one per row.
pub fn parse_series(literal: &str, chart_id: &str) -> HarvestResult<Vec<SeriesEntry>> {
    let rows = parse_rows(literal, chart_id)?;
    Ok(rows
        .iter()
        .map(|row| SeriesEntry {
            date: row.first().and_then(coerce_date),
            value: row.get(1).and_then(coerce_number),
        })
        .collect())
}

/// Decide whether the campaign is still running from its countdown text.
pub fn detect_status(document: &Html) -> CampaignStatus {
    let countdown = Selector::parse(COUNTDOWN_SELECTOR).expect("valid selector");
    let ongoing = document
        .select(&countdown)
        .any(|el| days_left_pattern().is_match(&el.text().collect::<String>()));
    if ongoing {
        CampaignStatus::Ongoing
    } else {
        CampaignStatus::Ended
    }
}

fn is_trend_row(row: &[Value]) -> bool {
    row.get(6)
        .and_then(coerce_text)
        .map(|t| TREND_MARKERS.iter().any(|m| t.contains(m)))
        .unwrap_or(false)
}

fn number_at(row: &[Value], i: usize) -> f64 {
    row.get(i).and_then(coerce_number).unwrap_or(0.0)
}

/// Parse the funding-progress literal and apply the row rules for `status`.
///
/// Trend-tagged rows are dropped for both shapes. Ongoing campaigns keep all
/// seven columns and lose their trailing two rows; ended campaigns keep the
/// first three columns and default the rest.
pub fn parse_progress(
    literal: &str,
    status: CampaignStatus,
) -> HarvestResult<Vec<FundingProgressEntry>> {
    let rows = parse_rows(literal, FUNDING_DATA_ATTR)?;

    let mut entries: Vec<FundingProgressEntry> = rows
        .iter()
        .filter(|row| !is_trend_row(row))
        .map(|row| {
            let date = row.first().and_then(coerce_date);
            let funds_raised = number_at(row, 1);
            let goal = number_at(row, 2);
            match status {
                CampaignStatus::Ongoing => FundingProgressEntry {
                    date,
                    funds_raised,
                    goal,
                    trend: number_at(row, 3),
                    projection_low: number_at(row, 4),
                    projection_high: number_at(row, 5),
                    tooltip: row.get(6).and_then(coerce_text).unwrap_or_default(),
                },
                CampaignStatus::Ended => FundingProgressEntry {
                    date,
                    funds_raised,
                    goal,
                    trend: 0.0,
                    projection_low: 0.0,
                    projection_high: 0.0,
                    tooltip: String::new(),
                },
            }
        })
        .collect();

    if status == CampaignStatus::Ongoing {
        let keep = entries.len().saturating_sub(ONGOING_TRAILER_ROWS);
        entries.truncate(keep);
    }

    Ok(entries)
}

fn extract_series(document: &Html, chart_id: &str, missing: &mut Vec<String>) -> Option<Vec<SeriesEntry>> {
    let Some(literal) = chart_literal(document, chart_id) else {
        tracing::info!("Chart {chart_id} not found on page");
        missing.push(format!("{chart_id} chart not found"));
        return None;
    };

    match parse_series(&literal, chart_id) {
        Ok(series) => {
            tracing::debug!("Chart {chart_id}: {} entries", series.len());
            Some(series)
        }
        Err(e) => {
            tracing::warn!("Skipping chart {chart_id}: {e}");
            missing.push(format!("{chart_id} chart unreadable: {e}"));
            None
        }
    }
}

fn extract_progress(
    document: &Html,
    status: CampaignStatus,
    missing: &mut Vec<String>,
) -> Option<Vec<FundingProgressEntry>> {
    let selector = Selector::parse(FUNDING_DATA_SELECTOR).expect("valid selector");
    let Some(literal) = document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(FUNDING_DATA_ATTR))
    else {
        tracing::info!("Funding progress data not found on page");
        missing.push("funding progress data not found".to_string());
        return None;
    };

    match parse_progress(literal, status) {
        Ok(entries) => {
            tracing::debug!("Funding progress ({status:?}): {} rows", entries.len());
            Some(entries)
        }
        Err(e) => {
            tracing::warn!("Skipping funding progress: {e}");
            missing.push(format!("funding progress unreadable: {e}"));
            None
        }
    }
}

/// Extract all three funding sources from rendered HTML.
pub fn extract_funding(html: &str) -> FundingCharts {
    let document = Html::parse_document(html);
    let mut missing = Vec::new();

    let status = detect_status(&document);
    let daily_funds = extract_series(&document, DAILY_FUNDS_CHART, &mut missing);
    let daily_backers = extract_series(&document, DAILY_BACKERS_CHART, &mut missing);
    let progress = extract_progress(&document, status, &mut missing);

    FundingCharts {
        status,
        daily_funds,
        daily_backers,
        progress,
        missing,
    }
}

/// Write whichever funding tables were extracted under `funds_data/`.
///
/// Tables are written independently: a failed write is noted in the outcome
/// and the remaining tables are still attempted. Only when every attempted
/// write fails is the first error returned.
pub fn persist_funding(
    charts: &FundingCharts,
    layout: &ProjectLayout,
    platform: &str,
) -> HarvestResult<ExtractOutcome> {
    let mut outcome = ExtractOutcome {
        written: Vec::new(),
        missing: charts.missing.clone(),
    };
    let mut first_error = None;

    let mut record = |label: &str, path: PathBuf, result: HarvestResult<()>| match result {
        Ok(()) => {
            tracing::info!("{label} data saved to {}", path.display());
            outcome.written.push(path);
        }
        Err(e) => {
            tracing::error!("Failed to write {}: {e}", path.display());
            outcome.missing.push(format!("{} write failed: {e}", label.to_lowercase()));
            first_error.get_or_insert(e);
        }
    };

    if let Some(series) = &charts.daily_funds {
        let path = layout.daily_funding_path(platform);
        let result = TableWriter::write_series_file(&path, "Funds Raised", series);
        record("Daily funding", path, result);
    }

    if let Some(series) = &charts.daily_backers {
        let path = layout.daily_backers_path(platform);
        let result = TableWriter::write_series_file(&path, "Backers", series);
        record("Daily backers", path, result);
    }

    if let Some(entries) = &charts.progress {
        let path = layout.funding_progress_path(platform);
        let result = TableWriter::write_progress_file(&path, entries);
        record("Funding progress", path, result);
    }

    match first_error {
        Some(e) if outcome.written.is_empty() => Err(e),
        _ => Ok(outcome),
    }
}
