//! Reading the campaign manifest CSV.

use std::io::Read;
use std::path::Path;

use crate::types::{CampaignRecord, HarvestError, HarvestResult};

pub const DEFAULT_ID_COLUMN: &str = "ig.id";
pub const DEFAULT_URL_COLUMN: &str = "combined.url";

/// Identifier used when a row has no id cell.
pub const UNKNOWN_ID: &str = "unknown";

/// Which manifest columns hold the identifier and URL fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestColumns {
    pub id: String,
    pub url: String,
}

impl Default for ManifestColumns {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_COLUMN.to_string(),
            url: DEFAULT_URL_COLUMN.to_string(),
        }
    }
}

/// Read campaign records from a CSV manifest file.
pub fn read_manifest(path: &Path, columns: &ManifestColumns) -> HarvestResult<Vec<CampaignRecord>> {
    let file = std::fs::File::open(path).map_err(|e| {
        HarvestError::Manifest(format!("cannot open {}: {e}", path.display()))
    })?;
    read_manifest_from(file, columns)
}

/// Read campaign records from any CSV source.
///
/// The URL column must exist. A missing id column or empty id cell yields
/// [`UNKNOWN_ID`]. Cells are trimmed.
pub fn read_manifest_from<R: Read>(
    reader: R,
    columns: &ManifestColumns,
) -> HarvestResult<Vec<CampaignRecord>> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let url_idx = position(&columns.url).ok_or_else(|| {
        HarvestError::Manifest(format!("missing URL column '{}'", columns.url))
    })?;
    let id_idx = position(&columns.id);
    if id_idx.is_none() {
        tracing::warn!("Manifest has no '{}' column; ids default to '{UNKNOWN_ID}'", columns.id);
    }

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let id = cell(id_idx);
        records.push(CampaignRecord {
            id: if id.is_empty() { UNKNOWN_ID.to_string() } else { id },
            url_fragment: cell(Some(url_idx)),
        });
    }

    tracing::debug!("Manifest: {} rows", records.len());
    Ok(records)
}
