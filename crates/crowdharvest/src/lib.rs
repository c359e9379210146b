//! crowdharvest: extraction of funding charts, campaign stories, and update
//! posts from rendered crowdfunding pages.

pub mod coerce;
pub mod funding;
pub mod literal;
pub mod manifest;
pub mod storage;
pub mod story;
pub mod text;
pub mod types;
pub mod updates;

pub use funding::{extract_funding, persist_funding, FundingCharts};
pub use manifest::{read_manifest, ManifestColumns};
pub use storage::{ProjectLayout, TableWriter};
pub use story::{extract_story, persist_story};
pub use types::*;
pub use updates::{extract_updates, persist_updates};
