//! crowdharvest: browser-driven scraping of crowdfunding campaigns.
//!
//! Page rendering lives here; extraction and output formats live in the
//! `crowdharvest` core crate.

pub mod config;
pub mod doctor;
pub mod orchestrator;
pub mod pages;
pub mod renderer;
pub mod session;

pub use config::{BrowserOptions, PlatformConfig};
pub use orchestrator::{extract_and_persist, BatchSummary, Orchestrator, ProjectReport, Step};
pub use renderer::chromium::ChromiumLauncher;
pub use session::BrowserSession;
