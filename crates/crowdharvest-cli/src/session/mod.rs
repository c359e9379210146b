//! Browser session lifecycle and readiness polling.

pub mod manager;
pub mod wait;

pub use manager::{BrowserSession, PageTools, RenderedPage, DOCUMENT_READY_JS};
pub use wait::{SessionError, Waiter};
