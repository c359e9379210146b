//! Bounded polling for page readiness.

use std::time::{Duration, Instant};

use crate::config::BrowserOptions;
use crate::renderer::RenderContext;

/// Failures of a browser session.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    #[error("page script failed: {0}")]
    Script(String),
}

/// Polls a JavaScript predicate until it returns `true` or time runs out.
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn from_options(options: &BrowserOptions) -> Self {
        Self::new(options.ready_timeout, options.poll_interval)
    }

    /// Wait for `predicate` to evaluate to `true` in the page.
    ///
    /// A script error counts as "not yet"; only the deadline ends the wait.
    pub async fn until(
        &self,
        page: &dyn RenderContext,
        predicate: &str,
        what: &str,
    ) -> Result<(), SessionError> {
        let start = Instant::now();
        loop {
            match page.execute_js(predicate).await {
                Ok(value) if value.as_bool() == Some(true) => return Ok(()),
                Ok(_) => {}
                Err(e) => tracing::debug!("Readiness check for {what} failed: {e:#}"),
            }

            let waited = start.elapsed();
            if waited >= self.timeout {
                return Err(SessionError::Timeout {
                    what: what.to_string(),
                    waited_ms: waited.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval.min(self.timeout - waited)).await;
        }
    }
}
