//! Updates page routine: press "See More Updates" until it is gone.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use crowdharvest::updates::UPDATE_SELECTOR;

use super::scripts::{click_button, element_count, grew_or_exhausted, reveal_button};
use super::PageRoutine;
use crate::renderer::RenderContext;
use crate::session::PageTools;

pub const LOAD_MORE_LABEL: &str = "See More Updates";

/// Why the "load more" loop ended.
///
/// Every variant ends the loop; only `Exhausted` means the page said there
/// is nothing left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationStop {
    Exhausted,
    LookupFailed(String),
    Stalled,
    PageLimit,
}

impl fmt::Display for PaginationStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationStop::Exhausted => write!(f, "no more updates to load"),
            PaginationStop::LookupFailed(e) => write!(f, "load-more lookup failed: {e}"),
            PaginationStop::Stalled => write!(f, "load-more produced no new updates"),
            PaginationStop::PageLimit => write!(f, "load-more click limit reached"),
        }
    }
}

pub struct UpdatesRoutine;

impl UpdatesRoutine {
    /// Click through every page of updates. Returns clicks made and why it stopped.
    pub async fn load_all(
        &self,
        page: &mut dyn RenderContext,
        tools: &PageTools<'_>,
    ) -> (u32, PaginationStop) {
        let reveal = reveal_button(LOAD_MORE_LABEL);
        let click = click_button(LOAD_MORE_LABEL);
        let count = element_count(UPDATE_SELECTOR);
        let mut clicks = 0u32;

        loop {
            if clicks >= tools.options.max_load_more {
                return (clicks, PaginationStop::PageLimit);
            }

            match page.execute_js(&reveal).await {
                Ok(v) if v.as_bool() == Some(true) => {}
                Ok(_) => return (clicks, PaginationStop::Exhausted),
                Err(e) => return (clicks, PaginationStop::LookupFailed(format!("{e:#}"))),
            }
            tools.settle().await;

            let seen = match page.execute_js(&count).await {
                Ok(v) => v.as_u64().unwrap_or(0),
                Err(e) => return (clicks, PaginationStop::LookupFailed(format!("{e:#}"))),
            };

            match page.execute_js(&click).await {
                Ok(v) if v.as_bool() == Some(true) => clicks += 1,
                Ok(_) => return (clicks, PaginationStop::Exhausted),
                Err(e) => return (clicks, PaginationStop::LookupFailed(format!("{e:#}"))),
            }

            let grown = grew_or_exhausted(UPDATE_SELECTOR, seen, LOAD_MORE_LABEL);
            if let Err(e) = tools.waiter.until(page, &grown, "more updates").await {
                tracing::debug!("{e}");
                return (clicks, PaginationStop::Stalled);
            }
        }
    }
}

#[async_trait]
impl PageRoutine for UpdatesRoutine {
    fn name(&self) -> &'static str {
        "updates"
    }

    async fn prepare(
        &self,
        page: &mut dyn RenderContext,
        tools: &PageTools<'_>,
    ) -> Result<Vec<String>> {
        let (clicks, stop) = self.load_all(page, tools).await;
        match &stop {
            PaginationStop::Exhausted => {
                tracing::info!("Loaded all updates after {clicks} load-more clicks");
                Ok(Vec::new())
            }
            other => {
                tracing::warn!("Stopped loading updates after {clicks} clicks: {other}");
                Ok(vec![other.to_string()])
            }
        }
    }
}
