//! Funding page routine: wait until chart data is on the page.

use anyhow::Result;
use async_trait::async_trait;

use super::scripts::{element_exists, script_mentions};
use super::PageRoutine;
use crate::renderer::RenderContext;
use crate::session::PageTools;

const FUNDING_DATA: &str = "div#fundingData";
const CHART_LIBRARY: &str = "Chartkick";

pub struct FundingRoutine;

#[async_trait]
impl PageRoutine for FundingRoutine {
    fn name(&self) -> &'static str {
        "funding"
    }

    async fn prepare(
        &self,
        page: &mut dyn RenderContext,
        tools: &PageTools<'_>,
    ) -> Result<Vec<String>> {
        let predicate = format!(
            "({}) || ({})",
            element_exists(FUNDING_DATA),
            script_mentions(CHART_LIBRARY)
        );
        if let Err(e) = tools.waiter.until(page, &predicate, "funding charts").await {
            tracing::info!("{e}");
        }
        Ok(Vec::new())
    }
}
