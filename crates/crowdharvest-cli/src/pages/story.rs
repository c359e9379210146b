//! Story page routine: scroll to trigger lazy content, then wait for the story.

use anyhow::Result;
use async_trait::async_trait;

use crowdharvest::story::STORY_SELECTOR;

use super::scripts::{element_exists, SCROLL_TO_BOTTOM_JS};
use super::PageRoutine;
use crate::renderer::RenderContext;
use crate::session::PageTools;

pub struct StoryRoutine;

#[async_trait]
impl PageRoutine for StoryRoutine {
    fn name(&self) -> &'static str {
        "story"
    }

    async fn prepare(
        &self,
        page: &mut dyn RenderContext,
        tools: &PageTools<'_>,
    ) -> Result<Vec<String>> {
        for i in 0..tools.options.story_scrolls {
            if let Err(e) = page.execute_js(SCROLL_TO_BOTTOM_JS).await {
                tracing::debug!("Scroll {} failed: {e:#}", i + 1);
            }
            tools.settle().await;
        }

        // A missing container is reported by extraction, not here.
        if let Err(e) = tools
            .waiter
            .until(page, &element_exists(STORY_SELECTOR), "story section")
            .await
        {
            tracing::info!("{e}");
        }

        Ok(Vec::new())
    }
}
