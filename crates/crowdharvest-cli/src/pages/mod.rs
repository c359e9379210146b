//! Page routines: what to do with a rendered page before its HTML is read.

pub mod funding;
pub mod scripts;
pub mod story;
pub mod updates;

use anyhow::Result;
use async_trait::async_trait;

use crate::renderer::RenderContext;
use crate::session::PageTools;

pub use funding::FundingRoutine;
pub use story::StoryRoutine;
pub use updates::{PaginationStop, UpdatesRoutine};

/// Interaction run on a loaded page before its HTML is captured.
#[async_trait]
pub trait PageRoutine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Work the page. Returned notes describe anything left unfinished.
    async fn prepare(
        &self,
        page: &mut dyn RenderContext,
        tools: &PageTools<'_>,
    ) -> Result<Vec<String>>;
}
