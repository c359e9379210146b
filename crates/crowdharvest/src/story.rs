//! Campaign story extraction.

use scraper::{Html, Selector};

use crate::storage::{write_record, ProjectLayout};
use crate::text::{clean_text, element_text};
use crate::types::{ExtractOutcome, HarvestResult, StoryRecord};

/// Container holding the campaign narrative.
pub const STORY_SELECTOR: &str = "div.routerContentStory-storyBody";

/// Extract the story text, or `None` if the container is not on the page.
pub fn extract_story(html: &str) -> Option<StoryRecord> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(STORY_SELECTOR).expect("valid selector");
    let section = document.select(&selector).next()?;

    Some(StoryRecord {
        content: clean_text(&element_text(&section, "\n")),
    })
}

/// Write `story.json` if a story was found.
pub fn persist_story(
    story: Option<&StoryRecord>,
    layout: &ProjectLayout,
) -> HarvestResult<ExtractOutcome> {
    let Some(story) = story else {
        tracing::warn!("Story section not found in {}", layout.root().display());
        return Ok(ExtractOutcome::unavailable("story section not found"));
    };

    let path = layout.story_path();
    write_record(&path, story)?;
    tracing::info!("Story content saved to {}", path.display());

    Ok(ExtractOutcome {
        written: vec![path],
        missing: Vec::new(),
    })
}
