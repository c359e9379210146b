//! Update post extraction.

use scraper::{ElementRef, Html, Selector};

use crate::storage::{write_record, ProjectLayout};
use crate::text::{clean_text, element_text, inline_text};
use crate::types::{ExtractOutcome, HarvestResult, UpdatePost};

/// One update post container.
pub const UPDATE_SELECTOR: &str = "div.routerContentUpdate-update";
const NAME_SELECTOR: &str = "div.routerContentUpdate-name";
const DATE_SELECTOR: &str = "div.routerContentUpdate-date";
const POST_SELECTOR: &str = "div.routerContentUpdate-post";

fn first_in<'a>(update: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    update.select(selector).next()
}

/// Extract every update post in page order.
///
/// A container missing its name, date, or body is skipped.
pub fn extract_updates(html: &str) -> Vec<UpdatePost> {
    let document = Html::parse_document(html);
    let updates = Selector::parse(UPDATE_SELECTOR).expect("valid selector");
    let name = Selector::parse(NAME_SELECTOR).expect("valid selector");
    let date = Selector::parse(DATE_SELECTOR).expect("valid selector");
    let post = Selector::parse(POST_SELECTOR).expect("valid selector");

    document
        .select(&updates)
        .enumerate()
        .filter_map(|(i, update)| {
            let parts = (
                first_in(&update, &name),
                first_in(&update, &date),
                first_in(&update, &post),
            );
            match parts {
                (Some(n), Some(d), Some(p)) => Some(UpdatePost {
                    poster_name: inline_text(&n),
                    post_date: inline_text(&d),
                    post_content: clean_text(&element_text(&p, "\n")),
                }),
                _ => {
                    tracing::warn!("Update #{i} is missing its name, date, or body; skipped");
                    None
                }
            }
        })
        .collect()
}

/// Write one record per post under `updates/`.
///
/// Posts that share a sanitized poster and date land on the same file; the
/// later post wins.
pub fn persist_updates(
    posts: &[UpdatePost],
    layout: &ProjectLayout,
) -> HarvestResult<ExtractOutcome> {
    if posts.is_empty() {
        tracing::warn!("No updates found for {}", layout.root().display());
        return Ok(ExtractOutcome::unavailable("no updates found"));
    }

    let mut outcome = ExtractOutcome::default();
    for post in posts {
        let path = layout.update_path(&post.poster_name, &post.post_date);
        if outcome.written.contains(&path) {
            tracing::debug!("Overwriting {} with a later post", path.display());
        } else {
            outcome.written.push(path.clone());
        }
        write_record(&path, post)?;
        tracing::info!("Post saved to {}", path.display());
    }

    Ok(outcome)
}
