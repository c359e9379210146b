//! In-memory stand-in for Chromium used by the integration tests.
//!
//! Pages are keyed by URL. Scripts are recognised by comparing them with the
//! generators in `pages::scripts`, so a routine that sends anything else gets
//! an error back.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crowdharvest::story::STORY_SELECTOR;
use crowdharvest::updates::UPDATE_SELECTOR;
use crowdharvest_cli::config::BrowserOptions;
use crowdharvest_cli::pages::scripts::{
    click_button, element_count, element_exists, reveal_button, SCROLL_TO_BOTTOM_JS,
};
use crowdharvest_cli::pages::updates::LOAD_MORE_LABEL;
use crowdharvest_cli::renderer::{BrowserLauncher, NavigationResult, RenderContext, Renderer};
use crowdharvest_cli::session::DOCUMENT_READY_JS;

/// Placeholder in a page body replaced by the currently loaded update chunks.
pub const UPDATES_SLOT: &str = "{{updates}}";

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub html: String,
    /// Batches of update markup; the first is visible on load.
    pub update_chunks: Vec<String>,
    pub fail_navigation: bool,
    pub never_ready: bool,
    /// Clicking "load more" does nothing.
    pub stall: bool,
    /// Looking up the "load more" button throws.
    pub fail_lookup: bool,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub clicks: AtomicUsize,
}

/// A launcher over a fixed set of pages.
#[derive(Clone, Default)]
pub struct FakeWeb {
    pages: Arc<HashMap<String, FakePage>>,
    pub counters: Arc<Counters>,
}

impl FakeWeb {
    pub fn new(pages: impl IntoIterator<Item = (String, FakePage)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.counters.shutdowns.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.counters.clicks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for FakeWeb {
    async fn launch(&self, _options: &BrowserOptions) -> Result<Box<dyn Renderer>> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowser { web: self.clone() }))
    }
}

struct FakeBrowser {
    web: FakeWeb,
}

#[async_trait]
impl Renderer for FakeBrowser {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(FakeTab {
            web: self.web.clone(),
            state: Mutex::new(None),
        }))
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        self.web.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Loaded {
    page: FakePage,
    visible_chunks: usize,
}

impl Loaded {
    fn has_more(&self) -> bool {
        self.visible_chunks < self.page.update_chunks.len()
    }

    fn render(&self) -> String {
        let updates = self.page.update_chunks[..self.visible_chunks].concat();
        let mut html = self.page.html.replace(UPDATES_SLOT, &updates);
        if self.has_more() {
            html = html.replace(
                "</body>",
                &format!("<button>{LOAD_MORE_LABEL}</button></body>"),
            );
        }
        html
    }

    fn update_count(&self) -> u64 {
        self.page.update_chunks[..self.visible_chunks]
            .iter()
            .map(|c| c.matches("routerContentUpdate-update").count() as u64)
            .sum()
    }
}

struct FakeTab {
    web: FakeWeb,
    state: Mutex<Option<Loaded>>,
}

#[async_trait]
impl RenderContext for FakeTab {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<NavigationResult> {
        let page = self
            .web
            .pages
            .get(url)
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
        if page.fail_navigation {
            bail!("net::ERR_CONNECTION_RESET at {url}");
        }
        let visible_chunks = page.update_chunks.len().min(1);
        *self.state.lock().unwrap() = Some(Loaded {
            page: page.clone(),
            visible_chunks,
        });
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<Value> {
        let mut guard = self.state.lock().unwrap();
        let loaded = guard.as_mut().ok_or_else(|| anyhow!("no page loaded"))?;
        let ready = !loaded.page.never_ready;
        let html = loaded.render();

        if script == DOCUMENT_READY_JS {
            return Ok(json!(ready));
        }
        if script == SCROLL_TO_BOTTOM_JS {
            return Ok(json!(true));
        }
        if script == element_exists(STORY_SELECTOR) {
            return Ok(json!(ready && html.contains("routerContentStory-storyBody")));
        }
        if script == element_count(UPDATE_SELECTOR) {
            return Ok(json!(loaded.update_count()));
        }
        if script == reveal_button(LOAD_MORE_LABEL) {
            if loaded.page.fail_lookup {
                bail!("TypeError: document.querySelectorAll is not a function");
            }
            return Ok(json!(loaded.has_more()));
        }
        if script == click_button(LOAD_MORE_LABEL) {
            if !loaded.has_more() {
                return Ok(json!(false));
            }
            self.web.counters.clicks.fetch_add(1, Ordering::SeqCst);
            if !loaded.page.stall {
                loaded.visible_chunks += 1;
            }
            return Ok(json!(true));
        }
        let growth_prefix = format!("{} > ", element_count(UPDATE_SELECTOR));
        if let Some(rest) = script.strip_prefix(&growth_prefix) {
            let seen: u64 = rest
                .split_whitespace()
                .next()
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| anyhow!("malformed growth predicate"))?;
            return Ok(json!(loaded.update_count() > seen || !loaded.has_more()));
        }
        if script.contains("fundingData") && script.contains("Chartkick") {
            return Ok(json!(
                ready && (html.contains("id=\"fundingData\"") || html.contains("Chartkick"))
            ));
        }
        bail!("unsupported script: {script}")
    }

    async fn get_html(&self) -> Result<String> {
        let guard = self.state.lock().unwrap();
        guard
            .as_ref()
            .map(Loaded::render)
            .ok_or_else(|| anyhow!("no page loaded"))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Options with waits short enough for tests.
pub fn fast_options() -> BrowserOptions {
    BrowserOptions {
        ready_timeout: Duration::from_millis(60),
        poll_interval: Duration::from_millis(5),
        settle_delay: Duration::ZERO,
        story_scrolls: 2,
        ..BrowserOptions::default()
    }
}

pub fn story_html(body: &str) -> String {
    format!(
        "<html><body><div class=\"routerContentStory-storyBody\">{body}</div></body></html>"
    )
}

pub fn updates_html() -> String {
    format!("<html><body><div class=\"updates\">{UPDATES_SLOT}</div></body></html>")
}

pub fn update_post(name: &str, date: &str, text: &str) -> String {
    format!(
        "<div class=\"routerContentUpdate-update\">\
         <div class=\"routerContentUpdate-name\">{name}</div>\
         <div class=\"routerContentUpdate-date\">{date}</div>\
         <div class=\"routerContentUpdate-post\"><p>{text}</p></div>\
         </div>"
    )
}

pub fn funding_html() -> String {
    r#"<html><body><div id="fundingData" data-chart="[[&quot;2023-01-01&quot;, 100, 5000, null, null, null, &quot;Raised: $100&quot;], [&quot;2023-01-02&quot;, 350, 5000, null, null, null, &quot;Raised: $350&quot;]]"></div>
<script>
new Chartkick["ColumnChart"]("chart-1", [["2023-01-01", 100], ["2023-01-02", 250.5]], {});
new Chartkick["ColumnChart"]("chart-2", [["2023-01-01", 3], ["2023-01-02", "abc"]], {});
</script></body></html>"#
        .to_string()
}
