//! Scoped browser sessions: launch, render one page, always shut down.

use anyhow::Result;

use crate::config::BrowserOptions;
use crate::pages::PageRoutine;
use crate::renderer::{BrowserLauncher, RenderContext, Renderer};

use super::wait::{SessionError, Waiter};

/// Script predicate for a fully loaded document.
pub const DOCUMENT_READY_JS: &str = "document.readyState === 'complete'";

/// Settings and helpers handed to a [`PageRoutine`].
pub struct PageTools<'a> {
    pub options: &'a BrowserOptions,
    pub waiter: Waiter,
}

impl<'a> PageTools<'a> {
    pub fn new(options: &'a BrowserOptions) -> Self {
        Self {
            options,
            waiter: Waiter::from_options(options),
        }
    }

    /// Fixed pause after a scroll or click.
    pub async fn settle(&self) {
        tokio::time::sleep(self.options.settle_delay).await;
    }
}

/// HTML captured after a routine finished with the page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub final_url: String,
    pub html: String,
    /// Anything the routine could not finish, e.g. pagination cut short.
    pub notes: Vec<String>,
}

/// Opens pages in a dedicated browser, one browser per call.
pub struct BrowserSession<'a> {
    launcher: &'a dyn BrowserLauncher,
    options: BrowserOptions,
}

impl<'a> BrowserSession<'a> {
    pub fn new(launcher: &'a dyn BrowserLauncher, options: BrowserOptions) -> Self {
        Self { launcher, options }
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// Render `url`, let `routine` work the page, and return its HTML.
    ///
    /// The browser is shut down before this returns, whether navigation,
    /// the routine, or HTML capture failed or not.
    pub async fn open(&self, url: &str, routine: &dyn PageRoutine) -> Result<RenderedPage> {
        let renderer = self
            .launcher
            .launch(&self.options)
            .await
            .map_err(|e| SessionError::Launch(format!("{e:#}")))?;

        let result = self.render(renderer.as_ref(), url, routine).await;

        if let Err(e) = renderer.shutdown().await {
            tracing::warn!("Browser shutdown failed: {e:#}");
        }
        result
    }

    async fn render(
        &self,
        renderer: &dyn Renderer,
        url: &str,
        routine: &dyn PageRoutine,
    ) -> Result<RenderedPage> {
        let mut page = renderer.new_context().await?;
        let result = self.drive(page.as_mut(), url, routine).await;
        if let Err(e) = page.close().await {
            tracing::debug!("Closing page failed: {e:#}");
        }
        result
    }

    async fn drive(
        &self,
        page: &mut dyn RenderContext,
        url: &str,
        routine: &dyn PageRoutine,
    ) -> Result<RenderedPage> {
        let nav = page
            .navigate(url, self.options.navigation_timeout)
            .await
            .map_err(|e| SessionError::Navigation {
                url: url.to_string(),
                message: format!("{e:#}"),
            })?;
        tracing::debug!("Loaded {} in {}ms", nav.final_url, nav.load_time_ms);

        let tools = PageTools::new(&self.options);
        if let Err(e) = tools.waiter.until(page, DOCUMENT_READY_JS, "document ready").await {
            tracing::warn!("{e}; continuing with what has rendered");
        }

        tracing::debug!("Running {} routine on {url}", routine.name());
        let notes = routine.prepare(page, &tools).await?;

        let html = page
            .get_html()
            .await
            .map_err(|e| SessionError::Script(format!("{e:#}")))?;

        Ok(RenderedPage {
            final_url: nav.final_url,
            html,
            notes,
        })
    }
}
