//! Chromium-based renderer using chromiumoxide.

use super::{BrowserLauncher, NavigationResult, RenderContext, Renderer};
use crate::config::{resolve_chromium_path, BrowserOptions, CHROMIUM_ENV};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Launches one headless Chromium per call.
pub struct ChromiumLauncher;

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn Renderer>> {
        Ok(Box::new(ChromiumRenderer::launch(options).await?))
    }
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Page viewport matching the window, so pages lay out at the full size.
fn page_viewport(options: &BrowserOptions) -> Viewport {
    let (width, height) = options.window_size;
    Viewport {
        width,
        height,
        ..Viewport::default()
    }
}

impl ChromiumRenderer {
    /// Launch a Chromium instance configured from `options`.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = resolve_chromium_path(options.chromium_path.as_ref()).with_context(
            || format!("Chromium not found. Pass --chromium or set {CHROMIUM_ENV}."),
        )?;
        tracing::debug!("Launching Chromium at {}", chrome_path.display());

        let (width, height) = options.window_size;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(width, height)
            .viewport(page_viewport(options));
        if !options.headless {
            builder = builder.with_head();
        }
        for arg in options.launch_args() {
            builder = builder.arg(arg);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser, handler })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let closed = this.browser.close().await;
        let _ = this.browser.wait().await;
        this.handler.abort();
        closed.context("failed to close Chromium")?;
        Ok(())
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(timeout, self.page.goto(url)).await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_follows_window_size() {
        let viewport = page_viewport(&BrowserOptions::default());
        assert_eq!((viewport.width, viewport.height), (1920, 1080));
        assert!(!viewport.emulating_mobile);
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_and_execute_js() {
        let options = BrowserOptions::default();
        let renderer = ChromiumLauncher
            .launch(&options)
            .await
            .expect("failed to launch browser");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");

        let nav = ctx
            .navigate(
                "data:text/html,<h1>Hello</h1><p>World</p>",
                Duration::from_secs(10),
            )
            .await
            .expect("navigation failed");
        assert!(nav.load_time_ms < 10000);

        let ua = ctx
            .execute_js("navigator.userAgent")
            .await
            .expect("JS execution failed");
        assert!(ua.as_str().unwrap().contains("Chrome/91.0.4472.124"));

        let html = ctx.get_html().await.expect("get_html failed");
        assert!(html.contains("<h1>Hello</h1>"));

        ctx.close().await.expect("close failed");
        renderer.shutdown().await.expect("shutdown failed");
    }
}
