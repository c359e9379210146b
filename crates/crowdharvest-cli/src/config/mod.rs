//! Configuration values and resolution.
//!
//! Every option is an immutable value built once in `main` and passed down;
//! nothing here is read from global state after startup.

use std::path::PathBuf;
use std::time::Duration;

/// Env var that points at a Chromium binary.
pub const CHROMIUM_ENV: &str = "CROWDHARVEST_CHROMIUM";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/91.0.4472.124 Safari/537.36";

/// Browser launch and page-wait settings.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: String,
    /// Explicit Chromium binary; otherwise discovered at launch.
    pub chromium_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
    /// Upper bound for every readiness poll.
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    /// Pause after a scroll or click before polling resumes.
    pub settle_delay: Duration,
    pub story_scrolls: u32,
    /// Safety cap on "load more" clicks per page.
    pub max_load_more: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chromium_path: None,
            navigation_timeout: Duration::from_secs(30),
            ready_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            settle_delay: Duration::from_secs(1),
            story_scrolls: 3,
            max_load_more: 200,
        }
    }
}

impl BrowserOptions {
    /// Command-line arguments passed to Chromium on launch.
    pub fn launch_args(&self) -> Vec<String> {
        vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", self.user_agent),
        ]
    }
}

/// Base URLs for the two platforms and the label used in output names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Crowdfunding platform hosting the story and updates.
    pub campaign_base: String,
    /// Pledge-management platform hosting the funding charts.
    pub funding_base: String,
    pub updates_suffix: String,
    /// Goes into `daily_funding_<label>.csv` and friends.
    pub label: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            campaign_base: "https://www.indiegogo.com".to_string(),
            funding_base: "https://www.backerkit.com/c/indiegogo".to_string(),
            updates_suffix: "#/updates/all".to_string(),
            label: "indiegogo".to_string(),
        }
    }
}

/// The three pages scraped for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUrls {
    pub story: String,
    pub updates: String,
    pub funding: String,
}

impl PlatformConfig {
    /// Build the page URLs for a manifest URL fragment.
    pub fn urls_for(&self, fragment: &str) -> ProjectUrls {
        let story = format!("{}{fragment}", self.campaign_base);
        ProjectUrls {
            updates: format!("{story}{}", self.updates_suffix),
            funding: format!("{}{fragment}", self.funding_base),
            story,
        }
    }
}

/// Find the Chromium binary path.
///
/// Order: explicit path, `CROWDHARVEST_CHROMIUM`, `~/.crowdharvest/chromium`,
/// system `PATH`, common macOS location.
pub fn resolve_chromium_path(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.clone());
    }

    if let Ok(p) = std::env::var(CHROMIUM_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".crowdharvest/chromium/chrome-linux64/chrome"),
            home.join(".crowdharvest/chromium/chrome"),
        ];
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_for_fragment() {
        let urls = PlatformConfig::default().urls_for("/projects/livall-pikaboost-2");
        assert_eq!(urls.story, "https://www.indiegogo.com/projects/livall-pikaboost-2");
        assert_eq!(
            urls.updates,
            "https://www.indiegogo.com/projects/livall-pikaboost-2#/updates/all"
        );
        assert_eq!(
            urls.funding,
            "https://www.backerkit.com/c/indiegogo/projects/livall-pikaboost-2"
        );
    }

    #[test]
    fn test_launch_args_carry_user_agent() {
        let options = BrowserOptions::default();
        let args = options.launch_args();
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args
            .iter()
            .any(|a| a.starts_with("--user-agent=") && a.contains("Chrome/91.0.4472.124")));
    }

    #[test]
    fn test_explicit_chromium_path_wins() {
        let explicit = PathBuf::from("/opt/chrome/chrome");
        assert_eq!(resolve_chromium_path(Some(&explicit)), Some(explicit));
    }
}
