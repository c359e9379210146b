//! Environment readiness check.

use std::path::Path;

use anyhow::Result;

use crate::config::{resolve_chromium_path, BrowserOptions, PlatformConfig, CHROMIUM_ENV};

/// Print Chromium availability and the effective settings.
///
/// Returns whether a browser can be launched.
pub fn run(options: &BrowserOptions, platforms: &PlatformConfig, out_dir: &Path) -> Result<bool> {
    println!("crowdharvest doctor");
    println!("===================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium = resolve_chromium_path(options.chromium_path.as_ref());
    match &chromium {
        Some(path) if path.exists() => println!("[OK] Chromium found: {}", path.display()),
        Some(path) => println!("[!!] Chromium path does not exist: {}", path.display()),
        None => println!("[!!] Chromium NOT found. Pass --chromium or set {CHROMIUM_ENV}."),
    }

    if out_dir.exists() {
        println!("[OK] Output directory exists: {}", out_dir.display());
    } else {
        println!("[??] Output directory will be created: {}", out_dir.display());
    }

    println!();
    println!("Campaign base: {}", platforms.campaign_base);
    println!("Funding base:  {}", platforms.funding_base);
    println!("Headless:      {}", options.headless);
    println!("Ready timeout: {}ms", options.ready_timeout.as_millis());
    println!("Settle delay:  {}ms", options.settle_delay.as_millis());
    println!();

    let ready = chromium.as_deref().is_some_and(Path::exists);
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }
    Ok(ready)
}
