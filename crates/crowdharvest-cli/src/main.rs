//! crowdharvest command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crowdharvest::{read_manifest, CampaignRecord, ManifestColumns, ProjectLayout};
use crowdharvest_cli::config::{BrowserOptions, PlatformConfig};
use crowdharvest_cli::orchestrator::{extract_and_persist, Orchestrator, Step};
use crowdharvest_cli::renderer::chromium::ChromiumLauncher;
use crowdharvest_cli::session::BrowserSession;

#[derive(Parser)]
#[command(
    name = "crowdharvest",
    about = "Scrape crowdfunding campaign stories, updates, and funding charts",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Root directory for per-project output.
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    /// Path to a Chromium binary.
    #[arg(long, global = true)]
    chromium: Option<PathBuf>,

    /// Show the browser window.
    #[arg(long, global = true)]
    headful: bool,

    /// Upper bound for each readiness wait, in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Pause after each scroll or click, in milliseconds.
    #[arg(long, global = true, default_value_t = 1_000)]
    settle_ms: u64,

    /// Base URL of the crowdfunding platform.
    #[arg(long, global = true)]
    campaign_base: Option<String>,

    /// Base URL of the pledge-management platform.
    #[arg(long, global = true)]
    funding_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every project listed in a CSV manifest.
    Run {
        manifest: PathBuf,

        /// Column holding the project identifier.
        #[arg(long, default_value = crowdharvest::manifest::DEFAULT_ID_COLUMN)]
        id_column: String,

        /// Column holding the campaign URL fragment.
        #[arg(long, default_value = crowdharvest::manifest::DEFAULT_URL_COLUMN)]
        url_column: String,
    },

    /// Scrape a single project.
    Project {
        id: String,
        /// URL fragment, e.g. `/projects/some-campaign`.
        url_fragment: String,
    },

    /// Scrape one campaign story page.
    Story {
        url: String,
        /// Directory to write into (defaults to --out-dir).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Scrape one campaign updates page.
    Updates {
        url: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Scrape one funding-chart page.
    Funding {
        url: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Extract from a saved HTML file without a browser.
    Parse {
        kind: StepKind,
        html: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check that a browser can be launched.
    Doctor,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   crowdharvest completions bash > ~/.local/share/bash-completion/completions/crowdharvest
    ///   crowdharvest completions zsh > ~/.zfunc/_crowdharvest
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StepKind {
    Story,
    Updates,
    Funding,
}

impl From<StepKind> for Step {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Story => Step::Story,
            StepKind::Updates => Step::Updates,
            StepKind::Funding => Step::Funding,
        }
    }
}

impl Cli {
    fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: !self.headful,
            chromium_path: self.chromium.clone(),
            ready_timeout: Duration::from_millis(self.timeout_ms),
            settle_delay: Duration::from_millis(self.settle_ms),
            ..BrowserOptions::default()
        }
    }

    fn platforms(&self) -> PlatformConfig {
        let mut platforms = PlatformConfig::default();
        if let Some(base) = &self.campaign_base {
            platforms.campaign_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = &self.funding_base {
            platforms.funding_base = base.trim_end_matches('/').to_string();
        }
        platforms
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = cli.browser_options();
    let platforms = cli.platforms();
    let launcher = ChromiumLauncher;

    match &cli.command {
        Commands::Run {
            manifest,
            id_column,
            url_column,
        } => {
            let columns = ManifestColumns {
                id: id_column.clone(),
                url: url_column.clone(),
            };
            let records = read_manifest(manifest, &columns)
                .with_context(|| format!("reading manifest {}", manifest.display()))?;
            tracing::info!("Loaded {} projects from {}", records.len(), manifest.display());

            let session = BrowserSession::new(&launcher, options);
            let orchestrator = Orchestrator::new(session, platforms, cli.out_dir.clone());
            let (_, summary) = orchestrator.run_batch(&records).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Project { id, url_fragment } => {
            let record = CampaignRecord {
                id: id.clone(),
                url_fragment: url_fragment.clone(),
            };
            let session = BrowserSession::new(&launcher, options);
            let orchestrator = Orchestrator::new(session, platforms, cli.out_dir.clone());
            let report = orchestrator.run_project(&record).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Story { url, out } => {
            scrape_one(Step::Story, url, out.as_deref(), &cli, &launcher).await?;
        }
        Commands::Updates { url, out } => {
            scrape_one(Step::Updates, url, out.as_deref(), &cli, &launcher).await?;
        }
        Commands::Funding { url, out } => {
            scrape_one(Step::Funding, url, out.as_deref(), &cli, &launcher).await?;
        }

        Commands::Parse { kind, html, out } => {
            let source = std::fs::read_to_string(html)
                .with_context(|| format!("reading {}", html.display()))?;
            let layout = ProjectLayout::new(out.as_deref().unwrap_or(&cli.out_dir));
            layout.ensure_root()?;
            let outcome = extract_and_persist((*kind).into(), &source, &layout, &platforms.label)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Doctor => {
            let ready = crowdharvest_cli::doctor::run(&options, &platforms, &cli.out_dir)?;
            if !ready {
                std::process::exit(1);
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "crowdharvest", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Run one scraper against an explicit URL, writing straight into `out`.
async fn scrape_one(
    step: Step,
    url: &str,
    out: Option<&Path>,
    cli: &Cli,
    launcher: &ChromiumLauncher,
) -> anyhow::Result<()> {
    let layout = ProjectLayout::new(out.unwrap_or(&cli.out_dir));
    layout.ensure_root()?;

    let session = BrowserSession::new(launcher, cli.browser_options());
    let orchestrator = Orchestrator::new(session, cli.platforms(), cli.out_dir.clone());
    let result = orchestrator.scrape_step(step, url, &layout).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
