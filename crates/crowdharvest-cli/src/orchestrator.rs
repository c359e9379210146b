//! Per-project orchestration over a manifest.
//!
//! Each project runs story, updates, and funding in order. Every step ends
//! in a [`StepResult`]; nothing a step does can stop the steps or projects
//! after it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crowdharvest::{
    extract_funding, extract_story, extract_updates, persist_funding, persist_story,
    persist_updates, CampaignRecord, ExtractOutcome, HarvestResult, OutcomeStatus, ProjectLayout,
};

use crate::config::PlatformConfig;
use crate::pages::{FundingRoutine, PageRoutine, StoryRoutine, UpdatesRoutine};
use crate::session::BrowserSession;

/// One of the three per-project scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Story,
    Updates,
    Funding,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Story, Step::Updates, Step::Funding];

    pub fn routine(&self) -> &'static dyn PageRoutine {
        match self {
            Step::Story => &StoryRoutine,
            Step::Updates => &UpdatesRoutine,
            Step::Funding => &FundingRoutine,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Story => "story",
            Step::Updates => "updates",
            Step::Funding => "funding",
        })
    }
}

/// Extract `step`'s data from rendered HTML and write it under `layout`.
pub fn extract_and_persist(
    step: Step,
    html: &str,
    layout: &ProjectLayout,
    platform_label: &str,
) -> HarvestResult<ExtractOutcome> {
    match step {
        Step::Story => persist_story(extract_story(html).as_ref(), layout),
        Step::Updates => persist_updates(&extract_updates(html), layout),
        Step::Funding => persist_funding(&extract_funding(html), layout, platform_label),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Done(ExtractOutcome),
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub url: String,
    pub result: StepResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectOutcome {
    Skipped { reason: String },
    Failed { reason: String },
    Ran { steps: Vec<StepReport> },
}

/// Overall result for one manifest row.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub id: String,
    pub outcome: ProjectOutcome,
}

/// Coarse classification of a project report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Skipped,
    Complete,
    Partial,
    Failed,
}

impl ProjectReport {
    /// `Failed` if any step failed, `Complete` if every step wrote everything,
    /// otherwise `Partial`.
    pub fn verdict(&self) -> Verdict {
        match &self.outcome {
            ProjectOutcome::Skipped { .. } => Verdict::Skipped,
            ProjectOutcome::Failed { .. } => Verdict::Failed,
            ProjectOutcome::Ran { steps } => {
                let mut verdict = Verdict::Complete;
                for s in steps {
                    match &s.result {
                        StepResult::Failed { .. } => return Verdict::Failed,
                        StepResult::Done(o) if o.status() != OutcomeStatus::Complete => {
                            verdict = Verdict::Partial
                        }
                        StepResult::Done(_) => {}
                    }
                }
                verdict
            }
        }
    }
}

/// Counts over a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, report: &ProjectReport) {
        match report.verdict() {
            Verdict::Skipped => self.skipped += 1,
            Verdict::Complete => self.complete += 1,
            Verdict::Partial => self.partial += 1,
            Verdict::Failed => self.failed += 1,
        }
        if report.verdict() != Verdict::Skipped {
            self.processed += 1;
        }
    }
}

/// Drives the scrapes for every project in a manifest.
pub struct Orchestrator<'a> {
    session: BrowserSession<'a>,
    platforms: PlatformConfig,
    output_root: PathBuf,
}

impl<'a> Orchestrator<'a> {
    pub fn new(session: BrowserSession<'a>, platforms: PlatformConfig, output_root: PathBuf) -> Self {
        Self {
            session,
            platforms,
            output_root,
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Render one page and persist what `step` extracts from it.
    pub async fn scrape_step(&self, step: Step, url: &str, layout: &ProjectLayout) -> StepResult {
        let page = match self.session.open(url, step.routine()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Error while fetching {url}: {e:#}");
                return StepResult::Failed {
                    reason: format!("{e:#}"),
                };
            }
        };

        match extract_and_persist(step, &page.html, layout, &self.platforms.label) {
            Ok(mut outcome) => {
                outcome.missing.extend(page.notes);
                StepResult::Done(outcome)
            }
            Err(e) => {
                tracing::error!("Error while saving {step} for {}: {e}", layout.root().display());
                StepResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run all three steps for one manifest row.
    pub async fn run_project(&self, record: &CampaignRecord) -> ProjectReport {
        let id = record.id.clone();
        if record.url_fragment.trim().is_empty() {
            tracing::warn!("Skipping project {id}: URL is missing.");
            return ProjectReport {
                id,
                outcome: ProjectOutcome::Skipped {
                    reason: "URL is missing".to_string(),
                },
            };
        }

        let layout = match ProjectLayout::for_project(&self.output_root, &record.id) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::error!("Rejecting project {id}: {e}");
                return ProjectReport {
                    id,
                    outcome: ProjectOutcome::Failed {
                        reason: e.to_string(),
                    },
                };
            }
        };
        if let Err(e) = layout.ensure_root() {
            tracing::error!("Cannot create directory for project {id}: {e}");
            return ProjectReport {
                id,
                outcome: ProjectOutcome::Failed {
                    reason: e.to_string(),
                },
            };
        }

        let urls = self.platforms.urls_for(record.url_fragment.trim());
        let mut steps = Vec::with_capacity(Step::ALL.len());
        for step in Step::ALL {
            let url = match step {
                Step::Story => &urls.story,
                Step::Updates => &urls.updates,
                Step::Funding => &urls.funding,
            };
            tracing::info!("Scraping {step} for project {id} from {url}");
            let result = self.scrape_step(step, url, &layout).await;
            log_step(&id, step, &result);
            steps.push(StepReport {
                step,
                url: url.clone(),
                result,
            });
        }

        ProjectReport {
            id,
            outcome: ProjectOutcome::Ran { steps },
        }
    }

    /// Run every record in order and summarize.
    pub async fn run_batch(&self, records: &[CampaignRecord]) -> (Vec<ProjectReport>, BatchSummary) {
        let mut summary = BatchSummary::default();
        let mut reports = Vec::with_capacity(records.len());

        for record in records {
            let report = self.run_project(record).await;
            summary.record(&report);
            reports.push(report);
        }

        tracing::info!(
            "Batch finished: {} processed, {} skipped, {} complete, {} partial, {} failed",
            summary.processed,
            summary.skipped,
            summary.complete,
            summary.partial,
            summary.failed
        );
        (reports, summary)
    }
}

fn log_step(id: &str, step: Step, result: &StepResult) {
    match result {
        StepResult::Done(outcome) => match outcome.status() {
            OutcomeStatus::Complete => {
                tracing::info!("Project {id}: {step} complete ({} files)", outcome.written.len())
            }
            status => tracing::warn!(
                "Project {id}: {step} {status:?} ({} files); missing: {}",
                outcome.written.len(),
                outcome.missing.join("; ")
            ),
        },
        StepResult::Failed { reason } => {
            tracing::error!("Error scraping {step} for project {id}: {reason}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ran(results: Vec<StepResult>) -> ProjectReport {
        ProjectReport {
            id: "1".to_string(),
            outcome: ProjectOutcome::Ran {
                steps: results
                    .into_iter()
                    .map(|result| StepReport {
                        step: Step::Story,
                        url: String::new(),
                        result,
                    })
                    .collect(),
            },
        }
    }

    fn complete() -> StepResult {
        StepResult::Done(ExtractOutcome {
            written: vec![PathBuf::from("story.json")],
            missing: Vec::new(),
        })
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(ran(vec![complete(), complete()]).verdict(), Verdict::Complete);
        assert_eq!(
            ran(vec![complete(), StepResult::Done(ExtractOutcome::unavailable("x"))]).verdict(),
            Verdict::Partial
        );
        assert_eq!(
            ran(vec![
                StepResult::Done(ExtractOutcome::unavailable("x")),
                StepResult::Failed { reason: "boom".into() },
            ])
            .verdict(),
            Verdict::Failed
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(&ran(vec![complete()]));
        summary.record(&ProjectReport {
            id: "2".into(),
            outcome: ProjectOutcome::Skipped { reason: "URL is missing".into() },
        });
        assert_eq!(
            summary,
            BatchSummary { processed: 1, skipped: 1, complete: 1, partial: 0, failed: 0 }
        );
    }

    #[test]
    fn test_extract_and_persist_offline() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let html = r#"<html><body><div class="routerContentStory-storyBody"><p>Hi</p></div></body></html>"#;

        let outcome = extract_and_persist(Step::Story, html, &layout, "indiegogo").unwrap();
        assert_eq!(outcome.status(), OutcomeStatus::Complete);

        let outcome = extract_and_persist(Step::Funding, html, &layout, "indiegogo").unwrap();
        assert_eq!(outcome.status(), OutcomeStatus::Unavailable);
        assert!(!layout.funds_dir().exists());
    }
}
