use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::Instrument;

use crate::checkout::{Checkout, CheckoutOutcome};
use crate::classify::{classify, Label};
use crate::event::{self, PullRequestEvent};
use crate::format::FormatCheck;
use crate::github::GitHub;
use crate::queue::Handler;
use crate::signing::commits_are_signed;

mod comment;

/// Pause between classifying a PR and labelling it.
///
/// The project board automation strips labels set in the first moments after a PR opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WaitPolicy {
    delay: Duration,
}

impl WaitPolicy {
    pub(crate) const fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    pub(crate) const fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    async fn wait(&self) {
        if !self.delay.is_zero() {
            tracing::debug!("Waiting {:?} before labelling", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    pub label_delay: WaitPolicy,
    /// Where temporary checkouts are created (default: system temp dir)
    pub work_dir: Option<PathBuf>,
}

/// How a message was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Not an opened pull request
    Skipped,
    /// Labelled, but the PR does not merge cleanly
    Conflict { label: Label },
    Reviewed {
        label: Label,
        signed: bool,
        unformatted: Vec<String>,
    },
}

/// Reviews newly opened pull requests.
pub(crate) struct Pipeline<G, C, F> {
    config: PipelineConfig,
    github: G,
    checkout: C,
    format: F,
}

impl<G, C, F> Pipeline<G, C, F>
where
    G: GitHub,
    C: Checkout,
    F: FormatCheck,
{
    pub(crate) fn new(config: PipelineConfig, github: G, checkout: C, format: F) -> Self {
        Self {
            config,
            github,
            checkout,
            format,
        }
    }

    /// Decode a queue message and review the PR it describes.
    /// Errors are GitHub or git failures that warrant redelivery.
    pub(crate) async fn handle_message(&self, body: &[u8]) -> Result<Outcome> {
        let Some(event) = event::decode(body) else {
            return Ok(Outcome::Skipped);
        };
        let span = tracing::info_span!(
            "review",
            repo = %event.base_repo(),
            pr = event.number,
            url = %event.pull_request.url,
        );
        self.review(&event).instrument(span).await
    }

    async fn review(&self, event: &PullRequestEvent) -> Result<Outcome> {
        let repo = event.base_repo();
        let number = event.number;
        let details = self.github.pull_request(&repo, number).await?;

        let label = classify(&event.pull_request.title, &details.files);
        self.config.label_delay.wait().await;
        tracing::debug!("Adding label {label} to PR {number}");
        self.github
            .add_labels(&repo, number, &[label.name().to_owned()])
            .await?;
        tracing::info!("Added label {label} to PR {number}");

        let signed = commits_are_signed(&details.commits);
        if !signed {
            let body = comment::unsigned(event, &details)?;
            self.github.add_comment(&repo, number, &body).await?;
            tracing::info!("Added comment to unsigned PR {number}");
        }

        // removed on drop, whichever way we leave this function
        let dir = self.temp_dir(number)?;
        let base = &event.pull_request.base;
        let checkout = self
            .checkout
            .checkout(dir.path(), &base.repo.clone_url, &base.ref_field, number)
            .await?;
        let outcome = match checkout {
            CheckoutOutcome::Conflict => {
                self.github
                    .add_comment(&repo, number, &comment::conflict()?)
                    .await?;
                tracing::info!("Added comment to unmergeable PR {number}");
                Outcome::Conflict { label }
            }
            CheckoutOutcome::Ready(working_copy) => {
                let report = self.format.check(&working_copy, &details.files).await?;
                if !report.is_compliant() {
                    let body = comment::unformatted(&report.violations, &self.format.fix_command())?;
                    self.github.add_comment(&repo, number, &body).await?;
                    tracing::info!("Added comment to unformatted PR {number}");
                }
                Outcome::Reviewed {
                    label,
                    signed,
                    unformatted: report.violations,
                }
            }
        };
        if let Err(e) = dir.close() {
            tracing::warn!("Failed to remove working copy of PR {number}: {e}");
        }
        Ok(outcome)
    }

    fn temp_dir(&self, number: u64) -> Result<tempfile::TempDir> {
        let prefix = format!("pr-{number}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &self.config.work_dir {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.context("failed to create working copy directory")
    }
}

impl<G, C, F> Handler for Pipeline<G, C, F>
where
    G: GitHub + 'static,
    C: Checkout + 'static,
    F: FormatCheck + 'static,
{
    async fn handle(&self, body: &[u8]) -> Result<()> {
        let outcome = self.handle_message(body).await?;
        tracing::debug!("Handled message: {outcome:?}");
        Ok(())
    }
}
