use std::sync::Arc;

use anyhow::{Context, Result};
use futures::TryStreamExt;
use octocrab::models::repos::{DiffEntry, RepoCommit};
use octocrab::{Octocrab, Page};

use super::{ChangedFile, Commit, GitHub, PullRequestDetails, RepoId};

const PER_PAGE: u8 = 100;

/// [`GitHub`] backed by the REST API.
#[derive(Debug, Clone)]
pub(crate) struct OctocrabGitHub {
    client: Arc<Octocrab>,
}

impl OctocrabGitHub {
    pub(crate) fn new(client: Arc<Octocrab>) -> Self {
        Self { client }
    }

    /// `GET /repos/{owner}/{repo}/pulls/{number}/commits`, which octocrab has no handler for.
    async fn pr_commits(&self, repo: &RepoId, number: u64) -> octocrab::Result<Vec<RepoCommit>> {
        let route = format!("/repos/{}/{}/pulls/{number}/commits", repo.owner, repo.name);
        let page: Page<RepoCommit> = self
            .client
            .get(route, Some(&[("per_page", PER_PAGE)]))
            .await?;
        page.into_stream(&self.client).try_collect().await
    }
}

impl From<RepoCommit> for Commit {
    fn from(c: RepoCommit) -> Self {
        Commit {
            sha: c.sha,
            verified: c.commit.verification.is_some_and(|v| v.verified),
            message: c.commit.message,
        }
    }
}

impl From<DiffEntry> for ChangedFile {
    fn from(entry: DiffEntry) -> Self {
        ChangedFile {
            status: (&entry.status).into(),
            filename: entry.filename,
        }
    }
}

impl GitHub for OctocrabGitHub {
    async fn pull_request(&self, repo: &RepoId, number: u64) -> Result<PullRequestDetails> {
        let pulls = self.client.pulls(&repo.owner, &repo.name);
        let pr = pulls
            .get(number)
            .await
            .with_context(|| format!("failed to get {repo}#{number}"))?;
        let commits = self
            .pr_commits(repo, number)
            .await
            .with_context(|| format!("failed to list commits of {repo}#{number}"))?;
        let files: Vec<DiffEntry> = async {
            pulls
                .list_files(number)
                .await?
                .into_stream(&self.client)
                .try_collect()
                .await
        }
        .await
        .with_context(|| format!("failed to list files of {repo}#{number}"))?;
        Ok(PullRequestDetails {
            commit_count: pr.commits,
            head_ssh_url: pr.head.repo.and_then(|r| r.ssh_url),
            commits: commits.into_iter().map(Commit::from).collect(),
            files: files.into_iter().map(ChangedFile::from).collect(),
        })
    }

    async fn add_labels(&self, repo: &RepoId, number: u64, labels: &[String]) -> Result<()> {
        let applied = self
            .client
            .issues(&repo.owner, &repo.name)
            .add_labels(number, labels)
            .await
            .with_context(|| format!("failed to label {repo}#{number}"))?;
        tracing::debug!(
            "Labels on {repo}#{number} are now {:?}",
            applied.iter().map(|l| l.name.as_str()).collect::<Vec<_>>()
        );
        Ok(())
    }

    async fn add_comment(&self, repo: &RepoId, number: u64, body: &str) -> Result<()> {
        let comment = self
            .client
            .issues(&repo.owner, &repo.name)
            .create_comment(number, body)
            .await
            .with_context(|| format!("failed to comment on {repo}#{number}"))?;
        tracing::info!("Created comment at {}", comment.html_url);
        Ok(())
    }
}
