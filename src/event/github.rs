use serde::Deserialize;

use crate::github::RepoId;

/// A stripped down GitHub `pull_request` webhook payload.
/// Only the fields the review pipeline reads are modelled; everything else is ignored.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PullRequestEvent {
    /// The action this event represents.
    pub action: PullRequestEventAction,
    /// The pull request number this event corresponds to.
    pub number: u64,
    /// The pull request this event corresponds to
    pub pull_request: PullRequest,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PullRequestEventAction {
    Opened,
    /// `closed`, `synchronize`, `labeled`, …
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PullRequest {
    /// API URL of the pull request
    pub url: String,
    pub title: String,
    /// Number of commits, absent from some older hook payloads
    pub commits: Option<u64>,
    pub base: Branch,
    pub head: HeadBranch,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Branch {
    #[serde(rename = "ref")]
    pub ref_field: String,
    pub repo: Repository,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct HeadBranch {
    #[serde(rename = "ref")]
    pub ref_field: String,
    /// `null` once the fork a PR came from has been deleted
    pub repo: Option<Repository>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Repository {
    pub name: String,
    pub owner: User,
    pub clone_url: String,
    pub html_url: String,
    pub ssh_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct User {
    pub login: String,
}

impl PullRequestEvent {
    /// Repository the pull request targets.
    pub(crate) fn base_repo(&self) -> RepoId {
        let repo = &self.pull_request.base.repo;
        RepoId::new(&repo.owner.login, &repo.name)
    }
}
