use std::fmt::Display;
use std::future::Future;

use anyhow::Result;
use octocrab::models::repos::DiffEntryStatus;

mod octocrab_client;

pub(crate) use octocrab_client::OctocrabGitHub;

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub(crate) fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        }
    }
}

impl Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything the review needs to know about a PR beyond its webhook payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PullRequestDetails {
    pub commit_count: Option<u64>,
    /// SSH URL of the head repository, if the fork still exists
    pub head_ssh_url: Option<String>,
    pub commits: Vec<Commit>,
    /// Changed files in diff order
    pub files: Vec<ChangedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Commit {
    pub sha: String,
    pub message: String,
    /// GitHub verified the commit’s GPG/SSH signature
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl From<&DiffEntryStatus> for FileStatus {
    fn from(status: &DiffEntryStatus) -> Self {
        match status {
            DiffEntryStatus::Added => Self::Added,
            DiffEntryStatus::Removed => Self::Removed,
            DiffEntryStatus::Modified => Self::Modified,
            DiffEntryStatus::Renamed => Self::Renamed,
            DiffEntryStatus::Copied => Self::Copied,
            DiffEntryStatus::Changed => Self::Changed,
            _ => Self::Unchanged,
        }
    }
}

impl ChangedFile {
    pub(crate) fn is_removed(&self) -> bool {
        self.status == FileStatus::Removed
    }
}

/// The GitHub operations the review pipeline performs.
///
/// Every call may fail (network, auth, rate limit); failures are returned as-is
/// so the message gets redelivered.
pub(crate) trait GitHub: Send + Sync {
    /// Fetch details, commits and changed files of a pull request.
    fn pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> impl Future<Output = Result<PullRequestDetails>> + Send;

    fn add_labels(
        &self,
        repo: &RepoId,
        number: u64,
        labels: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    fn add_comment(
        &self,
        repo: &RepoId,
        number: u64,
        body: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests;
