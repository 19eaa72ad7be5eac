use anyhow::Result;
use askama::Template;

use crate::event::PullRequestEvent;
use crate::github::PullRequestDetails;

#[derive(Template)]
#[template(path = "unsigned.md.j2", escape = "none")]
struct Unsigned<'a> {
    guide_url: &'a str,
    head_ref: &'a str,
    head_url: &'a str,
    commits: u64,
}

#[derive(Template)]
#[template(path = "conflict.md.j2", escape = "none")]
struct Conflict;

#[derive(Template)]
#[template(path = "unformatted.md.j2", escape = "none")]
struct Unformatted<'a> {
    files: &'a [String],
    fix_command: &'a str,
}

/// Instructions for adding a sign-off to every commit of the PR.
pub(super) fn unsigned(event: &PullRequestEvent, details: &PullRequestDetails) -> Result<String> {
    let base = &event.pull_request.base;
    let guide_url = format!(
        "{}/blob/{}/CONTRIBUTING.md#sign-your-work",
        base.repo.html_url, base.ref_field
    );
    let head_repo = event.pull_request.head.repo.as_ref();
    let head_url = details
        .head_ssh_url
        .as_deref()
        .or_else(|| head_repo.and_then(|r| r.ssh_url.as_deref()))
        .or_else(|| head_repo.map(|r| r.clone_url.as_str()))
        .unwrap_or(&base.repo.clone_url);
    Ok(Unsigned {
        guide_url: &guide_url,
        head_ref: &event.pull_request.head.ref_field,
        head_url,
        commits: details
            .commit_count
            .or(event.pull_request.commits)
            .unwrap_or(1),
    }
    .render()?)
}

pub(super) fn conflict() -> Result<String> {
    Ok(Conflict.render()?)
}

pub(super) fn unformatted(files: &[String], fix_command: &str) -> Result<String> {
    Ok(Unformatted { files, fix_command }.render()?)
}
