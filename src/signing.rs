use std::sync::LazyLock;

use regex::Regex;

use crate::github::Commit;

static SIGNED_OFF_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Signed-off-by: ([^<\n]+) <([^<>@\s]+@[^<>\s]+)>\s*$").unwrap()
});

/// A commit counts as signed if it carries a DCO sign-off trailer
/// or a signature GitHub could verify.
pub(crate) fn is_signed(commit: &Commit) -> bool {
    commit.verified || SIGNED_OFF_BY.is_match(&commit.message)
}

/// `true` iff every commit is signed; vacuously `true` for no commits.
pub(crate) fn commits_are_signed(commits: &[Commit]) -> bool {
    commits.iter().all(|c| {
        let signed = is_signed(c);
        if !signed {
            tracing::debug!("Commit {} is not signed", c.sha);
        }
        signed
    })
}
