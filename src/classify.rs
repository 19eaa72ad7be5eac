use std::fmt::Display;

use crate::github::ChangedFile;

/// Mutually exclusive triage priority of a freshly opened PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Label {
    DesignReview,
    DocsReview,
    Triage,
}

impl Label {
    /// Name of the label in the GitHub repository.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Label::DesignReview => "1-design-review",
            Label::DocsReview => "3-docs-review",
            Label::Triage => "0-triage",
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the label for an opened PR. Proposals win over docs-only changes.
pub(crate) fn classify(title: &str, files: &[ChangedFile]) -> Label {
    if title.to_lowercase().contains("proposal") {
        Label::DesignReview
    } else if is_docs_only(files) {
        Label::DocsReview
    } else {
        Label::Triage
    }
}

/// An empty change set does not count as documentation.
fn is_docs_only(files: &[ChangedFile]) -> bool {
    !files.is_empty() && files.iter().all(|f| is_docs_path(&f.filename))
}

pub(crate) fn is_docs_path(path: &str) -> bool {
    path.ends_with(".md") || path.starts_with("docs/")
}
