use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};

/// A clone of the base repository with a PR merged in.
/// Does not own its directory: whoever created the destination removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WorkingCopy {
    root: PathBuf,
}

impl WorkingCopy {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CheckoutOutcome {
    Ready(WorkingCopy),
    /// The PR cannot be merged into the base branch cleanly.
    Conflict,
}

pub(crate) trait Checkout: Send + Sync {
    /// Clone branch `base_ref` of `base_url` into the empty directory `destination`
    /// and merge PR `number` into it.
    fn checkout(
        &self,
        destination: &Path,
        base_url: &str,
        base_ref: &str,
        number: u64,
    ) -> impl Future<Output = Result<CheckoutOutcome>> + Send;
}

/// [`Checkout`] using libgit2 on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GitCheckout;

impl Checkout for GitCheckout {
    async fn checkout(
        &self,
        destination: &Path,
        base_url: &str,
        base_ref: &str,
        number: u64,
    ) -> Result<CheckoutOutcome> {
        let destination = destination.to_owned();
        let base_url = base_url.to_owned();
        let base_ref = base_ref.to_owned();
        tokio::task::spawn_blocking(move || {
            clone_and_merge(&destination, &base_url, &base_ref, number)
        })
        .await?
    }
}

/// Clone `base_ref`, fetch `refs/pull/<number>/head`, merge it.
pub(crate) fn clone_and_merge(
    destination: &Path,
    base_url: &str,
    base_ref: &str,
    number: u64,
) -> Result<CheckoutOutcome> {
    let repo = RepoBuilder::new()
        .branch(base_ref)
        .clone(base_url, destination)
        .with_context(|| format!("failed to clone {base_ref} of {base_url}"))?;
    tracing::debug!("Cloned {base_ref} of {base_url} to {}", destination.display());

    let pr_ref = format!("refs/remotes/origin/pr/{number}");
    {
        // "+" so force-pushed PRs still update the local ref
        let refspec = format!("+refs/pull/{number}/head:{pr_ref}");
        let mut remote = repo.find_remote("origin")?;
        remote
            .fetch(&[&refspec], None, None)
            .with_context(|| format!("failed to fetch PR {number} from {base_url}"))?;
    }

    let pr_head = repo.find_reference(&pr_ref)?;
    let annotated = repo.reference_to_annotated_commit(&pr_head)?;
    let (analysis, _) = repo.merge_analysis(&[&annotated])?;

    if analysis.is_up_to_date() {
        tracing::debug!("PR {number} is already contained in the base branch");
    } else if analysis.is_fast_forward() {
        let target = pr_head.peel_to_commit()?;
        repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().force()))?;
        repo.set_head_detached(target.id())?;
        tracing::debug!("Fast-forwarded to PR {number} at {}", target.id());
    } else {
        repo.merge(
            &[&annotated],
            None,
            Some(CheckoutBuilder::new().allow_conflicts(true)),
        )?;
        if repo.index()?.has_conflicts() {
            tracing::debug!("PR {number} conflicts with the base branch");
            return Ok(CheckoutOutcome::Conflict);
        }
        tracing::debug!("Merged PR {number} into the base branch");
    }

    let root = repo.workdir().context("no workdir")?;
    Ok(CheckoutOutcome::Ready(WorkingCopy::new(root)))
}
