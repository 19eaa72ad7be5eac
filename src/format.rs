use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::checkout::WorkingCopy;
use crate::github::ChangedFile;

/// Changed files that are not formatted, in PR diff order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormatReport {
    pub violations: Vec<String>,
}

impl FormatReport {
    pub(crate) fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}

pub(crate) trait FormatCheck: Send + Sync {
    /// Check the PR’s changed `files` as they are in `working_copy`.
    fn check(
        &self,
        working_copy: &WorkingCopy,
        files: &[ChangedFile],
    ) -> impl Future<Output = Result<FormatReport>> + Send;

    /// Shell command a contributor can run to fix violations.
    fn fix_command(&self) -> String;
}

/// Runs a formatter that reads source on stdin and writes the canonical form to stdout,
/// e.g. `gofmt -s`. A file is compliant if the output equals its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandFormatter {
    pub program: String,
    pub args: Vec<String>,
    /// File extensions (without dot) subject to the formatter
    pub extensions: Vec<String>,
    /// Suggested to contributors, e.g. `gofmt -s -w`
    pub fix_command: String,
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self {
            program: "gofmt".to_owned(),
            args: vec!["-s".to_owned()],
            extensions: vec!["go".to_owned()],
            fix_command: "gofmt -s -w".to_owned(),
        }
    }
}

impl CommandFormatter {
    fn applies_to(&self, file: &ChangedFile) -> bool {
        if file.is_removed() || file.filename.starts_with("vendor/") {
            return false;
        }
        Path::new(&file.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Resolve `filename` to a regular file inside the canonical `root`.
    /// Symlinks are only followed while they stay in the checkout.
    async fn resolve(root: &Path, filename: &str) -> Option<PathBuf> {
        // missing: removed by the merge
        let path = tokio::fs::canonicalize(root.join(filename)).await.ok()?;
        if !path.starts_with(root) {
            tracing::warn!("Skipping {filename}: it resolves outside the working copy");
            return None;
        }
        // submodules and other non-files
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        metadata.is_file().then_some(path)
    }

    async fn is_formatted(&self, content: &[u8]) -> Result<bool> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program))?;
        let mut stdin = child.stdin.take().context("formatter has no stdin")?;
        // feed stdin while collecting stdout, a large file would fill the pipe otherwise
        let write = async move { stdin.write_all(content).await };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.with_context(|| format!("failed to run {}", self.program))?;
        if !output.status.success() {
            tracing::debug!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
            return Ok(false);
        }
        written.with_context(|| format!("failed to write to {}", self.program))?;
        Ok(output.stdout == content)
    }
}

impl FormatCheck for CommandFormatter {
    async fn check(&self, working_copy: &WorkingCopy, files: &[ChangedFile]) -> Result<FormatReport> {
        let root = tokio::fs::canonicalize(working_copy.root())
            .await
            .with_context(|| format!("failed to resolve {}", working_copy.root().display()))?;
        let mut report = FormatReport::default();
        for file in files.iter().filter(|f| self.applies_to(f)) {
            let Some(path) = Self::resolve(&root, &file.filename).await else {
                continue;
            };
            let content = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            if !self.is_formatted(&content).await? {
                tracing::debug!("{} is not formatted", file.filename);
                report.violations.push(file.filename.clone());
            }
        }
        Ok(report)
    }

    fn fix_command(&self) -> String {
        self.fix_command.clone()
    }
}
