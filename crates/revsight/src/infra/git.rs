//! Git integration utilities.
//!
//! Workspace discovery goes through [`gix`]; every query that produces text is
//! delegated to the `git` executable so its output matches what users see in a
//! terminal.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::RevsightError;

const BRANCH_FORMAT: &str = "--format=%(refname:short) %(committerdate:relative): %(subject)";
/// Everything after this is an operand, even when it starts with `-`.
const END_OF_OPTIONS: &str = "--end-of-options";

/// Locate the work tree enclosing `path`, if any.
pub fn discover_root(path: &Path) -> Option<PathBuf> {
    let start = if path.is_dir() { path } else { path.parent()? };
    let repo = gix::discover(start).ok()?;
    let root = repo.work_dir()?.to_path_buf();
    root.canonicalize().ok().or(Some(root))
}

/// Read-only wrapper around the `git` executable for one repository.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    root: PathBuf,
}

impl GitCli {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `git` with `args` in the repository root and return its stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String, RevsightError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(%command, root = %self.root.display(), "running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| RevsightError::ExternalToolFailure {
                command: command.clone(),
                detail: err.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| format!("exited with {}", output.status));
            return Err(RevsightError::ExternalToolFailure { command, detail });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Local branches, most recently committed first, one per line.
    ///
    /// Lists `refs/heads` directly so a detached HEAD never shows up as a row.
    pub async fn branches_by_recency(&self) -> Result<String, RevsightError> {
        self.run(&[
            "for-each-ref",
            "--sort=-committerdate",
            BRANCH_FORMAT,
            "refs/heads/",
        ])
        .await
    }

    /// Contents of `relative_path` as of `revision`.
    pub async fn show_file(
        &self,
        revision: &str,
        relative_path: &str,
    ) -> Result<String, RevsightError> {
        let spec = format!("{revision}:{relative_path}");
        self.run(&["show", END_OF_OPTIONS, &spec]).await
    }

    pub async fn remote_url(&self, remote: &str) -> Result<String, RevsightError> {
        let url = self
            .run(&["remote", "get-url", END_OF_OPTIONS, remote])
            .await?;
        non_empty(url, || format!("{} remote get-url {remote}", self.program))
    }

    /// Name of the checked out branch, or the commit hash when HEAD is detached.
    pub async fn current_branch(&self) -> Result<String, RevsightError> {
        let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        let branch = non_empty(branch, || {
            format!("{} rev-parse --abbrev-ref HEAD", self.program)
        })?;
        if branch != "HEAD" {
            return Ok(branch);
        }

        let commit = self.run(&["rev-parse", "HEAD"]).await?;
        non_empty(commit, || format!("{} rev-parse HEAD", self.program))
    }
}

fn non_empty(output: String, command: impl FnOnce() -> String) -> Result<String, RevsightError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        Err(RevsightError::ExternalToolFailure {
            command: command(),
            detail: "produced no output".into(),
        })
    } else {
        Ok(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_root_outside_repository_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("loose.txt");
        std::fs::write(&file, "loose").expect("write");
        // tempdirs are normally outside any work tree; skip if the host nests them.
        if gix::discover(temp.path()).is_ok() {
            return;
        }
        assert!(discover_root(&file).is_none());
    }

    #[test]
    fn empty_output_is_a_tool_failure() {
        let err = non_empty("  \n".into(), || "git remote get-url origin".into())
            .expect_err("blank output");
        assert!(matches!(err, RevsightError::ExternalToolFailure { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let git = GitCli::new("revsight-no-such-git", std::env::temp_dir());
        let err = git.run(&["status"]).await.expect_err("spawn fails");
        assert!(
            err.to_string().contains("revsight-no-such-git status"),
            "unexpected error: {err}"
        );
    }
}
