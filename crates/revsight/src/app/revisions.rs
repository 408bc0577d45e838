//! Listing candidate revisions and resolving the user's choice.

use anyhow::Result;
use tracing::debug;

use crate::app::host::Host;
use crate::domain::errors::RevsightError;
use crate::domain::model::{PickOutcome, RevisionCandidate};
use crate::infra::git::GitCli;

const PICK_PLACEHOLDER: &str = "Select a branch or type a commit hash, tag, or branch name";

/// Parse one candidate per non-blank line: identifier, whitespace, description.
///
/// Pseudo-refs such as `(HEAD detached at 1a2b3c4)` are not revisions and are skipped.
pub fn parse_candidates(output: &str) -> Vec<RevisionCandidate> {
    output
        .lines()
        .map(str::trim)
        .map(|line| line.strip_prefix("* ").unwrap_or(line).trim_start())
        .filter(|line| !line.is_empty() && !line.starts_with('('))
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((identifier, description)) => {
                RevisionCandidate::new(identifier, description.trim_start())
            }
            None => RevisionCandidate::new(line, ""),
        })
        .collect()
}

/// Branches of the repository, most recently active first.
pub async fn list_candidates(git: &GitCli) -> Result<Vec<RevisionCandidate>, RevsightError> {
    let output = git.branches_by_recency().await?;
    let candidates = parse_candidates(&output);
    debug!(count = candidates.len(), "listed revision candidates");
    if candidates.is_empty() {
        return Err(RevsightError::NoRevisionsFound);
    }
    Ok(candidates)
}

/// Prompt for a revision. Dismissal resolves to [`PickOutcome::Cancelled`].
pub async fn select_revision(
    host: &dyn Host,
    candidates: Vec<RevisionCandidate>,
) -> Result<PickOutcome> {
    let outcome = host.pick_revision(candidates, PICK_PLACEHOLDER).await?;
    Ok(match outcome {
        PickOutcome::TypedOverride(text) if text.trim().is_empty() => PickOutcome::Cancelled,
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_whitespace() {
        let output = "main 2 hours ago: Merge pull request #4\nfeature/login 3 days ago: wip\n";
        let candidates = parse_candidates(output);
        assert_eq!(
            candidates,
            vec![
                RevisionCandidate::new("main", "2 hours ago: Merge pull request #4"),
                RevisionCandidate::new("feature/login", "3 days ago: wip"),
            ]
        );
    }

    #[test]
    fn empty_output_yields_no_candidates() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates("\n  \n").is_empty());
    }

    #[test]
    fn identifier_without_description() {
        let candidates = parse_candidates("release\n");
        assert_eq!(candidates, vec![RevisionCandidate::new("release", "")]);
    }

    #[test]
    fn detached_head_line_is_skipped() {
        let output = "(HEAD detached at 8e0ecc4) 0 seconds ago: first\nmain 1 hour ago: second\n";
        assert_eq!(
            parse_candidates(output),
            vec![RevisionCandidate::new("main", "1 hour ago: second")]
        );
        assert!(parse_candidates("* (no branch, rebasing topic) x\n").is_empty());
    }

    #[test]
    fn current_branch_marker_is_dropped() {
        let candidates = parse_candidates("* develop\tlatest work\n  main older\n");
        assert_eq!(candidates[0], RevisionCandidate::new("develop", "latest work"));
        assert_eq!(candidates[1], RevisionCandidate::new("main", "older"));
    }
}
