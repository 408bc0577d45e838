//! Domain models for file contexts, revisions, and remote targets.

use std::path::{Component, PathBuf};

use serde::Serialize;

/// A selectable revision parsed from version-control output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionCandidate {
    pub identifier: String,
    pub description: String,
}

impl RevisionCandidate {
    pub fn new(identifier: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
        }
    }
}

/// The file a command operates on together with its enclosing workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub absolute_path: PathBuf,
    pub workspace_root: PathBuf,
}

impl FileContext {
    /// Path of the file relative to the workspace root, joined with `/`.
    ///
    /// Returns `None` when the file does not live under the root.
    pub fn relative_path(&self) -> Option<String> {
        let relative = self.absolute_path.strip_prefix(&self.workspace_root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    pub fn file_name(&self) -> String {
        self.absolute_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.absolute_path.display().to_string())
    }
}

/// Everything needed to compute the web URL of a file on its remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub normalized_base_url: String,
    pub branch: String,
    pub relative_path: String,
    /// Zero-based line, as editors report cursors.
    pub line_number: Option<u32>,
}

impl RemoteTarget {
    /// One-based line used in web fragments.
    pub fn display_line(&self) -> Option<u32> {
        self.line_number.map(|line| line.saturating_add(1))
    }
}

/// How an interactive revision prompt was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// A list row was accepted.
    Picked(String),
    /// Free text was entered without choosing a row.
    TypedOverride(String),
    Cancelled,
}

impl PickOutcome {
    /// The revision identifier to use, or `None` when the prompt was dismissed.
    pub fn into_identifier(self) -> Option<String> {
        match self {
            PickOutcome::Picked(identifier) | PickOutcome::TypedOverride(identifier) => {
                Some(identifier)
            }
            PickOutcome::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_excludes_root() {
        let context = FileContext {
            absolute_path: PathBuf::from("/work/repo/lib/util.ts"),
            workspace_root: PathBuf::from("/work/repo"),
        };
        assert_eq!(context.relative_path().as_deref(), Some("lib/util.ts"));
        assert_eq!(context.file_name(), "util.ts");
    }

    #[test]
    fn relative_path_outside_root_is_none() {
        let context = FileContext {
            absolute_path: PathBuf::from("/elsewhere/util.ts"),
            workspace_root: PathBuf::from("/work/repo"),
        };
        assert!(context.relative_path().is_none());
    }

    #[test]
    fn display_line_is_one_based() {
        let target = RemoteTarget {
            normalized_base_url: "https://github.com/acme/widgets".into(),
            branch: "develop".into(),
            relative_path: "lib/util.ts".into(),
            line_number: Some(9),
        };
        assert_eq!(target.display_line(), Some(10));
    }

    #[test]
    fn cancelled_has_no_identifier() {
        assert_eq!(PickOutcome::Cancelled.into_identifier(), None);
        assert_eq!(
            PickOutcome::TypedOverride("deadbeef".into()).into_identifier(),
            Some("deadbeef".into())
        );
    }
}
