//! Services the surrounding editor provides to commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::app::content::{ContentLocator, ProviderSlot};
use crate::domain::model::{PickOutcome, RevisionCandidate};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A diff between historical content and the file on disk.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    pub title: String,
    /// Left side, dereferenced through [`Host::content_slot`].
    pub original: ContentLocator,
    /// Right side, the working copy.
    pub modified: PathBuf,
}

/// Editor capabilities consumed by the commands.
#[async_trait]
pub trait Host: Send + Sync {
    /// Document that currently has focus, if any.
    fn focused_file(&self) -> Option<PathBuf>;

    /// Zero-based cursor line, reported only when the cursor is inside `file`.
    fn cursor_line(&self, file: &Path) -> Option<u32>;

    /// Present `candidates` and let the user pick one or type a revision.
    async fn pick_revision(
        &self,
        candidates: Vec<RevisionCandidate>,
        placeholder: &str,
    ) -> Result<PickOutcome>;

    /// Slot through which the diff view dereferences content locators.
    fn content_slot(&self) -> &ProviderSlot;

    async fn show_diff(&self, request: DiffRequest) -> Result<()>;

    fn open_url(&self, url: &str) -> Result<()>;

    fn read_clipboard(&self) -> Result<String>;

    fn notify(&self, notice: Notice);
}
