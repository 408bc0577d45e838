//! The user-invokable commands.
//!
//! Each command is a straight-line sequence: resolve the file, gather inputs,
//! compute a target, hand it to the host. Every failure is caught here and
//! reported through [`Host::notify`]; nothing escapes to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::app::content::{ContentLocator, GitContentProvider};
use crate::app::context::resolve_context;
use crate::app::host::{DiffRequest, Host, Notice};
use crate::app::remote::fetch_remote_target;
use crate::app::revisions::{list_candidates, select_revision};
use crate::domain::errors::RevsightError;
use crate::domain::model::{FileContext, PickOutcome};
use crate::infra::config::Config;
use crate::infra::git::GitCli;

/// How a command invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// The user dismissed a prompt.
    Cancelled,
    /// An informational notice was shown instead of doing the work.
    Informed,
    /// An error notice was shown.
    Failed,
}

/// Where the compare command gets its revision from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RevisionSource {
    /// List branches and ask the user.
    #[default]
    Prompt,
    /// Use this identifier as if the user had typed it.
    Given(String),
    /// Use the clipboard text as the identifier.
    Clipboard,
}

#[derive(Debug, Clone, Default)]
pub struct CompareRequest {
    pub file: Option<PathBuf>,
    pub source: RevisionSource,
}

#[derive(Debug, Clone, Default)]
pub struct OpenRemoteRequest {
    pub file: Option<PathBuf>,
}

/// Compare a file against a revision in the host's diff view.
pub async fn run_compare(
    host: &dyn Host,
    config: &Config,
    request: CompareRequest,
) -> CommandOutcome {
    match compare(host, config, request).await {
        Ok(outcome) => outcome,
        Err(err) => report(host, err),
    }
}

/// Open the web page of a file on its remote host.
pub async fn run_open_remote(
    host: &dyn Host,
    config: &Config,
    request: OpenRemoteRequest,
) -> CommandOutcome {
    match open_remote(host, config, request).await {
        Ok(url) => {
            info!(%url, "opened remote view");
            CommandOutcome::Completed
        }
        Err(err) => report(host, err),
    }
}

async fn compare(
    host: &dyn Host,
    config: &Config,
    request: CompareRequest,
) -> Result<CommandOutcome> {
    let context = resolve_context(request.file.as_deref(), host)?;
    let git = GitCli::new(&config.git.program, &context.workspace_root);

    let outcome = match request.source {
        RevisionSource::Prompt => {
            let candidates = list_candidates(&git).await?;
            select_revision(host, candidates).await?
        }
        RevisionSource::Given(revision) => typed(revision),
        RevisionSource::Clipboard => {
            let text = host.read_clipboard().context("failed to read the clipboard")?;
            if text.trim().is_empty() {
                host.notify(Notice::info("The clipboard does not contain a revision"));
                return Ok(CommandOutcome::Informed);
            }
            typed(text)
        }
    };

    let Some(revision) = outcome.into_identifier() else {
        debug!("revision prompt dismissed");
        return Ok(CommandOutcome::Cancelled);
    };

    show_revision_diff(host, config, &git, &context, revision).await?;
    Ok(CommandOutcome::Completed)
}

fn typed(text: String) -> PickOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        PickOutcome::Cancelled
    } else {
        PickOutcome::TypedOverride(trimmed.to_owned())
    }
}

async fn show_revision_diff(
    host: &dyn Host,
    config: &Config,
    git: &GitCli,
    context: &FileContext,
    revision: String,
) -> Result<()> {
    let relative_path = context
        .relative_path()
        .ok_or_else(|| RevsightError::NotInWorkspace(context.absolute_path.clone()))?;
    let title = format!("{} ({revision}) vs working tree", context.file_name());
    let request = DiffRequest {
        title,
        original: ContentLocator::new(relative_path, revision),
        modified: context.absolute_path.clone(),
    };

    let provider = Arc::new(GitContentProvider::new(git.clone()));
    let lease = host.content_slot().acquire(provider);
    let shown = host.show_diff(request).await;
    let _release = lease.release_after(config.diff.release_delay());
    shown
}

async fn open_remote(
    host: &dyn Host,
    config: &Config,
    request: OpenRemoteRequest,
) -> Result<String> {
    let context = resolve_context(request.file.as_deref(), host)?;
    let line = host.cursor_line(&context.absolute_path);
    let git = GitCli::new(&config.git.program, &context.workspace_root);

    let target = fetch_remote_target(&git, &config.git.remote, &context, line).await?;
    let url = target.to_url();
    host.open_url(&url)
        .with_context(|| format!("failed to open {url}"))?;
    Ok(url)
}

fn report(host: &dyn Host, err: anyhow::Error) -> CommandOutcome {
    let informational = err
        .downcast_ref::<RevsightError>()
        .is_some_and(RevsightError::is_informational);
    if informational {
        host.notify(Notice::info(err.to_string()));
        CommandOutcome::Informed
    } else {
        host.notify(Notice::error(format!("{err:#}")));
        CommandOutcome::Failed
    }
}
