//! Command-line interface.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::commands::{
    CommandOutcome, CompareRequest, OpenRemoteRequest, RevisionSource, run_compare,
    run_open_remote,
};
use crate::app::host::{Host, Notice};
use crate::app::revisions::list_candidates;
use crate::domain::errors::RevsightError;
use crate::domain::model::RevisionCandidate;
use crate::infra::config::Config;
use crate::infra::git::{GitCli, discover_root};
use crate::ui::app::{FocusedDocument, TerminalHost};

#[derive(Debug, Parser)]
#[command(author, version, about = "Compare files with past revisions and open them on their remote host", long_about = None)]
pub struct Cli {
    /// Document focused in the editor, as PATH or PATH:LINE (one-based line).
    #[arg(long, global = true, env = "REVSIGHT_FOCUSED", value_name = "PATH[:LINE]")]
    pub focused: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Diff a file against a branch, tag, or commit
    Compare {
        /// File to compare; defaults to the focused document
        file: Option<PathBuf>,
        /// Revision to compare against instead of choosing one interactively
        #[arg(long, conflicts_with = "from_clipboard")]
        rev: Option<String>,
        /// Use the revision (usually a commit hash) currently on the clipboard
        #[arg(long)]
        from_clipboard: bool,
    },
    /// Open a file on its remote web host
    OpenRemote {
        /// File to open; defaults to the focused document
        file: Option<PathBuf>,
        /// One-based line to link to
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        line: Option<u32>,
        /// Print the URL instead of launching a browser
        #[arg(long)]
        print: bool,
    },
    /// List branches offered by `compare`, most recent first
    Branches {
        /// Directory inside the repository; defaults to the current directory
        dir: Option<PathBuf>,
        /// Emit JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let mut focused = cli.focused.as_deref().map(FocusedDocument::parse);

    let outcome = match cli.command {
        Commands::Compare {
            file,
            rev,
            from_clipboard,
        } => {
            let config = Config::load(target_path(file.as_deref(), focused.as_ref()))?;
            let host = TerminalHost::new(&config, focused);
            let source = match (rev, from_clipboard) {
                (Some(rev), _) => RevisionSource::Given(rev),
                (None, true) => RevisionSource::Clipboard,
                (None, false) => RevisionSource::Prompt,
            };
            run_compare(&host, &config, CompareRequest { file, source }).await
        }
        Commands::OpenRemote { file, line, print } => {
            if let Some(line) = line {
                let path = file
                    .clone()
                    .or_else(|| focused.as_ref().map(|doc| doc.path.clone()));
                if let Some(path) = path {
                    focused = Some(FocusedDocument {
                        path,
                        line: Some(line - 1),
                    });
                }
            }
            let config = Config::load(target_path(file.as_deref(), focused.as_ref()))?;
            let host = TerminalHost::new(&config, focused).with_print_urls(print);
            run_open_remote(&host, &config, OpenRemoteRequest { file }).await
        }
        Commands::Branches { dir, json } => {
            let config = Config::load(dir.as_deref())?;
            let host = TerminalHost::new(&config, focused);
            branches(&host, &config, dir, json).await?
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_owned();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            CommandOutcome::Completed
        }
    };

    Ok(match outcome {
        CommandOutcome::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

/// File whose repository supplies the workspace config layer.
fn target_path<'a>(
    file: Option<&'a Path>,
    focused: Option<&'a FocusedDocument>,
) -> Option<&'a Path> {
    file.or_else(|| focused.map(|doc| doc.path.as_path()))
}

async fn branches(
    host: &dyn Host,
    config: &Config,
    dir: Option<PathBuf>,
    json: bool,
) -> Result<CommandOutcome> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("unable to determine working directory")?,
    };
    let Some(root) = discover_root(&dir) else {
        host.notify(Notice::error(RevsightError::NotInWorkspace(dir).to_string()));
        return Ok(CommandOutcome::Failed);
    };

    let git = GitCli::new(&config.git.program, root);
    let candidates = match list_candidates(&git).await {
        Ok(candidates) => candidates,
        Err(err) if err.is_informational() => {
            host.notify(Notice::info(err.to_string()));
            return Ok(CommandOutcome::Informed);
        }
        Err(err) => {
            host.notify(Notice::error(err.to_string()));
            return Ok(CommandOutcome::Failed);
        }
    };

    print_candidates(&candidates, json)?;
    Ok(CommandOutcome::Completed)
}

fn print_candidates(candidates: &[RevisionCandidate], json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(candidates).context("failed to serialize branches")?;
        println!("{rendered}");
    } else {
        for candidate in candidates {
            println!("{}\t{}", candidate.identifier, candidate.description);
        }
    }
    Ok(())
}
