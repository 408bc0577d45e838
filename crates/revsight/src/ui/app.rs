//! Terminal implementation of the editor host.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::style::{Stylize, style};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};

use crate::app::content::ProviderSlot;
use crate::app::host::{DiffRequest, Host, Notice, NoticeLevel};
use crate::domain::model::{PickOutcome, RevisionCandidate};
use crate::infra::browser::Browser;
use crate::infra::clipboard::Clipboard;
use crate::infra::config::Config;
use crate::ui::components::diff::{colorize, render_unified};
use crate::ui::components::picker::{PickerState, RevisionPicker};

const TICK_RATE: Duration = Duration::from_millis(120);

/// The document an editor reports as focused, with its cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedDocument {
    pub path: PathBuf,
    /// Zero-based cursor line.
    pub line: Option<u32>,
}

impl FocusedDocument {
    /// Parse `PATH[:LINE]` where `LINE` is one-based.
    pub fn parse(spec: &str) -> Self {
        if let Some((path, line)) = spec.rsplit_once(':')
            && !path.is_empty()
            && let Ok(line) = line.parse::<u32>()
            && line > 0
        {
            return Self {
                path: PathBuf::from(path),
                line: Some(line - 1),
            };
        }
        Self {
            path: PathBuf::from(spec),
            line: None,
        }
    }
}

/// Host backed by the terminal: a ratatui picker, printed diffs, and the system browser.
pub struct TerminalHost {
    focused: Option<FocusedDocument>,
    slot: ProviderSlot,
    browser: Browser,
    print_urls: bool,
    context_lines: usize,
}

impl TerminalHost {
    pub fn new(config: &Config, focused: Option<FocusedDocument>) -> Self {
        Self {
            focused,
            slot: ProviderSlot::new(),
            browser: Browser::new(&config.browser.command),
            print_urls: false,
            context_lines: config.diff.context_lines,
        }
    }

    /// Print URLs to stdout instead of launching a browser.
    pub fn with_print_urls(mut self, print_urls: bool) -> Self {
        self.print_urls = print_urls;
        self
    }
}

#[async_trait]
impl Host for TerminalHost {
    fn focused_file(&self) -> Option<PathBuf> {
        self.focused.as_ref().map(|doc| doc.path.clone())
    }

    fn cursor_line(&self, file: &Path) -> Option<u32> {
        let doc = self.focused.as_ref()?;
        let focused = doc.path.canonicalize().ok()?;
        if focused == file { doc.line } else { None }
    }

    async fn pick_revision(
        &self,
        candidates: Vec<RevisionCandidate>,
        placeholder: &str,
    ) -> Result<PickOutcome> {
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            return Err(anyhow!(
                "choosing a revision needs an interactive terminal; pass --rev instead"
            ));
        }
        let state = PickerState::new(candidates, placeholder);
        tokio::task::spawn_blocking(move || run_picker(state))
            .await
            .context("revision picker task panicked")?
    }

    fn content_slot(&self) -> &ProviderSlot {
        &self.slot
    }

    async fn show_diff(&self, request: DiffRequest) -> Result<()> {
        let original = self.slot.resolve(&request.original).await;
        let modified = tokio::fs::read_to_string(&request.modified)
            .await
            .with_context(|| format!("failed to read {}", request.modified.display()))?;

        let rendered = render_unified(
            &original,
            &modified,
            &request.original.to_string(),
            request.original.relative_path(),
            self.context_lines,
        );

        let stdout = io::stdout();
        let colored = stdout.is_terminal();
        let mut out = stdout.lock();
        if colored {
            writeln!(out, "{}", style(&request.title).bold())?;
        } else {
            writeln!(out, "{}", request.title)?;
        }
        if rendered.is_empty() {
            writeln!(out, "No differences.")?;
        } else if colored {
            write!(out, "{}", colorize(&rendered))?;
        } else {
            write!(out, "{rendered}")?;
        }
        out.flush()?;
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        if self.print_urls {
            println!("{url}");
            return Ok(());
        }
        self.browser.open(url)
    }

    fn read_clipboard(&self) -> Result<String> {
        Clipboard::new().paste()
    }

    fn notify(&self, notice: Notice) {
        let stderr = io::stderr();
        let colored = stderr.is_terminal();
        match notice.level {
            NoticeLevel::Info => {
                info!(text = %notice.message, "notice");
                if colored {
                    eprintln!("{}", style(&notice.message).dark_grey());
                } else {
                    eprintln!("{}", notice.message);
                }
            }
            NoticeLevel::Error => {
                error!(text = %notice.message, "command failed");
                if colored {
                    eprintln!("{} {}", style("error:").red().bold(), notice.message);
                } else {
                    eprintln!("error: {}", notice.message);
                }
            }
        }
    }
}

fn run_picker(mut state: PickerState) -> Result<PickOutcome> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stderr = io::stderr();
    if let Err(err) = execute!(stderr, EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(err).context("failed to enter alternate screen");
    }

    let backend = CrosstermBackend::new(stderr);
    let result = Terminal::new(backend)
        .context("failed to initialize terminal")
        .and_then(|mut terminal| {
            terminal.hide_cursor().ok();
            let outcome = picker_loop(&mut terminal, &mut state);
            let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
            let _ = terminal.show_cursor();
            outcome
        });

    disable_raw_mode().ok();
    if result.is_err() {
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
    }
    result
}

fn picker_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut PickerState,
) -> Result<PickOutcome> {
    let picker = RevisionPicker;
    loop {
        terminal.draw(|frame| {
            let area = frame.size();
            picker.render(frame, area, state);
        })?;

        if event::poll(TICK_RATE)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(outcome) = state.handle_key(key)
        {
            return Ok(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_document_with_line() {
        let doc = FocusedDocument::parse("lib/util.ts:10");
        assert_eq!(doc.path, PathBuf::from("lib/util.ts"));
        assert_eq!(doc.line, Some(9));
    }

    #[test]
    fn focused_document_without_line() {
        let doc = FocusedDocument::parse("lib/util.ts");
        assert_eq!(doc.path, PathBuf::from("lib/util.ts"));
        assert_eq!(doc.line, None);

        let zero = FocusedDocument::parse("lib/util.ts:0");
        assert_eq!(zero.path, PathBuf::from("lib/util.ts:0"));
        assert_eq!(zero.line, None);
    }

    #[test]
    fn cursor_only_reported_for_focused_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let focused = temp.path().join("a.txt");
        let other = temp.path().join("b.txt");
        std::fs::write(&focused, "a").expect("write");
        std::fs::write(&other, "b").expect("write");

        let host = TerminalHost::new(
            &Config::default(),
            Some(FocusedDocument {
                path: focused.clone(),
                line: Some(4),
            }),
        );
        let focused = focused.canonicalize().expect("canonical");
        let other = other.canonicalize().expect("canonical");
        assert_eq!(host.cursor_line(&focused), Some(4));
        assert_eq!(host.cursor_line(&other), None);
    }
}
