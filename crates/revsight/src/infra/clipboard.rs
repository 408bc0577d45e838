//! Clipboard integration utilities.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Cross-platform clipboard reader with fallbacks for headless environments.
pub struct Clipboard {
    primary: Option<arboard::Clipboard>,
}

impl Clipboard {
    /// Attempt to initialize the system clipboard. When unavailable we fall back to shell-based
    /// clipboard utilities.
    pub fn new() -> Self {
        let primary = arboard::Clipboard::new().ok();
        Self { primary }
    }

    /// Read the clipboard as text, falling back to platform-specific executables if needed.
    pub fn paste(&mut self) -> Result<String> {
        if let Some(primary) = self.primary.as_mut()
            && let Ok(text) = primary.get_text()
        {
            return Ok(text);
        }

        self.primary = None;
        fallback_paste()
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_paste() -> Result<String> {
    for command in fallback_commands() {
        if let Ok(text) = try_command_paste(command) {
            return Ok(text);
        }
    }

    Err(anyhow!(
        "failed to read clipboard text using available backends"
    ))
}

fn try_command_paste(command: &[&str]) -> Result<String> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if output.status.success() {
        String::from_utf8(output.stdout).context("clipboard contents are not UTF-8")
    } else {
        Err(anyhow!("clipboard command exited with status {}", output.status))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbpaste"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![
        &["xclip", "-selection", "clipboard", "-o"],
        &["wl-paste", "--no-newline"],
    ]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "Get-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
