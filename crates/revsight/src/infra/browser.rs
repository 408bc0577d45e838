//! Launching URLs in the user's browser.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Opens URLs with either a configured command or the platform opener.
#[derive(Debug, Clone, Default)]
pub struct Browser {
    command: Option<Vec<String>>,
}

impl Browser {
    /// `command` is split on whitespace and the URL is appended as the final argument.
    /// A blank command selects the platform opener.
    pub fn new(command: &str) -> Self {
        let parts: Vec<String> = command.split_whitespace().map(str::to_owned).collect();
        Self {
            command: (!parts.is_empty()).then_some(parts),
        }
    }

    pub fn open(&self, url: &str) -> Result<()> {
        match &self.command {
            Some(parts) => spawn_configured(parts, url),
            None => open_with_platform(url),
        }
    }
}

fn spawn_configured(parts: &[String], url: &str) -> Result<()> {
    let (program, args) = parts
        .split_first()
        .context("browser command missing program")?;
    Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch browser command: {program}"))?;
    Ok(())
}

fn open_with_platform(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to launch macOS browser opener")?;
        return Ok(());
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Command::new("xdg-open")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to launch xdg-open")?;
        return Ok(());
    }

    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()
            .context("failed to launch Windows browser opener")?;
        return Ok(());
    }

    #[allow(unreachable_code)]
    Err(anyhow!("opening URLs is not supported on this platform"))
}
