//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::infra::git::discover_root;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".revsight/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitSettings,
    #[serde(default)]
    pub diff: DiffSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSettings {
    #[serde(default = "GitSettings::default_program")]
    pub program: String,
    #[serde(default = "GitSettings::default_remote")]
    pub remote: String,
}

impl GitSettings {
    fn default_program() -> String {
        "git".into()
    }

    fn default_remote() -> String {
        "origin".into()
    }
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
            remote: Self::default_remote(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSettings {
    #[serde(default = "DiffSettings::default_release_delay_secs")]
    pub release_delay_secs: u64,
    #[serde(default = "DiffSettings::default_context_lines")]
    pub context_lines: usize,
}

impl DiffSettings {
    fn default_release_delay_secs() -> u64 {
        10
    }

    fn default_context_lines() -> usize {
        3
    }

    /// Grace period before a diff's content provider is released.
    pub fn release_delay(&self) -> Duration {
        Duration::from_secs(self.release_delay_secs)
    }
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            release_delay_secs: Self::default_release_delay_secs(),
            context_lines: Self::default_context_lines(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BrowserSettings {
    #[serde(default)]
    pub command: String,
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    git_program: Option<String>,
    remote: Option<String>,
    browser: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            git_program: env::var("REVSIGHT_GIT").ok(),
            remote: env::var("REVSIGHT_REMOTE").ok(),
            browser: env::var("REVSIGHT_BROWSER").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(git_program: &str, remote: &str) -> Self {
        Self {
            git_program: Some(git_program.to_owned()),
            remote: Some(remote.to_owned()),
            browser: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    ///
    /// The workspace layer comes from the repository containing `target`, or the current
    /// directory when no target is known.
    pub fn load(target: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path(target)?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data).with_context(|| format!("invalid config in {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            git: merge_git(self.git, other.git),
            diff: merge_diff(self.diff, other.diff),
            browser: merge_browser(self.browser, other.browser),
        }
    }
}

fn merge_git(base: GitSettings, overlay: GitSettings) -> GitSettings {
    GitSettings {
        program: choose(base.program, overlay.program, GitSettings::default_program),
        remote: choose(base.remote, overlay.remote, GitSettings::default_remote),
    }
}

fn merge_diff(base: DiffSettings, overlay: DiffSettings) -> DiffSettings {
    DiffSettings {
        release_delay_secs: choose(
            base.release_delay_secs,
            overlay.release_delay_secs,
            DiffSettings::default_release_delay_secs,
        ),
        context_lines: choose(
            base.context_lines,
            overlay.context_lines,
            DiffSettings::default_context_lines,
        ),
    }
}

fn merge_browser(base: BrowserSettings, overlay: BrowserSettings) -> BrowserSettings {
    if overlay.command.trim().is_empty() {
        base
    } else {
        overlay
    }
}

fn choose<T: PartialEq>(base: T, overlay: T, default_fn: fn() -> T) -> T {
    if overlay != default_fn() { overlay } else { base }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("revsight/config.toml"))
}

fn workspace_config_path(target: Option<&Path>) -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let start = match target {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => cwd,
    };
    let root = discover_root(&start).or_else(|| start.is_dir().then_some(start));
    Ok(root.map(|root| root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(program) = env.git_program.filter(|value| !value.trim().is_empty()) {
        config.git.program = program;
    }
    if let Some(remote) = env.remote.filter(|value| !value.trim().is_empty()) {
        config.git.remote = remote;
    }
    if let Some(browser) = env.browser {
        config.browser.command = browser;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.git.program, "git");
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.diff.release_delay(), Duration::from_secs(10));
        assert!(config.browser.command.is_empty());
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[git]
remote = "upstream"
[browser]
command = "firefox --new-tab"
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".revsight"))?;
        fs::write(
            workspace_dir.join(".revsight/config.toml"),
            r#"
[diff]
release_delay_secs = 30
"#,
        )?;

        let config = Config::load_with_layers(
            Some(global),
            Some(workspace_dir.join(".revsight/config.toml")),
            EnvOverrides::default(),
        )?;

        assert_eq!(config.git.remote, "upstream");
        assert_eq!(config.git.program, "git");
        assert_eq!(config.diff.release_delay_secs, 30);
        assert_eq!(config.diff.context_lines, 3);
        assert_eq!(config.browser.command, "firefox --new-tab");

        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("/opt/git/bin/git", "fork");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.git.program, "/opt/git/bin/git");
        assert_eq!(config.git.remote, "fork");
        Ok(())
    }

    #[test]
    fn workspace_layer_follows_target_repository() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let repo = temp.path().join("other-repo");
        fs::create_dir_all(&repo)?;
        gix::init(&repo)?;
        fs::create_dir_all(repo.join("src"))?;
        fs::write(repo.join("src/main.rs"), "fn main() {}\n")?;

        let path = workspace_config_path(Some(&repo.join("src/main.rs")))?
            .expect("workspace config path");
        assert_eq!(path, repo.canonicalize()?.join(".revsight/config.toml"));
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
