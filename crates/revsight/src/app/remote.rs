//! Mapping a repository remote to the web page of a file.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::RevsightError;
use crate::domain::model::{FileContext, RemoteTarget};
use crate::infra::git::GitCli;

static SCP_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@/:\s]+@(?P<host>[^:/\s]+):/?(?P<path>.+)$").expect("valid regex")
});
static SSH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ssh://(?:[^@/]+@)?(?P<host>[^:/]+)(?::\d+)?/(?P<path>.+)$").expect("valid regex")
});

/// Web host family, detected by substring in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteHost {
    GitHub,
    GitLab,
    Bitbucket,
    Generic,
}

impl RemoteHost {
    pub fn detect(base_url: &str) -> Self {
        if base_url.contains("github.com") {
            RemoteHost::GitHub
        } else if base_url.contains("gitlab.com") {
            RemoteHost::GitLab
        } else if base_url.contains("bitbucket.org") {
            RemoteHost::Bitbucket
        } else {
            RemoteHost::Generic
        }
    }

    fn path_segment(self) -> &'static str {
        match self {
            RemoteHost::GitHub | RemoteHost::Generic => "blob",
            RemoteHost::GitLab => "-/blob",
            RemoteHost::Bitbucket => "src",
        }
    }

    /// Unknown hosts never get a line fragment.
    fn line_fragment(self, line: u32) -> Option<String> {
        match self {
            RemoteHost::GitHub | RemoteHost::GitLab => Some(format!("#L{line}")),
            RemoteHost::Bitbucket => Some(format!("#lines-{line}")),
            RemoteHost::Generic => None,
        }
    }
}

/// Rewrite SSH remotes to `https://host/path` and drop a trailing `.git`.
pub fn normalize(remote_url: &str) -> String {
    let trimmed = remote_url.trim();
    let rewritten = if let Some(caps) = SSH_URL.captures(trimmed) {
        format!("https://{}/{}", &caps["host"], &caps["path"])
    } else if !trimmed.contains("://")
        && let Some(caps) = SCP_LIKE.captures(trimmed)
    {
        format!("https://{}/{}", &caps["host"], &caps["path"])
    } else {
        trimmed.to_owned()
    };

    match rewritten.strip_suffix(".git") {
        Some(stripped) => stripped.to_owned(),
        None => rewritten,
    }
}

/// Web URL of `relative_path` on `branch`. `line` is one-based.
pub fn build_file_url(
    base_url: &str,
    branch: &str,
    relative_path: &str,
    line: Option<u32>,
) -> String {
    let host = RemoteHost::detect(base_url);
    let mut url = format!("{base_url}/{}/{branch}/{relative_path}", host.path_segment());
    if let Some(fragment) = line.and_then(|line| host.line_fragment(line)) {
        url.push_str(&fragment);
    }
    url
}

impl RemoteTarget {
    pub fn to_url(&self) -> String {
        build_file_url(
            &self.normalized_base_url,
            &self.branch,
            &self.relative_path,
            self.display_line(),
        )
    }
}

/// Read the remote URL and current branch concurrently and assemble the target.
pub async fn fetch_remote_target(
    git: &GitCli,
    remote: &str,
    context: &FileContext,
    line_number: Option<u32>,
) -> Result<RemoteTarget, RevsightError> {
    let relative_path = context
        .relative_path()
        .ok_or_else(|| RevsightError::NotInWorkspace(context.absolute_path.clone()))?;
    let (remote_url, branch) = tokio::try_join!(git.remote_url(remote), git.current_branch())?;
    Ok(RemoteTarget {
        normalized_base_url: normalize(&remote_url),
        branch,
        relative_path,
        line_number,
    })
}
