//! Historical file content for the diff view.
//!
//! A [`ContentLocator`] names a file at a revision. The diff view resolves it
//! through a [`ProviderSlot`], a single-slot arena holding the provider of the
//! command currently showing a diff. The command acquires the slot before
//! opening the view and releases it after a grace period.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::errors::RevsightError;
use crate::infra::git::GitCli;

/// URI scheme used when a locator is carried around as a string.
pub const LOCATOR_SCHEME: &str = "revsight-rev";

/// Reference to `relative_path` as of `revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLocator {
    relative_path: String,
    revision: String,
}

impl ContentLocator {
    pub fn new(relative_path: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            revision: revision.into(),
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// `revsight-rev:/<path>?ref=<revision>`
    pub fn to_uri(&self) -> String {
        format!(
            "{LOCATOR_SCHEME}:/{}?ref={}",
            escape(&self.relative_path),
            escape(&self.revision)
        )
    }

    pub fn parse_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(LOCATOR_SCHEME)?.strip_prefix(":/")?;
        let (path, revision) = rest.split_once("?ref=")?;
        if path.is_empty() || revision.is_empty() {
            return None;
        }
        Some(Self::new(unescape(path)?, unescape(revision)?))
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.relative_path, self.revision)
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            '?' => escaped.push_str("%3F"),
            '#' => escaped.push_str("%23"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(index) = rest.find('%') {
        out.push_str(&rest[..index]);
        let code = rest.get(index + 1..index + 3)?;
        out.push(match code {
            "25" => '%',
            "3F" | "3f" => '?',
            "23" => '#',
            _ => return None,
        });
        rest = &rest[index + 3..];
    }
    out.push_str(rest);
    Some(out)
}

/// Produces file text for a locator.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn provide(&self, locator: &ContentLocator) -> Result<String, RevsightError>;
}

/// Reads historical content with `git show` in one repository.
#[derive(Debug, Clone)]
pub struct GitContentProvider {
    git: GitCli,
}

impl GitContentProvider {
    pub fn new(git: GitCli) -> Self {
        Self { git }
    }
}

#[async_trait]
impl ContentProvider for GitContentProvider {
    async fn provide(&self, locator: &ContentLocator) -> Result<String, RevsightError> {
        self.git
            .show_file(locator.revision(), locator.relative_path())
            .await
            .map_err(|err| RevsightError::ContentFetchFailure {
                path: locator.relative_path().to_owned(),
                revision: locator.revision().to_owned(),
                detail: match err {
                    RevsightError::ExternalToolFailure { detail, .. } => detail,
                    other => other.to_string(),
                },
            })
    }
}

/// Text shown in place of content that could not be loaded.
pub fn placeholder(err: &RevsightError) -> String {
    format!("[revsight] {err}\n")
}

#[derive(Default)]
struct SlotState {
    provider: Option<Arc<dyn ContentProvider>>,
    generation: u64,
}

/// Holds at most one live content provider.
#[derive(Clone, Default)]
pub struct ProviderSlot {
    state: Arc<Mutex<SlotState>>,
}

impl ProviderSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `provider`, replacing any previous occupant.
    pub fn acquire(&self, provider: Arc<dyn ContentProvider>) -> ProviderLease {
        let mut state = self.state.lock();
        state.generation += 1;
        state.provider = Some(provider);
        debug!(generation = state.generation, "content provider acquired");
        ProviderLease {
            slot: self.clone(),
            generation: state.generation,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.state.lock().provider.is_some()
    }

    /// Dereference `locator`. Failures come back as placeholder text.
    pub async fn resolve(&self, locator: &ContentLocator) -> String {
        let provider = self.state.lock().provider.clone();
        let result = match provider {
            Some(provider) => provider.provide(locator).await,
            None => Err(RevsightError::ContentFetchFailure {
                path: locator.relative_path().to_owned(),
                revision: locator.revision().to_owned(),
                detail: "no content provider is registered".into(),
            }),
        };

        result.unwrap_or_else(|err| {
            warn!(%locator, error = %err, "falling back to placeholder content");
            placeholder(&err)
        })
    }

    fn release_generation(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation == generation && state.provider.is_some() {
            state.provider = None;
            debug!(generation, "content provider released");
        }
    }
}

impl fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ProviderSlot")
            .field("occupied", &state.provider.is_some())
            .field("generation", &state.generation)
            .finish()
    }
}

/// Claim on a [`ProviderSlot`]. Releasing only clears the slot if no later
/// lease has replaced this one.
#[derive(Debug)]
#[must_use = "a lease that is never released keeps its provider alive"]
pub struct ProviderLease {
    slot: ProviderSlot,
    generation: u64,
}

impl ProviderLease {
    pub fn release(self) {
        self.slot.release_generation(self.generation);
    }

    /// Release once `delay` has elapsed. Must be called within a tokio runtime.
    pub fn release_after(self, delay: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            self.release();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl ContentProvider for Fixed {
        async fn provide(&self, _locator: &ContentLocator) -> Result<String, RevsightError> {
            Ok(self.0.to_owned())
        }
    }

    struct Failing;

    #[async_trait]
    impl ContentProvider for Failing {
        async fn provide(&self, locator: &ContentLocator) -> Result<String, RevsightError> {
            Err(RevsightError::ContentFetchFailure {
                path: locator.relative_path().to_owned(),
                revision: locator.revision().to_owned(),
                detail: "invalid object name".into(),
            })
        }
    }

    #[test]
    fn uri_round_trips_special_characters() {
        let locator = ContentLocator::new("docs/what?.md", "v1.0#rc%1");
        let uri = locator.to_uri();
        assert_eq!(uri, "revsight-rev:/docs/what%3F.md?ref=v1.0%23rc%251");
        assert_eq!(ContentLocator::parse_uri(&uri), Some(locator));
    }

    #[test]
    fn malformed_uris_are_rejected() {
        assert!(ContentLocator::parse_uri("file:/a.txt?ref=main").is_none());
        assert!(ContentLocator::parse_uri("revsight-rev:/a.txt").is_none());
        assert!(ContentLocator::parse_uri("revsight-rev:/?ref=main").is_none());
    }

    #[tokio::test]
    async fn failure_resolves_to_placeholder() {
        let slot = ProviderSlot::new();
        let lease = slot.acquire(Arc::new(Failing));
        let text = slot
            .resolve(&ContentLocator::new("src/lib.rs", "deadbeef"))
            .await;
        assert!(text.contains("[revsight]"));
        assert!(text.contains("unable to load src/lib.rs at deadbeef"));
        lease.release();
    }

    #[tokio::test]
    async fn empty_slot_resolves_to_placeholder() {
        let slot = ProviderSlot::new();
        let text = slot.resolve(&ContentLocator::new("a.txt", "main")).await;
        assert!(text.contains("no content provider is registered"));
    }

    #[tokio::test(start_paused = true)]
    async fn lease_is_released_after_delay() {
        let slot = ProviderSlot::new();
        let lease = slot.acquire(Arc::new(Fixed("old text")));
        let handle = lease.release_after(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(slot.is_occupied());
        assert_eq!(
            slot.resolve(&ContentLocator::new("a.txt", "main")).await,
            "old text"
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.await.expect("release task");
        assert!(!slot.is_occupied());
    }

    #[tokio::test]
    async fn stale_lease_does_not_evict_newer_provider() {
        let slot = ProviderSlot::new();
        let first = slot.acquire(Arc::new(Fixed("first")));
        let second = slot.acquire(Arc::new(Fixed("second")));

        first.release();
        assert!(slot.is_occupied());
        assert_eq!(
            slot.resolve(&ContentLocator::new("a.txt", "main")).await,
            "second"
        );

        second.release();
        assert!(!slot.is_occupied());
    }
}
