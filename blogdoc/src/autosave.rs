//! Draft autosave
//!
//! Periodically writes the editor content to a local key-value store under
//! one fixed key, and offers the stored draft back when an empty editor
//! starts. Time is a logical clock advanced by the host's event loop, so a
//! save never blocks input handling.

use crate::editor_config::AutosaveConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Key under which the draft is stored
pub const DRAFT_KEY: &str = "blog_content_draft";

/// Errors from a draft store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error for {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Invalid draft key: {0:?}")]
    InvalidKey(String),
}

/// Local durable key-value storage for drafts
pub trait DraftStore {
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove a key; removing a missing key is not an error
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// When the key was last written, if the store knows
    fn modified(&self, _key: &str) -> Option<DateTime<Utc>> {
        None
    }
}

/// In-memory store, for tests and hosts without durable storage
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: HashMap<String, (String, DateTime<Utc>)>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Utc::now()));
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|(value, _)| value.clone()))
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn modified(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|(_, at)| *at)
    }
}

/// Store keeping one file per key in a directory
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    directory: PathBuf,
}

impl FileDraftStore {
    /// The directory is created on the first write
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.directory.join(format!("{}.html", key)))
    }
}

impl DraftStore for FileDraftStore {
    /// Write through a temporary file so a crash never leaves half a draft
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.directory)
            .map_err(|e| StoreError::IoError(self.directory.clone(), e))?;

        let temp = path.with_extension("html.tmp");
        fs::write(&temp, value).map_err(|e| StoreError::IoError(temp.clone(), e))?;
        fs::rename(&temp, &path).map_err(|e| StoreError::IoError(path.clone(), e))
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::IoError(path, e)),
        };
        match String::from_utf8(bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!(
                    "Draft {} is not valid UTF-8, restoring it lossily",
                    path.display()
                );
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::IoError(path, e)),
        }
    }

    fn modified(&self, key: &str) -> Option<DateTime<Utc>> {
        let path = self.path_for(key).ok()?;
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

/// A saved draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub content: String,
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    /// Timer not running
    Idle,

    /// Timer running, waiting for the next tick
    Armed,

    /// A write is in progress
    Saving,
}

/// Result of a save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    Saved { at: DateTime<Utc> },

    /// Nothing was written: the content is empty, or a restore prompt is
    /// still unanswered
    Skipped,

    /// The draft stays pending in memory and is retried on the next save
    Failed { error: String },
}

/// Interval and manual draft saving over a [`DraftStore`]
#[derive(Debug)]
pub struct AutosaveManager<S: DraftStore> {
    store: S,
    state: AutosaveState,
    interval: Duration,
    elapsed: Duration,
    last_saved: Option<DateTime<Utc>>,
    last_error: Option<String>,

    /// Snapshot whose write failed
    pending: Option<DraftSnapshot>,

    /// A stored draft was offered and the user has not answered yet
    restore_pending: bool,
}

impl<S: DraftStore> AutosaveManager<S> {
    /// Create a manager, armed when the configuration enables autosave
    pub fn new(store: S, config: &AutosaveConfig) -> Self {
        let mut manager = Self {
            store,
            state: AutosaveState::Idle,
            interval: Duration::from_secs(config.interval_secs.max(1)),
            elapsed: Duration::ZERO,
            last_saved: None,
            last_error: None,
            pending: None,
            restore_pending: false,
        };
        if config.enabled {
            manager.enable();
        }
        manager
    }

    /// Arm the repeating timer
    pub fn enable(&mut self) {
        self.state = AutosaveState::Armed;
        self.elapsed = Duration::ZERO;
    }

    /// Cancel future ticks without saving
    pub fn disable(&mut self) {
        self.state = AutosaveState::Idle;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_enabled(&self) -> bool {
        self.state != AutosaveState::Idle
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time of the last successful save
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending(&self) -> Option<&DraftSnapshot> {
        self.pending.as_ref()
    }

    pub fn restore_pending(&self) -> bool {
        self.restore_pending
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Advance the logical clock
    ///
    /// Saves `content` when an interval boundary is crossed. Several missed
    /// intervals still produce a single save. Ticks are held back while a
    /// restore prompt is unanswered.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        content: &str,
        now: DateTime<Utc>,
    ) -> Option<AutosaveEvent> {
        if self.state != AutosaveState::Armed {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(elapsed);
        if self.elapsed < self.interval {
            return None;
        }
        let carry = self.elapsed.as_nanos() % self.interval.as_nanos();
        self.elapsed = Duration::new(
            (carry / 1_000_000_000) as u64,
            (carry % 1_000_000_000) as u32,
        );
        if self.restore_pending {
            log::debug!("Autosave tick skipped: restore prompt unanswered");
            return None;
        }
        Some(self.save(content, now))
    }

    /// Save immediately, whether or not the timer is armed
    pub fn save_now(&mut self, content: &str, now: DateTime<Utc>) -> AutosaveEvent {
        self.save(content, now)
    }

    fn save(&mut self, content: &str, now: DateTime<Utc>) -> AutosaveEvent {
        if self.restore_pending {
            log::debug!("Not saving: restore prompt unanswered");
            return AutosaveEvent::Skipped;
        }
        // An empty editor never replaces a stored draft
        if content.trim().is_empty() {
            log::debug!("Not saving empty content");
            return AutosaveEvent::Skipped;
        }

        let resume = if self.is_enabled() {
            AutosaveState::Armed
        } else {
            AutosaveState::Idle
        };
        self.state = AutosaveState::Saving;

        let event = match self.store.write(DRAFT_KEY, content) {
            Ok(()) => {
                log::info!("Draft saved ({} bytes)", content.len());
                self.last_saved = Some(now);
                self.last_error = None;
                self.pending = None;
                AutosaveEvent::Saved { at: now }
            }
            Err(e) => {
                log::warn!("Draft save failed: {}", e);
                self.last_error = Some(e.to_string());
                self.pending = Some(DraftSnapshot {
                    content: content.to_string(),
                    saved_at: Some(now),
                });
                AutosaveEvent::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.state = resume;
        event
    }

    /// The stored draft, if any
    pub fn stored_draft(&self) -> Result<Option<DraftSnapshot>, StoreError> {
        let content = self.store.read(DRAFT_KEY)?;
        Ok(content.map(|content| DraftSnapshot {
            content,
            saved_at: self.store.modified(DRAFT_KEY),
        }))
    }

    /// Draft to offer for restoring when the editor starts
    ///
    /// Only offered when the document is empty. A store that cannot be read
    /// offers nothing. While an offered draft awaits
    /// [`resolve_restore`](Self::resolve_restore), nothing is saved over it.
    pub fn restore_prompt(&mut self, document_is_empty: bool) -> Option<DraftSnapshot> {
        if !document_is_empty {
            return None;
        }
        let draft = match self.stored_draft() {
            Ok(draft) => draft,
            Err(e) => {
                log::warn!("Could not read stored draft: {}", e);
                None
            }
        };
        self.restore_pending = draft.is_some();
        draft
    }

    /// Answer the restore prompt
    ///
    /// Accepting returns the draft to load; declining deletes it for good.
    pub fn resolve_restore(&mut self, accept: bool) -> Result<Option<DraftSnapshot>, StoreError> {
        if accept {
            let draft = self.stored_draft()?;
            self.restore_pending = false;
            return Ok(draft);
        }
        self.discard()?;
        self.restore_pending = false;
        Ok(None)
    }

    /// Delete the stored draft
    pub fn discard(&mut self) -> Result<(), StoreError> {
        log::info!("Discarding stored draft");
        self.store.delete(DRAFT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Store whose writes fail until `healthy` is set
    #[derive(Default)]
    struct FlakyStore {
        healthy: bool,
        inner: MemoryDraftStore,
    }

    impl DraftStore for FlakyStore {
        fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if !self.healthy {
                return Err(StoreError::IoError(
                    PathBuf::from("/drafts"),
                    std::io::Error::other("disk full"),
                ));
            }
            self.inner.write(key, value)
        }

        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.read(key)
        }

        fn delete(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.delete(key)
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn manager() -> AutosaveManager<MemoryDraftStore> {
        AutosaveManager::new(MemoryDraftStore::new(), &AutosaveConfig::default())
    }

    #[test]
    fn test_tick_after_interval_saves_content() {
        // Arrange: Autosave enabled with the default 60 second interval
        let mut autosave = manager();
        assert_eq!(autosave.state(), AutosaveState::Armed);

        // Act: 59 seconds, then one more
        let early = autosave.advance(Duration::from_secs(59), "hello world", at(59));
        let tick = autosave.advance(Duration::from_secs(1), "hello world", at(60));

        // Assert: Only the second call saves
        assert_eq!(early, None);
        assert_eq!(tick, Some(AutosaveEvent::Saved { at: at(60) }));
        assert_eq!(
            autosave.store().read(DRAFT_KEY).unwrap().as_deref(),
            Some("hello world")
        );
        assert_eq!(autosave.last_saved(), Some(at(60)));
        assert_eq!(autosave.state(), AutosaveState::Armed);
    }

    #[test]
    fn test_disable_stops_future_ticks() {
        let mut autosave = manager();
        autosave.advance(Duration::from_secs(60), "first", at(60));
        autosave.disable();

        assert_eq!(autosave.advance(Duration::from_secs(600), "second", at(660)), None);
        assert_eq!(
            autosave.store().read(DRAFT_KEY).unwrap().as_deref(),
            Some("first")
        );
        assert_eq!(autosave.state(), AutosaveState::Idle);
    }

    #[test]
    fn test_missed_intervals_save_once() {
        let mut autosave = manager();
        let event = autosave.advance(Duration::from_secs(150), "x", at(150));
        assert!(matches!(event, Some(AutosaveEvent::Saved { .. })));
        // 30 seconds carried over
        assert_eq!(autosave.advance(Duration::from_secs(29), "x", at(179)), None);
        assert!(autosave.advance(Duration::from_secs(1), "x", at(180)).is_some());
    }

    #[test]
    fn test_manual_save_works_while_disabled() {
        let config = AutosaveConfig {
            enabled: false,
            ..AutosaveConfig::default()
        };
        let mut autosave = AutosaveManager::new(MemoryDraftStore::new(), &config);
        assert_eq!(autosave.save_now("<p>draft</p>", at(5)), AutosaveEvent::Saved { at: at(5) });
        assert_eq!(autosave.state(), AutosaveState::Idle);
    }

    #[test]
    fn test_restore_prompt_only_for_empty_document() {
        let mut autosave = manager();
        autosave.save_now("<p>draft</p>", at(1));

        assert_eq!(autosave.restore_prompt(false), None);
        let offered = autosave.restore_prompt(true).unwrap();
        assert_eq!(offered.content, "<p>draft</p>");
        assert!(offered.saved_at.is_some());
    }

    #[test]
    fn test_declining_restore_deletes_draft() {
        let mut autosave = manager();
        autosave.save_now("<p>draft</p>", at(1));

        assert_eq!(autosave.resolve_restore(false).unwrap(), None);
        assert_eq!(autosave.restore_prompt(true), None);
    }

    #[test]
    fn test_accepting_restore_keeps_draft() {
        let mut autosave = manager();
        autosave.save_now("<p>draft</p>", at(1));

        let restored = autosave.resolve_restore(true).unwrap().unwrap();
        assert_eq!(restored.content, "<p>draft</p>");
        assert!(autosave.restore_prompt(true).is_some());
    }

    #[test]
    fn test_write_failure_keeps_pending_and_retries() {
        // Arrange: A store that rejects writes
        let mut autosave = AutosaveManager::new(FlakyStore::default(), &AutosaveConfig::default());

        // Act: Tick while the store is failing
        let event = autosave.advance(Duration::from_secs(60), "<p>v1</p>", at(60));

        // Assert: Failure reported, draft kept in memory
        assert!(matches!(event, Some(AutosaveEvent::Failed { .. })));
        assert!(autosave.last_error().unwrap().contains("disk full"));
        assert_eq!(autosave.pending().unwrap().content, "<p>v1</p>");
        assert_eq!(autosave.last_saved(), None);

        // The next tick succeeds and clears the failure
        autosave.store.healthy = true;
        let event = autosave.advance(Duration::from_secs(60), "<p>v2</p>", at(120));
        assert_eq!(event, Some(AutosaveEvent::Saved { at: at(120) }));
        assert_eq!(autosave.pending(), None);
        assert_eq!(autosave.last_error(), None);
    }

    #[test]
    fn test_unanswered_restore_prompt_protects_draft() {
        // Arrange: A draft from an earlier session, offered to an empty editor
        let mut store = MemoryDraftStore::new();
        store.write(DRAFT_KEY, "<p>yesterday's work</p>").unwrap();
        let mut autosave = AutosaveManager::new(store, &AutosaveConfig::default());
        assert!(autosave.restore_prompt(true).is_some());

        // Act: Timer ticks and a manual save before the user answers
        let tick = autosave.advance(Duration::from_secs(60), "<p>new</p>", at(60));
        let manual = autosave.save_now("<p>new</p>", at(61));

        // Assert: The offered draft is intact and can still be accepted
        assert_eq!(tick, None);
        assert_eq!(manual, AutosaveEvent::Skipped);
        assert!(autosave.restore_pending());
        let restored = autosave.resolve_restore(true).unwrap().unwrap();
        assert_eq!(restored.content, "<p>yesterday's work</p>");

        // Saving resumes once the prompt is answered
        assert!(!autosave.restore_pending());
        assert_eq!(
            autosave.advance(Duration::from_secs(60), "<p>new</p>", at(120)),
            Some(AutosaveEvent::Saved { at: at(120) })
        );
    }

    #[test]
    fn test_empty_content_never_overwrites_draft() {
        let mut autosave = manager();
        autosave.save_now("<p>draft</p>", at(1));

        assert_eq!(
            autosave.advance(Duration::from_secs(60), "", at(60)),
            Some(AutosaveEvent::Skipped)
        );
        assert_eq!(autosave.save_now("  ", at(61)), AutosaveEvent::Skipped);
        assert_eq!(
            autosave.store().read(DRAFT_KEY).unwrap().as_deref(),
            Some("<p>draft</p>")
        );
        assert_eq!(autosave.last_saved(), Some(at(1)));
    }

    #[test]
    fn test_huge_elapsed_time_does_not_overflow() {
        let mut autosave = manager();
        assert!(autosave.advance(Duration::MAX, "x", at(1)).is_some());
        assert!(autosave.advance(Duration::MAX, "x", at(2)).is_some());
        // The carry is always shorter than one interval
        assert_eq!(autosave.advance(Duration::ZERO, "x", at(3)), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileDraftStore::new(dir.path().join("drafts"));

        assert_eq!(store.read(DRAFT_KEY).unwrap(), None);
        store.write(DRAFT_KEY, "<p>one</p>").unwrap();
        store.write(DRAFT_KEY, "<p>two</p>").unwrap();
        assert_eq!(store.read(DRAFT_KEY).unwrap().as_deref(), Some("<p>two</p>"));
        assert!(store.modified(DRAFT_KEY).is_some());

        store.delete(DRAFT_KEY).unwrap();
        store.delete(DRAFT_KEY).unwrap();
        assert_eq!(store.read(DRAFT_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileDraftStore::new(dir.path());
        assert!(matches!(
            store.write("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_draft_is_restored_lossily() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blog_content_draft.html"), b"<p>caf\xe9</p>").unwrap();
        let store = FileDraftStore::new(dir.path());

        let restored = store.read(DRAFT_KEY).unwrap().unwrap();
        assert_eq!(restored, "<p>caf\u{fffd}</p>");
    }
}
