//! One editing session
//!
//! Wires the adapter, the dispatcher and the derived-data consumers
//! together. Every change the adapter commits is pushed to the metrics
//! engine right away; autosave reads the current content when its clock
//! ticks; the table of contents and the audit run on request.

use crate::accessibility::{self, AccessibilityReport};
use crate::autosave::{AutosaveEvent, AutosaveManager, DraftSnapshot, DraftStore, StoreError};
use crate::document_model::Selection;
use crate::editor::{
    Change, Command, CommandDispatcher, CommandError, DocumentAdapter, ImageInput, ModalKind,
    ModalRequest, ModalResponse, Outcome, ValidationError,
};
use crate::editor_config::EditorConfig;
use crate::metrics::{ContentMetrics, MetricsEngine};
use crate::table_menu::{LayoutProvider, MenuPosition, TableMenuPositioner};
use crate::toc::{self, HeadingRecord, Numbering};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;

/// Editor state plus everything derived from it
#[derive(Debug)]
pub struct EditorSession<S: DraftStore> {
    adapter: DocumentAdapter,
    dispatcher: CommandDispatcher,
    metrics: MetricsEngine,
    autosave: AutosaveManager<S>,
    table_menu: TableMenuPositioner,
    config: EditorConfig,
}

impl<S: DraftStore> EditorSession<S> {
    /// Start a session with an empty, focused editor
    pub fn new(config: EditorConfig, store: S) -> Self {
        let mut session = Self {
            adapter: DocumentAdapter::with_history_depth(config.limits.history_depth),
            dispatcher: CommandDispatcher::new(config.limits.clone()),
            metrics: MetricsEngine::new(&config.metrics),
            autosave: AutosaveManager::new(store, &config.autosave),
            table_menu: TableMenuPositioner::new(&config.table_menu),
            config,
        };
        let markup = session.adapter.content();
        session.metrics.update(&markup);
        session
    }

    pub fn adapter(&self) -> &DocumentAdapter {
        &self.adapter
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn autosave(&self) -> &AutosaveManager<S> {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut AutosaveManager<S> {
        &mut self.autosave
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current serialized markup
    pub fn content(&self) -> String {
        self.adapter.content()
    }

    /// Move the cursor or selection
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), CommandError> {
        self.adapter.set_selection(selection)
    }

    pub fn focus(&mut self) {
        self.adapter.focus();
    }

    /// Drop the selection; commands are ignored until the editor is focused
    pub fn blur(&mut self) {
        self.adapter.blur();
    }

    /// Replace the document
    pub fn load(&mut self, markup: &str) -> Change {
        let change = self.adapter.set_content(markup);
        self.notify(&change);
        change
    }

    /// Run a toolbar command
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let outcome = self.dispatcher.dispatch(&mut self.adapter, command)?;
        if let Outcome::Applied(change) = &outcome {
            self.notify(change);
        }
        Ok(outcome)
    }

    /// Open a modal; `None` when there is no active editor to insert into
    pub fn open_modal(&mut self, kind: ModalKind) -> Result<Option<ModalRequest>, CommandError> {
        self.dispatcher.open(&self.adapter, kind)
    }

    /// Confirm the pending modal with the user's input
    pub fn confirm_modal(&mut self, response: ModalResponse) -> Result<Outcome, CommandError> {
        let outcome = self.dispatcher.confirm(&mut self.adapter, response)?;
        if let Outcome::Applied(change) = &outcome {
            self.notify(change);
        }
        Ok(outcome)
    }

    pub fn cancel_modal(&mut self) -> bool {
        self.dispatcher.cancel()
    }

    /// Image modal input from a local file, within the configured size limit
    pub fn image_from_file(&self, path: &Path, alt: &str) -> Result<ImageInput, ValidationError> {
        ImageInput::from_file(path, alt, self.config.limits.max_image_bytes)
    }

    fn notify(&mut self, change: &Change) {
        let metrics = self.metrics.on_change(change);
        log::debug!(
            "Content changed: {} words, {} min read",
            metrics.word_count,
            metrics.read_time_minutes
        );
    }

    pub fn metrics(&self) -> ContentMetrics {
        self.metrics.current()
    }

    pub fn headings(&self, numbering: Numbering) -> Vec<HeadingRecord> {
        toc::generate(self.adapter.document(), numbering)
    }

    /// Insert a table of contents at the cursor
    pub fn insert_table_of_contents(&mut self, numbering: Numbering) -> Result<Change, CommandError> {
        let change = toc::insert_table_of_contents(&mut self.adapter, numbering)?;
        self.notify(&change);
        Ok(change)
    }

    pub fn audit(&self) -> AccessibilityReport {
        accessibility::audit_document(self.adapter.document(), &self.config.audit)
    }

    /// Where the table menu goes for the current selection
    pub fn table_menu_position<L: LayoutProvider>(&self, layout: &L) -> Option<MenuPosition> {
        self.table_menu.on_selection_change(&self.adapter, layout)
    }

    /// Advance the autosave clock, saving the current content on a tick
    pub fn tick(&mut self, elapsed: Duration, now: DateTime<Utc>) -> Option<AutosaveEvent> {
        let content = self.adapter.content();
        self.autosave.advance(elapsed, &content, now)
    }

    /// Manual "save draft"
    pub fn save_draft(&mut self, now: DateTime<Utc>) -> AutosaveEvent {
        let content = self.adapter.content();
        self.autosave.save_now(&content, now)
    }

    /// Draft to offer when the editor starts empty
    ///
    /// Autosave holds off until the prompt is answered.
    pub fn restore_prompt(&mut self) -> Option<DraftSnapshot> {
        self.autosave.restore_prompt(self.adapter.is_empty())
    }

    /// Answer the restore prompt
    ///
    /// Accepting loads the draft into the editor; declining deletes it.
    pub fn resolve_restore(&mut self, accept: bool) -> Result<Option<Change>, StoreError> {
        match self.autosave.resolve_restore(accept)? {
            Some(draft) => Ok(Some(self.load(&draft.content))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::{MemoryDraftStore, DRAFT_KEY};
    use crate::document_model::MarkKind;
    use crate::editor::LinkInput;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn session() -> EditorSession<MemoryDraftStore> {
        EditorSession::new(EditorConfig::default(), MemoryDraftStore::new())
    }

    #[test]
    fn test_metrics_follow_every_change() {
        // Arrange: A session with some words
        let mut session = session();
        session.load("<p>one two three</p>");
        assert_eq!(session.metrics().word_count, 3);

        // Act: Type more words at the cursor
        session
            .dispatch(Command::InsertText("zero ".to_string()))
            .unwrap();

        // Assert: Metrics were pushed without asking
        assert_eq!(session.metrics().word_count, 4);
        assert_eq!(session.metrics().read_time_minutes, 1);
    }

    #[test]
    fn test_stored_marks_do_not_notify() {
        let mut session = session();
        let outcome = session.dispatch(Command::ToggleMark(MarkKind::Bold)).unwrap();
        assert!(matches!(outcome, Outcome::StoredMarks(_)));
        assert_eq!(session.metrics().word_count, 0);
    }

    #[test]
    fn test_tick_saves_current_content() {
        let mut session = session();
        session.load("<p>draft body</p>");

        assert!(session.tick(Duration::from_secs(30), now()).is_none());
        let event = session.tick(Duration::from_secs(30), now());

        assert_eq!(event, Some(AutosaveEvent::Saved { at: now() }));
        assert_eq!(
            session.autosave().store().read(DRAFT_KEY).unwrap().as_deref(),
            Some("<p>draft body</p>")
        );
    }

    #[test]
    fn test_restore_flow() {
        // Arrange: A draft left by an earlier session
        let mut store = MemoryDraftStore::new();
        store.write(DRAFT_KEY, "<h2>Saved</h2><p>words here</p>").unwrap();
        let mut session = EditorSession::new(EditorConfig::default(), store);

        // Act: The empty editor offers the draft and the user accepts
        let prompt = session.restore_prompt().unwrap();
        let change = session.resolve_restore(true).unwrap().unwrap();

        // Assert: The draft is loaded and metrics reflect it
        assert_eq!(prompt.content, "<h2>Saved</h2><p>words here</p>");
        assert_eq!(change.markup, prompt.content);
        assert_eq!(session.metrics().word_count, 3);
        assert!(session.restore_prompt().is_none());
    }

    #[test]
    fn test_declined_restore_deletes_draft() {
        let mut store = MemoryDraftStore::new();
        store.write(DRAFT_KEY, "<p>old</p>").unwrap();
        let mut session = EditorSession::new(EditorConfig::default(), store);

        assert_eq!(session.resolve_restore(false).unwrap(), None);
        assert_eq!(session.autosave().store().read(DRAFT_KEY).unwrap(), None);
        assert!(session.content().is_empty());
    }

    #[test]
    fn test_modal_insert_updates_metrics() {
        let mut session = session();
        session.load("<p>see docs</p>");
        let mut selection = session.adapter().selection().unwrap().clone();
        selection.head.offset = 3;
        session.set_selection(selection).unwrap();

        session.open_modal(ModalKind::Link).unwrap().unwrap();
        let outcome = session
            .confirm_modal(ModalResponse::Link(LinkInput {
                href: "https://example.com".to_string(),
                target: None,
            }))
            .unwrap();

        assert!(matches!(outcome, Outcome::Applied(_)));
        assert!(session.content().contains("<a href=\"https://example.com\">see</a>"));
        assert_eq!(session.metrics().word_count, 2);
    }

    #[test]
    fn test_selection_changes_keep_metrics_in_step() {
        // Arrange: A loaded post with the cursor moved inside it
        let mut session = session();
        session.load("<p>alpha beta</p>");
        let mut selection = session.adapter().selection().unwrap().clone();
        selection.head.offset = 5;
        session.set_selection(selection).unwrap();

        // Act: Edit, lose focus, regain it and edit again
        session
            .dispatch(Command::ToggleMark(MarkKind::Bold))
            .unwrap();
        assert_eq!(session.content(), "<p><strong>alpha</strong> beta</p>");
        session.blur();
        let ignored = session
            .dispatch(Command::InsertText("lost ".to_string()))
            .unwrap();
        session.focus();
        session
            .dispatch(Command::InsertText("gamma ".to_string()))
            .unwrap();

        // Assert: Metrics always describe the current content
        assert!(matches!(ignored, Outcome::NoEditor));
        assert!(!session.content().contains("lost"));
        assert_eq!(session.metrics().word_count, 3);
        assert_eq!(
            session.metrics(),
            crate::metrics::measure(&session.content(), 225)
        );
    }

    #[test]
    fn test_image_from_file_uses_configured_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, crate::media::tests::tiny_png()).unwrap();

        let mut config = EditorConfig::default();
        config.limits.max_image_bytes = 8;
        let strict = EditorSession::new(config, MemoryDraftStore::new());
        assert!(matches!(
            strict.image_from_file(&path, "pixel"),
            Err(ValidationError::ImageFile(_))
        ));

        let input = session().image_from_file(&path, "pixel").unwrap();
        assert!(input.src.starts_with("data:image/png;base64,"));
        assert_eq!(input.alt, "pixel");
    }

    #[test]
    fn test_pending_restore_blocks_autosave() {
        let mut store = MemoryDraftStore::new();
        store.write(DRAFT_KEY, "<p>keep me</p>").unwrap();
        let mut session = EditorSession::new(EditorConfig::default(), store);
        assert!(session.restore_prompt().is_some());

        assert_eq!(session.tick(Duration::from_secs(120), now()), None);
        assert_eq!(session.save_draft(now()), AutosaveEvent::Skipped);

        session.resolve_restore(true).unwrap();
        assert_eq!(session.content(), "<p>keep me</p>");
    }

    #[test]
    fn test_toc_and_audit_on_demand() {
        let mut session = session();
        session.load("<h1>Intro</h1><p>text</p><h3>Deep</h3>");

        assert_eq!(session.headings(Numbering::None).len(), 2);
        assert_eq!(session.audit().score, 90);

        session.insert_table_of_contents(Numbering::Auto).unwrap();
        assert!(session.content().contains("table-of-contents"));
        assert!(session.metrics().word_count > 4);
    }
}
