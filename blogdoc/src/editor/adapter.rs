//! Document model adapter
//!
//! Owns the document tree and the selection for one editing session. Content
//! crosses the boundary as serialized markup; everything in between is a
//! tree edit applied through [`DocumentAdapter::transact`], which commits a
//! whole new tree or nothing.

use super::error::CommandError;
use super::history::{History, Snapshot};
use crate::document_model::{
    marks_at, Block, Document, MarkKind, Marks, NodePath, Position, Selection,
};

/// Change notification carrying the new serialized markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub markup: String,
}

/// Character range inside one text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    pub path: NodePath,
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

/// Working copy handed to a mutation
///
/// Edits made here become visible only when the closure passed to
/// [`DocumentAdapter::transact`] returns `Ok`.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub doc: Document,
    pub selection: Selection,
    pub stored_marks: Option<Marks>,
}

impl Transaction {
    /// Cursor end of the selection
    pub fn head(&self) -> &Position {
        &self.selection.head
    }

    /// Start of the selection in document order
    pub fn from(&self) -> &Position {
        self.selection.from()
    }

    pub fn to(&self) -> &Position {
        self.selection.to()
    }

    pub fn is_collapsed(&self) -> bool {
        self.selection.is_collapsed()
    }

    pub fn set_cursor(&mut self, path: NodePath, offset: usize) {
        self.selection = Selection::collapsed(Position::new(path, offset));
    }

    /// Selected character range of every text block the selection touches
    pub fn ranges(&self) -> Vec<TextRange> {
        let from = self.from().clone();
        let to = self.to().clone();

        self.doc
            .textblock_paths()
            .into_iter()
            .filter(|path| *path >= from.path && *path <= to.path)
            .filter_map(|path| {
                let len = self.doc.block_at(&path)?.text_len();
                let start = if path == from.path { from.offset.min(len) } else { 0 };
                let end = if path == to.path { to.offset.min(len) } else { len };
                Some(TextRange {
                    path,
                    from: start,
                    to: end,
                })
            })
            .collect()
    }

    /// Marks for text typed at the cursor
    pub fn typing_marks(&self) -> Marks {
        if let Some(marks) = &self.stored_marks {
            return marks.clone();
        }
        self.doc
            .block_at(&self.head().path)
            .and_then(Block::runs)
            .map(|runs| marks_at(runs, self.head().offset))
            .unwrap_or_default()
    }

    /// Apply a structural edit that keeps the number of text blocks
    ///
    /// The selection follows its text blocks by their position in document
    /// order, since paths shift when blocks are wrapped or unwrapped.
    pub fn restructure<F>(&mut self, edit: F) -> Result<(), CommandError>
    where
        F: FnOnce(&mut Document) -> Result<(), CommandError>,
    {
        let before = self.doc.textblock_paths();
        let ordinal = |position: &Position| before.iter().position(|p| *p == position.path);
        let anchor = ordinal(&self.selection.anchor);
        let head = ordinal(&self.selection.head);

        edit(&mut self.doc)?;

        let after = self.doc.textblock_paths();
        if let Some(path) = anchor.and_then(|i| after.get(i)) {
            self.selection.anchor.path = path.clone();
        }
        if let Some(path) = head.and_then(|i| after.get(i)) {
            self.selection.head.path = path.clone();
        }
        Ok(())
    }

    /// Move the cursor to the first text block at or after `path`, or the
    /// last text block when none follows
    pub fn place_cursor_near(&mut self, path: &NodePath) {
        let paths = self.doc.textblock_paths();
        let target = paths
            .iter()
            .find(|p| *p >= path)
            .or_else(|| paths.last())
            .cloned();
        if let Some(target) = target {
            self.set_cursor(target, 0);
        }
    }
}

/// Owner of the document and selection for one editing session
#[derive(Debug)]
pub struct DocumentAdapter {
    doc: Document,

    /// `None` while the editor has no focus
    selection: Option<Selection>,

    /// Marks toggled on a collapsed selection, applied to the next insertion
    stored_marks: Option<Marks>,

    history: History,
}

impl DocumentAdapter {
    /// Create a focused adapter holding an empty document
    pub fn new() -> Self {
        Self::with_history_depth(100)
    }

    pub fn with_history_depth(depth: usize) -> Self {
        let mut adapter = Self {
            doc: Document::new(),
            selection: None,
            stored_marks: None,
            history: History::with_max_levels(depth),
        };
        ensure_textblock(&mut adapter.doc);
        adapter.selection = adapter.doc.start_position().map(Selection::collapsed);
        adapter
    }

    /// Replace the whole document with parsed markup
    ///
    /// Malformed markup is recovered leniently; this never fails. The cursor
    /// moves to the start of the document and undo history is cleared.
    pub fn set_content(&mut self, markup: &str) -> Change {
        self.doc = Document::from_html(markup);
        ensure_textblock(&mut self.doc);
        self.selection = self.doc.start_position().map(Selection::collapsed);
        self.stored_marks = None;
        self.history.clear();
        log::debug!("Loaded content ({} blocks)", self.doc.blocks.len());
        self.change()
    }

    /// Current serialized markup
    ///
    /// A document holding only empty paragraphs serializes to the empty
    /// string.
    pub fn content(&self) -> String {
        if self.doc.is_empty() {
            String::new()
        } else {
            self.doc.to_html()
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Whether an editor is active to receive commands
    pub fn is_active(&self) -> bool {
        self.selection.is_some()
    }

    /// Give the editor focus, placing the cursor at the start if it has none
    pub fn focus(&mut self) {
        if self.selection.is_none() {
            self.selection = self.doc.start_position().map(Selection::collapsed);
        }
    }

    pub fn blur(&mut self) {
        self.selection = None;
        self.stored_marks = None;
    }

    /// Move the selection; both ends must lie inside text blocks
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), CommandError> {
        for position in [&selection.anchor, &selection.head] {
            if !is_valid_position(&self.doc, position) {
                return Err(CommandError::InvalidPath(position.path.clone()));
            }
        }
        if self.selection.as_ref() != Some(&selection) {
            self.stored_marks = None;
        }
        self.selection = Some(selection);
        Ok(())
    }

    pub fn stored_marks(&self) -> Option<&Marks> {
        self.stored_marks.as_ref()
    }

    /// Toggle a mark for the next insertion at a collapsed cursor
    pub fn toggle_stored_mark(&mut self, kind: MarkKind) -> Marks {
        self.update_stored_marks(|marks| {
            let on = !marks.has(kind);
            marks.set(kind, on);
        })
    }

    /// Edit the marks used by the next insertion at a collapsed cursor
    pub fn update_stored_marks<F>(&mut self, update: F) -> Marks
    where
        F: FnOnce(&mut Marks),
    {
        let mut marks = match &self.stored_marks {
            Some(marks) => marks.clone(),
            None => self.transaction().typing_marks(),
        };
        update(&mut marks);
        self.stored_marks = Some(marks.clone());
        marks
    }

    /// Apply a mutation atomically
    ///
    /// `edit` works on a copy of the document. On `Ok` the copy replaces the
    /// document, an undo step is recorded and one change notification is
    /// returned. On `Err` nothing changes.
    pub fn transact<F>(&mut self, edit: F) -> Result<Change, CommandError>
    where
        F: FnOnce(&mut Transaction) -> Result<(), CommandError>,
    {
        let mut tx = self.transaction();
        edit(&mut tx)?;

        let Transaction {
            mut doc,
            selection,
            stored_marks,
        } = tx;
        ensure_textblock(&mut doc);
        let selection = Selection::new(
            clamp_position(&doc, &selection.anchor),
            clamp_position(&doc, &selection.head),
        );

        let before = Snapshot {
            doc: std::mem::replace(&mut self.doc, doc),
            selection: self.selection.replace(selection),
        };
        self.history.record(before);
        self.stored_marks = stored_marks;

        Ok(self.change())
    }

    /// Revert the most recent transaction
    pub fn undo(&mut self) -> Option<Change> {
        let current = self.snapshot();
        let previous = self.history.undo(current)?;
        self.restore(previous);
        Some(self.change())
    }

    /// Reapply the most recently undone transaction
    pub fn redo(&mut self) -> Option<Change> {
        let current = self.snapshot();
        let next = self.history.redo(current)?;
        self.restore(next);
        Some(self.change())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn transaction(&self) -> Transaction {
        let selection = self
            .selection
            .clone()
            .or_else(|| self.doc.start_position().map(Selection::collapsed))
            .unwrap_or_else(|| Selection::collapsed(Position::new(NodePath::root(0), 0)));
        Transaction {
            doc: self.doc.clone(),
            selection,
            stored_marks: self.stored_marks.clone(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc: self.doc.clone(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot.doc;
        self.selection = snapshot.selection;
        self.stored_marks = None;
    }

    fn change(&self) -> Change {
        Change {
            markup: self.content(),
        }
    }
}

impl Default for DocumentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Guarantee the cursor has a text block to rest in
fn ensure_textblock(doc: &mut Document) {
    if doc.textblock_paths().is_empty() {
        doc.blocks.push(Block::empty_paragraph());
    }
}

fn is_valid_position(doc: &Document, position: &Position) -> bool {
    doc.block_at(&position.path)
        .is_some_and(|block| block.is_textblock() && position.offset <= block.text_len())
}

/// Pull a position back inside the document after an edit
fn clamp_position(doc: &Document, position: &Position) -> Position {
    if let Some(block) = doc.block_at(&position.path).filter(|b| b.is_textblock()) {
        return Position::new(position.path.clone(), position.offset.min(block.text_len()));
    }

    let paths = doc.textblock_paths();
    if let Some(previous) = paths.iter().rev().find(|p| **p < position.path) {
        let len = doc.block_at(previous).map(Block::text_len).unwrap_or(0);
        return Position::new(previous.clone(), len);
    }
    paths
        .first()
        .map(|first| Position::new(first.clone(), 0))
        .unwrap_or_else(|| Position::new(NodePath::root(0), 0))
}
