//! Toolbar state projection
//!
//! Which marks and block types are active at the selection. Recomputed from
//! the adapter whenever the selection or document changes.

use super::adapter::DocumentAdapter;
use crate::document_model::{
    marks_at, range_all, Alignment, AncestorKind, Block, MarkKind, Marks,
};

const BOOLEAN_MARKS: [MarkKind; 7] = [
    MarkKind::Bold,
    MarkKind::Italic,
    MarkKind::Underline,
    MarkKind::Strike,
    MarkKind::Code,
    MarkKind::Subscript,
    MarkKind::Superscript,
];

/// Kind of the text block holding the cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveBlock {
    #[default]
    Paragraph,
    Heading(u8),
    CodeBlock,
}

/// Read-only projection of the document at the selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolbarState {
    /// Marks active at the cursor, or shared by the whole selection
    pub marks: Marks,
    pub block: ActiveBlock,
    pub alignment: Alignment,
    pub in_bullet_list: bool,
    pub in_ordered_list: bool,
    pub in_blockquote: bool,
    pub in_table: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl ToolbarState {
    /// Compute the state for the adapter's current selection
    ///
    /// Without a selection everything reads as inactive.
    pub fn from_adapter(adapter: &DocumentAdapter) -> Self {
        let mut state = ToolbarState {
            can_undo: adapter.can_undo(),
            can_redo: adapter.can_redo(),
            ..ToolbarState::default()
        };
        let Some(selection) = adapter.selection() else {
            return state;
        };
        let doc = adapter.document();
        let head = &selection.head;

        if let Some(block) = doc.block_at(&head.path) {
            state.block = match block {
                Block::Heading { level, .. } => ActiveBlock::Heading(*level),
                Block::CodeBlock { .. } => ActiveBlock::CodeBlock,
                _ => ActiveBlock::Paragraph,
            };
            state.alignment = block.attrs().map(|attrs| attrs.align).unwrap_or_default();
        }

        for ancestor in doc.ancestry(&head.path) {
            match ancestor.kind {
                AncestorKind::List { ordered: true } => state.in_ordered_list = true,
                AncestorKind::List { ordered: false } => state.in_bullet_list = true,
                AncestorKind::BlockQuote => state.in_blockquote = true,
                AncestorKind::Table | AncestorKind::TableCell => state.in_table = true,
                _ => {}
            }
        }

        state.marks = if selection.is_collapsed() {
            match adapter.stored_marks() {
                Some(marks) => marks.clone(),
                None => doc
                    .block_at(&head.path)
                    .and_then(Block::runs)
                    .map(|runs| marks_at(runs, head.offset))
                    .unwrap_or_default(),
            }
        } else {
            selection_marks(adapter)
        };

        state
    }

    pub fn is_active(&self, kind: MarkKind) -> bool {
        self.marks.has(kind)
    }

    /// Link destination under the cursor
    pub fn link_href(&self) -> Option<&str> {
        self.marks.link.as_ref().map(|link| link.href.as_str())
    }
}

/// Marks of the first selected character, with boolean marks reported only
/// when the whole selection carries them
fn selection_marks(adapter: &DocumentAdapter) -> Marks {
    let Some(selection) = adapter.selection() else {
        return Marks::default();
    };
    let doc = adapter.document();
    let from = selection.from();
    let to = selection.to();

    let ranges: Vec<_> = doc
        .textblock_paths()
        .into_iter()
        .filter(|path| *path >= from.path && *path <= to.path)
        .filter_map(|path| {
            let runs = doc.block_at(&path)?.runs()?;
            let len = crate::document_model::runs_len(runs);
            let start = if path == from.path { from.offset.min(len) } else { 0 };
            let end = if path == to.path { to.offset.min(len) } else { len };
            (start < end).then_some((runs, start, end))
        })
        .collect();

    let Some(&(first_runs, first_start, _)) = ranges.first() else {
        return Marks::default();
    };
    let mut marks = marks_at(first_runs, first_start + 1);
    for kind in BOOLEAN_MARKS {
        let all = ranges
            .iter()
            .all(|(runs, start, end)| range_all(runs, *start, *end, |m| m.has(kind)));
        marks.set(kind, all);
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::{NodePath, Position, Selection};

    fn adapter_at(markup: &str, anchor: (&[usize], usize), head: (&[usize], usize)) -> DocumentAdapter {
        let mut adapter = DocumentAdapter::new();
        adapter.set_content(markup);
        adapter
            .set_selection(Selection::new(
                Position::new(NodePath::new(anchor.0.to_vec()), anchor.1),
                Position::new(NodePath::new(head.0.to_vec()), head.1),
            ))
            .unwrap();
        adapter
    }

    #[test]
    fn test_state_at_cursor_in_bold_heading() {
        let adapter = adapter_at(
            "<h2 style=\"text-align: center\"><strong>Bold</strong> title</h2>",
            (&[0], 2),
            (&[0], 2),
        );

        let state = ToolbarState::from_adapter(&adapter);

        assert!(state.is_active(MarkKind::Bold));
        assert_eq!(state.block, ActiveBlock::Heading(2));
        assert_eq!(state.alignment, Alignment::Center);
        assert!(!state.in_table);
    }

    #[test]
    fn test_range_reports_marks_shared_by_whole_selection() {
        let adapter = adapter_at("<p><strong>ab</strong>cd</p>", (&[0], 0), (&[0], 4));
        let state = ToolbarState::from_adapter(&adapter);
        assert!(!state.is_active(MarkKind::Bold));

        let adapter = adapter_at("<p><strong>ab</strong>cd</p>", (&[0], 0), (&[0], 2));
        assert!(ToolbarState::from_adapter(&adapter).is_active(MarkKind::Bold));
    }

    #[test]
    fn test_structural_flags() {
        let adapter = adapter_at(
            "<blockquote><ol><li><p>x</p></li></ol></blockquote>",
            (&[0, 0, 0, 0], 0),
            (&[0, 0, 0, 0], 0),
        );
        let state = ToolbarState::from_adapter(&adapter);
        assert!(state.in_blockquote);
        assert!(state.in_ordered_list);
        assert!(!state.in_bullet_list);
    }

    #[test]
    fn test_link_href_and_table_flag() {
        let adapter = adapter_at(
            "<table><tbody><tr><td><p><a href=\"/docs\">docs</a></p></td></tr></tbody></table>",
            (&[0, 0, 0, 0], 2),
            (&[0, 0, 0, 0], 2),
        );
        let state = ToolbarState::from_adapter(&adapter);
        assert!(state.in_table);
        assert_eq!(state.link_href(), Some("/docs"));
    }

    #[test]
    fn test_blurred_editor_reports_nothing_active() {
        let mut adapter = DocumentAdapter::new();
        adapter.set_content("<p><strong>x</strong></p>");
        adapter.blur();
        assert_eq!(
            ToolbarState::from_adapter(&adapter),
            ToolbarState::default()
        );
    }
}
