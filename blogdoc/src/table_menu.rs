//! Floating table menu placement
//!
//! When the selection sits inside a table the host shows a small menu of
//! table operations above the cell. Layout is owned by the host; this
//! module only decides where the menu goes, or that it is hidden.

use crate::document_model::{AncestorKind, Document, NodePath, Selection};
use crate::editor::DocumentAdapter;
use crate::editor_config::TableMenuConfig;

/// Axis-aligned rectangle in host pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Menu position relative to the editor's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPosition {
    pub x: f64,
    pub y: f64,
}

/// Host-side geometry lookups
pub trait LayoutProvider {
    /// Bounding box of the rendered node at `path` (a table or a cell)
    fn node_rect(&self, path: &NodePath) -> Option<Rect>;

    /// Bounding box of the editor surface
    fn editor_rect(&self) -> Option<Rect>;
}

/// Computes the table menu position on selection changes
#[derive(Debug, Clone, Default)]
pub struct TableMenuPositioner {
    config: TableMenuConfig,
}

impl TableMenuPositioner {
    pub fn new(config: &TableMenuConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Position for the adapter's current selection
    pub fn on_selection_change<L: LayoutProvider>(
        &self,
        adapter: &DocumentAdapter,
        layout: &L,
    ) -> Option<MenuPosition> {
        self.position(adapter.document(), adapter.selection(), layout)
    }

    /// Where to show the menu, or `None` to hide it
    ///
    /// The menu anchors to the cell holding the selection head, or to the
    /// whole table when the cell cannot be measured.
    pub fn position<L: LayoutProvider>(
        &self,
        doc: &Document,
        selection: Option<&Selection>,
        layout: &L,
    ) -> Option<MenuPosition> {
        let head = &selection?.head;
        let ancestry = doc.ancestry(&head.path);
        let cell = ancestry
            .iter()
            .rev()
            .find(|a| a.kind == AncestorKind::TableCell);
        let table = ancestry.iter().rev().find(|a| a.kind == AncestorKind::Table)?;

        let anchor = cell
            .and_then(|cell| layout.node_rect(&cell.path))
            .or_else(|| layout.node_rect(&table.path));
        let Some(anchor) = anchor else {
            log::debug!("No layout for table at {}, hiding menu", table.path);
            return None;
        };
        let editor = layout.editor_rect()?;

        Some(MenuPosition {
            x: anchor.x - editor.x + self.config.offset_x,
            y: anchor.y - editor.y + self.config.offset_y,
        })
    }
}
