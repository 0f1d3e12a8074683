//! Block-level document elements
//!
//! This module defines the structured representation of editor content
//! at the block level (paragraphs, headings, lists, tables, media, etc.)

use super::text_run::{runs_text, TextRun};
use super::types::Alignment;

/// Attributes shared by paragraphs and headings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAttrs {
    /// Anchor identifier (`id` attribute)
    pub id: Option<String>,

    pub align: Alignment,

    /// Indentation level (0 = none)
    pub indent: u8,
}

/// Block-level element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph of formatted text
    Paragraph { attrs: BlockAttrs, runs: Vec<TextRun> },

    /// A heading with level (1-6) and formatted text
    Heading {
        level: u8,
        attrs: BlockAttrs,
        runs: Vec<TextRun>,
    },

    /// An ordered or unordered list
    List {
        ordered: bool,
        /// CSS class carried through serialization
        class: Option<String>,
        items: Vec<ListItem>,
    },

    /// A block quote containing other blocks
    BlockQuote(Vec<Block>),

    /// A code block
    CodeBlock {
        /// Programming language for syntax highlighting (e.g., "rust")
        language: Option<String>,
        /// Raw code content
        code: String,
    },

    Table(Table),

    /// An image reference
    Image {
        src: String,
        /// Alternative text for the image (for accessibility)
        alt: Option<String>,
        title: Option<String>,
    },

    /// An embedded video player
    Video {
        src: String,
        width: u32,
        height: u32,
        controls: bool,
    },

    /// A horizontal rule
    Rule,
}

/// A list item, which may contain multiple blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

impl ListItem {
    /// Create a new list item with a single paragraph
    pub fn with_paragraph(runs: Vec<TextRun>) -> Self {
        Self {
            blocks: vec![Block::paragraph(runs)],
        }
    }
}

/// A table of header and data cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<TableRow>,

    /// Cosmetic border preference
    pub bordered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    /// Whether this is a header cell (`th`)
    pub header: bool,
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// An empty cell holding one empty paragraph
    pub fn empty(header: bool) -> Self {
        Self {
            header,
            blocks: vec![Block::empty_paragraph()],
        }
    }
}

impl Table {
    /// Create a `rows` x `cols` table of empty cells
    pub fn new(rows: usize, cols: usize, with_header_row: bool, bordered: bool) -> Self {
        let rows = (0..rows)
            .map(|r| TableRow {
                cells: (0..cols)
                    .map(|_| TableCell::empty(with_header_row && r == 0))
                    .collect(),
            })
            .collect();
        Self { rows, bordered }
    }

    pub fn has_header_cell(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.cells.iter().any(|cell| cell.header))
    }
}

impl Block {
    pub fn paragraph(runs: Vec<TextRun>) -> Self {
        Block::Paragraph {
            attrs: BlockAttrs::default(),
            runs,
        }
    }

    pub fn empty_paragraph() -> Self {
        Self::paragraph(Vec::new())
    }

    pub fn heading(level: u8, runs: Vec<TextRun>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            attrs: BlockAttrs::default(),
            runs,
        }
    }

    /// Whether the block holds text directly (a cursor can rest in it)
    pub fn is_textblock(&self) -> bool {
        matches!(
            self,
            Block::Paragraph { .. } | Block::Heading { .. } | Block::CodeBlock { .. }
        )
    }

    /// Inline runs of a paragraph or heading
    pub fn runs(&self) -> Option<&[TextRun]> {
        match self {
            Block::Paragraph { runs, .. } | Block::Heading { runs, .. } => Some(runs),
            _ => None,
        }
    }

    pub fn runs_mut(&mut self) -> Option<&mut Vec<TextRun>> {
        match self {
            Block::Paragraph { runs, .. } | Block::Heading { runs, .. } => Some(runs),
            _ => None,
        }
    }

    pub fn attrs_mut(&mut self) -> Option<&mut BlockAttrs> {
        match self {
            Block::Paragraph { attrs, .. } | Block::Heading { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn attrs(&self) -> Option<&BlockAttrs> {
        match self {
            Block::Paragraph { attrs, .. } | Block::Heading { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Character length of a text block's content
    pub fn text_len(&self) -> usize {
        match self {
            Block::Paragraph { runs, .. } | Block::Heading { runs, .. } => {
                super::text_run::runs_len(runs)
            }
            Block::CodeBlock { code, .. } => code.chars().count(),
            _ => 0,
        }
    }

    /// Plain text of the block and everything nested in it
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph { runs, .. } | Block::Heading { runs, .. } => runs_text(runs),
            Block::CodeBlock { code, .. } => code.clone(),
            Block::BlockQuote(blocks) => join_text(blocks),
            Block::List { items, .. } => items
                .iter()
                .map(|item| join_text(&item.blocks))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table(table) => table
                .rows
                .iter()
                .flat_map(|row| row.cells.iter())
                .map(|cell| join_text(&cell.blocks))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Image { alt, .. } => alt.clone().unwrap_or_default(),
            Block::Video { .. } | Block::Rule => String::new(),
        }
    }

    /// An empty paragraph (no runs, or only empty runs)
    pub fn is_empty_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { runs, .. } if runs.iter().all(|r| r.text.is_empty()))
    }
}

fn join_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new_marks_first_row_as_header() {
        let table = Table::new(3, 2, true, false);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].cells.iter().all(|c| c.header));
        assert!(table.rows[1].cells.iter().all(|c| !c.header));
        assert!(table.has_header_cell());
    }

    #[test]
    fn test_table_without_header_row() {
        let table = Table::new(2, 2, false, true);
        assert!(!table.has_header_cell());
        assert!(table.bordered);
    }

    #[test]
    fn test_plain_text_of_nested_list() {
        let list = Block::List {
            ordered: false,
            class: None,
            items: vec![
                ListItem::with_paragraph(vec![TextRun::new("one")]),
                ListItem::with_paragraph(vec![TextRun::new("two")]),
            ],
        };
        assert_eq!(list.plain_text(), "one\ntwo");
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert!(matches!(Block::heading(9, vec![]), Block::Heading { level: 6, .. }));
    }
}
