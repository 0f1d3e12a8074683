//! Document model for the editor
//!
//! A `Document` is an ordered tree of blocks with inline text runs. It is
//! serialized to and from HTML markup at session boundaries (load, save,
//! export), and mutated in between through the editor's command layer.

// Submodules
mod blocks;
mod html_parser;
mod html_tokenizer;
mod html_writer;
mod text_run;
mod types;

// Re-export public types
pub use blocks::{Block, BlockAttrs, ListItem, Table, TableCell, TableRow};
pub use html_writer::escape_html;
pub use text_run::{
    delete_range, insert_text, link_span_at, map_range, marks_at, normalize_runs, range_all,
    runs_len, runs_text, split_runs, Link, MarkKind, Marks, TextRun,
};
pub use types::{Alignment, NodePath, Position, Selection};

/// Kind of structural node enclosing a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorKind {
    BlockQuote,
    List { ordered: bool },
    ListItem,
    Table,
    TableCell,
    TextBlock,
    /// Any other leaf block (image, video, rule)
    Leaf,
}

/// A structural node on the way down to a position
///
/// For list items and table cells the path identifies the item or cell
/// (e.g. `[table, row, col]`), not a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub path: NodePath,
    pub kind: AncestorKind,
}

/// The editor document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level blocks in document order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse serialized markup into a document
    ///
    /// Parsing never fails: malformed markup is recovered leniently.
    pub fn from_html(markup: &str) -> Self {
        html_parser::HtmlParser::parse(markup)
    }

    /// Wrap text verbatim in a single paragraph
    pub fn from_plain_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::new();
        }
        Self {
            blocks: vec![Block::paragraph(vec![TextRun::new(text)])],
        }
    }

    /// Serialize the document to markup
    pub fn to_html(&self) -> String {
        html_writer::write_document(self)
    }

    /// No blocks, or only empty paragraphs
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty_paragraph)
    }

    /// Plain text of the whole document, one line per block
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Visit every block in document order (pre-order)
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(&NodePath, &Block),
    {
        walk_blocks(&self.blocks, &NodePath::default(), &mut f);
    }

    /// Paths of all text blocks in document order
    pub fn textblock_paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::new();
        self.walk(|path, block| {
            if block.is_textblock() {
                paths.push(path.clone());
            }
        });
        paths
    }

    /// Position at the start of the first text block
    pub fn start_position(&self) -> Option<Position> {
        self.textblock_paths()
            .into_iter()
            .next()
            .map(|path| Position::new(path, 0))
    }

    /// Resolve a path to a block
    pub fn block_at(&self, path: &NodePath) -> Option<&Block> {
        resolve(&self.blocks, path.steps())
    }

    pub fn block_at_mut(&mut self, path: &NodePath) -> Option<&mut Block> {
        resolve_mut(&mut self.blocks, path.steps())
    }

    /// The block list containing `path` and the block's index in it
    ///
    /// The index may equal the list length (an insertion point).
    pub fn container_mut(&mut self, path: &NodePath) -> Option<(&mut Vec<Block>, usize)> {
        container_of(&mut self.blocks, path.steps())
    }

    /// Structural nodes from the root down to (and including) `path`
    pub fn ancestry(&self, path: &NodePath) -> Vec<Ancestor> {
        let mut result = Vec::new();
        let mut blocks = &self.blocks;
        let mut prefix = Vec::new();
        let mut steps = path.steps();

        while let Some((&index, rest)) = steps.split_first() {
            prefix.push(index);
            let Some(block) = blocks.get(index) else {
                break;
            };
            let here = NodePath::new(prefix.clone());
            match block {
                Block::BlockQuote(children) => {
                    result.push(Ancestor {
                        path: here,
                        kind: AncestorKind::BlockQuote,
                    });
                    blocks = children;
                    steps = rest;
                }
                Block::List { ordered, items, .. } => {
                    result.push(Ancestor {
                        path: here,
                        kind: AncestorKind::List { ordered: *ordered },
                    });
                    let Some((&item_index, rest)) = rest.split_first() else {
                        break;
                    };
                    let Some(item) = items.get(item_index) else {
                        break;
                    };
                    prefix.push(item_index);
                    result.push(Ancestor {
                        path: NodePath::new(prefix.clone()),
                        kind: AncestorKind::ListItem,
                    });
                    blocks = &item.blocks;
                    steps = rest;
                }
                Block::Table(table) => {
                    result.push(Ancestor {
                        path: here,
                        kind: AncestorKind::Table,
                    });
                    let [row, col, rest @ ..] = rest else {
                        break;
                    };
                    let Some(cell) = table.rows.get(*row).and_then(|r| r.cells.get(*col)) else {
                        break;
                    };
                    prefix.push(*row);
                    prefix.push(*col);
                    result.push(Ancestor {
                        path: NodePath::new(prefix.clone()),
                        kind: AncestorKind::TableCell,
                    });
                    blocks = &cell.blocks;
                    steps = rest;
                }
                other => {
                    let kind = if other.is_textblock() {
                        AncestorKind::TextBlock
                    } else {
                        AncestorKind::Leaf
                    };
                    result.push(Ancestor { path: here, kind });
                    break;
                }
            }
        }

        result
    }

    /// Nearest enclosing ancestor of the given kind
    pub fn nearest<P>(&self, path: &NodePath, pred: P) -> Option<Ancestor>
    where
        P: Fn(AncestorKind) -> bool,
    {
        self.ancestry(path)
            .into_iter()
            .rev()
            .find(|ancestor| pred(ancestor.kind))
    }

    /// Count of blocks matching a predicate anywhere in the tree
    pub fn count_blocks<P>(&self, pred: P) -> usize
    where
        P: Fn(&Block) -> bool,
    {
        let mut count = 0;
        self.walk(|_, block| {
            if pred(block) {
                count += 1;
            }
        });
        count
    }
}

fn walk_blocks<F>(blocks: &[Block], parent: &NodePath, f: &mut F)
where
    F: FnMut(&NodePath, &Block),
{
    for (index, block) in blocks.iter().enumerate() {
        let path = parent.join(&[index]);
        f(&path, block);
        match block {
            Block::BlockQuote(children) => walk_blocks(children, &path, f),
            Block::List { items, .. } => {
                for (item_index, item) in items.iter().enumerate() {
                    walk_blocks(&item.blocks, &path.join(&[item_index]), f);
                }
            }
            Block::Table(table) => {
                for (r, row) in table.rows.iter().enumerate() {
                    for (c, cell) in row.cells.iter().enumerate() {
                        walk_blocks(&cell.blocks, &path.join(&[r, c]), f);
                    }
                }
            }
            _ => {}
        }
    }
}

fn resolve<'a>(blocks: &'a [Block], steps: &[usize]) -> Option<&'a Block> {
    let (&first, rest) = steps.split_first()?;
    let block = blocks.get(first)?;
    if rest.is_empty() {
        return Some(block);
    }
    match block {
        Block::BlockQuote(children) => resolve(children, rest),
        Block::List { items, .. } => {
            let (&item, rest) = rest.split_first()?;
            resolve(&items.get(item)?.blocks, rest)
        }
        Block::Table(table) => {
            let [row, col, rest @ ..] = rest else {
                return None;
            };
            let cell = table.rows.get(*row)?.cells.get(*col)?;
            resolve(&cell.blocks, rest)
        }
        _ => None,
    }
}

fn resolve_mut<'a>(blocks: &'a mut [Block], steps: &[usize]) -> Option<&'a mut Block> {
    let (&first, rest) = steps.split_first()?;
    let block = blocks.get_mut(first)?;
    if rest.is_empty() {
        return Some(block);
    }
    match block {
        Block::BlockQuote(children) => resolve_mut(children, rest),
        Block::List { items, .. } => {
            let (&item, rest) = rest.split_first()?;
            resolve_mut(&mut items.get_mut(item)?.blocks, rest)
        }
        Block::Table(table) => {
            let [row, col, rest @ ..] = rest else {
                return None;
            };
            let cell = table.rows.get_mut(*row)?.cells.get_mut(*col)?;
            resolve_mut(&mut cell.blocks, rest)
        }
        _ => None,
    }
}

fn container_of<'a>(
    blocks: &'a mut Vec<Block>,
    steps: &[usize],
) -> Option<(&'a mut Vec<Block>, usize)> {
    let (&first, rest) = steps.split_first()?;
    if rest.is_empty() {
        return Some((blocks, first));
    }
    match blocks.get_mut(first)? {
        Block::BlockQuote(children) => container_of(children, rest),
        Block::List { items, .. } => {
            let (&item, rest) = rest.split_first()?;
            container_of(&mut items.get_mut(item)?.blocks, rest)
        }
        Block::Table(table) => {
            let [row, col, rest @ ..] = rest else {
                return None;
            };
            let cell = table.rows.get_mut(*row)?.cells.get_mut(*col)?;
            container_of(&mut cell.blocks, rest)
        }
        _ => None,
    }
}
