//! Document transforms behind the toolbar commands
//!
//! Every function edits a [`Transaction`]; the adapter commits the result as
//! one atomic change.

use super::adapter::{TextRange, Transaction};
use super::error::CommandError;
use crate::document_model::{
    delete_range, insert_text as insert_runs_text, link_span_at, map_range, range_all,
    runs_text, split_runs, Alignment, AncestorKind, Block, BlockAttrs, Document, Link,
    ListItem, MarkKind, Marks, NodePath, TextRun,
};

/// Deepest indentation reachable with the indent command
pub const MAX_INDENT: u8 = 8;

/// Text block kind targeted by the heading dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Paragraph,
    Heading(u8),
}

/// Ranges inside blocks that carry inline marks
fn mark_ranges(tx: &Transaction) -> Vec<TextRange> {
    tx.ranges()
        .into_iter()
        .filter(|range| !range.is_empty())
        .filter(|range| tx.doc.block_at(&range.path).and_then(Block::runs).is_some())
        .collect()
}

/// Apply a mark edit to every selected character
pub fn apply_marks<F>(tx: &mut Transaction, edit: F) -> Result<(), CommandError>
where
    F: Fn(&mut Marks),
{
    let ranges = mark_ranges(tx);
    if ranges.is_empty() {
        return Err(CommandError::NotApplicable);
    }
    for range in ranges {
        if let Some(runs) = tx.doc.block_at_mut(&range.path).and_then(Block::runs_mut) {
            *runs = map_range(runs, range.from, range.to, &edit);
        }
    }
    Ok(())
}

/// Toggle a boolean mark over a non-empty selection
///
/// The mark is removed when every selected character already has it,
/// otherwise it is added everywhere.
pub fn toggle_mark(tx: &mut Transaction, kind: MarkKind) -> Result<(), CommandError> {
    let all_marked = {
        let ranges = mark_ranges(tx);
        !ranges.is_empty()
            && ranges.iter().all(|range| {
                tx.doc
                    .block_at(&range.path)
                    .and_then(Block::runs)
                    .is_some_and(|runs| range_all(runs, range.from, range.to, |m| m.has(kind)))
            })
    };
    apply_marks(tx, |marks| marks.set(kind, !all_marked))
}

/// Remove every inline mark from the selection
pub fn clear_formatting(tx: &mut Transaction) -> Result<(), CommandError> {
    apply_marks(tx, |marks| *marks = Marks::default())?;
    tx.stored_marks = None;
    Ok(())
}

/// Convert the selected text blocks to paragraphs or headings
///
/// Choosing the heading level every selected block already has turns them
/// back into paragraphs.
pub fn set_block_type(tx: &mut Transaction, target: BlockType) -> Result<(), CommandError> {
    let paths: Vec<NodePath> = tx.ranges().into_iter().map(|r| r.path).collect();
    if paths.is_empty() {
        return Err(CommandError::NotApplicable);
    }

    let target = match target {
        BlockType::Heading(level) => {
            let already = paths.iter().all(|path| {
                matches!(tx.doc.block_at(path), Some(Block::Heading { level: l, .. }) if *l == level)
            });
            if already {
                BlockType::Paragraph
            } else {
                BlockType::Heading(level.clamp(1, 6))
            }
        }
        other => other,
    };

    for path in &paths {
        if let Some(block) = tx.doc.block_at_mut(path) {
            *block = convert_textblock(std::mem::replace(block, Block::Rule), target);
        }
    }
    Ok(())
}

fn convert_textblock(block: Block, target: BlockType) -> Block {
    let (attrs, runs) = match block {
        Block::Paragraph { attrs, runs } | Block::Heading { attrs, runs, .. } => (attrs, runs),
        Block::CodeBlock { code, .. } => {
            let runs = if code.is_empty() {
                Vec::new()
            } else {
                vec![TextRun::new(code)]
            };
            (BlockAttrs::default(), runs)
        }
        other => return other,
    };
    match target {
        BlockType::Paragraph => Block::Paragraph { attrs, runs },
        BlockType::Heading(level) => Block::Heading { level, attrs, runs },
    }
}

pub fn set_alignment(tx: &mut Transaction, align: Alignment) -> Result<(), CommandError> {
    update_attrs(tx, |attrs| attrs.align = align)
}

/// Shift indentation of the selected blocks by `delta` levels
pub fn indent(tx: &mut Transaction, delta: i8) -> Result<(), CommandError> {
    update_attrs(tx, |attrs| {
        let level = i16::from(attrs.indent) + i16::from(delta);
        attrs.indent = level.clamp(0, i16::from(MAX_INDENT)) as u8;
    })
}

fn update_attrs<F>(tx: &mut Transaction, update: F) -> Result<(), CommandError>
where
    F: Fn(&mut BlockAttrs),
{
    let mut touched = false;
    for range in tx.ranges() {
        if let Some(attrs) = tx.doc.block_at_mut(&range.path).and_then(Block::attrs_mut) {
            update(attrs);
            touched = true;
        }
    }
    if touched {
        Ok(())
    } else {
        Err(CommandError::NotApplicable)
    }
}

/// Sibling blocks spanned by the selection: the first block's path and the
/// index of the last block in the same container
fn sibling_span(tx: &Transaction) -> (NodePath, usize) {
    let from = &tx.from().path;
    let to = &tx.to().path;
    let start = from.last().unwrap_or(0);
    let parent = |path: &NodePath| path.steps()[..path.len().saturating_sub(1)].to_vec();
    let same_parent = from.len() == to.len() && parent(from) == parent(to);
    let end = if same_parent {
        to.last().unwrap_or(start).max(start)
    } else {
        start
    };
    (from.clone(), end)
}

/// Wrap the selected sibling blocks with `wrap`
fn wrap_siblings<F>(tx: &mut Transaction, wrap: F) -> Result<(), CommandError>
where
    F: FnOnce(Vec<Block>) -> Block,
{
    let (first, end) = sibling_span(tx);
    tx.restructure(|doc| {
        let (blocks, start) = doc
            .container_mut(&first)
            .ok_or_else(|| CommandError::InvalidPath(first.clone()))?;
        if end >= blocks.len() {
            return Err(CommandError::InvalidPath(first.clone()));
        }
        let wrapped: Vec<Block> = blocks.drain(start..=end).collect();
        blocks.insert(start, wrap(wrapped));
        Ok(())
    })
}

/// Replace a container block with the blocks it holds
fn unwrap_block(tx: &mut Transaction, path: &NodePath) -> Result<(), CommandError> {
    tx.restructure(|doc| {
        let (blocks, index) = doc
            .container_mut(path)
            .ok_or_else(|| CommandError::InvalidPath(path.clone()))?;
        let inner = match blocks.get(index) {
            Some(Block::BlockQuote(children)) => children.clone(),
            Some(Block::List { items, .. }) => items
                .iter()
                .flat_map(|item| item.blocks.iter().cloned())
                .collect(),
            _ => return Err(CommandError::InvalidPath(path.clone())),
        };
        blocks.splice(index..=index, inner);
        Ok(())
    })
}

/// Toggle a bullet or numbered list around the selection
///
/// Inside a list of the same kind the list is lifted, inside a list of the
/// other kind the list kind is switched.
pub fn toggle_list(tx: &mut Transaction, ordered: bool) -> Result<(), CommandError> {
    let head = tx.from().path.clone();
    let list = tx
        .doc
        .nearest(&head, |kind| matches!(kind, AncestorKind::List { .. }));

    match list {
        Some(list) if list.kind == (AncestorKind::List { ordered }) => unwrap_block(tx, &list.path),
        Some(list) => {
            if let Some(Block::List { ordered: kind, .. }) = tx.doc.block_at_mut(&list.path) {
                *kind = ordered;
            }
            Ok(())
        }
        None => wrap_siblings(tx, |blocks| Block::List {
            ordered,
            class: None,
            items: blocks
                .into_iter()
                .map(|block| ListItem {
                    blocks: vec![block],
                })
                .collect(),
        }),
    }
}

pub fn toggle_blockquote(tx: &mut Transaction) -> Result<(), CommandError> {
    let head = tx.from().path.clone();
    match tx.doc.nearest(&head, |kind| kind == AncestorKind::BlockQuote) {
        Some(quote) => unwrap_block(tx, &quote.path),
        None => wrap_siblings(tx, Block::BlockQuote),
    }
}

/// Turn the cursor's block into a code block, or back into a paragraph
pub fn toggle_code_block(tx: &mut Transaction) -> Result<(), CommandError> {
    let path = tx.head().path.clone();
    let block = tx
        .doc
        .block_at_mut(&path)
        .ok_or_else(|| CommandError::InvalidPath(path.clone()))?;

    let replacement = match &*block {
        Block::CodeBlock { .. } => convert_textblock(block.clone(), BlockType::Paragraph),
        Block::Paragraph { runs, .. } | Block::Heading { runs, .. } => Block::CodeBlock {
            language: None,
            code: runs_text(runs),
        },
        _ => return Err(CommandError::NotApplicable),
    };
    *block = replacement;
    Ok(())
}

/// Link the selection, or the link under a collapsed cursor
///
/// A collapsed cursor outside any link inserts the URL itself as linked
/// text.
pub fn set_link(tx: &mut Transaction, link: Link) -> Result<(), CommandError> {
    if !tx.is_collapsed() {
        return apply_marks(tx, |marks| marks.link = Some(link.clone()));
    }

    let head = tx.head().clone();
    let mut marks = tx.typing_marks();
    let runs = tx
        .doc
        .block_at_mut(&head.path)
        .and_then(Block::runs_mut)
        .ok_or(CommandError::NotApplicable)?;

    if let Some((start, end, _)) = link_span_at(runs, head.offset) {
        *runs = map_range(runs, start, end, |m| m.link = Some(link.clone()));
        return Ok(());
    }

    marks.link = Some(link.clone());
    *runs = insert_runs_text(runs, head.offset, &link.href, &marks);
    tx.set_cursor(head.path, head.offset + link.href.chars().count());
    tx.stored_marks = None;
    Ok(())
}

/// Remove the link from the selection, or the whole link under the cursor
pub fn unset_link(tx: &mut Transaction) -> Result<(), CommandError> {
    if !tx.is_collapsed() {
        return apply_marks(tx, |marks| marks.link = None);
    }

    let head = tx.head().clone();
    let runs = tx
        .doc
        .block_at_mut(&head.path)
        .and_then(Block::runs_mut)
        .ok_or(CommandError::NotApplicable)?;
    let (start, end, _) = link_span_at(runs, head.offset).ok_or(CommandError::NotApplicable)?;
    *runs = map_range(runs, start, end, |m| m.link = None);
    Ok(())
}

/// Delete the selected text and collapse the cursor to its start
///
/// When the selection spans sibling blocks the tail of the last block joins
/// the first and the blocks between are removed; otherwise the selected
/// text is removed from each block in place.
pub fn delete_selection(tx: &mut Transaction) -> Result<(), CommandError> {
    if tx.is_collapsed() {
        return Ok(());
    }
    let from = tx.from().clone();
    let to = tx.to().clone();

    if from.path == to.path {
        remove_text(&mut tx.doc, &from.path, from.offset, to.offset);
        tx.set_cursor(from.path, from.offset);
        return Ok(());
    }

    let (_, end) = sibling_span(tx);
    let mergeable = end == to.path.last().unwrap_or(0)
        && to.path.len() == from.path.len()
        && tx.doc.block_at(&from.path).and_then(Block::runs).is_some()
        && tx.doc.block_at(&to.path).and_then(Block::runs).is_some();

    if mergeable {
        let tail = tx
            .doc
            .block_at(&to.path)
            .and_then(Block::runs)
            .map(|runs| split_runs(runs, to.offset).1)
            .unwrap_or_default();
        if let Some(runs) = tx.doc.block_at_mut(&from.path).and_then(Block::runs_mut) {
            let (mut head, _) = split_runs(runs, from.offset);
            head.extend(tail);
            *runs = crate::document_model::normalize_runs(head);
        }
        if let Some((blocks, start)) = tx.doc.container_mut(&from.path) {
            if end < blocks.len() {
                blocks.drain(start + 1..=end);
            }
        }
    } else {
        for range in tx.ranges() {
            remove_text(&mut tx.doc, &range.path, range.from, range.to);
        }
    }

    tx.set_cursor(from.path, from.offset);
    Ok(())
}

fn remove_text(doc: &mut Document, path: &NodePath, from: usize, to: usize) {
    match doc.block_at_mut(path) {
        Some(Block::Paragraph { runs, .. }) | Some(Block::Heading { runs, .. }) => {
            *runs = delete_range(runs, from, to);
        }
        Some(Block::CodeBlock { code, .. }) => {
            *code = code
                .chars()
                .enumerate()
                .filter(|(i, _)| *i < from || *i >= to)
                .map(|(_, c)| c)
                .collect();
        }
        _ => {}
    }
}

/// Type text at the cursor, replacing any selected text
pub fn insert_text(tx: &mut Transaction, text: &str) -> Result<(), CommandError> {
    if text.is_empty() {
        return Err(CommandError::NotApplicable);
    }
    delete_selection(tx)?;

    let head = tx.head().clone();
    let marks = tx.typing_marks();
    match tx.doc.block_at_mut(&head.path) {
        Some(Block::Paragraph { runs, .. }) | Some(Block::Heading { runs, .. }) => {
            *runs = insert_runs_text(runs, head.offset, text, &marks);
        }
        Some(Block::CodeBlock { code, .. }) => {
            let at = byte_offset(code, head.offset);
            code.insert_str(at, text);
        }
        _ => return Err(CommandError::InvalidPath(head.path)),
    }

    tx.set_cursor(head.path, head.offset + text.chars().count());
    tx.stored_marks = None;
    Ok(())
}

/// Split the cursor's text block in two (the Enter key)
///
/// Inside a list item the tail becomes a new item; Enter in an empty item
/// leaves the list. Code blocks get a newline instead.
pub fn split_block(tx: &mut Transaction) -> Result<(), CommandError> {
    delete_selection(tx)?;
    let head = tx.head().clone();
    let block = tx
        .doc
        .block_at(&head.path)
        .cloned()
        .ok_or_else(|| CommandError::InvalidPath(head.path.clone()))?;

    if matches!(block, Block::CodeBlock { .. }) {
        return insert_text(tx, "\n");
    }
    if block.runs().is_none() {
        return Err(CommandError::NotApplicable);
    }

    if let Some(item_path) = first_block_of_list_item(&tx.doc, &head.path) {
        return split_list_item(tx, &item_path, &block, head.offset);
    }

    let (first, second) = split_textblock(&block, head.offset);
    let (blocks, index) = tx
        .doc
        .container_mut(&head.path)
        .ok_or_else(|| CommandError::InvalidPath(head.path.clone()))?;
    blocks[index] = first;
    blocks.insert(index + 1, second);
    tx.set_cursor(head.path.with_last(index + 1), 0);
    Ok(())
}

/// Path of the list item when `path` is the first block inside one
fn first_block_of_list_item(doc: &Document, path: &NodePath) -> Option<NodePath> {
    if path.last() != Some(0) {
        return None;
    }
    let ancestry = doc.ancestry(path);
    let parent = ancestry.iter().rev().nth(1)?;
    (parent.kind == AncestorKind::ListItem).then(|| parent.path.clone())
}

fn split_list_item(
    tx: &mut Transaction,
    item_path: &NodePath,
    block: &Block,
    offset: usize,
) -> Result<(), CommandError> {
    let list_path = NodePath::new(item_path.steps()[..item_path.len() - 1].to_vec());
    let item_index = item_path.last().unwrap_or(0);
    let invalid = || CommandError::InvalidPath(item_path.clone());

    if block.is_empty_paragraph() {
        // Leave the list: drop the empty item, continue after the list
        let Some(Block::List { items, ordered, .. }) = tx.doc.block_at_mut(&list_path) else {
            return Err(invalid());
        };
        let ordered = *ordered;
        let trailing = if item_index < items.len() {
            items.split_off(item_index + 1)
        } else {
            Vec::new()
        };
        items.truncate(item_index);
        let list_emptied = items.is_empty();

        let (blocks, list_index) = tx.doc.container_mut(&list_path).ok_or_else(invalid)?;
        let mut insert_at = list_index + 1;
        if list_emptied {
            blocks.remove(list_index);
            insert_at = list_index;
        }
        blocks.insert(insert_at, Block::empty_paragraph());
        if !trailing.is_empty() {
            blocks.insert(
                insert_at + 1,
                Block::List {
                    ordered,
                    class: None,
                    items: trailing,
                },
            );
        }
        tx.set_cursor(list_path.with_last(insert_at), 0);
        return Ok(());
    }

    let (first, second) = split_textblock(block, offset);
    let Some(Block::List { items, .. }) = tx.doc.block_at_mut(&list_path) else {
        return Err(invalid());
    };
    let item = items.get_mut(item_index).ok_or_else(invalid)?;
    if let Some(slot) = item.blocks.first_mut() {
        *slot = first;
    }
    items.insert(
        item_index + 1,
        ListItem {
            blocks: vec![second],
        },
    );
    tx.set_cursor(list_path.join(&[item_index + 1, 0]), 0);
    Ok(())
}

/// Split a text block at a character offset
///
/// The second half never repeats the anchor id. An empty tail of a heading
/// becomes a paragraph.
pub fn split_textblock(block: &Block, offset: usize) -> (Block, Block) {
    match block {
        Block::Paragraph { attrs, runs } => {
            let (before, after) = split_runs(runs, offset);
            (
                Block::Paragraph {
                    attrs: attrs.clone(),
                    runs: before,
                },
                Block::Paragraph {
                    attrs: without_id(attrs),
                    runs: after,
                },
            )
        }
        Block::Heading { level, attrs, runs } => {
            let (before, after) = split_runs(runs, offset);
            let first = Block::Heading {
                level: *level,
                attrs: attrs.clone(),
                runs: before,
            };
            let second = if after.is_empty() {
                Block::paragraph(after)
            } else {
                Block::Heading {
                    level: *level,
                    attrs: without_id(attrs),
                    runs: after,
                }
            };
            (first, second)
        }
        Block::CodeBlock { language, code } => {
            let at = byte_offset(code, offset);
            (
                Block::CodeBlock {
                    language: language.clone(),
                    code: code[..at].to_string(),
                },
                Block::CodeBlock {
                    language: language.clone(),
                    code: code[at..].to_string(),
                },
            )
        }
        other => (other.clone(), Block::empty_paragraph()),
    }
}

fn without_id(attrs: &BlockAttrs) -> BlockAttrs {
    BlockAttrs {
        id: None,
        ..attrs.clone()
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Insert a block at the cursor and return its path
///
/// - an empty paragraph under the cursor is replaced
/// - a cursor at the end of its block inserts after it
/// - a cursor at the start inserts before it
/// - otherwise the text block is split around the new block
///
/// An empty paragraph follows a block that ends its container, so the
/// cursor always has a place to land. The cursor moves into the first cell
/// of an inserted table, otherwise to the text block after the insertion.
pub fn insert_block(tx: &mut Transaction, block: Block) -> Result<NodePath, CommandError> {
    delete_selection(tx)?;
    let head = tx.head().clone();
    let invalid = || CommandError::InvalidPath(head.path.clone());
    let current = tx.doc.block_at(&head.path).cloned().ok_or_else(invalid)?;
    let is_table = matches!(block, Block::Table(_));
    let len = current.text_len();

    let (blocks, index) = tx.doc.container_mut(&head.path).ok_or_else(invalid)?;
    let inserted = if current.is_empty_paragraph() {
        blocks[index] = block;
        index
    } else if head.offset >= len {
        blocks.insert(index + 1, block);
        index + 1
    } else if head.offset == 0 {
        blocks.insert(index, block);
        index
    } else {
        let (first, second) = split_textblock(&current, head.offset);
        blocks[index] = first;
        blocks.insert(index + 1, block);
        blocks.insert(index + 2, second);
        index + 1
    };
    if inserted + 1 == blocks.len() {
        blocks.push(Block::empty_paragraph());
    }

    let path = head.path.with_last(inserted);
    if is_table {
        tx.set_cursor(path.join(&[0, 0, 0]), 0);
    } else if let Some(next) = tx
        .doc
        .textblock_paths()
        .into_iter()
        .find(|p| *p > path && !p.starts_with(&path))
    {
        tx.set_cursor(next, 0);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::{Position, Selection};

    fn tx(markup: &str, anchor: (&[usize], usize), head: (&[usize], usize)) -> Transaction {
        Transaction {
            doc: Document::from_html(markup),
            selection: Selection::new(
                Position::new(NodePath::new(anchor.0.to_vec()), anchor.1),
                Position::new(NodePath::new(head.0.to_vec()), head.1),
            ),
            stored_marks: None,
        }
    }

    fn cursor(markup: &str, path: &[usize], offset: usize) -> Transaction {
        tx(markup, (path, offset), (path, offset))
    }

    #[test]
    fn test_toggle_bold_adds_then_removes() {
        // Arrange: Select "two" in a plain paragraph
        let mut t = tx("<p>one two</p>", (&[0], 4), (&[0], 7));

        // Act: Toggle bold twice
        toggle_mark(&mut t, MarkKind::Bold).unwrap();
        let once = t.doc.to_html();
        toggle_mark(&mut t, MarkKind::Bold).unwrap();

        // Assert: Added on the first toggle, removed on the second
        assert_eq!(once, "<p>one <strong>two</strong></p>");
        assert_eq!(t.doc.to_html(), "<p>one two</p>");
    }

    #[test]
    fn test_toggle_mark_on_partially_marked_selection_adds() {
        let mut t = tx("<p><em>ab</em>cd</p>", (&[0], 0), (&[0], 4));
        toggle_mark(&mut t, MarkKind::Italic).unwrap();
        assert_eq!(t.doc.to_html(), "<p><em>abcd</em></p>");
    }

    #[test]
    fn test_mark_across_blocks() {
        let mut t = tx("<p>ab</p><p>cd</p>", (&[0], 1), (&[1], 1));
        toggle_mark(&mut t, MarkKind::Underline).unwrap();
        assert_eq!(t.doc.to_html(), "<p>a<u>b</u></p><p><u>c</u>d</p>");
    }

    #[test]
    fn test_set_heading_toggles_back_to_paragraph() {
        let mut t = cursor("<p>Title</p>", &[0], 2);
        set_block_type(&mut t, BlockType::Heading(2)).unwrap();
        assert_eq!(t.doc.to_html(), "<h2>Title</h2>");

        set_block_type(&mut t, BlockType::Heading(2)).unwrap();
        assert_eq!(t.doc.to_html(), "<p>Title</p>");
    }

    #[test]
    fn test_alignment_and_indent() {
        let mut t = cursor("<p>x</p>", &[0], 0);
        set_alignment(&mut t, Alignment::Justify).unwrap();
        indent(&mut t, 1).unwrap();
        indent(&mut t, -3).unwrap();
        indent(&mut t, 2).unwrap();
        assert_eq!(
            t.doc.to_html(),
            "<p style=\"text-align: justify\" data-indent=\"2\">x</p>"
        );
    }

    #[test]
    fn test_toggle_list_wraps_siblings_and_lifts() {
        let mut t = tx("<p>a</p><p>b</p><p>c</p>", (&[0], 0), (&[1], 1));

        toggle_list(&mut t, false).unwrap();
        assert_eq!(
            t.doc.to_html(),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul><p>c</p>"
        );
        assert_eq!(t.head().path, NodePath::new(vec![0, 1, 0]));

        toggle_list(&mut t, true).unwrap();
        assert!(t.doc.to_html().starts_with("<ol>"));

        toggle_list(&mut t, true).unwrap();
        assert_eq!(t.doc.to_html(), "<p>a</p><p>b</p><p>c</p>");
        assert_eq!(t.head().path, NodePath::root(1));
    }

    #[test]
    fn test_toggle_blockquote() {
        let mut t = cursor("<p>q</p>", &[0], 0);
        toggle_blockquote(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<blockquote><p>q</p></blockquote>");
        toggle_blockquote(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<p>q</p>");
    }

    #[test]
    fn test_toggle_code_block() {
        let mut t = cursor("<p>let x = 1;</p>", &[0], 0);
        toggle_code_block(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<pre><code>let x = 1;</code></pre>");
        toggle_code_block(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<p>let x = 1;</p>");
    }

    #[test]
    fn test_set_link_on_selection_and_unset_at_cursor() {
        let link = Link {
            href: "https://example.com".to_string(),
            target: Some("_blank".to_string()),
        };
        let mut t = tx("<p>read the docs</p>", (&[0], 9), (&[0], 13));
        set_link(&mut t, link).unwrap();
        assert_eq!(
            t.doc.to_html(),
            "<p>read the <a href=\"https://example.com\" target=\"_blank\" \
             rel=\"noopener noreferrer\">docs</a></p>"
        );

        t.set_cursor(NodePath::root(0), 11);
        unset_link(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<p>read the docs</p>");
    }

    #[test]
    fn test_set_link_at_bare_cursor_inserts_url() {
        let link = Link {
            href: "https://a.io".to_string(),
            target: None,
        };
        let mut t = cursor("<p>go </p>", &[0], 3);
        set_link(&mut t, link).unwrap();
        assert_eq!(t.doc.to_html(), "<p>go <a href=\"https://a.io\">https://a.io</a></p>");
        assert_eq!(t.head().offset, 15);
    }

    #[test]
    fn test_insert_text_uses_stored_marks() {
        let mut t = cursor("<p>ab</p>", &[0], 1);
        t.stored_marks = Some(Marks {
            bold: true,
            ..Marks::default()
        });
        insert_text(&mut t, "X").unwrap();
        assert_eq!(t.doc.to_html(), "<p>a<strong>X</strong>b</p>");
        assert_eq!(t.head().offset, 2);
        assert!(t.stored_marks.is_none());
    }

    #[test]
    fn test_insert_text_replaces_selection_across_blocks() {
        let mut t = tx("<p>hello</p><p>big</p><p>world</p>", (&[0], 2), (&[2], 3));
        insert_text(&mut t, "-").unwrap();
        assert_eq!(t.doc.to_html(), "<p>he-ld</p>");
    }

    #[test]
    fn test_split_paragraph_and_heading() {
        let mut t = cursor("<h2 id=\"t\">Title</h2>", &[0], 5);
        split_block(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<h2 id=\"t\">Title</h2><p></p>");
        assert_eq!(t.head().path, NodePath::root(1));

        let mut t = cursor("<p>abcd</p>", &[0], 2);
        split_block(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<p>ab</p><p>cd</p>");
    }

    #[test]
    fn test_split_list_item_and_leave_list() {
        let mut t = cursor("<ul><li><p>ab</p></li></ul>", &[0, 0, 0], 1);
        split_block(&mut t).unwrap();
        assert_eq!(
            t.doc.to_html(),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul>"
        );
        assert_eq!(t.head().path, NodePath::new(vec![0, 1, 0]));

        let mut t = cursor("<ul><li><p>a</p></li><li><p></p></li></ul>", &[0, 1, 0], 0);
        split_block(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<ul><li><p>a</p></li></ul><p></p>");
        assert_eq!(t.head().path, NodePath::root(1));
    }

    #[test]
    fn test_insert_block_replaces_empty_paragraph() {
        let mut t = cursor("<p></p>", &[0], 0);
        let path = insert_block(&mut t, Block::Rule).unwrap();
        assert_eq!(path, NodePath::root(0));
        assert_eq!(t.doc.to_html(), "<hr><p></p>");
        assert_eq!(t.head().path, NodePath::root(1));
    }

    #[test]
    fn test_insert_block_at_start_end_and_middle() {
        let mut t = cursor("<p>ab</p>", &[0], 0);
        insert_block(&mut t, Block::Rule).unwrap();
        assert_eq!(t.doc.to_html(), "<hr><p>ab</p>");
        assert_eq!(t.head().path, NodePath::root(1));

        let mut t = cursor("<p>ab</p><p>c</p>", &[0], 2);
        insert_block(&mut t, Block::Rule).unwrap();
        assert_eq!(t.doc.to_html(), "<p>ab</p><hr><p>c</p>");
        assert_eq!(t.head().path, NodePath::root(2));

        let mut t = cursor("<p>ab</p>", &[0], 1);
        insert_block(&mut t, Block::Rule).unwrap();
        assert_eq!(t.doc.to_html(), "<p>a</p><hr><p>b</p>");
    }

    #[test]
    fn test_insert_table_moves_cursor_into_first_cell() {
        let mut t = cursor("<p>x</p>", &[0], 1);
        let table = crate::document_model::Table::new(2, 2, true, false);
        let path = insert_block(&mut t, Block::Table(table)).unwrap();
        assert_eq!(path, NodePath::root(1));
        assert_eq!(t.head().path, NodePath::new(vec![1, 0, 0, 0]));
        assert!(matches!(t.doc.blocks[2], Block::Paragraph { .. }));
    }

    #[test]
    fn test_clear_formatting() {
        let mut t = tx(
            "<p><strong><span style=\"color: red\">loud</span></strong></p>",
            (&[0], 0),
            (&[0], 4),
        );
        clear_formatting(&mut t).unwrap();
        assert_eq!(t.doc.to_html(), "<p>loud</p>");
    }

    #[test]
    fn test_marks_need_text() {
        let mut t = cursor("<p>ab</p>", &[0], 1);
        assert_eq!(
            toggle_mark(&mut t, MarkKind::Bold),
            Err(CommandError::NotApplicable)
        );
    }
}
