//! Table row, column and header operations for the table menu

use super::adapter::Transaction;
use super::error::CommandError;
use crate::document_model::{AncestorKind, Block, NodePath, Table, TableCell, TableRow};

/// Operations offered by the floating table menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommand {
    AddRowBefore,
    AddRowAfter,
    AddColumnBefore,
    AddColumnAfter,
    DeleteRow,
    DeleteColumn,
    ToggleHeaderRow,
    DeleteTable,
}

/// The cell holding the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLocation {
    pub table: NodePath,
    pub row: usize,
    pub col: usize,
}

/// Find the table cell enclosing the cursor
pub fn locate_cell(tx: &Transaction) -> Result<CellLocation, CommandError> {
    let cell = tx
        .doc
        .nearest(&tx.head().path, |kind| kind == AncestorKind::TableCell)
        .ok_or(CommandError::NotInTable)?;
    match cell.path.steps() {
        [table @ .., row, col] => Ok(CellLocation {
            table: NodePath::new(table.to_vec()),
            row: *row,
            col: *col,
        }),
        _ => Err(CommandError::NotInTable),
    }
}

fn table_mut<'a>(tx: &'a mut Transaction, path: &NodePath) -> Result<&'a mut Table, CommandError> {
    match tx.doc.block_at_mut(path) {
        Some(Block::Table(table)) => Ok(table),
        _ => Err(CommandError::InvalidPath(path.clone())),
    }
}

/// Apply a table menu operation at the cursor
pub fn apply(tx: &mut Transaction, command: TableCommand) -> Result<(), CommandError> {
    let location = locate_cell(tx)?;
    log::debug!(
        "Table {:?} at {} row {} col {}",
        command,
        location.table,
        location.row,
        location.col
    );

    match command {
        TableCommand::AddRowBefore => add_row(tx, &location, location.row),
        TableCommand::AddRowAfter => add_row(tx, &location, location.row + 1),
        TableCommand::AddColumnBefore => add_column(tx, &location, location.col),
        TableCommand::AddColumnAfter => add_column(tx, &location, location.col + 1),
        TableCommand::DeleteRow => delete_row(tx, &location),
        TableCommand::DeleteColumn => delete_column(tx, &location),
        TableCommand::ToggleHeaderRow => toggle_header_row(tx, &location),
        TableCommand::DeleteTable => delete_table(tx, &location.table),
    }
}

/// Shift one step of the cursor path when rows or columns open before it
fn shift_cursor(tx: &mut Transaction, step: usize) {
    let mut steps = tx.head().path.steps().to_vec();
    if let Some(value) = steps.get_mut(step) {
        *value += 1;
    }
    let offset = tx.head().offset;
    tx.set_cursor(NodePath::new(steps), offset);
}

fn add_row(tx: &mut Transaction, at: &CellLocation, index: usize) -> Result<(), CommandError> {
    let table = table_mut(tx, &at.table)?;
    let cols = table
        .rows
        .get(at.row)
        .map(|row| row.cells.len())
        .unwrap_or(1);
    let row = TableRow {
        cells: (0..cols).map(|_| TableCell::empty(false)).collect(),
    };
    table.rows.insert(index.min(table.rows.len()), row);

    if index <= at.row {
        shift_cursor(tx, at.table.len());
    }
    Ok(())
}

fn add_column(tx: &mut Transaction, at: &CellLocation, index: usize) -> Result<(), CommandError> {
    let table = table_mut(tx, &at.table)?;
    for row in &mut table.rows {
        let header = row.cells.get(at.col).is_some_and(|cell| cell.header);
        let position = index.min(row.cells.len());
        row.cells.insert(position, TableCell::empty(header));
    }

    if index <= at.col {
        shift_cursor(tx, at.table.len() + 1);
    }
    Ok(())
}

fn delete_row(tx: &mut Transaction, at: &CellLocation) -> Result<(), CommandError> {
    let table = table_mut(tx, &at.table)?;
    if table.rows.len() <= 1 {
        return delete_table(tx, &at.table);
    }
    table.rows.remove(at.row);

    let row = at.row.min(table.rows.len() - 1);
    let col = at.col.min(table.rows[row].cells.len().saturating_sub(1));
    tx.place_cursor_near(&at.table.join(&[row, col]));
    Ok(())
}

fn delete_column(tx: &mut Transaction, at: &CellLocation) -> Result<(), CommandError> {
    let table = table_mut(tx, &at.table)?;
    let widest = table.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    if widest <= 1 {
        return delete_table(tx, &at.table);
    }
    for row in &mut table.rows {
        if at.col < row.cells.len() {
            row.cells.remove(at.col);
        }
    }
    // Ragged rows can end up empty
    table.rows.retain(|row| !row.cells.is_empty());

    let row = at.row.min(table.rows.len().saturating_sub(1));
    let col = table
        .rows
        .get(row)
        .map(|r| at.col.min(r.cells.len().saturating_sub(1)))
        .unwrap_or(0);
    tx.place_cursor_near(&at.table.join(&[row, col]));
    Ok(())
}

/// Turn the first row into header cells, or back into data cells
fn toggle_header_row(tx: &mut Transaction, at: &CellLocation) -> Result<(), CommandError> {
    let table = table_mut(tx, &at.table)?;
    let Some(first) = table.rows.first_mut() else {
        return Err(CommandError::InvalidPath(at.table.clone()));
    };
    let make_header = !first.cells.iter().all(|cell| cell.header);
    for cell in &mut first.cells {
        cell.header = make_header;
    }
    Ok(())
}

fn delete_table(tx: &mut Transaction, path: &NodePath) -> Result<(), CommandError> {
    let (blocks, index) = tx
        .doc
        .container_mut(path)
        .ok_or_else(|| CommandError::InvalidPath(path.clone()))?;
    if index >= blocks.len() {
        return Err(CommandError::InvalidPath(path.clone()));
    }
    blocks.remove(index);
    if blocks.is_empty() {
        blocks.push(Block::empty_paragraph());
    }
    tx.place_cursor_near(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::{Document, Position, Selection};

    const TABLE: &str = "<p>before</p><table><tbody>\
        <tr><th><p>A</p></th><th><p>B</p></th></tr>\
        <tr><td><p>1</p></td><td><p>2</p></td></tr>\
        </tbody></table><p>after</p>";

    fn in_cell(row: usize, col: usize) -> Transaction {
        Transaction {
            doc: Document::from_html(TABLE),
            selection: Selection::collapsed(Position::new(
                NodePath::new(vec![1, row, col, 0]),
                1,
            )),
            stored_marks: None,
        }
    }

    fn table(tx: &Transaction) -> &Table {
        match &tx.doc.blocks[1] {
            Block::Table(table) => table,
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_cell() {
        let tx = in_cell(1, 0);
        assert_eq!(
            locate_cell(&tx).unwrap(),
            CellLocation {
                table: NodePath::root(1),
                row: 1,
                col: 0
            }
        );
    }

    #[test]
    fn test_outside_table_is_rejected() {
        let mut tx = in_cell(0, 0);
        tx.set_cursor(NodePath::root(0), 0);
        assert_eq!(
            apply(&mut tx, TableCommand::AddRowAfter),
            Err(CommandError::NotInTable)
        );
    }

    #[test]
    fn test_add_row_before_keeps_cursor_in_same_cell() {
        // Arrange: Cursor in the second data cell
        let mut tx = in_cell(1, 1);

        // Act: Insert a row above
        apply(&mut tx, TableCommand::AddRowBefore).unwrap();

        // Assert: Three rows, the cursor follows its cell down
        assert_eq!(table(&tx).rows.len(), 3);
        assert!(table(&tx).rows[1].cells.iter().all(|c| !c.header));
        assert_eq!(tx.head().path, NodePath::new(vec![1, 2, 1, 0]));
        assert_eq!(tx.head().offset, 1);
    }

    #[test]
    fn test_add_column_copies_header_flag() {
        let mut tx = in_cell(0, 0);
        apply(&mut tx, TableCommand::AddColumnAfter).unwrap();

        let t = table(&tx);
        assert_eq!(t.rows[0].cells.len(), 3);
        assert!(t.rows[0].cells[1].header);
        assert!(!t.rows[1].cells[1].header);
        assert_eq!(tx.head().path, NodePath::new(vec![1, 0, 0, 0]));

        apply(&mut tx, TableCommand::AddColumnBefore).unwrap();
        assert_eq!(tx.head().path, NodePath::new(vec![1, 0, 1, 0]));
    }

    #[test]
    fn test_delete_row_and_column() {
        let mut tx = in_cell(1, 1);
        apply(&mut tx, TableCommand::DeleteRow).unwrap();
        assert_eq!(table(&tx).rows.len(), 1);
        assert_eq!(tx.head().path, NodePath::new(vec![1, 0, 1, 0]));

        apply(&mut tx, TableCommand::DeleteColumn).unwrap();
        assert_eq!(table(&tx).rows[0].cells.len(), 1);
        assert_eq!(tx.head().path, NodePath::new(vec![1, 0, 0, 0]));

        // Removing the last column removes the table
        apply(&mut tx, TableCommand::DeleteColumn).unwrap();
        assert_eq!(tx.doc.to_html(), "<p>before</p><p>after</p>");
        assert_eq!(tx.head().path, NodePath::root(1));
    }

    #[test]
    fn test_toggle_header_row() {
        let mut tx = in_cell(1, 0);
        apply(&mut tx, TableCommand::ToggleHeaderRow).unwrap();
        assert!(!table(&tx).has_header_cell());

        apply(&mut tx, TableCommand::ToggleHeaderRow).unwrap();
        assert!(table(&tx).rows[0].cells.iter().all(|c| c.header));
    }

    #[test]
    fn test_delete_table_in_blockquote_leaves_paragraph() {
        let mut tx = Transaction {
            doc: Document::from_html(
                "<blockquote><table><tbody><tr><td><p>x</p></td></tr></tbody></table></blockquote>",
            ),
            selection: Selection::collapsed(Position::new(NodePath::new(vec![0, 0, 0, 0, 0]), 0)),
            stored_marks: None,
        };
        apply(&mut tx, TableCommand::DeleteTable).unwrap();
        assert_eq!(tx.doc.to_html(), "<blockquote><p></p></blockquote>");
        assert_eq!(tx.head().path, NodePath::new(vec![0, 0]));
    }
}
