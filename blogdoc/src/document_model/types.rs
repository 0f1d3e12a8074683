//! Shared type definitions: alignment, structural paths and selections

use std::fmt;

/// Block text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a CSS `text-align` value
    pub fn from_css(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Alignment::Left,
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            "justify" => Alignment::Justify,
            _ => Alignment::None,
        }
    }

    /// CSS `text-align` value, `None` for the default alignment
    pub fn as_css(self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
            Alignment::Justify => Some("justify"),
        }
    }
}

/// Structural position of a node in the document tree
///
/// Each step indexes into the children of the node reached so far:
/// - document and blockquote: child block index
/// - list: item index, then block index within the item
/// - table: row index, cell index, then block index within the cell
///
/// Paths of text blocks are never prefixes of each other, so comparing
/// two text block paths lexicographically yields document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn new(steps: Vec<usize>) -> Self {
        Self(steps)
    }

    /// Path of a top-level block
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the node within its parent's child list
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Extend the path with additional steps
    pub fn join(&self, steps: &[usize]) -> Self {
        let mut next = self.0.clone();
        next.extend_from_slice(steps);
        Self(next)
    }

    /// Replace the final step
    pub fn with_last(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        if let Some(last) = next.last_mut() {
            *last = index;
        }
        Self(next)
    }

    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self
            .0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "/{}", s)
    }
}

/// A cursor position: a text block plus a character offset into its text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub path: NodePath,
    pub offset: usize,
}

impl Position {
    pub fn new(path: NodePath, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// The editor selection; collapsed when anchor and head coincide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            head: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Start of the selection in document order
    pub fn from(&self) -> &Position {
        if self.anchor <= self.head {
            &self.anchor
        } else {
            &self.head
        }
    }

    /// End of the selection in document order
    pub fn to(&self) -> &Position {
        if self.anchor <= self.head {
            &self.head
        } else {
            &self.anchor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_order_is_document_order() {
        let first = NodePath::new(vec![0, 2, 0]);
        let second = NodePath::new(vec![1]);
        assert!(first < second);
    }

    #[test]
    fn test_selection_from_to_normalizes_backwards_selection() {
        let a = Position::new(NodePath::root(2), 4);
        let b = Position::new(NodePath::root(0), 1);
        let sel = Selection::new(a.clone(), b.clone());
        assert_eq!(sel.from(), &b);
        assert_eq!(sel.to(), &a);
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_alignment_css_roundtrip() {
        assert_eq!(Alignment::from_css(" Center "), Alignment::Center);
        assert_eq!(Alignment::Center.as_css(), Some("center"));
        assert_eq!(Alignment::from_css("inherit"), Alignment::None);
        assert_eq!(Alignment::None.as_css(), None);
    }
}
