//! Command and modal input errors

use crate::document_model::NodePath;
use thiserror::Error;

/// Modal input rejected before anything is applied
///
/// The modal stays open so the user can correct the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("URL scheme is not allowed: {0}")]
    UnsafeUrl(String),

    #[error("Image source must not be empty")]
    EmptySource,

    #[error("Video dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Table size {rows}x{cols} is outside 1..={max_rows} rows and 1..={max_cols} columns")]
    TableSize {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },

    #[error("Alt text must not be empty")]
    EmptyAltText,

    #[error("Image file rejected: {0}")]
    ImageFile(String),
}

/// Errors returned by the command dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("The document has no headings")]
    NoHeadings,

    #[error("The selection is not inside a table")]
    NotInTable,

    #[error("No modal is open")]
    NoPendingModal,

    #[error("Response does not match the open {0} modal")]
    ModalMismatch(&'static str),

    #[error("No suitable node at {0}")]
    InvalidPath(NodePath),

    #[error("Command does not apply to the current selection")]
    NotApplicable,
}
