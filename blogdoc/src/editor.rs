//! Editing layer
//!
//! The adapter owns the document and selection; the dispatcher turns
//! toolbar actions and modal responses into transactions on it.

// Submodules
mod adapter;
mod commands;
mod error;
mod history;
mod modal;
mod table_ops;
mod toolbar;
mod transforms;

// Re-export public types
pub use adapter::{Change, DocumentAdapter, TextRange, Transaction};
pub use commands::{Command, CommandDispatcher, Outcome};
pub use error::{CommandError, ValidationError};
pub use history::{History, Snapshot};
pub use modal::{
    embed_url, AltTextInput, ImageInput, LinkInput, ModalKind, ModalRequest, ModalResponse,
    TableInput, VideoInput,
};
pub use table_ops::{locate_cell, CellLocation, TableCommand};
pub use toolbar::{ActiveBlock, ToolbarState};
pub use transforms::{insert_block, BlockType, MAX_INDENT};
