//! Command dispatcher
//!
//! One entry point per toolbar affordance. Immediate commands apply a
//! single transaction; insertions go through a modal that is opened,
//! then confirmed or cancelled.

use super::adapter::{Change, DocumentAdapter};
use super::error::CommandError;
use super::modal::{ModalKind, ModalRequest, ModalResponse};
use super::table_ops::{self, TableCommand};
use super::toolbar::ToolbarState;
use super::transforms::{self, BlockType};
use crate::document_model::{Alignment, Block, MarkKind, Marks};
use crate::editor_config::EditorLimits;
use crate::toc::{self, Numbering};

/// A toolbar action that applies immediately
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleMark(MarkKind),
    SetHeading(u8),
    SetParagraph,
    SetAlignment(Alignment),

    /// `None` clears the text color
    SetColor(Option<String>),
    SetHighlight(Option<String>),
    SetFontSize(Option<String>),

    ToggleBulletList,
    ToggleOrderedList,
    ToggleBlockQuote,
    ToggleCodeBlock,
    Indent,
    Outdent,
    InsertRule,
    ClearFormatting,
    RemoveLink,
    InsertText(String),

    /// Enter key
    SplitBlock,

    Undo,
    Redo,
    Table(TableCommand),
    InsertTableOfContents(Numbering),
}

/// Result of a dispatched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document changed
    Applied(Change),

    /// Only the marks for the next insertion changed
    StoredMarks(Marks),

    /// No editor is active; nothing happened
    NoEditor,

    /// Nothing to undo or redo
    Unchanged,
}

/// Routes toolbar commands and modal responses to document mutations
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    pending: Option<ModalKind>,
    limits: EditorLimits,
}

impl CommandDispatcher {
    pub fn new(limits: EditorLimits) -> Self {
        Self {
            pending: None,
            limits,
        }
    }

    /// Modal currently awaiting confirmation
    pub fn pending(&self) -> Option<&ModalKind> {
        self.pending.as_ref()
    }

    pub fn limits(&self) -> &EditorLimits {
        &self.limits
    }

    /// Apply an immediate command
    ///
    /// Mark commands on a collapsed cursor only change the marks used by the
    /// next insertion.
    pub fn dispatch(
        &mut self,
        adapter: &mut DocumentAdapter,
        command: Command,
    ) -> Result<Outcome, CommandError> {
        if !adapter.is_active() {
            log::debug!("Ignoring {:?}: no active editor", command);
            return Ok(Outcome::NoEditor);
        }
        log::debug!("Dispatching {:?}", command);

        let collapsed = adapter.selection().is_some_and(|s| s.is_collapsed());
        let change = match command {
            Command::ToggleMark(kind) if collapsed => {
                return Ok(Outcome::StoredMarks(adapter.toggle_stored_mark(kind)));
            }
            Command::ToggleMark(kind) => {
                adapter.transact(|tx| transforms::toggle_mark(tx, kind))?
            }
            Command::SetColor(color) => {
                return set_style_mark(adapter, collapsed, move |marks| {
                    marks.color = color.clone()
                });
            }
            Command::SetHighlight(highlight) => {
                return set_style_mark(adapter, collapsed, move |marks| {
                    marks.highlight = highlight.clone()
                });
            }
            Command::SetFontSize(size) => {
                return set_style_mark(adapter, collapsed, move |marks| {
                    marks.font_size = size.clone()
                });
            }
            Command::ClearFormatting if collapsed => {
                return Ok(Outcome::StoredMarks(
                    adapter.update_stored_marks(|marks| *marks = Marks::default()),
                ));
            }
            Command::ClearFormatting => adapter.transact(transforms::clear_formatting)?,
            Command::SetHeading(level) => {
                adapter.transact(|tx| transforms::set_block_type(tx, BlockType::Heading(level)))?
            }
            Command::SetParagraph => {
                adapter.transact(|tx| transforms::set_block_type(tx, BlockType::Paragraph))?
            }
            Command::SetAlignment(align) => {
                adapter.transact(|tx| transforms::set_alignment(tx, align))?
            }
            Command::ToggleBulletList => adapter.transact(|tx| transforms::toggle_list(tx, false))?,
            Command::ToggleOrderedList => adapter.transact(|tx| transforms::toggle_list(tx, true))?,
            Command::ToggleBlockQuote => adapter.transact(transforms::toggle_blockquote)?,
            Command::ToggleCodeBlock => adapter.transact(transforms::toggle_code_block)?,
            Command::Indent => adapter.transact(|tx| transforms::indent(tx, 1))?,
            Command::Outdent => adapter.transact(|tx| transforms::indent(tx, -1))?,
            Command::InsertRule => adapter.transact(|tx| {
                transforms::insert_block(tx, Block::Rule)?;
                Ok(())
            })?,
            Command::RemoveLink => adapter.transact(transforms::unset_link)?,
            Command::InsertText(text) => {
                adapter.transact(|tx| transforms::insert_text(tx, &text))?
            }
            Command::SplitBlock => adapter.transact(transforms::split_block)?,
            Command::Undo => {
                return Ok(adapter.undo().map_or(Outcome::Unchanged, Outcome::Applied));
            }
            Command::Redo => {
                return Ok(adapter.redo().map_or(Outcome::Unchanged, Outcome::Applied));
            }
            Command::Table(table_command) => {
                adapter.transact(|tx| table_ops::apply(tx, table_command))?
            }
            Command::InsertTableOfContents(numbering) => {
                toc::insert_table_of_contents(adapter, numbering)?
            }
        };
        Ok(Outcome::Applied(change))
    }

    /// Open an insertion modal
    ///
    /// Returns the pre-filled request, or `None` when no editor is active.
    /// Opening a modal replaces any modal still pending. The alt text modal
    /// works on a known image and does not need an active selection.
    pub fn open(
        &mut self,
        adapter: &DocumentAdapter,
        kind: ModalKind,
    ) -> Result<Option<ModalRequest>, CommandError> {
        let request = match &kind {
            ModalKind::ImageAlt { path } => match adapter.document().block_at(path) {
                Some(Block::Image { src, .. }) => ModalRequest::ImageAlt {
                    path: path.clone(),
                    src: src.clone(),
                },
                _ => return Err(CommandError::InvalidPath(path.clone())),
            },
            _ if !adapter.is_active() => return Ok(None),
            ModalKind::Link => {
                let link = ToolbarState::from_adapter(adapter).marks.link;
                ModalRequest::Link {
                    href: link.as_ref().map(|l| l.href.clone()),
                    target: link.and_then(|l| l.target),
                }
            }
            ModalKind::Image => ModalRequest::Image,
            ModalKind::Video => ModalRequest::Video(Default::default()),
            ModalKind::Table => ModalRequest::Table(Default::default()),
        };

        if let Some(previous) = self.pending.replace(kind) {
            log::debug!("Replacing open {} modal", previous.name());
        }
        Ok(Some(request))
    }

    /// Validate and apply the pending modal's input
    ///
    /// Invalid input is rejected with the modal left open so it can be
    /// corrected. Once the input is valid the modal closes, whether or not
    /// the document accepted the edit.
    pub fn confirm(
        &mut self,
        adapter: &mut DocumentAdapter,
        response: ModalResponse,
    ) -> Result<Outcome, CommandError> {
        let kind = self.pending.as_ref().ok_or(CommandError::NoPendingModal)?;
        if !response.answers(kind) {
            return Err(CommandError::ModalMismatch(kind.name()));
        }

        let edit = match &response {
            ModalResponse::Link(input) => Edit::Link(input.validate()?),
            ModalResponse::Image(input) => Edit::Insert(input.validate()?),
            ModalResponse::Video(input) => Edit::Insert(input.validate()?),
            ModalResponse::Table(input) => Edit::Insert(input.validate(&self.limits)?),
            ModalResponse::AltText(input) => Edit::Alt(input.validate()?),
        };

        let Some(kind) = self.pending.take() else {
            return Err(CommandError::NoPendingModal);
        };
        if !matches!(kind, ModalKind::ImageAlt { .. }) && !adapter.is_active() {
            return Ok(Outcome::NoEditor);
        }
        log::debug!("Confirming {} modal", kind.name());

        let change = match (edit, kind) {
            (Edit::Link(link), _) => adapter.transact(|tx| transforms::set_link(tx, link))?,
            (Edit::Insert(block), _) => adapter.transact(|tx| {
                transforms::insert_block(tx, block)?;
                Ok(())
            })?,
            (Edit::Alt(text), ModalKind::ImageAlt { path }) => adapter.transact(|tx| {
                match tx.doc.block_at_mut(&path) {
                    Some(Block::Image { alt, .. }) => {
                        *alt = Some(text);
                        Ok(())
                    }
                    _ => Err(CommandError::InvalidPath(path.clone())),
                }
            })?,
            (Edit::Alt(_), other) => return Err(CommandError::ModalMismatch(other.name())),
        };
        Ok(Outcome::Applied(change))
    }

    /// Close the pending modal, discarding its input
    ///
    /// Returns whether a modal was open.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// Validated modal input ready to apply
enum Edit {
    Link(crate::document_model::Link),
    Insert(Block),
    Alt(String),
}

/// Set a style mark over the selection, or for the next insertion at a
/// collapsed cursor
fn set_style_mark<F>(
    adapter: &mut DocumentAdapter,
    collapsed: bool,
    update: F,
) -> Result<Outcome, CommandError>
where
    F: Fn(&mut Marks),
{
    if collapsed {
        return Ok(Outcome::StoredMarks(adapter.update_stored_marks(update)));
    }
    let change = adapter.transact(|tx| transforms::apply_marks(tx, update))?;
    Ok(Outcome::Applied(change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::{NodePath, Position, Selection};
    use crate::editor::{AltTextInput, LinkInput, TableInput, ValidationError, VideoInput};

    fn editor(markup: &str) -> (CommandDispatcher, DocumentAdapter) {
        let mut adapter = DocumentAdapter::new();
        adapter.set_content(markup);
        (CommandDispatcher::default(), adapter)
    }

    fn select(adapter: &mut DocumentAdapter, path: &[usize], from: usize, to: usize) {
        adapter
            .set_selection(Selection::new(
                Position::new(NodePath::new(path.to_vec()), from),
                Position::new(NodePath::new(path.to_vec()), to),
            ))
            .unwrap();
    }

    #[test]
    fn test_bold_on_range_applies_one_change() {
        // Arrange: Select "world"
        let (mut dispatcher, mut adapter) = editor("<p>hello world</p>");
        select(&mut adapter, &[0], 6, 11);

        // Act: Toggle bold
        let outcome = dispatcher
            .dispatch(&mut adapter, Command::ToggleMark(MarkKind::Bold))
            .unwrap();

        // Assert: One change carrying the new markup
        assert_eq!(
            outcome,
            Outcome::Applied(Change {
                markup: "<p>hello <strong>world</strong></p>".to_string()
            })
        );
    }

    #[test]
    fn test_bold_on_cursor_affects_next_insertion() {
        let (mut dispatcher, mut adapter) = editor("<p>ab</p>");
        select(&mut adapter, &[0], 1, 1);

        let outcome = dispatcher
            .dispatch(&mut adapter, Command::ToggleMark(MarkKind::Bold))
            .unwrap();
        assert!(matches!(outcome, Outcome::StoredMarks(ref m) if m.bold));
        assert_eq!(adapter.content(), "<p>ab</p>");

        dispatcher
            .dispatch(&mut adapter, Command::InsertText("X".to_string()))
            .unwrap();
        assert_eq!(adapter.content(), "<p>a<strong>X</strong>b</p>");
    }

    #[test]
    fn test_commands_without_editor_are_noops() {
        let (mut dispatcher, mut adapter) = editor("<p>text</p>");
        adapter.blur();

        let outcome = dispatcher
            .dispatch(&mut adapter, Command::SetHeading(1))
            .unwrap();

        assert_eq!(outcome, Outcome::NoEditor);
        assert_eq!(adapter.content(), "<p>text</p>");
        assert_eq!(dispatcher.open(&adapter, ModalKind::Link), Ok(None));
    }

    #[test]
    fn test_color_on_range() {
        let (mut dispatcher, mut adapter) = editor("<p>red</p>");
        select(&mut adapter, &[0], 0, 3);
        dispatcher
            .dispatch(&mut adapter, Command::SetColor(Some("#ff0000".to_string())))
            .unwrap();
        assert_eq!(
            adapter.content(),
            "<p><span style=\"color: #ff0000\">red</span></p>"
        );

        dispatcher
            .dispatch(&mut adapter, Command::SetColor(None))
            .unwrap();
        assert_eq!(adapter.content(), "<p>red</p>");
    }

    #[test]
    fn test_undo_redo_through_dispatcher() {
        let (mut dispatcher, mut adapter) = editor("<p>x</p>");
        dispatcher
            .dispatch(&mut adapter, Command::SetHeading(2))
            .unwrap();
        assert_eq!(adapter.content(), "<h2>x</h2>");

        dispatcher.dispatch(&mut adapter, Command::Undo).unwrap();
        assert_eq!(adapter.content(), "<p>x</p>");
        dispatcher.dispatch(&mut adapter, Command::Redo).unwrap();
        assert_eq!(adapter.content(), "<h2>x</h2>");
        assert_eq!(
            dispatcher.dispatch(&mut adapter, Command::Redo).unwrap(),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_failed_command_changes_nothing() {
        let (mut dispatcher, mut adapter) = editor("<p>plain</p>");
        let result = dispatcher.dispatch(&mut adapter, Command::Table(TableCommand::AddRowAfter));
        assert_eq!(result, Err(CommandError::NotInTable));
        assert_eq!(adapter.content(), "<p>plain</p>");
        assert!(!adapter.can_undo());
    }

    #[test]
    fn test_link_modal_prefills_current_href() {
        let (mut dispatcher, mut adapter) = editor("<p><a href=\"/old\">docs</a></p>");
        select(&mut adapter, &[0], 2, 2);

        let request = dispatcher.open(&adapter, ModalKind::Link).unwrap();
        assert_eq!(
            request,
            Some(ModalRequest::Link {
                href: Some("/old".to_string()),
                target: None
            })
        );

        dispatcher
            .confirm(
                &mut adapter,
                ModalResponse::Link(LinkInput {
                    href: "/new".to_string(),
                    target: None,
                }),
            )
            .unwrap();
        assert_eq!(adapter.content(), "<p><a href=\"/new\">docs</a></p>");
        assert!(dispatcher.pending().is_none());
    }

    #[test]
    fn test_invalid_input_keeps_modal_open() {
        // Arrange: Open the video modal
        let (mut dispatcher, mut adapter) = editor("<p>text</p>");
        dispatcher.open(&adapter, ModalKind::Video).unwrap();

        // Act: Confirm without a URL
        let result = dispatcher.confirm(&mut adapter, ModalResponse::Video(VideoInput::default()));

        // Assert: Rejected, modal still open, document unchanged
        assert_eq!(
            result,
            Err(CommandError::ValidationError(ValidationError::EmptyUrl))
        );
        assert_eq!(dispatcher.pending(), Some(&ModalKind::Video));
        assert_eq!(adapter.content(), "<p>text</p>");

        assert!(dispatcher.cancel());
        assert!(dispatcher.pending().is_none());
        assert!(!dispatcher.cancel());
    }

    #[test]
    fn test_confirm_requires_matching_open_modal() {
        let (mut dispatcher, mut adapter) = editor("<p>text</p>");
        let response = ModalResponse::Table(TableInput::default());
        assert_eq!(
            dispatcher.confirm(&mut adapter, response.clone()),
            Err(CommandError::NoPendingModal)
        );

        dispatcher.open(&adapter, ModalKind::Link).unwrap();
        assert_eq!(
            dispatcher.confirm(&mut adapter, response),
            Err(CommandError::ModalMismatch("link"))
        );
    }

    #[test]
    fn test_table_modal_inserts_table_and_moves_cursor() {
        let (mut dispatcher, mut adapter) = editor("<p></p>");
        dispatcher.open(&adapter, ModalKind::Table).unwrap();

        dispatcher
            .confirm(
                &mut adapter,
                ModalResponse::Table(TableInput {
                    rows: 2,
                    cols: 2,
                    with_header_row: true,
                    with_borders: false,
                }),
            )
            .unwrap();

        assert_eq!(
            adapter.content(),
            "<table><tbody><tr><th><p></p></th><th><p></p></th></tr>\
             <tr><td><p></p></td><td><p></p></td></tr></tbody></table><p></p>"
        );
        assert_eq!(
            adapter.selection().map(|s| s.head.path.clone()),
            Some(NodePath::new(vec![0, 0, 0, 0]))
        );
    }

    #[test]
    fn test_alt_text_flow() {
        let (mut dispatcher, mut adapter) = editor("<p>a</p><img src=\"/x.png\"><p>b</p>");
        let path = NodePath::root(1);

        let request = dispatcher
            .open(&adapter, ModalKind::ImageAlt { path: path.clone() })
            .unwrap();
        assert_eq!(
            request,
            Some(ModalRequest::ImageAlt {
                path: path.clone(),
                src: "/x.png".to_string()
            })
        );

        dispatcher
            .confirm(
                &mut adapter,
                ModalResponse::AltText(AltTextInput {
                    alt: " A diagram ".to_string(),
                }),
            )
            .unwrap();
        assert_eq!(
            adapter.content(),
            "<p>a</p><img src=\"/x.png\" alt=\"A diagram\"><p>b</p>"
        );

        assert_eq!(
            dispatcher.open(&adapter, ModalKind::ImageAlt { path: NodePath::root(0) }),
            Err(CommandError::InvalidPath(NodePath::root(0)))
        );
    }
}
