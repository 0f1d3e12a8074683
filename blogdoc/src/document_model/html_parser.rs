//! Markup event stream parser
//!
//! Converts the tokenizer's event stream into a block tree with formatted
//! text runs. Recovery is lenient: unknown elements are transparent,
//! unmatched end tags are ignored, stray text is wrapped in a paragraph and
//! anything still open at the end of input is closed.

use super::blocks::{Block, BlockAttrs, ListItem, Table, TableCell, TableRow};
use super::html_tokenizer::{tokenize, HtmlEvent};
use super::text_run::{normalize_runs, Link, Marks, TextRun};
use super::types::Alignment;
use super::Document;

/// Parser state for converting markup events to blocks
pub struct HtmlParser {
    /// Current inline marks
    marks: Marks,

    /// Open inline elements with the marks in effect before each opened
    inline_stack: Vec<InlineFrame>,

    /// Open block containers, the document root at the bottom
    containers: Vec<Container>,

    /// Paragraph or heading currently collecting runs
    pending: Option<PendingText>,

    /// Code block being collected (inside `pre`)
    code: Option<CodeContext>,
}

struct InlineFrame {
    tag: String,
    saved: Marks,
}

enum Container {
    Root(Vec<Block>),
    BlockQuote(Vec<Block>),
    List {
        ordered: bool,
        class: Option<String>,
        items: Vec<ListItem>,
    },
    ListItem(Vec<Block>),
    Table {
        bordered: bool,
        rows: Vec<TableRow>,
    },
    Row(Vec<TableCell>),
    Cell {
        header: bool,
        blocks: Vec<Block>,
    },
}

enum TextKind {
    Paragraph,
    Heading(u8),
}

struct PendingText {
    kind: TextKind,
    attrs: BlockAttrs,
    runs: Vec<TextRun>,
}

struct CodeContext {
    language: Option<String>,
    code: String,
}

impl HtmlParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self {
            marks: Marks::default(),
            inline_stack: Vec::new(),
            containers: vec![Container::Root(Vec::new())],
            pending: None,
            code: None,
        }
    }

    /// Parse markup into a document
    pub fn parse(markup: &str) -> Document {
        let mut parser = Self::new();
        for event in tokenize(markup) {
            parser.process_event(event);
        }
        parser.finalize()
    }

    /// Process a single markup event
    fn process_event(&mut self, event: HtmlEvent) {
        if self.code.is_some() {
            self.process_code_event(event);
            return;
        }

        match event {
            HtmlEvent::Start { name, attrs } => self.handle_start_tag(&name, &attrs),
            HtmlEvent::End(name) => self.handle_end_tag(&name),
            HtmlEvent::Text(text) => self.handle_text(&text),
        }
    }

    /// Inside `pre` everything but text and the closing tag is ignored
    fn process_code_event(&mut self, event: HtmlEvent) {
        let Some(code) = self.code.as_mut() else {
            return;
        };
        match event {
            HtmlEvent::Text(text) => code.code.push_str(&text),
            HtmlEvent::Start { name, attrs } if name == "code" => {
                if code.language.is_none() {
                    code.language = attr(&attrs, "class").and_then(language_from_class);
                }
            }
            HtmlEvent::Start { name, .. } if name == "br" => code.code.push('\n'),
            HtmlEvent::End(name) if name == "pre" => {
                if let Some(code) = self.code.take() {
                    self.push_block(Block::CodeBlock {
                        language: code.language,
                        code: code.code,
                    });
                }
            }
            _ => {}
        }
    }

    /// Handle opening tags
    fn handle_start_tag(&mut self, name: &str, attrs: &[(String, String)]) {
        match name {
            "p" => {
                self.flush_pending();
                self.pending = Some(PendingText {
                    kind: TextKind::Paragraph,
                    attrs: block_attrs(attrs),
                    runs: Vec::new(),
                });
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush_pending();
                let level = name[1..].parse::<u8>().unwrap_or(1);
                self.pending = Some(PendingText {
                    kind: TextKind::Heading(level),
                    attrs: block_attrs(attrs),
                    runs: Vec::new(),
                });
            }
            "blockquote" => {
                self.flush_pending();
                self.ensure_block_container();
                self.containers.push(Container::BlockQuote(Vec::new()));
            }
            "ul" | "ol" => {
                self.flush_pending();
                self.ensure_block_container();
                self.containers.push(Container::List {
                    ordered: name == "ol",
                    class: attr(attrs, "class").map(str::to_string),
                    items: Vec::new(),
                });
            }
            "li" => {
                self.flush_pending();
                if matches!(self.containers.last(), Some(Container::ListItem(_))) {
                    self.close_top();
                }
                if matches!(self.containers.last(), Some(Container::List { .. })) {
                    self.containers.push(Container::ListItem(Vec::new()));
                }
            }
            "table" => {
                self.flush_pending();
                self.ensure_block_container();
                let bordered = attr(attrs, "class")
                    .map(|class| class.split_whitespace().any(|c| c == "bordered"))
                    .unwrap_or(false);
                self.containers.push(Container::Table {
                    bordered,
                    rows: Vec::new(),
                });
            }
            "tr" => {
                self.flush_pending();
                if matches!(self.containers.last(), Some(Container::Cell { .. })) {
                    self.close_top();
                }
                if matches!(self.containers.last(), Some(Container::Row(_))) {
                    self.close_top();
                }
                if matches!(self.containers.last(), Some(Container::Table { .. })) {
                    self.containers.push(Container::Row(Vec::new()));
                }
            }
            "td" | "th" => {
                self.flush_pending();
                if matches!(self.containers.last(), Some(Container::Cell { .. })) {
                    self.close_top();
                }
                if matches!(self.containers.last(), Some(Container::Table { .. })) {
                    self.containers.push(Container::Row(Vec::new()));
                }
                if matches!(self.containers.last(), Some(Container::Row(_))) {
                    self.containers.push(Container::Cell {
                        header: name == "th",
                        blocks: Vec::new(),
                    });
                }
            }
            "pre" => {
                self.flush_pending();
                self.code = Some(CodeContext {
                    language: None,
                    code: String::new(),
                });
            }
            "img" => {
                let block = Block::Image {
                    src: attr(attrs, "src").unwrap_or_default().to_string(),
                    alt: attr(attrs, "alt").map(str::to_string),
                    title: attr(attrs, "title").map(str::to_string),
                };
                self.interrupt_with(block);
            }
            "iframe" | "video" => {
                let block = Block::Video {
                    src: attr(attrs, "src").unwrap_or_default().to_string(),
                    width: parse_dimension(attr(attrs, "width"), 640),
                    height: parse_dimension(attr(attrs, "height"), 480),
                    controls: attr(attrs, "data-controls")
                        .map(|v| v != "false")
                        .unwrap_or(name == "iframe" || attr(attrs, "controls").is_some()),
                };
                self.interrupt_with(block);
            }
            "hr" => self.interrupt_with(Block::Rule),
            "br" => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.runs.push(TextRun::with_marks("\n", &self.marks));
                }
            }
            "strong" | "b" => self.open_inline(name, |m| m.bold = true),
            "em" | "i" => self.open_inline(name, |m| m.italic = true),
            "u" | "ins" => self.open_inline(name, |m| m.underline = true),
            "s" | "del" | "strike" => self.open_inline(name, |m| m.strike = true),
            "code" => self.open_inline(name, |m| m.code = true),
            "sub" => self.open_inline(name, |m| {
                m.subscript = true;
                m.superscript = false;
            }),
            "sup" => self.open_inline(name, |m| {
                m.superscript = true;
                m.subscript = false;
            }),
            "a" => {
                let link = attr(attrs, "href").map(|href| Link {
                    href: href.to_string(),
                    target: attr(attrs, "target").map(str::to_string),
                });
                self.open_inline(name, |m| {
                    if link.is_some() {
                        m.link = link.clone();
                    }
                });
            }
            "span" | "mark" | "font" => {
                let style = attr(attrs, "style").map(parse_style).unwrap_or_default();
                let is_mark = name == "mark";
                self.open_inline(name, |m| {
                    for (key, value) in &style {
                        match key.as_str() {
                            "color" => m.color = Some(value.clone()),
                            "font-size" => m.font_size = Some(value.clone()),
                            "background-color" | "background" => {
                                m.highlight = Some(value.clone())
                            }
                            _ => {}
                        }
                    }
                    if is_mark && m.highlight.is_none() {
                        m.highlight = Some("yellow".to_string());
                    }
                });
            }
            // Unknown elements are transparent
            _ => {}
        }
    }

    /// Handle closing tags
    fn handle_end_tag(&mut self, name: &str) {
        match name {
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.flush_pending(),
            "blockquote" => {
                self.flush_pending();
                self.close_until(|c| matches!(c, Container::BlockQuote(_)));
            }
            "ul" | "ol" => {
                self.flush_pending();
                self.close_until(|c| matches!(c, Container::List { .. }));
            }
            "li" => {
                self.flush_pending();
                self.close_until(|c| matches!(c, Container::ListItem(_)));
            }
            "table" => {
                self.flush_pending();
                self.close_until(|c| matches!(c, Container::Table { .. }));
            }
            "tr" => {
                self.flush_pending();
                self.close_until(|c| matches!(c, Container::Row(_)));
            }
            "td" | "th" => {
                self.flush_pending();
                self.close_until(|c| matches!(c, Container::Cell { .. }));
            }
            _ => self.close_inline(name),
        }
    }

    /// Handle text content
    fn handle_text(&mut self, text: &str) {
        if self.pending.is_none() {
            if text.trim().is_empty() {
                return;
            }
            if matches!(
                self.containers.last(),
                Some(Container::Table { .. }) | Some(Container::Row(_))
            ) {
                log::debug!("Dropping stray text inside table structure");
                return;
            }
            self.ensure_block_container();
            self.pending = Some(PendingText {
                kind: TextKind::Paragraph,
                attrs: BlockAttrs::default(),
                runs: Vec::new(),
            });
        }

        if let Some(pending) = self.pending.as_mut() {
            pending.runs.push(TextRun::with_marks(text, &self.marks));
        }
    }

    fn open_inline<F>(&mut self, tag: &str, apply: F)
    where
        F: FnOnce(&mut Marks),
    {
        self.inline_stack.push(InlineFrame {
            tag: tag.to_string(),
            saved: self.marks.clone(),
        });
        apply(&mut self.marks);
    }

    /// Close the innermost open inline element with this tag
    fn close_inline(&mut self, tag: &str) {
        let Some(index) = self.inline_stack.iter().rposition(|frame| frame.tag == tag) else {
            return;
        };
        // Anything opened inside the element closes with it
        self.marks = self.inline_stack[index].saved.clone();
        self.inline_stack.truncate(index);
    }

    /// Emit a leaf block, splitting any paragraph it interrupts
    ///
    /// Text following the block continues in a fresh implicit paragraph.
    fn interrupt_with(&mut self, block: Block) {
        let had_content = self
            .pending
            .as_ref()
            .is_some_and(|pending| !pending.runs.is_empty());
        if had_content {
            self.flush_pending();
        } else {
            self.pending = None;
        }
        self.push_block(block);
    }

    /// Finish the pending paragraph or heading
    fn flush_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let runs = normalize_runs(pending.runs);
        let block = match pending.kind {
            TextKind::Paragraph => Block::Paragraph {
                attrs: pending.attrs,
                runs,
            },
            TextKind::Heading(level) => Block::Heading {
                level,
                attrs: pending.attrs,
                runs,
            },
        };
        self.push_block(block);
    }

    /// Make sure the top container accepts blocks
    fn ensure_block_container(&mut self) {
        match self.containers.last() {
            Some(Container::List { .. }) => self.containers.push(Container::ListItem(Vec::new())),
            Some(Container::Table { .. }) => {
                self.containers.push(Container::Row(Vec::new()));
                self.containers.push(Container::Cell {
                    header: false,
                    blocks: Vec::new(),
                });
            }
            Some(Container::Row(_)) => self.containers.push(Container::Cell {
                header: false,
                blocks: Vec::new(),
            }),
            _ => {}
        }
    }

    /// Add a block to the innermost container
    fn push_block(&mut self, block: Block) {
        self.ensure_block_container();
        match self.containers.last_mut() {
            Some(Container::Root(blocks))
            | Some(Container::BlockQuote(blocks))
            | Some(Container::ListItem(blocks))
            | Some(Container::Cell { blocks, .. }) => blocks.push(block),
            _ => log::debug!("No block container available, dropping block"),
        }
    }

    /// Close containers down to and including the nearest match
    fn close_until<P>(&mut self, pred: P)
    where
        P: Fn(&Container) -> bool,
    {
        let Some(index) = self.containers.iter().rposition(|c| pred(c)) else {
            return;
        };
        if index == 0 {
            return;
        }
        while self.containers.len() > index {
            self.close_top();
        }
    }

    /// Pop the top container and fold it into its parent
    fn close_top(&mut self) {
        if self.containers.len() <= 1 {
            return;
        }
        let Some(container) = self.containers.pop() else {
            return;
        };

        match container {
            Container::Root(_) => {}
            Container::BlockQuote(blocks) => self.push_block(Block::BlockQuote(blocks)),
            Container::List {
                ordered,
                class,
                items,
            } => {
                if !items.is_empty() {
                    self.push_block(Block::List {
                        ordered,
                        class,
                        items,
                    });
                }
            }
            Container::ListItem(mut blocks) => {
                if blocks.is_empty() {
                    blocks.push(Block::empty_paragraph());
                }
                if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                    items.push(ListItem { blocks });
                }
            }
            Container::Table { bordered, rows } => {
                if !rows.is_empty() {
                    self.push_block(Block::Table(Table { rows, bordered }));
                }
            }
            Container::Row(cells) => {
                if let Some(Container::Table { rows, .. }) = self.containers.last_mut() {
                    rows.push(TableRow { cells });
                }
            }
            Container::Cell { header, mut blocks } => {
                if blocks.is_empty() {
                    blocks.push(Block::empty_paragraph());
                }
                if let Some(Container::Row(cells)) = self.containers.last_mut() {
                    cells.push(TableCell { header, blocks });
                }
            }
        }
    }

    /// Finalize parsing
    fn finalize(mut self) -> Document {
        if let Some(code) = self.code.take() {
            self.push_block(Block::CodeBlock {
                language: code.language,
                code: code.code,
            });
        }
        self.flush_pending();
        while self.containers.len() > 1 {
            self.close_top();
        }

        match self.containers.pop() {
            Some(Container::Root(blocks)) => Document { blocks },
            _ => Document::new(),
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Split an inline `style` attribute into lowercased property/value pairs
fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            (!key.is_empty() && !value.is_empty()).then(|| (key, value.to_string()))
        })
        .collect()
}

fn block_attrs(attrs: &[(String, String)]) -> BlockAttrs {
    let align = attr(attrs, "style")
        .map(parse_style)
        .and_then(|decls| {
            decls
                .into_iter()
                .find(|(key, _)| key == "text-align")
                .map(|(_, value)| Alignment::from_css(&value))
        })
        .unwrap_or_default();

    BlockAttrs {
        id: attr(attrs, "id")
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        align,
        indent: attr(attrs, "data-indent")
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(0),
    }
}

fn language_from_class(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

fn parse_dimension(value: Option<&str>, default: u32) -> u32 {
    value
        .map(|v| v.trim().trim_end_matches("px"))
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}
