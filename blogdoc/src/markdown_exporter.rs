//! Markdown exporter for blog content
//!
//! A best-effort, lossy conversion covering headings, paragraphs,
//! bold/italic and unordered lists. Everything else degrades to its plain
//! text:
//! - links keep their text and lose the destination
//! - ordered lists, quotes, code and table cells become plain paragraphs
//! - images, videos and rules are dropped

use crate::document_model::{Block, Document, ListItem, TextRun};

/// Convert a document to Markdown
pub fn to_markdown(doc: &Document) -> String {
    let mut output = String::new();
    for block in &doc.blocks {
        write_block(&mut output, block, 0);
    }
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

/// Write a single block to the output
fn write_block(output: &mut String, block: &Block, indent_level: usize) {
    let indent = "  ".repeat(indent_level);

    match block {
        Block::Heading { level, runs, .. } => {
            let prefix = "#".repeat(usize::from((*level).clamp(1, 6)));
            output.push_str(&format!("{}{} {}\n\n", indent, prefix, runs_to_markdown(runs)));
        }

        Block::Paragraph { runs, .. } => {
            let text = runs_to_markdown(runs);
            if !text.is_empty() {
                output.push_str(&indent);
                output.push_str(&text);
                output.push_str("\n\n");
            }
        }

        Block::List {
            ordered: false,
            items,
            ..
        } => {
            write_list(output, items, &indent);
            output.push('\n');
        }

        Block::List { items, .. } => {
            for item in items {
                for block in &item.blocks {
                    write_block(output, block, indent_level);
                }
            }
        }

        Block::BlockQuote(blocks) => {
            for inner in blocks {
                write_block(output, inner, indent_level);
            }
        }

        Block::CodeBlock { code, .. } => {
            for line in code.lines().filter(|line| !line.trim().is_empty()) {
                output.push_str(&indent);
                output.push_str(&escape_markdown(line.trim()));
                output.push_str("\n\n");
            }
        }

        Block::Table(table) => {
            for cell in table.rows.iter().flat_map(|row| &row.cells) {
                for block in &cell.blocks {
                    write_block(output, block, indent_level);
                }
            }
        }

        Block::Image { .. } | Block::Video { .. } | Block::Rule => {}
    }
}

/// Write an unordered list, nesting sub-lists by two spaces
fn write_list(output: &mut String, items: &[ListItem], indent: &str) {
    for item in items {
        let mut first = true;
        for block in &item.blocks {
            match block {
                Block::Paragraph { runs, .. } | Block::Heading { runs, .. } if first => {
                    output.push_str(&format!("{}- {}\n", indent, runs_to_markdown(runs)));
                }
                Block::List {
                    ordered: false,
                    items,
                    ..
                } => {
                    if first {
                        output.push_str(&format!("{}-\n", indent));
                    }
                    write_list(output, items, &format!("{}  ", indent));
                }
                other => {
                    let text = other.plain_text();
                    let text = text.trim();
                    if first {
                        output.push_str(&format!("{}- {}\n", indent, escape_markdown(text)));
                    } else if !text.is_empty() {
                        output.push_str(&format!("{}  {}\n", indent, escape_markdown(text)));
                    }
                }
            }
            first = false;
        }
        if first {
            output.push_str(&format!("{}-\n", indent));
        }
    }
}

/// Convert text runs to markdown string with formatting
///
/// Emphasis markers are kept inside surrounding whitespace, which Markdown
/// would otherwise refuse to treat as emphasis.
fn runs_to_markdown(runs: &[TextRun]) -> String {
    let mut result = String::new();

    for run in runs {
        let text = escape_markdown(&run.text).replace('\n', "  \n");
        let core = text.trim();
        if core.is_empty() {
            result.push_str(&text);
            continue;
        }

        let marker = match (run.marks.bold, run.marks.italic) {
            (true, true) => "***",
            (true, false) => "**",
            (false, true) => "*",
            (false, false) => "",
        };
        let start = text.len() - text.trim_start().len();
        let end = text.trim_end().len();
        result.push_str(&text[..start]);
        result.push_str(marker);
        result.push_str(core);
        result.push_str(marker);
        result.push_str(&text[end..]);
    }

    result
}

fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::Marks;

    #[test]
    fn test_runs_to_markdown_plain() {
        let runs = vec![TextRun::new("Hello world")];
        assert_eq!(runs_to_markdown(&runs), "Hello world");
    }

    #[test]
    fn test_runs_to_markdown_bold_keeps_spaces_outside() {
        let bold = Marks {
            bold: true,
            ..Marks::default()
        };
        let runs = vec![TextRun::new("a"), TextRun::with_marks(" bold ", &bold), TextRun::new("b")];
        assert_eq!(runs_to_markdown(&runs), "a **bold** b");
    }

    #[test]
    fn test_runs_to_markdown_combined() {
        let marks = Marks {
            bold: true,
            italic: true,
            ..Marks::default()
        };
        assert_eq!(runs_to_markdown(&[TextRun::with_marks("text", &marks)]), "***text***");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        assert_eq!(runs_to_markdown(&[TextRun::new("2*3 [x]")]), "2\\*3 \\[x\\]");
    }

    #[test]
    fn test_document_to_markdown() {
        let doc = Document::from_html(
            "<h2>Intro</h2><p>Some <strong>bold</strong> and <em>italic</em>.</p>\
             <ul><li><p>one</p></li><li><p>two</p><ul><li><p>nested</p></li></ul></li></ul>",
        );
        assert_eq!(
            to_markdown(&doc),
            "## Intro\n\nSome **bold** and *italic*.\n\n- one\n- two\n  - nested\n"
        );
    }

    #[test]
    fn test_unsupported_blocks_degrade_to_text() {
        let doc = Document::from_html(
            "<ol><li><p>first</p></li></ol><blockquote><p>quoted</p></blockquote>\
             <p><a href=\"/x\">linked</a></p><hr><img src=\"a.png\">",
        );
        assert_eq!(to_markdown(&doc), "first\n\nquoted\n\nlinked\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(to_markdown(&Document::new()), "");
    }
}
