//! Markup serializer
//!
//! Writes a document as compact markup, the format the editor stores in
//! drafts and hands to the publishing workflow. Parsing the output again
//! yields an equal document.

use super::blocks::{Block, BlockAttrs, ListItem, Table};
use super::text_run::{normalize_runs, Marks, TextRun};
use super::Document;

/// Serialize a document to markup
pub fn write_document(doc: &Document) -> String {
    let mut output = String::new();
    write_blocks(&mut output, &doc.blocks);
    output
}

/// Serialize a block sequence to markup
pub fn write_blocks(output: &mut String, blocks: &[Block]) {
    for block in blocks {
        write_block(output, block);
    }
}

fn write_block(output: &mut String, block: &Block) {
    match block {
        Block::Paragraph { attrs, runs } => {
            output.push_str("<p");
            write_block_attrs(output, attrs);
            output.push('>');
            write_runs(output, runs);
            output.push_str("</p>");
        }

        Block::Heading { level, attrs, runs } => {
            let level = (*level).clamp(1, 6);
            output.push_str(&format!("<h{}", level));
            write_block_attrs(output, attrs);
            output.push('>');
            write_runs(output, runs);
            output.push_str(&format!("</h{}>", level));
        }

        Block::List {
            ordered,
            class,
            items,
        } => write_list(output, *ordered, class.as_deref(), items),

        Block::BlockQuote(blocks) => {
            output.push_str("<blockquote>");
            write_blocks(output, blocks);
            output.push_str("</blockquote>");
        }

        Block::CodeBlock { language, code } => {
            if let Some(lang) = language {
                output.push_str(&format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    escape_html(lang),
                    escape_html(code)
                ));
            } else {
                output.push_str(&format!("<pre><code>{}</code></pre>", escape_html(code)));
            }
        }

        Block::Table(table) => write_table(output, table),

        Block::Image { src, alt, title } => {
            output.push_str(&format!("<img src=\"{}\"", escape_html(src)));
            if let Some(alt) = alt {
                output.push_str(&format!(" alt=\"{}\"", escape_html(alt)));
            }
            if let Some(title) = title {
                output.push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            output.push('>');
        }

        Block::Video {
            src,
            width,
            height,
            controls,
        } => {
            output.push_str(&format!(
                "<div data-video><iframe src=\"{}\" width=\"{}\" height=\"{}\" data-controls=\"{}\" frameborder=\"0\" allowfullscreen></iframe></div>",
                escape_html(src),
                width,
                height,
                controls
            ));
        }

        Block::Rule => output.push_str("<hr>"),
    }
}

fn write_block_attrs(output: &mut String, attrs: &BlockAttrs) {
    if let Some(id) = &attrs.id {
        output.push_str(&format!(" id=\"{}\"", escape_html(id)));
    }
    if let Some(align) = attrs.align.as_css() {
        output.push_str(&format!(" style=\"text-align: {}\"", align));
    }
    if attrs.indent > 0 {
        output.push_str(&format!(" data-indent=\"{}\"", attrs.indent));
    }
}

fn write_list(output: &mut String, ordered: bool, class: Option<&str>, items: &[ListItem]) {
    let tag = if ordered { "ol" } else { "ul" };
    output.push('<');
    output.push_str(tag);
    if let Some(class) = class {
        output.push_str(&format!(" class=\"{}\"", escape_html(class)));
    }
    output.push('>');

    for item in items {
        output.push_str("<li>");
        if item.blocks.is_empty() {
            output.push_str("<p></p>");
        }
        write_blocks(output, &item.blocks);
        output.push_str("</li>");
    }

    output.push_str(&format!("</{}>", tag));
}

fn write_table(output: &mut String, table: &Table) {
    if table.bordered {
        output.push_str("<table class=\"bordered\"><tbody>");
    } else {
        output.push_str("<table><tbody>");
    }

    for row in &table.rows {
        output.push_str("<tr>");
        for cell in &row.cells {
            let tag = if cell.header { "th" } else { "td" };
            output.push_str(&format!("<{}>", tag));
            if cell.blocks.is_empty() {
                output.push_str("<p></p>");
            }
            write_blocks(output, &cell.blocks);
            output.push_str(&format!("</{}>", tag));
        }
        output.push_str("</tr>");
    }

    output.push_str("</tbody></table>");
}

/// Write inline runs, outermost element first: link, styled span,
/// highlight, then the boolean marks
fn write_runs(output: &mut String, runs: &[TextRun]) {
    for run in normalize_runs(runs.to_vec()) {
        output.push_str(&run_to_html(&run.text, &run.marks));
    }
}

fn run_to_html(text: &str, marks: &Marks) -> String {
    let mut html = escape_html(text).replace('\n', "<br>");

    if marks.code {
        html = format!("<code>{}</code>", html);
    }
    if marks.superscript {
        html = format!("<sup>{}</sup>", html);
    }
    if marks.subscript {
        html = format!("<sub>{}</sub>", html);
    }
    if marks.strike {
        html = format!("<s>{}</s>", html);
    }
    if marks.underline {
        html = format!("<u>{}</u>", html);
    }
    if marks.italic {
        html = format!("<em>{}</em>", html);
    }
    if marks.bold {
        html = format!("<strong>{}</strong>", html);
    }
    if let Some(ref color) = marks.highlight {
        html = format!(
            "<mark style=\"background-color: {}\">{}</mark>",
            escape_html(color),
            html
        );
    }

    let style = [
        marks.color.as_ref().map(|c| format!("color: {}", c)),
        marks.font_size.as_ref().map(|s| format!("font-size: {}", s)),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("; ");
    if !style.is_empty() {
        html = format!("<span style=\"{}\">{}</span>", escape_html(&style), html);
    }

    if let Some(ref link) = marks.link {
        let target = match link.target.as_deref() {
            Some("_blank") => " target=\"_blank\" rel=\"noopener noreferrer\"".to_string(),
            Some(target) => format!(" target=\"{}\"", escape_html(target)),
            None => String::new(),
        };
        html = format!("<a href=\"{}\"{}>{}</a>", escape_html(&link.href), target, html);
    }

    html
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
