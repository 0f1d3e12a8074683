//! HTML exporter for blog content
//!
//! Exports either the raw serialized markup or a standalone page with:
//! - The post title and reading metadata
//! - Modern CSS styling with sans-serif fonts

use crate::document_model::{escape_html, Document};
use crate::metrics::ContentMetrics;

/// Serialized markup exactly as the editor stores it
pub fn to_html(doc: &Document) -> String {
    if doc.is_empty() {
        String::new()
    } else {
        doc.to_html()
    }
}

/// Wrap the content in a complete, styled HTML page
///
/// # Parameters
/// * `doc` - The document to export
/// * `title` - Page title; omitted from the body when empty
/// * `metrics` - Word count and read time shown under the title
///
/// # Returns
/// The page markup
pub fn to_standalone_html(doc: &Document, title: &str, metrics: &ContentMetrics) -> String {
    let mut output = String::new();

    write_html_header(&mut output, title);

    output.push_str("<body>\n");
    output.push_str("<article class=\"container\">\n");

    if !title.is_empty() {
        output.push_str(&format!(
            "<h1 class=\"post-title\">{}</h1>\n",
            escape_html(title)
        ));
    }
    write_metadata(&mut output, metrics);

    output.push_str("<div class=\"post-content\">\n");
    output.push_str(&to_html(doc));
    output.push_str("\n</div>\n");

    output.push_str("</article>\n");
    output.push_str("</body>\n");
    output.push_str("</html>\n");

    output
}

/// Write HTML header with CSS styling
fn write_html_header(output: &mut String, title: &str) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    output.push_str("<style>\n");
    output.push_str(CSS_STYLES);
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

fn write_metadata(output: &mut String, metrics: &ContentMetrics) {
    let unit = if metrics.read_time_minutes == 1 {
        "minute"
    } else {
        "minutes"
    };
    output.push_str(&format!(
        "<p class=\"metadata\">{} words &middot; {} {} read</p>\n",
        metrics.word_count, metrics.read_time_minutes, unit
    ));
}

const CSS_STYLES: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Oxygen',
                 'Ubuntu', 'Cantarell', 'Fira Sans', 'Droid Sans', 'Helvetica Neue',
                 sans-serif;
    line-height: 1.6;
    color: #333;
    background-color: #f5f5f5;
    padding: 20px;
}

.container {
    max-width: 800px;
    margin: 0 auto;
    background: white;
    padding: 60px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    border-radius: 4px;
}

.post-title {
    font-size: 2.5em;
    font-weight: 700;
    margin-bottom: 8px;
    color: #1a1a1a;
}

.metadata {
    color: #777;
    font-size: 0.95em;
    margin-bottom: 40px;
}

h1, h2, h3, h4, h5, h6 {
    margin-top: 32px;
    margin-bottom: 12px;
    color: #1a1a1a;
    font-weight: 600;
}

p {
    margin-bottom: 16px;
}

p[data-indent="1"] { padding-left: 3em; }
p[data-indent="2"] { padding-left: 6em; }
p[data-indent="3"] { padding-left: 9em; }
p[data-indent="4"] { padding-left: 12em; }

code {
    font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', 'Consolas', monospace;
    background-color: #f4f4f4;
    padding: 2px 6px;
    border-radius: 3px;
    font-size: 0.9em;
    color: #d73a49;
}

pre {
    background-color: #f6f8fa;
    border: 1px solid #e1e4e8;
    border-radius: 4px;
    padding: 16px;
    margin-bottom: 16px;
    overflow-x: auto;
}

pre code {
    background: none;
    padding: 0;
    color: #24292e;
}

blockquote {
    border-left: 4px solid #ddd;
    padding-left: 16px;
    margin: 16px 0;
    color: #666;
    font-style: italic;
}

ul, ol {
    margin-bottom: 16px;
    padding-left: 30px;
}

ul.table-of-contents {
    list-style: none;
    padding-left: 0;
    border-left: 4px solid #0066cc;
    background-color: #f9f9f9;
    padding: 12px 20px;
}

ul.table-of-contents p {
    margin-bottom: 4px;
}

table {
    width: 100%;
    border-collapse: collapse;
    margin-bottom: 20px;
}

th, td {
    padding: 10px 12px;
    text-align: left;
}

th {
    font-weight: 600;
    background-color: #f6f8fa;
}

table.bordered th,
table.bordered td {
    border: 1px solid #d0d7de;
}

img {
    max-width: 100%;
    height: auto;
    border-radius: 4px;
}

div[data-video] {
    margin: 24px 0;
}

div[data-video] iframe {
    max-width: 100%;
}

hr {
    border: none;
    border-top: 2px solid #e1e4e8;
    margin: 32px 0;
}

a {
    color: #0366d6;
    text-decoration: none;
}

a:hover {
    text-decoration: underline;
}

@media screen and (max-width: 768px) {
    .container {
        padding: 30px 20px;
    }

    .post-title {
        font-size: 2em;
    }
}
"#;
