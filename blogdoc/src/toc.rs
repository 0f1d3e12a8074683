//! Table of contents generation
//!
//! Collects headings in document order, derives anchor slugs and optional
//! section numbers, and inserts a linked list of them at the cursor.

use crate::document_model::{
    runs_text, Block, BlockAttrs, Document, Link, ListItem, Marks, NodePath, TextRun,
};
use crate::editor::{insert_block, Change, CommandError, DocumentAdapter};
use itertools::Itertools;
use regex::Regex;
use std::sync::OnceLock;

/// CSS class of the inserted list
pub const TOC_CLASS: &str = "table-of-contents";

const CHECKMARKS: [char; 3] = ['✓', '✔', '☑'];
const BULLETS: [char; 2] = ['•', '·'];

/// How headings without an explicit number prefix are numbered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Numbering {
    #[default]
    None,

    /// Hierarchical numbers from per-level counters (`1.`, `1.2.`)
    Auto,
}

/// A heading found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRecord {
    pub level: u8,

    /// Text without marker glyphs or number prefix
    pub text: String,

    pub slug: String,

    /// Section number such as `"2.1."`
    pub number: Option<String>,

    /// A checkmark glyph was present
    pub checkmark: bool,

    /// A bullet or middle-dot glyph was present
    pub bullet: bool,

    pub path: NodePath,
}

impl HeadingRecord {
    /// Text shown for this heading in the table of contents
    pub fn entry_text(&self) -> String {
        let mut entry = String::new();
        if self.checkmark {
            entry.push_str("✓ ");
        }
        if self.bullet {
            entry.push_str("• ");
        }
        if let Some(number) = &self.number {
            entry.push_str(number);
            entry.push(' ');
        }
        entry.push_str(&self.text);
        entry
    }
}

fn number_prefix_regex() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)*\.)\s+").expect("number prefix pattern is valid")
    })
}

fn slug_regexes() -> &'static (Regex, Regex, Regex) {
    static SLUG: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    SLUG.get_or_init(|| {
        (
            Regex::new(r"[^\w\s-]").expect("slug strip pattern is valid"),
            Regex::new(r"\s+").expect("slug space pattern is valid"),
            Regex::new(r"-+").expect("slug hyphen pattern is valid"),
        )
    })
}

/// Anchor slug for heading text
///
/// Lowercases, drops characters other than word characters, whitespace and
/// hyphens, turns whitespace runs into single hyphens and trims hyphens
/// from both ends. Applying it twice gives the same result.
pub fn slugify(text: &str) -> String {
    let (strip, spaces, hyphens) = slug_regexes();
    let lower = text.to_lowercase();
    let stripped = strip.replace_all(&lower, "");
    let hyphenated = spaces.replace_all(stripped.trim(), "-");
    let collapsed = hyphens.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Collect every heading in document order
///
/// Headings carrying an explicit `N.` prefix keep it as their number; when
/// none do, `numbering` decides whether numbers are generated.
pub fn generate(doc: &Document, numbering: Numbering) -> Vec<HeadingRecord> {
    let mut headings = Vec::new();
    doc.walk(|path, block| {
        if let Block::Heading { level, runs, .. } = block {
            headings.push(heading_record(path, *level, &runs_text(runs)));
        }
    });

    let explicit = headings.iter().any(|h| h.number.is_some());
    if !explicit && numbering == Numbering::Auto {
        auto_number(&mut headings);
    }

    let duplicates: Vec<&str> = headings
        .iter()
        .map(|h| h.slug.as_str())
        .filter(|slug| !slug.is_empty())
        .duplicates()
        .collect();
    if !duplicates.is_empty() {
        log::warn!("Duplicate heading anchors: {}", duplicates.join(", "));
    }

    headings
}

fn heading_record(path: &NodePath, level: u8, raw: &str) -> HeadingRecord {
    let checkmark = raw.chars().any(|c| CHECKMARKS.contains(&c));
    let bullet = raw.chars().any(|c| BULLETS.contains(&c));
    let stripped: String = raw
        .chars()
        .filter(|c| !CHECKMARKS.contains(c) && !BULLETS.contains(c))
        .collect();
    // Removed glyphs leave gaps between words
    let cleaned = stripped.split_whitespace().join(" ");
    let cleaned = cleaned.as_str();

    let (number, text) = match number_prefix_regex().captures(cleaned) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            (Some(caps[1].to_string()), cleaned[whole..].trim().to_string())
        }
        None => (None, cleaned.to_string()),
    };

    HeadingRecord {
        level,
        slug: slugify(&text),
        text,
        number,
        checkmark,
        bullet,
        path: path.clone(),
    }
}

/// Number headings from one counter per level
///
/// Advancing a level resets all deeper levels. Numbers start at the
/// shallowest level present in the document.
fn auto_number(headings: &mut [HeadingRecord]) {
    let Some(top) = headings.iter().map(|h| h.level).min() else {
        return;
    };
    let mut counters = [0usize; 6];
    for heading in headings.iter_mut() {
        let level = usize::from(heading.level.clamp(1, 6));
        counters[level - 1] += 1;
        counters[level..].iter_mut().for_each(|c| *c = 0);

        let start = usize::from(top) - 1;
        let number = counters[start..level].iter().join(".");
        heading.number = Some(format!("{}.", number));
    }
}

/// Build the linked list block for a set of headings
pub fn table_of_contents_list(headings: &[HeadingRecord]) -> Block {
    let top = headings.iter().map(|h| h.level).min().unwrap_or(1);
    let items = headings
        .iter()
        .map(|heading| {
            let marks = Marks {
                link: Some(Link {
                    href: format!("#{}", heading.slug),
                    target: None,
                }),
                ..Marks::default()
            };
            ListItem {
                blocks: vec![Block::Paragraph {
                    attrs: BlockAttrs {
                        indent: heading.level.saturating_sub(top),
                        ..BlockAttrs::default()
                    },
                    runs: vec![TextRun::with_marks(heading.entry_text(), &marks)],
                }],
            }
        })
        .collect();

    Block::List {
        ordered: false,
        class: Some(TOC_CLASS.to_string()),
        items,
    }
}

/// Anchor every heading and insert the table of contents at the cursor
///
/// Both happen in one transaction. A document without headings is left
/// untouched.
pub fn insert_table_of_contents(
    adapter: &mut DocumentAdapter,
    numbering: Numbering,
) -> Result<Change, CommandError> {
    let headings = generate(adapter.document(), numbering);
    if headings.is_empty() {
        return Err(CommandError::NoHeadings);
    }
    log::debug!("Inserting table of contents with {} entries", headings.len());

    adapter.transact(|tx| {
        for heading in &headings {
            if let Some(attrs) = tx.doc.block_at_mut(&heading.path).and_then(Block::attrs_mut) {
                attrs.id = (!heading.slug.is_empty()).then(|| heading.slug.clone());
            }
        }
        insert_block(tx, table_of_contents_list(&headings))?;
        Ok(())
    })
}
