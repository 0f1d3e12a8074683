//! Accessibility audit
//!
//! Five heuristic checks over the document tree, each of which can only
//! lower the score. The report is advisory and never blocks saving.

use crate::document_model::{Block, Document, NodePath};
use crate::editor_config::AuditConfig;
use itertools::Itertools;
use std::fmt;

/// Starting score before penalties
pub const MAX_SCORE: i32 = 100;

const MISSING_ALT_PENALTY: i32 = 15;
const SKIPPED_HEADING_PENALTY: i32 = 10;
const NO_HEADINGS_PENALTY: i32 = 5;
const LINK_TEXT_PENALTY: i32 = 10;
const TABLE_HEADER_PENALTY: i32 = 10;
const LONG_PARAGRAPH_PENALTY: i32 = 5;

const VAGUE_LINK_TEXT: [&str; 4] = ["click here", "link", "here", "this link"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

/// A failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub recommendation: &'static str,
}

/// A check that found nothing to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pub message: &'static str,
}

/// Result of one audit run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibilityReport {
    /// Starts at 100 and has no lower bound
    pub score: i32,
    pub issues: Vec<Issue>,
    pub passes: Vec<Pass>,
}

impl Default for AccessibilityReport {
    fn default() -> Self {
        Self {
            score: MAX_SCORE,
            issues: Vec::new(),
            passes: Vec::new(),
        }
    }
}

impl AccessibilityReport {
    fn fail(&mut self, penalty: i32, issue: Issue) {
        self.score -= penalty;
        self.issues.push(issue);
    }

    fn pass(&mut self, message: &'static str) {
        self.passes.push(Pass { message });
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Audit serialized markup with the default thresholds
pub fn audit(markup: &str) -> AccessibilityReport {
    audit_document(&Document::from_html(markup), &AuditConfig::default())
}

/// Audit a document tree
pub fn audit_document(doc: &Document, config: &AuditConfig) -> AccessibilityReport {
    let mut report = AccessibilityReport::default();
    check_images(doc, &mut report);
    check_headings(doc, &mut report);
    check_links(doc, &mut report);
    check_tables(doc, &mut report);
    check_paragraphs(doc, config, &mut report);
    log::debug!(
        "Accessibility score {} ({} issues)",
        report.score,
        report.issues.len()
    );
    report
}

/// Paths of images with missing or blank alt text, in document order
pub fn images_missing_alt(doc: &Document) -> Vec<NodePath> {
    let mut paths = Vec::new();
    doc.walk(|path, block| {
        if let Block::Image { alt, .. } = block {
            if alt.as_deref().is_none_or(|a| a.trim().is_empty()) {
                paths.push(path.clone());
            }
        }
    });
    paths
}

fn check_images(doc: &Document, report: &mut AccessibilityReport) {
    let missing = images_missing_alt(doc).len();
    if missing == 0 {
        report.pass("All images have alt text");
        return;
    }
    let noun = if missing == 1 { "image is" } else { "images are" };
    report.fail(
        MISSING_ALT_PENALTY,
        Issue {
            severity: Severity::Error,
            message: format!("{} {} missing alt text", missing, noun),
            recommendation: "Describe each image in its alt text so screen reader users get the same information",
        },
    );
}

fn check_headings(doc: &Document, report: &mut AccessibilityReport) {
    let mut levels = Vec::new();
    let mut has_prose = false;
    doc.walk(|_, block| match block {
        Block::Heading { level, .. } => levels.push(*level),
        Block::Paragraph { .. } if !block.plain_text().trim().is_empty() => has_prose = true,
        _ => {}
    });

    let skips: Vec<(u8, u8)> = levels
        .iter()
        .tuple_windows()
        .filter(|(prev, next)| **next > **prev + 1)
        .map(|(prev, next)| (*prev, *next))
        .collect();

    if let Some((from, to)) = skips.first() {
        report.fail(
            SKIPPED_HEADING_PENALTY,
            Issue {
                severity: Severity::Warning,
                message: format!(
                    "Heading level skipped (H{} followed by H{}){}",
                    from,
                    to,
                    if skips.len() > 1 {
                        format!(" and {} more", skips.len() - 1)
                    } else {
                        String::new()
                    }
                ),
                recommendation: "Use heading levels in order without skipping, for example H2 after H1",
            },
        );
    } else if levels.is_empty() && has_prose {
        report.fail(
            NO_HEADINGS_PENALTY,
            Issue {
                severity: Severity::Warning,
                message: "No headings found".to_string(),
                recommendation: "Add headings to break the content into navigable sections",
            },
        );
    } else {
        report.pass("Heading structure is sequential");
    }
}

/// Text of every link, adjacent runs sharing a destination joined together
fn link_texts(doc: &Document) -> Vec<String> {
    let mut texts = Vec::new();
    doc.walk(|_, block| {
        let Some(runs) = block.runs() else {
            return;
        };
        let groups = runs.iter().chunk_by(|run| run.marks.link.clone());
        for (link, group) in &groups {
            if link.is_some() {
                texts.push(group.map(|run| run.text.as_str()).collect());
            }
        }
    });
    texts
}

fn is_vague_link_text(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    VAGUE_LINK_TEXT.contains(&text.as_str()) || text.chars().count() < 3
}

fn check_links(doc: &Document, report: &mut AccessibilityReport) {
    let vague = link_texts(doc)
        .into_iter()
        .filter(|text| is_vague_link_text(text))
        .count();
    if vague == 0 {
        report.pass("Link text is descriptive");
        return;
    }
    report.fail(
        LINK_TEXT_PENALTY,
        Issue {
            severity: Severity::Warning,
            message: format!("{} link(s) with non-descriptive text", vague),
            recommendation: "Use link text that says where the link goes instead of \"click here\"",
        },
    );
}

fn check_tables(doc: &Document, report: &mut AccessibilityReport) {
    let mut tables = 0;
    let mut with_headers = 0;
    doc.walk(|_, block| {
        if let Block::Table(table) = block {
            tables += 1;
            if table.has_header_cell() {
                with_headers += 1;
            }
        }
    });

    if tables > 0 && with_headers == 0 {
        report.fail(
            TABLE_HEADER_PENALTY,
            Issue {
                severity: Severity::Warning,
                message: format!("{} table(s) without header cells", tables),
                recommendation: "Mark the first row of each table as a header row",
            },
        );
    } else {
        report.pass("Tables have header cells");
    }
}

fn check_paragraphs(doc: &Document, config: &AuditConfig, report: &mut AccessibilityReport) {
    let mut long = 0;
    doc.walk(|_, block| {
        if let Block::Paragraph { .. } = block {
            if block.plain_text().split_whitespace().count() > config.long_paragraph_words {
                long += 1;
            }
        }
    });

    if long == 0 {
        report.pass("Paragraphs are a readable length");
        return;
    }
    report.fail(
        LONG_PARAGRAPH_PENALTY,
        Issue {
            severity: Severity::Info,
            message: format!(
                "{} paragraph(s) longer than {} words",
                long, config.long_paragraph_words
            ),
            recommendation: "Split long paragraphs into shorter ones",
        },
    );
}
