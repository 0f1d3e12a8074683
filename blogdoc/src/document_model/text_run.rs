//! Text run representation with formatting
//!
//! A text run is a span of text with consistent marks applied.
//! All offsets in this module are character offsets, not byte offsets.

/// Hyperlink mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link destination
    pub href: String,

    /// Browsing context (e.g. `_blank`)
    pub target: Option<String>,
}

/// Toggleable boolean marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Subscript,
    Superscript,
}

/// Active marks on a span of text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
    pub subscript: bool,
    pub superscript: bool,

    /// Link (if this text is part of a hyperlink)
    pub link: Option<Link>,

    /// Text color as a CSS color value
    pub color: Option<String>,

    /// Highlight (background) color as a CSS color value
    pub highlight: Option<String>,

    /// Font size as a CSS length
    pub font_size: Option<String>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any formatting is active
    pub fn has_formatting(&self) -> bool {
        *self != Marks::default()
    }

    pub fn has(&self, kind: MarkKind) -> bool {
        match kind {
            MarkKind::Bold => self.bold,
            MarkKind::Italic => self.italic,
            MarkKind::Underline => self.underline,
            MarkKind::Strike => self.strike,
            MarkKind::Code => self.code,
            MarkKind::Subscript => self.subscript,
            MarkKind::Superscript => self.superscript,
        }
    }

    /// Set or clear a boolean mark
    ///
    /// Subscript and superscript exclude each other.
    pub fn set(&mut self, kind: MarkKind, on: bool) {
        match kind {
            MarkKind::Bold => self.bold = on,
            MarkKind::Italic => self.italic = on,
            MarkKind::Underline => self.underline = on,
            MarkKind::Strike => self.strike = on,
            MarkKind::Code => self.code = on,
            MarkKind::Subscript => {
                self.subscript = on;
                if on {
                    self.superscript = false;
                }
            }
            MarkKind::Superscript => {
                self.superscript = on;
                if on {
                    self.subscript = false;
                }
            }
        }
    }
}

/// A span of text with consistent formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// The text content; `\n` is a hard line break
    pub text: String,

    pub marks: Marks,
}

impl TextRun {
    /// Create a new plain text run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// Create a new text run with the specified marks
    pub fn with_marks(text: impl Into<String>, marks: &Marks) -> Self {
        Self {
            text: text.into(),
            marks: marks.clone(),
        }
    }

    /// Check if this text run has any formatting applied
    pub fn has_formatting(&self) -> bool {
        self.marks.has_formatting()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Concatenated text of a run list, marks stripped
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// Total character length of a run list
pub fn runs_len(runs: &[TextRun]) -> usize {
    runs.iter().map(TextRun::char_len).sum()
}

/// Merge adjacent runs with identical marks and drop empty runs
pub fn normalize_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut result: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match result.last_mut() {
            Some(prev) if prev.marks == run.marks => prev.text.push_str(&run.text),
            _ => result.push(run),
        }
    }
    result
}

/// Split a run list at a character offset
pub fn split_runs(runs: &[TextRun], at: usize) -> (Vec<TextRun>, Vec<TextRun>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut consumed = 0;

    for run in runs {
        let len = run.char_len();
        if consumed + len <= at {
            before.push(run.clone());
        } else if consumed >= at {
            after.push(run.clone());
        } else {
            let split = byte_index(&run.text, at - consumed);
            before.push(TextRun::with_marks(&run.text[..split], &run.marks));
            after.push(TextRun::with_marks(&run.text[split..], &run.marks));
        }
        consumed += len;
    }

    (before, after)
}

/// Apply `f` to the marks of every character in `from..to`
pub fn map_range<F>(runs: &[TextRun], from: usize, to: usize, mut f: F) -> Vec<TextRun>
where
    F: FnMut(&mut Marks),
{
    let (head, rest) = split_runs(runs, from);
    let (mut middle, tail) = split_runs(&rest, to.saturating_sub(from));
    for run in &mut middle {
        f(&mut run.marks);
    }

    let mut result = head;
    result.extend(middle);
    result.extend(tail);
    normalize_runs(result)
}

/// Check whether every character in `from..to` satisfies `pred`
///
/// An empty range never satisfies the predicate.
pub fn range_all<P>(runs: &[TextRun], from: usize, to: usize, pred: P) -> bool
where
    P: Fn(&Marks) -> bool,
{
    if from >= to {
        return false;
    }
    let (_, rest) = split_runs(runs, from);
    let (middle, _) = split_runs(&rest, to - from);
    !middle.is_empty() && middle.iter().all(|run| pred(&run.marks))
}

/// Insert text with the given marks at a character offset
pub fn insert_text(runs: &[TextRun], at: usize, text: &str, marks: &Marks) -> Vec<TextRun> {
    let (mut result, tail) = split_runs(runs, at);
    result.push(TextRun::with_marks(text, marks));
    result.extend(tail);
    normalize_runs(result)
}

/// Remove the characters in `from..to`
pub fn delete_range(runs: &[TextRun], from: usize, to: usize) -> Vec<TextRun> {
    let (mut head, rest) = split_runs(runs, from);
    let (_, tail) = split_runs(&rest, to.saturating_sub(from));
    head.extend(tail);
    normalize_runs(head)
}

/// Marks in effect at a cursor offset
///
/// The character before the cursor wins; at the start of a block the first
/// character is used.
pub fn marks_at(runs: &[TextRun], offset: usize) -> Marks {
    let mut consumed = 0;
    for run in runs {
        let len = run.char_len();
        if offset > consumed && offset <= consumed + len {
            return run.marks.clone();
        }
        consumed += len;
    }
    runs.first()
        .filter(|_| offset == 0)
        .map(|run| run.marks.clone())
        .unwrap_or_default()
}

/// Character range of the contiguous linked span covering `offset`
pub fn link_span_at(runs: &[TextRun], offset: usize) -> Option<(usize, usize, Link)> {
    let link = marks_at(runs, offset).link?;
    let mut start = None;
    let mut end = 0;
    let mut consumed = 0;

    for run in runs {
        let len = run.char_len();
        let run_start = consumed;
        consumed += len;
        if run.marks.link.as_ref() == Some(&link) {
            if start.is_none() {
                start = Some(run_start);
            }
            end = consumed;
        } else if start.is_some() && end >= offset {
            break;
        } else {
            start = None;
        }
    }

    start.map(|s| (s, end, link))
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
