//! Markup tokenizer
//!
//! Splits serialized markup into a flat stream of start tags, end tags and
//! decoded text, the same shape of event stream the parser consumes.
//! Comments, doctypes and processing instructions are dropped, and the
//! contents of `script` and `style` elements are skipped entirely.

use regex::Regex;
use std::sync::OnceLock;

/// A single markup event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlEvent {
    Start {
        /// Lowercased tag name
        name: String,
        /// Attributes in source order, names lowercased, values decoded
        attrs: Vec<(String, String)>,
    },
    End(String),
    Text(String),
}

/// Elements that never have content or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is raw text and gets discarded
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template"];

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(
            r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|</\s*([a-zA-Z][a-zA-Z0-9-]*)\s*>|<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*/?>"#,
        )
        .expect("tag pattern is valid")
    })
}

fn attr_regex() -> &'static Regex {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    ATTR.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

/// Tokenize markup into events
pub fn tokenize(markup: &str) -> Vec<HtmlEvent> {
    let mut events = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = tag_regex().captures_at(markup, cursor) {
        let whole = caps.get(0).expect("group 0 always matches");
        if whole.start() > cursor {
            push_text(&mut events, &markup[cursor..whole.start()]);
        }
        cursor = whole.end();

        if let Some(name) = caps.get(1) {
            events.push(HtmlEvent::End(name.as_str().to_ascii_lowercase()));
        } else if let Some(name) = caps.get(2) {
            let name = name.as_str().to_ascii_lowercase();
            let attrs = caps
                .get(3)
                .map(|m| parse_attributes(m.as_str()))
                .unwrap_or_default();
            let skipped = SKIPPED_ELEMENTS.contains(&name.as_str());
            let void = VOID_ELEMENTS.contains(&name.as_str());

            if skipped {
                cursor = skip_raw_text(markup, cursor, &name);
                continue;
            }

            events.push(HtmlEvent::Start {
                name: name.clone(),
                attrs,
            });
            if void {
                events.push(HtmlEvent::End(name));
            }
        }
        // Comments, doctypes and processing instructions produce nothing.
    }

    if cursor < markup.len() {
        push_text(&mut events, &markup[cursor..]);
    }

    events
}

/// Return the byte offset just past the closing tag of a raw-text element
fn skip_raw_text(markup: &str, from: usize, name: &str) -> usize {
    let closing = format!("</{}", name);
    let rest = markup[from..].to_ascii_lowercase();
    match rest.find(&closing) {
        Some(start) => {
            let after = from + start;
            markup[after..]
                .find('>')
                .map(|end| after + end + 1)
                .unwrap_or(markup.len())
        }
        None => markup.len(),
    }
}

fn push_text(events: &mut Vec<HtmlEvent>, raw: &str) {
    let text = decode_entities(raw);
    if text.is_empty() {
        return;
    }
    // Adjacent text events can occur after dropped comments.
    if let Some(HtmlEvent::Text(prev)) = events.last_mut() {
        prev.push_str(&text);
    } else {
        events.push(HtmlEvent::Text(text));
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    attr_regex()
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// Decode named and numeric character references
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            decode_entity(entity).map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attrs: &[(&str, &str)]) -> HtmlEvent {
        HtmlEvent::Start {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_tokenize_simple_paragraph() {
        let events = tokenize("<p>Hello <strong>world</strong></p>");
        assert_eq!(
            events,
            vec![
                start("p", &[]),
                HtmlEvent::Text("Hello ".to_string()),
                start("strong", &[]),
                HtmlEvent::Text("world".to_string()),
                HtmlEvent::End("strong".to_string()),
                HtmlEvent::End("p".to_string()),
            ]
        );
    }

    #[test]
    fn test_void_elements_close_immediately() {
        let events = tokenize(r#"<img src="x.png" alt='A cat'>"#);
        assert_eq!(
            events,
            vec![
                start("img", &[("src", "x.png"), ("alt", "A cat")]),
                HtmlEvent::End("img".to_string()),
            ]
        );
    }

    #[test]
    fn test_attributes_without_values_and_case() {
        let events = tokenize("<IFRAME SRC=v.mp4 allowfullscreen></iframe>");
        assert_eq!(
            events[0],
            start("iframe", &[("src", "v.mp4"), ("allowfullscreen", "")])
        );
    }

    #[test]
    fn test_comments_and_scripts_are_dropped() {
        let events = tokenize("a<!-- note -->b<script>if (x < 1) {}</script>c");
        assert_eq!(events, vec![HtmlEvent::Text("abc".to_string())]);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#39;&#x41;&nbsp;"), "'A\u{a0}");
        assert_eq!(decode_entities("AT&T &unknown;"), "AT&T &unknown;");
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let events = tokenize("1 < 2");
        assert_eq!(events, vec![HtmlEvent::Text("1 < 2".to_string())]);
    }
}
