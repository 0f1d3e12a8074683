//! Two-phase insertion modals
//!
//! Link, image, video and table insertion first open a modal that collects
//! structured input, then apply a mutation on confirmation. The records here
//! are what the modal hands back, with their validation rules.

use super::error::ValidationError;
use crate::document_model::{Block, Link, NodePath, Table};
use crate::editor_config::EditorLimits;
use crate::media::ImageFile;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Which modal is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalKind {
    Link,
    Image,
    Video,
    Table,

    /// Alt text for an existing image that lacks it
    ImageAlt { path: NodePath },
}

impl ModalKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModalKind::Link => "link",
            ModalKind::Image => "image",
            ModalKind::Video => "video",
            ModalKind::Table => "table",
            ModalKind::ImageAlt { .. } => "alt text",
        }
    }
}

/// Pre-filled modal contents returned when a modal opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRequest {
    Link {
        /// Destination of the link under the cursor, if any
        href: Option<String>,
        target: Option<String>,
    },
    Image,
    Video(VideoInput),
    Table(TableInput),
    ImageAlt {
        path: NodePath,
        src: String,
    },
}

/// Input confirmed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResponse {
    Link(LinkInput),
    Image(ImageInput),
    Video(VideoInput),
    Table(TableInput),
    AltText(AltTextInput),
}

impl ModalResponse {
    /// Whether this response answers the given modal
    pub fn answers(&self, kind: &ModalKind) -> bool {
        matches!(
            (self, kind),
            (ModalResponse::Link(_), ModalKind::Link)
                | (ModalResponse::Image(_), ModalKind::Image)
                | (ModalResponse::Video(_), ModalKind::Video)
                | (ModalResponse::Table(_), ModalKind::Table)
                | (ModalResponse::AltText(_), ModalKind::ImageAlt { .. })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInput {
    pub href: String,

    /// Browsing context, `_blank` opens a new tab
    pub target: Option<String>,
}

impl LinkInput {
    pub fn validate(&self) -> Result<Link, ValidationError> {
        let href = self.href.trim();
        if href.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        let scheme = href
            .split_once(':')
            .map(|(scheme, _)| scheme.trim().to_ascii_lowercase());
        if matches!(scheme.as_deref(), Some("javascript") | Some("vbscript")) {
            return Err(ValidationError::UnsafeUrl(href.to_string()));
        }
        Ok(Link {
            href: href.to_string(),
            target: self
                .target
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub src: String,
    pub alt: String,
}

impl ImageInput {
    /// Embed a local image file as a `data:` URL
    ///
    /// Unreadable, oversized or non-image files are rejected like any other
    /// invalid modal input.
    pub fn from_file(path: &Path, alt: &str, max_bytes: u64) -> Result<Self, ValidationError> {
        let image = ImageFile::load(path, max_bytes).map_err(|e| {
            log::warn!("{}", e);
            ValidationError::ImageFile(e.to_string())
        })?;
        Ok(Self {
            src: image.data_url(),
            alt: alt.to_string(),
        })
    }

    pub fn validate(&self) -> Result<Block, ValidationError> {
        let src = self.src.trim();
        if src.is_empty() {
            return Err(ValidationError::EmptySource);
        }
        let alt = self.alt.trim();
        Ok(Block::Image {
            src: src.to_string(),
            alt: Some(alt.to_string()),
            title: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInput {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub controls: bool,
}

impl Default for VideoInput {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: 640,
            height: 480,
            controls: true,
        }
    }
}

impl VideoInput {
    pub fn validate(&self) -> Result<Block, ValidationError> {
        let src = self.src.trim();
        if src.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ValidationError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(Block::Video {
            src: embed_url(src),
            width: self.width,
            height: self.height,
            controls: self.controls,
        })
    }
}

fn youtube_regex() -> &'static Regex {
    static YOUTUBE: OnceLock<Regex> = OnceLock::new();
    YOUTUBE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|shorts/)|youtu\.be/)([A-Za-z0-9_-]+)",
        )
        .expect("youtube pattern is valid")
    })
}

fn vimeo_regex() -> &'static Regex {
    static VIMEO: OnceLock<Regex> = OnceLock::new();
    VIMEO.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:www\.)?vimeo\.com/(\d+)").expect("vimeo pattern is valid")
    })
}

/// Rewrite a video page URL into its embeddable player URL
///
/// Unrecognized URLs are returned unchanged.
pub fn embed_url(src: &str) -> String {
    if let Some(caps) = youtube_regex().captures(src) {
        return format!("https://www.youtube.com/embed/{}", &caps[1]);
    }
    if let Some(caps) = vimeo_regex().captures(src) {
        return format!("https://player.vimeo.com/video/{}", &caps[1]);
    }
    src.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInput {
    pub rows: usize,
    pub cols: usize,
    pub with_header_row: bool,

    /// Cosmetic border preference, stored on the table
    pub with_borders: bool,
}

impl Default for TableInput {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            with_header_row: true,
            with_borders: true,
        }
    }
}

impl TableInput {
    pub fn validate(&self, limits: &EditorLimits) -> Result<Block, ValidationError> {
        let rows_ok = (1..=limits.max_table_rows).contains(&self.rows);
        let cols_ok = (1..=limits.max_table_cols).contains(&self.cols);
        if !rows_ok || !cols_ok {
            return Err(ValidationError::TableSize {
                rows: self.rows,
                cols: self.cols,
                max_rows: limits.max_table_rows,
                max_cols: limits.max_table_cols,
            });
        }
        Ok(Block::Table(Table::new(
            self.rows,
            self.cols,
            self.with_header_row,
            self.with_borders,
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltTextInput {
    pub alt: String,
}

impl AltTextInput {
    pub fn validate(&self) -> Result<String, ValidationError> {
        let alt = self.alt.trim();
        if alt.is_empty() {
            return Err(ValidationError::EmptyAltText);
        }
        Ok(alt.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_validation() {
        let ok = LinkInput {
            href: "  https://example.com ".to_string(),
            target: Some("_blank".to_string()),
        };
        assert_eq!(
            ok.validate().unwrap(),
            Link {
                href: "https://example.com".to_string(),
                target: Some("_blank".to_string())
            }
        );

        let empty = LinkInput {
            href: "   ".to_string(),
            target: None,
        };
        assert_eq!(empty.validate(), Err(ValidationError::EmptyUrl));

        let script = LinkInput {
            href: "JavaScript:alert(1)".to_string(),
            target: None,
        };
        assert!(matches!(script.validate(), Err(ValidationError::UnsafeUrl(_))));
    }

    #[test]
    fn test_relative_and_anchor_links_are_allowed() {
        for href in ["/about", "#intro", "mailto:team@example.com"] {
            let input = LinkInput {
                href: href.to_string(),
                target: None,
            };
            assert!(input.validate().is_ok(), "{}", href);
        }
    }

    #[test]
    fn test_video_validation_and_embed_url() {
        let input = VideoInput {
            src: "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10".to_string(),
            ..VideoInput::default()
        };
        assert_eq!(
            input.validate().unwrap(),
            Block::Video {
                src: "https://www.youtube.com/embed/dQw4w9WgXcQ".to_string(),
                width: 640,
                height: 480,
                controls: true,
            }
        );

        let zero = VideoInput {
            src: "https://example.com/v.mp4".to_string(),
            width: 0,
            ..VideoInput::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(ValidationError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn test_embed_url_variants() {
        assert_eq!(
            embed_url("youtu.be/abc123"),
            "https://www.youtube.com/embed/abc123"
        );
        assert_eq!(
            embed_url("https://vimeo.com/76979871"),
            "https://player.vimeo.com/video/76979871"
        );
        assert_eq!(embed_url("https://cdn.example.com/a.mp4"), "https://cdn.example.com/a.mp4");
    }

    #[test]
    fn test_table_validation_uses_limits() {
        let limits = EditorLimits::default();
        let input = TableInput {
            rows: 2,
            cols: 4,
            with_header_row: false,
            with_borders: true,
        };
        let Block::Table(table) = input.validate(&limits).unwrap() else {
            panic!("expected table");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), 4);
        assert!(table.bordered);
        assert!(!table.has_header_cell());

        let too_big = TableInput {
            rows: 21,
            ..TableInput::default()
        };
        assert!(matches!(
            too_big.validate(&limits),
            Err(ValidationError::TableSize { rows: 21, .. })
        ));

        let empty = TableInput {
            cols: 0,
            ..TableInput::default()
        };
        assert!(empty.validate(&limits).is_err());
    }

    #[test]
    fn test_response_matches_modal_kind() {
        let response = ModalResponse::AltText(AltTextInput {
            alt: "x".to_string(),
        });
        assert!(response.answers(&ModalKind::ImageAlt {
            path: NodePath::root(0)
        }));
        assert!(!response.answers(&ModalKind::Image));
    }

    #[test]
    fn test_image_from_file_builds_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inline.png");
        std::fs::write(&path, crate::media::tests::tiny_png()).unwrap();

        let input = ImageInput::from_file(&path, "A chart", 1024).unwrap();
        assert!(input.src.starts_with("data:image/png;base64,"));
        assert_eq!(input.alt, "A chart");

        let too_big = ImageInput::from_file(&path, "A chart", 8);
        assert!(matches!(too_big, Err(ValidationError::ImageFile(_))));
    }
}
