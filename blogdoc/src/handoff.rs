//! Handing a finished post to the backend layer
//!
//! The host turns a [`ContentHandoff`] into its multipart request. This
//! module only gathers and validates what goes into it.

use crate::editor::DocumentAdapter;
use crate::media::{ImageFile, MediaError};
use itertools::Itertools;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandoffError {
    #[error("Post has no content")]
    EmptyContent,

    #[error("Featured image rejected: {0}")]
    FeaturedImage(#[from] MediaError),
}

/// Image shown with the post in listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub alt: String,
}

impl FeaturedImage {
    /// Load a featured image no larger than `max_bytes`
    pub fn load(path: &Path, alt: &str, max_bytes: u64) -> Result<Self, HandoffError> {
        let image = ImageFile::load(path, max_bytes)?;
        if alt.trim().is_empty() {
            log::warn!("Featured image {} has no alt text", path.display());
        }
        Ok(Self {
            path: image.path,
            bytes: image.bytes,
            mime: image.mime,
            alt: alt.trim().to_string(),
        })
    }
}

/// Trimmed, non-empty tags without duplicates, in entry order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list
    pub fn parse(input: &str) -> Self {
        Self(
            input
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .unique()
                .map(str::to_string)
                .collect(),
        )
    }

    /// Add a tag; returns false when it is blank or already present
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.0.iter().any(|t| t == tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag.trim());
        self.0.len() != before
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// URL slug for a post title
///
/// Lowercased, every run of characters outside `[a-z0-9]` becomes one `-`,
/// and leading or trailing dashes are dropped.
pub fn post_slug(title: &str) -> String {
    static NON_SLUG_CHARS: OnceLock<Regex> = OnceLock::new();
    let re = NON_SLUG_CHARS
        .get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));
    re.replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Everything the backend needs to publish a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHandoff {
    pub title: String,
    pub slug: String,
    pub tags: TagList,

    /// Serialized editor markup
    pub content: String,
    pub featured_image: Option<FeaturedImage>,
}

impl ContentHandoff {
    /// Collect the adapter's current content
    ///
    /// # Parameters
    /// * `adapter` - The editor holding the post body
    /// * `title` - Post title, also used for the slug
    ///
    /// # Returns
    /// * `Ok(ContentHandoff)` - Ready for the backend, without tags or image
    /// * `Err(HandoffError::EmptyContent)` - The editor is empty
    pub fn from_adapter(adapter: &DocumentAdapter, title: &str) -> Result<Self, HandoffError> {
        let content = adapter.content();
        if content.is_empty() {
            return Err(HandoffError::EmptyContent);
        }
        Ok(Self {
            title: title.trim().to_string(),
            slug: post_slug(title),
            tags: TagList::new(),
            content,
            featured_image: None,
        })
    }

    pub fn with_tags(mut self, tags: TagList) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_featured_image(mut self, image: FeaturedImage) -> Self {
        self.featured_image = Some(image);
        self
    }
}
