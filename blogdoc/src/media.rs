//! Local image files
//!
//! Reads an image from disk for the featured image and for inline images,
//! checking that it really is an image and that it fits the size limit.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading an image file
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Image {path} is {size} bytes, the limit is {limit} bytes", path = .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Not a supported image file: {path}", path = .0.display())]
    NotAnImage(PathBuf),
}

/// An image file loaded into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,

    /// MIME type detected from the file content
    pub mime: &'static str,

    /// Pixel dimensions, when the format carries them
    pub dimensions: Option<(usize, usize)>,
}

impl ImageFile {
    /// Load and validate an image file
    ///
    /// # Parameters
    /// * `path` - Image file to read
    /// * `max_bytes` - Largest accepted file size
    ///
    /// # Returns
    /// * `Ok(ImageFile)` - The file is an image within the size limit
    /// * `Err(MediaError)` - The file is unreadable, too large or not an image
    pub fn load(path: &Path, max_bytes: u64) -> Result<Self, MediaError> {
        let size = fs::metadata(path)
            .map_err(|e| MediaError::IoError(path.to_path_buf(), e))?
            .len();
        if size > max_bytes {
            return Err(MediaError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: max_bytes,
            });
        }

        let bytes = fs::read(path).map_err(|e| MediaError::IoError(path.to_path_buf(), e))?;
        Self::from_bytes(path, bytes)
    }

    /// Validate image bytes that are already in memory
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, MediaError> {
        if is_svg(path, &bytes) {
            return Ok(Self {
                path: path.to_path_buf(),
                bytes,
                mime: "image/svg+xml",
                dimensions: None,
            });
        }

        let mime = imagesize::image_type(&bytes)
            .ok()
            .and_then(mime_for)
            .ok_or_else(|| MediaError::NotAnImage(path.to_path_buf()))?;

        let dimensions = match imagesize::blob_size(&bytes) {
            Ok(size) => Some((size.width, size.height)),
            Err(e) => {
                log::warn!("Could not read dimensions for {}: {}", path.display(), e);
                None
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            mime,
            dimensions,
        })
    }

    /// Inline `data:` URL embedding the image
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// File name without directories
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn mime_for(kind: imagesize::ImageType) -> Option<&'static str> {
    use imagesize::ImageType;

    match kind {
        ImageType::Png => Some("image/png"),
        ImageType::Jpeg => Some("image/jpeg"),
        ImageType::Gif => Some("image/gif"),
        ImageType::Webp => Some("image/webp"),
        ImageType::Bmp => Some("image/bmp"),
        ImageType::Tiff => Some("image/tiff"),
        ImageType::Ico => Some("image/x-icon"),
        _ => None,
    }
}

fn is_svg(path: &Path, bytes: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    by_extension && head.contains("<svg")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest PNG header imagesize can read: 2x3 pixels
    pub(crate) fn tiny_png() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 3, 8, 6, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    #[test]
    fn test_load_png_detects_type_and_size() {
        // Arrange: A PNG file on disk
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        fs::write(&path, tiny_png()).unwrap();

        // Act: Load it
        let image = ImageFile::load(&path, 1024).unwrap();

        // Assert: Type, dimensions and data URL prefix
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.dimensions, Some((2, 3)));
        assert!(image.data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(image.file_name(), "cover.png");
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        fs::write(&path, tiny_png()).unwrap();

        let err = ImageFile::load(&path, 10).unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { limit: 10, .. }));
    }

    #[test]
    fn test_non_image_is_rejected() {
        let err = ImageFile::from_bytes(Path::new("notes.png"), b"hello".to_vec()).unwrap_err();
        assert!(matches!(err, MediaError::NotAnImage(_)));
    }

    #[test]
    fn test_svg_by_extension_and_content() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#.to_vec();
        let image = ImageFile::from_bytes(Path::new("logo.svg"), svg).unwrap();
        assert_eq!(image.mime, "image/svg+xml");
        assert_eq!(image.dimensions, None);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ImageFile::load(Path::new("/nonexistent/cover.png"), 1024).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cover.png"));
    }
}
