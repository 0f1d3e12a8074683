//! blogdoc - headless rich-text editor core for blog posts
//!
//! A document tree with an HTML boundary, toolbar commands with two-phase
//! modal insertions, and the data derived from the content: word count and
//! read time, table of contents, accessibility score and draft autosave.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

pub mod accessibility;
pub mod autosave;
pub mod document_model;
pub mod editor;
pub mod editor_config;
pub mod media;
pub mod metrics;
pub mod session;
pub mod table_menu;
pub mod toc;

// Import/export
pub mod export;
pub mod handoff;
pub mod html_exporter;
pub mod import;
pub mod markdown_exporter;

pub use editor_config::{EditorConfig, CONFIG_FILE_NAME};
pub use session::EditorSession;
