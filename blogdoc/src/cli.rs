//! Command-line interface definitions for blogdoc

use blogdoc::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the blogdoc application
#[derive(Parser)]
#[command(name = "blogdoc")]
#[command(version)]
#[command(about = "Blog post editor toolkit", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./blogdoc.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for blogdoc
#[derive(Subcommand)]
pub enum Commands {
    /// Show word count and estimated read time
    Stats {
        /// Post content (HTML or plain text)
        file: PathBuf,
    },

    /// Score the post's accessibility
    Audit {
        /// Post content (HTML or plain text)
        file: PathBuf,
    },

    /// List headings, or insert a table of contents
    Toc {
        /// Post content (HTML or plain text)
        file: PathBuf,

        /// Number headings automatically (1., 1.1., ...)
        #[arg(short, long)]
        numbered: bool,

        /// Insert the table of contents at the start of the post
        #[arg(long, requires = "output")]
        insert: bool,

        /// Where to write the post with the inserted table of contents
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the post to HTML or Markdown
    Export {
        /// Post content (HTML or plain text)
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (auto-detected from the extension if not given)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Wrap HTML output in a styled standalone page
        #[arg(long)]
        standalone: bool,

        /// Page title for standalone output
        #[arg(short, long, default_value = "")]
        title: String,
    },

    /// Load a file the way the editor would and write the resulting markup
    Import {
        /// HTML or plain text file
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage the stored draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Check a post is ready to hand to the backend
    Handoff {
        /// Post content (HTML or plain text)
        file: PathBuf,

        /// Post title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Comma separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Featured image file
        #[arg(long)]
        image: Option<PathBuf>,

        /// Alt text for the featured image
        #[arg(long, requires = "image")]
        alt: Option<String>,
    },
}

/// Draft store operations
#[derive(Subcommand)]
pub enum DraftAction {
    /// Save a file's content as the draft
    Save {
        /// Post content (HTML or plain text)
        file: PathBuf,
    },

    /// Print the stored draft
    Show,

    /// Write the stored draft to a file
    Restore {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete the stored draft
    Discard,
}
