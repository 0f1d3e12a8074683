//! blogdoc - Blog post editor toolkit
//!
//! A CLI tool that runs the editor's content pipelines on files: metrics,
//! accessibility audit, table of contents, import/export and drafts.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]

mod cli;

use anyhow::{Context, Result};
use blogdoc::autosave::{AutosaveEvent, AutosaveManager, FileDraftStore};
use blogdoc::editor::DocumentAdapter;
use blogdoc::export::{ExportFormat, ExportOptions};
use blogdoc::handoff::{ContentHandoff, FeaturedImage, TagList};
use blogdoc::toc::Numbering;
use blogdoc::{accessibility, export, import, metrics, toc, EditorConfig, CONFIG_FILE_NAME};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, DraftAction};
use std::fs;
use std::path::{Path, PathBuf};

/// Main entry point for the blogdoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging if verbose
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats { file } => handle_stats_command(&config, &file)?,

        Commands::Audit { file } => handle_audit_command(&config, &file)?,

        Commands::Toc {
            file,
            numbered,
            insert,
            output,
        } => handle_toc_command(&config, &file, numbered, insert, output)?,

        Commands::Export {
            file,
            output,
            format,
            standalone,
            title,
        } => handle_export_command(&config, &file, output, format, standalone, title)?,

        Commands::Import { file, output } => handle_import_command(&config, &file, &output)?,

        Commands::Draft { action } => handle_draft_command(&config, action)?,

        Commands::Handoff {
            file,
            title,
            tags,
            image,
            alt,
        } => handle_handoff_command(&config, &file, &title, &tags, image, alt.as_deref())?,
    }

    Ok(())
}

/// Load the configuration named on the command line, or ./blogdoc.toml
fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => EditorConfig::load_or_default(CONFIG_FILE_NAME)
            .with_context(|| format!("Failed to load config {}", CONFIG_FILE_NAME)),
    }
}

/// Load a post into a fresh editor
fn open_post(config: &EditorConfig, file: &Path) -> Result<DocumentAdapter> {
    let mut adapter = DocumentAdapter::with_history_depth(config.limits.history_depth);
    import::import_file(&mut adapter, file)
        .with_context(|| format!("Failed to read post {}", file.display()))?;
    Ok(adapter)
}

fn write_output(output: &Path, content: &str) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("✓ Successfully wrote: {}", output.display());
    Ok(())
}

/// Handle the stats command
fn handle_stats_command(config: &EditorConfig, file: &Path) -> Result<()> {
    let adapter = open_post(config, file)?;
    let stats = metrics::measure(
        &adapter.content(),
        config.metrics.words_per_minute as usize,
    );

    println!("Words: {}", stats.word_count);
    println!("Read time: {} min", stats.read_time_minutes);
    Ok(())
}

/// Handle the audit command
fn handle_audit_command(config: &EditorConfig, file: &Path) -> Result<()> {
    let adapter = open_post(config, file)?;
    let report = accessibility::audit_document(adapter.document(), &config.audit);

    println!("Accessibility score: {}/{}", report.score, accessibility::MAX_SCORE);
    for issue in &report.issues {
        println!("  [{}] {}", issue.severity, issue.message);
        println!("      {}", issue.recommendation);
    }
    for pass in &report.passes {
        println!("  ✓ {}", pass.message);
    }
    Ok(())
}

/// Handle the toc command
fn handle_toc_command(
    config: &EditorConfig,
    file: &Path,
    numbered: bool,
    insert: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let numbering = if numbered {
        Numbering::Auto
    } else {
        Numbering::None
    };
    let mut adapter = open_post(config, file)?;
    let headings = toc::generate(adapter.document(), numbering);

    if headings.is_empty() {
        println!("No headings found");
        return Ok(());
    }

    let top = headings.iter().map(|h| h.level).min().unwrap_or(1);
    for heading in &headings {
        let indent = "  ".repeat(usize::from(heading.level - top));
        println!("{}{}  #{}", indent, heading.entry_text(), heading.slug);
    }

    if insert {
        let output = output.context("--insert requires --output")?;
        let change = toc::insert_table_of_contents(&mut adapter, numbering)
            .context("Failed to insert table of contents")?;
        write_output(&output, &change.markup)?;
    }
    Ok(())
}

/// Handle the export command
fn handle_export_command(
    config: &EditorConfig,
    file: &Path,
    mut output: PathBuf,
    format_arg: Option<ExportFormat>,
    standalone: bool,
    title: String,
) -> Result<()> {
    // Auto-detect format from output file extension if not explicitly specified
    let format = match format_arg {
        Some(fmt) => {
            if output.extension().is_none() {
                output.set_extension(fmt.extension());
            }
            fmt
        }
        None => match ExportFormat::from_path(&output) {
            Some(fmt) => fmt,
            None => {
                anyhow::bail!(
                    "Unknown output format for {}. Supported: .html, .htm, .md, .markdown\nUse --format to specify explicitly.",
                    output.display()
                );
            }
        },
    };

    let adapter = open_post(config, file)?;
    let stats = metrics::measure(
        &adapter.content(),
        config.metrics.words_per_minute as usize,
    );
    let options = ExportOptions {
        format,
        standalone,
        title,
    };
    export::export_to_file(adapter.document(), &output, &options, &stats)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    println!("✓ Successfully wrote: {}", output.display());
    Ok(())
}

/// Handle the import command
fn handle_import_command(config: &EditorConfig, file: &Path, output: &Path) -> Result<()> {
    let adapter = open_post(config, file)?;
    write_output(output, &adapter.content())
}

/// Handle the draft subcommands
fn handle_draft_command(config: &EditorConfig, action: DraftAction) -> Result<()> {
    let store = FileDraftStore::new(&config.autosave.directory);
    let mut manager = AutosaveManager::new(store, &config.autosave);

    match action {
        DraftAction::Save { file } => {
            let adapter = open_post(config, &file)?;
            match manager.save_now(&adapter.content(), Utc::now()) {
                AutosaveEvent::Saved { at } => {
                    println!("✓ Draft saved at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                AutosaveEvent::Skipped => {
                    println!("Post is empty, draft left unchanged");
                }
                AutosaveEvent::Failed { error } => {
                    anyhow::bail!("Failed to save draft: {}", error);
                }
            }
        }

        DraftAction::Show => match manager.stored_draft().context("Failed to read draft")? {
            Some(draft) => {
                if let Some(saved_at) = draft.saved_at {
                    println!("Saved: {}", saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                println!("{}", draft.content);
            }
            None => println!("No stored draft"),
        },

        DraftAction::Restore { output } => {
            let draft = manager
                .resolve_restore(true)
                .context("Failed to read draft")?
                .context("No stored draft")?;
            write_output(&output, &draft.content)?;
        }

        DraftAction::Discard => {
            manager.discard().context("Failed to discard draft")?;
            println!("✓ Draft discarded");
        }
    }
    Ok(())
}

/// Handle the handoff command
fn handle_handoff_command(
    config: &EditorConfig,
    file: &Path,
    title: &str,
    tags: &str,
    image: Option<PathBuf>,
    alt: Option<&str>,
) -> Result<()> {
    let adapter = open_post(config, file)?;
    let mut handoff = ContentHandoff::from_adapter(&adapter, title)
        .context("Post is not ready")?
        .with_tags(TagList::parse(tags));

    if let Some(path) = image {
        let image = FeaturedImage::load(
            &path,
            alt.unwrap_or_default(),
            config.limits.max_image_bytes,
        )
        .with_context(|| format!("Invalid featured image {}", path.display()))?;
        handoff = handoff.with_featured_image(image);
    }

    println!("Title: {}", handoff.title);
    println!("Slug: {}", handoff.slug);
    println!("Tags: {}", handoff.tags.as_slice().join(", "));
    println!("Content: {} bytes", handoff.content.len());
    match &handoff.featured_image {
        Some(image) => println!(
            "Featured image: {} ({}, {} bytes)",
            image.path.display(),
            image.mime,
            image.bytes.len()
        ),
        None => println!("Featured image: none"),
    }

    let report = accessibility::audit_document(adapter.document(), &config.audit);
    if !report.is_clean() {
        println!(
            "Note: accessibility score {} ({} issue(s)), run 'blogdoc audit' for details",
            report.score,
            report.issues.len()
        );
    }
    println!("✓ Ready for handoff");
    Ok(())
}
