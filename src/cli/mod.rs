//! Command-line interface for diagram-catalog.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **list**: List the diagrams in the catalog
//! - **show**: Show one diagram's markers joined with its parts table
//! - **resolve**: Show which files a folder resolves to
//! - **markers**: Place a diagram's markers on the image at a rendered width
//! - **table**: Parse a local parts table
//! - **serve**: Start the JSON web service
//!
//! ## Usage
//!
//! ```text
//! # List every folder named in folders.json
//! diagram-catalog --source https://example.org/diagrams list
//!
//! # Only folders with markers, in numeric order
//! diagram-catalog --source ./diagrams list --strict --sort
//!
//! # Marker placements for an image rendered 800px wide, as JSON
//! diagram-catalog --source ./diagrams -f json markers "10. Oil Lubricating System" --width 800
//!
//! # Start the web service
//! diagram-catalog --source ./diagrams serve --port 8080 --open
//! ```

use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::resolver::CatalogResolver;
use crate::config::Settings;
use crate::transport::open_source;

pub mod list;
pub mod markers;
pub mod show;
pub mod table;

#[derive(Parser)]
#[command(name = "diagram-catalog")]
#[command(version)]
#[command(about = "Browse a catalog of annotated parts diagrams")]
#[command(
    long_about = "diagram-catalog resolves diagram folders published on a web server or in a local directory.\n\nEach folder holds a manifest of marker coordinates, a parts table and an image sharing one base name. The tool finds that base name, validates the manifest, parses the table and places the markers on the image at any rendered size."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL or local directory holding the diagram folders
    #[arg(short, long, global = true, env = "DIAGRAM_SOURCE")]
    pub source: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// Settings from `--config`, with `--source` taking precedence over the
    /// file's `source`
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or is invalid.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(source) = &self.source {
            settings.source = Some(source.clone());
        }
        Ok(settings)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the diagrams in the catalog
    List(list::ListArgs),

    /// Show a diagram's markers and parts
    Show(show::FolderArgs),

    /// Show which files a folder resolves to
    Resolve(show::ResolveArgs),

    /// Place a diagram's markers at a rendered width
    Markers(markers::MarkersArgs),

    /// Parse a local parts table
    Table(table::TableArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Build a catalog resolver over the configured source
///
/// # Errors
///
/// Returns an error if no source is configured or it cannot be opened.
pub fn open_resolver(settings: &Settings) -> anyhow::Result<CatalogResolver> {
    let source = settings
        .source
        .as_deref()
        .context("No diagram source: pass --source or set DIAGRAM_SOURCE")?;
    let transport = open_source(source, settings.http_timeout())
        .with_context(|| format!("Failed to open source {source}"))?;
    Ok(CatalogResolver::new(transport, settings))
}

/// Run a future to completion on a fresh runtime
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(future))
}
