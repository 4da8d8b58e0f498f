use clap::Args;

use crate::catalog::ordering::sort_entries;
use crate::cli::{block_on, open_resolver, OutputFormat};
use crate::config::Settings;
use crate::core::types::{CatalogEntry, ValidationMode};

#[derive(Args)]
pub struct ListArgs {
    /// Folder keys to list (defaults to the folders named in folders.json)
    pub folders: Vec<String>,

    /// Only list diagrams with at least one marker
    #[arg(long)]
    pub strict: bool,

    /// Sort numbered folders numerically, before unnumbered ones
    #[arg(long)]
    pub sort: bool,
}

pub fn run(args: ListArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let resolver = open_resolver(settings)?;
    let mode = if args.strict {
        ValidationMode::Strict
    } else {
        resolver.options().mode()
    };

    let mut entries = block_on(async {
        if args.folders.is_empty() {
            resolver.list_discovered(mode).await
        } else {
            Ok(resolver.list_catalog(&args.folders, mode).await)
        }
    })??;

    if args.sort {
        sort_entries(&mut entries);
    }

    print_entries(&entries, mode, format)
}

fn print_entries(entries: &[CatalogEntry], mode: ValidationMode, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Diagram Catalog ({} diagrams, {mode})\n", entries.len());

            let name_width = entries
                .iter()
                .map(|e| e.name.len())
                .max()
                .unwrap_or(0)
                .max("Name".len());
            println!("{:<name_width$}  {:>7}  Base name", "Name", "Markers");
            println!("{}", "-".repeat(name_width + 20));
            for entry in entries {
                println!(
                    "{:<name_width$}  {:>7}  {}",
                    entry.name, entry.marker_count, entry.base_name
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Tsv => {
            println!("name\tfolder_key\tbase_name\tmarker_count");
            for entry in entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.name, entry.folder_key, entry.base_name, entry.marker_count
                );
            }
        }
    }
    Ok(())
}
