use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::parsing::table::{parse_table_file, write_table_with, NamePolicy};

#[derive(Args)]
pub struct TableArgs {
    /// Parts table (CSV) to parse
    #[arg(required = true)]
    pub input: PathBuf,

    /// Take the part name from a "Name" column instead of "Qty"
    #[arg(long)]
    pub name_column: bool,
}

pub fn run(args: TableArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let mut options = settings.table_options();
    if args.name_column {
        options.name_policy = NamePolicy::NameAuthoritative;
    }

    let rows = parse_table_file(&args.input, options)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    match format {
        OutputFormat::Text => {
            println!("{} ({} rows)\n", args.input.display(), rows.len());
            println!("{:>4}  {:<8} {:<16} {:<32} Name", "Id", "Number", "Part No.", "Description");
            println!("{}", "-".repeat(72));
            for row in &rows {
                println!(
                    "{:>4}  {:<8} {:<16} {:<32} {}",
                    row.id, row.number, row.part_number, row.description, row.name
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Tsv => {
            print!("{}", write_table_with(&rows, b'\t')?);
        }
    }
    Ok(())
}
