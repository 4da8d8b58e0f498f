use clap::Args;

use crate::catalog::diagram::Diagram;
use crate::cli::{block_on, open_resolver, OutputFormat};
use crate::config::Settings;
use crate::core::types::{ResolvedFolder, ValidationMode};

#[derive(Args)]
pub struct FolderArgs {
    /// Folder key, e.g. "Engine/10. Oil Lubricating System"
    #[arg(required = true)]
    pub folder: String,

    /// Treat a manifest without markers as invalid
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Folder key, e.g. "Engine/10. Oil Lubricating System"
    #[arg(required = true)]
    pub folder: String,
}

pub fn run(args: FolderArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let resolver = open_resolver(settings)?;
    let mode = ValidationMode::from_strict(args.strict);
    let diagram = block_on(resolver.load_diagram(&args.folder, mode))??;
    print_diagram(&diagram, format)
}

pub fn run_resolve(args: ResolveArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let resolver = open_resolver(settings)?;
    let folder = block_on(resolver.resolve_folder(&args.folder))?;
    print_resolution(&folder, format)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn print_diagram(diagram: &Diagram, format: OutputFormat) -> anyhow::Result<()> {
    let markers = diagram.markers();
    match format {
        OutputFormat::Text => {
            println!("Diagram: {}\n", diagram.folder.display_name());
            println!("Folder:    {}", diagram.folder.folder_key);
            println!("Base name: {}", diagram.base_name());
            match &diagram.manifest {
                Some(manifest) => println!("Image:     {}", manifest.image_name),
                None => println!("Manifest:  invalid, no markers shown"),
            }
            if let Some(url) = &diagram.image_url {
                println!("Image URL: {url}");
            }
            println!("Markers:   {}", markers.len());
            println!("Parts:     {}", diagram.rows.len());

            if !markers.is_empty() {
                println!("\n{:<8} {:<16} {:<32} {:>8} {:>8}", "Number", "Part No.", "Description", "X", "Y");
                println!("{}", "-".repeat(76));
                for marker in &markers {
                    let (part_number, description) = marker.row.map_or(
                        (marker.coordinate.part_number.as_str(), ""),
                        |row| (row.part_number.as_str(), row.description.as_str()),
                    );
                    println!(
                        "{:<8} {:<16} {:<32} {:>8.1} {:>8.1}",
                        marker.coordinate.number,
                        or_dash(part_number),
                        or_dash(description),
                        marker.coordinate.x,
                        marker.coordinate.y
                    );
                }
            }

            let unmatched = diagram.unmatched_rows();
            if !unmatched.is_empty() {
                println!("\nParts without a marker:");
                for row in unmatched {
                    println!("  {:<8} {:<16} {}", row.number, or_dash(&row.part_number), row.description);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&diagram.detail())?);
        }
        OutputFormat::Tsv => {
            println!("number\tpart_number\tdescription\tx\ty");
            for marker in &markers {
                let row = marker.row;
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    marker.coordinate.number,
                    row.map_or(marker.coordinate.part_number.as_str(), |r| r.part_number.as_str()),
                    row.map_or("", |r| r.description.as_str()),
                    marker.coordinate.x,
                    marker.coordinate.y
                );
            }
        }
    }
    Ok(())
}

fn print_resolution(folder: &ResolvedFolder, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Folder: {}", folder.folder_key);
            let Some(base_name) = &folder.base_name else {
                println!("No manifest found under any naming convention");
                return Ok(());
            };
            println!("Base name: {base_name}");
            let yes_no = |b: bool| if b { "yes" } else { "no" };
            println!("Manifest:  {}", yes_no(folder.has_manifest));
            println!("Table:     {}", yes_no(folder.has_table));
            println!(
                "Image:     {}",
                folder.image_file().as_deref().unwrap_or("no")
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(folder)?);
        }
        OutputFormat::Tsv => {
            println!("folder_key\tbase_name\thas_manifest\thas_table\timage");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                folder.folder_key,
                folder.base_name.as_deref().unwrap_or(""),
                folder.has_manifest,
                folder.has_table,
                folder.image_file().unwrap_or_default()
            );
        }
    }
    Ok(())
}
