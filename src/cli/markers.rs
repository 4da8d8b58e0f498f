use clap::Args;

use crate::catalog::resolver::MarkerLayout;
use crate::cli::{block_on, open_resolver, OutputFormat};
use crate::config::Settings;

#[derive(Args)]
pub struct MarkersArgs {
    /// Folder key of the diagram
    #[arg(required = true)]
    pub folder: String,

    /// Width the image is rendered at, in pixels
    #[arg(long, required = true)]
    pub width: f64,

    /// Viewport width, in pixels; narrow viewports allow smaller markers
    #[arg(long)]
    pub viewport: Option<f64>,
}

pub fn run(args: MarkersArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    if !args.width.is_finite() || args.width <= 0.0 {
        anyhow::bail!("--width must be a positive number, got {}", args.width);
    }

    let resolver = open_resolver(settings)?;
    let layout = block_on(resolver.project_markers(&args.folder, args.width, args.viewport))??;
    print_layout(&layout, format)
}

fn print_layout(layout: &MarkerLayout, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{}: native {}x{}, rendered at {:.0}px (scale {:.3})\n",
                layout.folder_key,
                layout.native.width,
                layout.native.height,
                layout.rendered_width,
                layout.scale
            );
            println!("{:<8} {:>9} {:>9} {:>6} {:>6}", "Number", "Left", "Top", "Size", "Font");
            println!("{}", "-".repeat(42));
            for marker in &layout.markers {
                let p = &marker.placement;
                println!(
                    "{:<8} {:>9.1} {:>9.1} {:>6.1} {:>6.1}",
                    marker.number, p.left, p.top, p.size, p.font_size
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(layout)?);
        }
        OutputFormat::Tsv => {
            println!("id\tnumber\tleft\ttop\tsize\tfont_size");
            for marker in &layout.markers {
                let p = &marker.placement;
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    marker.id, marker.number, p.left, p.top, p.size, p.font_size
                );
            }
        }
    }
    Ok(())
}
