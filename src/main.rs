use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cache;
mod catalog;
mod cli;
mod config;
mod core;
mod geometry;
mod parsing;
mod resolve;
mod transport;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("diagram_catalog=debug,info")
    } else {
        EnvFilter::new("diagram_catalog=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let settings = cli.settings()?;

    match cli.command {
        cli::Commands::List(args) => {
            cli::list::run(args, &settings, cli.format)?;
        }
        cli::Commands::Show(args) => {
            cli::show::run(args, &settings, cli.format)?;
        }
        cli::Commands::Resolve(args) => {
            cli::show::run_resolve(args, &settings, cli.format)?;
        }
        cli::Commands::Markers(args) => {
            cli::markers::run(args, &settings, cli.format)?;
        }
        cli::Commands::Table(args) => {
            cli::table::run(args, &settings, cli.format)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, settings)?;
        }
    }

    Ok(())
}
