mod api;
mod cli;
mod config;
mod credentials;
mod display;
mod error;
mod exporters;
mod models;
mod output;
mod renderer;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::display::ColorChoice;

#[derive(Parser)]
#[command(name = "dwexport")]
#[command(
    about = "Export Datawrapper chart details and images",
    long_about = "Export Datawrapper chart details to a spreadsheet and chart images to PNG/SVG.\n\n\
                  Reads the API token from DATAWRAPPER_API_TOKEN. Exporting without --publish \
                  only needs the chart:read and folder:read scopes."
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to style terminal output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List charts
    List(cli::list::ListArgs),
    /// Export chart details to an .xlsx workbook
    Details(cli::details::DetailsArgs),
    /// Export chart images (PNG/SVG)
    Export(cli::export::ExportArgs),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize dwexport.toml configuration file
    Init {
        /// Path where to create the config file
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Init { path } => cli::config::init(path),
        },
        Commands::List(args) => cli::list::run(args, cli.color),
        Commands::Details(args) => cli::details::run(args, cli.color),
        Commands::Export(args) => cli::export::run(args, cli.color),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
