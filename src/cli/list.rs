use clap::Args;
use std::path::PathBuf;

use crate::config;
use crate::display::{print_markdown, ColorChoice};
use crate::error::Result;
use crate::exporters::collect_charts;
use crate::renderer::Renderer;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only list charts in this folder
    #[arg(long)]
    pub folder: Option<u64>,

    /// Include charts from sub-folders of --folder
    #[arg(long)]
    pub recursive: bool,
}

/// Print the chart listing
pub fn run(args: ListArgs, color: ColorChoice) -> Result<()> {
    let config = config::resolve(args.config)?;
    let client = super::connect(&config)?;

    let entries = collect_charts(&client, args.folder, args.recursive)?;
    print_markdown(&Renderer::default().render_chart_list(&entries), color);

    Ok(())
}
