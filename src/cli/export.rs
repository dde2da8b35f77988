use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{self, Export, NamingScheme};
use crate::display::{print_markdown, ColorChoice};
use crate::error::Result;
use crate::exporters::ImageExporter;
use crate::models::{ExportFormat, ExportOptions, Height};
use crate::output::NumberingLookup;
use crate::renderer::Renderer;

/// Token scopes needed to export without publishing
const READ_SCOPES: &[&str] = &["chart:read", "folder:read"];

/// Token scopes needed when charts are published first
const PUBLISH_SCOPES: &[&str] = &[
    "chart:read",
    "chart:write",
    "folder:read",
    "theme:read",
    "visualization:read",
];

#[derive(Debug, Default, Args)]
pub struct ExportArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only export charts in this folder
    #[arg(long)]
    pub folder: Option<u64>,

    /// Include charts from sub-folders of --folder, mirroring them as directories
    #[arg(long)]
    pub recursive: bool,

    /// Format to export (repeatable); defaults to the configured formats
    #[arg(short, long = "format", value_enum)]
    pub formats: Vec<ExportFormat>,

    /// Width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Height: "auto", "full" or a positive number of pixels
    #[arg(long)]
    pub height: Option<Height>,

    /// Publish each chart before exporting (needs chart:write)
    #[arg(long)]
    pub publish: bool,

    /// Directory receiving the image files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File naming scheme
    #[arg(long, value_enum)]
    pub naming: Option<NamingScheme>,

    /// Workbook with "Chart ID" and "Chart number" columns used for file names
    #[arg(long)]
    pub numbering: Option<PathBuf>,

    /// Attempts per export when a request times out
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Stop at the first chart that fails
    #[arg(long)]
    pub fail_fast: bool,
}

impl ExportArgs {
    /// Apply command-line overrides to the configured settings
    fn apply(&self, export: &mut Export) {
        if self.folder.is_some() {
            export.folder_id = self.folder;
        }
        if self.recursive {
            export.recursive = true;
        }
        if self.publish {
            export.publish = true;
        }
        if let Some(dir) = &self.output_dir {
            export.output_dir = dir.clone();
        }
        if let Some(naming) = self.naming {
            export.naming = naming;
        }
        if let Some(numbering) = &self.numbering {
            export.numbering_file = Some(numbering.clone());
        }
        if let Some(retries) = self.max_retries {
            export.max_retries = retries;
        }

        if !self.formats.is_empty() {
            let mut selected: Vec<ExportOptions> = Vec::new();
            for format in &self.formats {
                if selected.iter().any(|o| o.format == *format) {
                    continue;
                }
                let options = export
                    .formats
                    .iter()
                    .find(|o| o.format == *format)
                    .cloned()
                    .unwrap_or_else(|| ExportOptions::for_format(*format));
                selected.push(options);
            }
            export.formats = selected;
        }

        for options in &mut export.formats {
            if self.width.is_some() {
                options.width = self.width;
            }
            if let Some(height) = self.height {
                options.height = height;
            }
        }
    }
}

/// Token scopes the run needs
pub fn required_scopes(publish: bool) -> &'static [&'static str] {
    if publish {
        PUBLISH_SCOPES
    } else {
        READ_SCOPES
    }
}

/// Export chart images
pub fn run(args: ExportArgs, color: ColorChoice) -> Result<()> {
    let mut config = config::resolve(args.config.clone())?;
    args.apply(&mut config.export);
    config::validate(&config)?;
    let policy = super::failure_policy(&config, args.fail_fast);

    let client = super::connect(&config)?;
    info!(
        "Token needs scopes: {}",
        required_scopes(config.export.publish).join(", ")
    );

    let mut exporter = ImageExporter::new(&client, &config.export, policy);
    if let Some(path) = &config.export.numbering_file {
        let lookup = NumberingLookup::load(path)?;
        if lookup.is_empty() {
            warn!("No chart numbers found in {}", path.display());
        } else {
            info!("Loaded {} chart numbers from {}", lookup.len(), path.display());
        }
        exporter = exporter.with_numbering(lookup);
    }

    let report = exporter.run()?;

    print_markdown(
        &Renderer::default().render_report("Image export", &report),
        color,
    );
    if report.has_failures() {
        warn!("{} charts failed to export", report.failures.len());
    }

    Ok(())
}
