use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{self, Details};
use crate::display::{print_markdown, ColorChoice};
use crate::error::Result;
use crate::exporters::DetailExporter;
use crate::renderer::Renderer;

#[derive(Debug, Default, Args)]
pub struct DetailsArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only include charts in this folder
    #[arg(long)]
    pub folder: Option<u64>,

    /// Include charts from sub-folders of --folder
    #[arg(long)]
    pub recursive: bool,

    /// Workbook to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional metadata field to add as a column (dotted path, repeatable)
    #[arg(long = "field", value_name = "PATH")]
    pub fields: Vec<String>,

    /// Use listing data only, without requesting each chart
    #[arg(long)]
    pub no_details: bool,

    /// Do not request embed codes
    #[arg(long)]
    pub no_embed_codes: bool,

    /// Stop at the first chart that fails
    #[arg(long)]
    pub fail_fast: bool,
}

impl DetailsArgs {
    /// Apply command-line overrides to the configured settings
    fn apply(&self, details: &mut Details) {
        if self.folder.is_some() {
            details.folder_id = self.folder;
        }
        if self.recursive {
            details.recursive = true;
        }
        if let Some(output) = &self.output {
            details.output_path = output.clone();
        }
        for field in &self.fields {
            if !details.extra_fields.contains(field) {
                details.extra_fields.push(field.clone());
            }
        }
        if self.no_details {
            details.fetch_details = false;
        }
        if self.no_embed_codes {
            details.include_embed_codes = false;
        }
    }
}

/// Export chart details to a workbook
pub fn run(args: DetailsArgs, color: ColorChoice) -> Result<()> {
    let mut config = config::resolve(args.config.clone())?;
    args.apply(&mut config.details);
    let policy = super::failure_policy(&config, args.fail_fast);

    let client = super::connect(&config)?;

    match config.details.folder_id {
        Some(id) => info!("Listing charts from folder ID: {}", id),
        None => info!("Listing all charts"),
    }
    info!("Output file: {}", config.details.output_path.display());

    let report = DetailExporter::new(&client, &config.details, policy).run()?;

    print_markdown(
        &Renderer::default().render_report("Chart details", &report),
        color,
    );

    if report.rows == 0 {
        println!("No charts found.");
    } else {
        println!(
            "Successfully saved {} charts to {}",
            report.rows,
            config.details.output_path.display()
        );
    }
    if report.has_failures() {
        warn!("{} charts could not be read completely", report.failures.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let mut details = Details::default();
        details.extra_fields.push("metadata.describe.byline".to_string());

        let args = DetailsArgs {
            folder: Some(325652),
            recursive: true,
            output: Some(PathBuf::from("homelessness.xlsx")),
            fields: vec![
                "metadata.describe.byline".to_string(),
                "publicUrl".to_string(),
            ],
            no_embed_codes: true,
            ..Default::default()
        };
        args.apply(&mut details);

        assert_eq!(details.folder_id, Some(325652));
        assert!(details.recursive);
        assert_eq!(details.output_path, PathBuf::from("homelessness.xlsx"));
        assert_eq!(
            details.extra_fields,
            vec!["metadata.describe.byline".to_string(), "publicUrl".to_string()]
        );
        assert!(details.fetch_details);
        assert!(!details.include_embed_codes);
    }

    #[test]
    fn test_apply_without_flags_keeps_config() {
        let mut details = Details {
            folder_id: Some(1),
            ..Details::default()
        };
        DetailsArgs::default().apply(&mut details);
        assert_eq!(details.folder_id, Some(1));
        assert_eq!(details.output_path, PathBuf::from("charts.xlsx"));
    }
}
