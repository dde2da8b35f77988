use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{ExportFormat, ExportOptions};

/// dwexport configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What to do when a single chart fails
    pub on_error: FailurePolicy,

    /// API connection settings
    pub api: Api,

    /// Chart detail export settings
    pub details: Details,

    /// Chart image export settings
    pub export: Export,
}

/// Per-chart failure handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, record it in the run report and continue
    #[default]
    Skip,
    /// Stop the run at the first failure
    Abort,
}

/// Output file naming for image exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamingScheme {
    /// `{id}.{ext}`
    Id,
    /// `{id}-{title}.{ext}`
    #[default]
    IdTitle,
}

/// API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    /// Base URL including the version segment
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Charts requested per page when listing
    pub page_size: usize,
}

/// Chart detail export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    /// Only list charts in this folder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<u64>,

    /// Include charts from sub-folders (requires `folder_id`)
    pub recursive: bool,

    /// Workbook to write
    pub output_path: PathBuf,

    /// Request `GET /charts/{id}` for every chart
    pub fetch_details: bool,

    /// Request the responsive embed code for every chart
    pub include_embed_codes: bool,

    /// Additional metadata fields, as dotted paths into the chart record
    pub extra_fields: Vec<String>,
}

/// Chart image export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Export {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<u64>,

    pub recursive: bool,

    /// Directory receiving the image files
    pub output_dir: PathBuf,

    /// Publish each chart before exporting it (needs `chart:write`)
    pub publish: bool,

    /// Attempts per export when the request times out
    pub max_retries: u32,

    /// Skip charts still titled "[ Insert title here ]"
    pub skip_untitled: bool,

    pub naming: NamingScheme,

    /// Workbook mapping chart ids to chart numbers used as file names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbering_file: Option<PathBuf>,

    /// Formats to export, each with its own rendering options
    pub formats: Vec<ExportOptions>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "https://api.datawrapper.de/v3".to_string(),
            timeout_secs: 60,
            page_size: 100,
        }
    }
}

impl Default for Details {
    fn default() -> Self {
        Self {
            folder_id: None,
            recursive: false,
            output_path: PathBuf::from("charts.xlsx"),
            fetch_details: true,
            include_embed_codes: true,
            extra_fields: Vec::new(),
        }
    }
}

impl Default for Export {
    fn default() -> Self {
        Self {
            folder_id: None,
            recursive: false,
            output_dir: PathBuf::from("./exports"),
            publish: false,
            max_retries: 5,
            skip_untitled: true,
            naming: NamingScheme::IdTitle,
            numbering_file: None,
            formats: vec![
                ExportOptions::for_format(ExportFormat::Svg),
                ExportOptions::for_format(ExportFormat::Png),
            ],
        }
    }
}
