use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image format accepted by the export endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    /// Path segment and file extension
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export height
///
/// `Auto` sizes the chart body to its height in the editor minus header and
/// footer. `Full` sends no height at all, which renders the chart at its
/// full height even when `plain` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "HeightRepr", into = "HeightRepr")]
pub enum Height {
    #[default]
    Auto,
    Full,
    Pixels(u32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HeightRepr {
    Pixels(i64),
    Keyword(String),
}

impl TryFrom<HeightRepr> for Height {
    type Error = String;

    fn try_from(repr: HeightRepr) -> Result<Self, Self::Error> {
        match repr {
            HeightRepr::Pixels(px) => u32::try_from(px)
                .ok()
                .filter(|px| *px > 0)
                .map(Height::Pixels)
                .ok_or_else(|| format!("height must be a positive number, got {}", px)),
            HeightRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<Height> for HeightRepr {
    fn from(height: Height) -> Self {
        match height {
            Height::Auto => HeightRepr::Keyword("auto".to_string()),
            Height::Full => HeightRepr::Keyword("full".to_string()),
            Height::Pixels(px) => HeightRepr::Pixels(i64::from(px)),
        }
    }
}

impl FromStr for Height {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Height::Auto),
            "full" => Ok(Height::Full),
            other => match other.parse::<i64>() {
                Ok(px) => Height::try_from(HeightRepr::Pixels(px)),
                Err(_) => Err(format!(
                    "invalid height '{}': expected 'auto', 'full' or a positive number",
                    s
                )),
            },
        }
    }
}

/// Rendering options for one export format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,

    /// Width in pixels (chart default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Height,

    /// Export the chart body only, without header and footer
    #[serde(default)]
    pub plain: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,

    #[serde(default)]
    pub transparent: bool,
}

impl ExportOptions {
    /// Options with the editor's defaults for a format
    pub fn for_format(format: ExportFormat) -> Self {
        Self {
            format,
            width: None,
            height: Height::Auto,
            plain: format == ExportFormat::Svg,
            zoom: None,
            border_width: None,
            transparent: false,
        }
    }

    /// Check numeric options are in range
    pub fn validate(&self) -> Result<(), String> {
        if self.width == Some(0) {
            return Err(format!("{}: width must be positive", self.format));
        }
        if self.zoom == Some(0) {
            return Err(format!("{}: zoom must be positive", self.format));
        }
        if self.height == Height::Pixels(0) {
            return Err(format!("{}: height must be positive", self.format));
        }
        Ok(())
    }
}

/// A single export call for one chart in one format
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub chart_id: String,
    pub options: ExportOptions,
    /// Publish the chart before exporting (needs `chart:write`)
    pub publish: bool,
}

impl ExportRequest {
    pub fn new(chart_id: impl Into<String>, options: ExportOptions, publish: bool) -> Self {
        Self {
            chart_id: chart_id.into(),
            options,
            publish,
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.options.format
    }

    /// Query string for `GET /charts/{id}/export/{format}`
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let opts = &self.options;
        let mut params = Vec::new();

        if let Some(width) = opts.width {
            params.push(("width", width.to_string()));
        }
        match opts.height {
            Height::Auto => params.push(("height", "auto".to_string())),
            Height::Pixels(px) => params.push(("height", px.to_string())),
            Height::Full => {}
        }
        if let Some(border) = opts.border_width.filter(|b| *b != 0) {
            params.push(("borderWidth", border.to_string()));
        }
        if let Some(zoom) = opts.zoom {
            params.push(("zoom", zoom.to_string()));
        }
        if opts.plain {
            params.push(("plain", "true".to_string()));
        }
        if opts.transparent {
            params.push(("transparent", "true".to_string()));
        }

        params
    }
}
