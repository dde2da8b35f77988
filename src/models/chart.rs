use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title Datawrapper gives to charts that were created but never edited
pub const PLACEHOLDER_TITLE: &str = "[ Insert title here ]";

// ============================================================================
// Chart Models
// ============================================================================

/// A chart as returned by the listing endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    /// Datawrapper chart id (five characters, e.g. "aBc12")
    pub id: String,
    /// Chart title
    pub title: String,
    /// Visualization type (e.g. "d3-bars")
    pub chart_type: Option<String>,
    /// Folder the chart lives in, if any
    pub folder_id: Option<u64>,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
}

impl ChartSummary {
    /// Whether the chart still carries the editor's placeholder title
    pub fn has_placeholder_title(&self) -> bool {
        self.title.trim() == PLACEHOLDER_TITLE
    }
}

/// A chart found while collecting, with its location in the folder tree
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    pub chart: ChartSummary,
    /// Folder path within Datawrapper ("Parent/Child"), empty when unknown
    pub folder_path: String,
}

/// Full chart metadata from `GET /charts/{id}`
#[derive(Debug, Clone)]
pub struct ChartMetadata {
    pub summary: ChartSummary,
    pub published_at: Option<DateTime<Utc>>,
    pub public_version: Option<u32>,
    /// Untouched response body, used to resolve extra fields
    pub raw: Value,
}

impl ChartMetadata {
    /// Resolve a dotted path (e.g. `metadata.describe.byline`) against the
    /// raw response. Array elements are addressed by index.
    pub fn field(&self, path: &str) -> Option<String> {
        let mut current = &self.raw;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        match current {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }
}

/// One spreadsheet row of the detail export
#[derive(Debug, Clone)]
pub struct ChartDetail {
    pub summary: ChartSummary,
    pub chart_type: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub public_version: Option<u32>,
    /// Responsive iframe embed code
    pub embed_code: Option<String>,
    pub folder_path: String,
    /// Values of the requested extra fields, in request order
    pub extra: Vec<Option<String>>,
}

impl ChartDetail {
    /// Detail row built from listing data only
    pub fn from_entry(entry: &ChartEntry, extra_count: usize) -> Self {
        Self {
            summary: entry.chart.clone(),
            chart_type: entry.chart.chart_type.clone(),
            published_at: None,
            public_version: None,
            embed_code: None,
            folder_path: entry.folder_path.clone(),
            extra: vec![None; extra_count],
        }
    }

    /// Merge full metadata into the row
    pub fn with_metadata(mut self, metadata: &ChartMetadata, extra_fields: &[String]) -> Self {
        if !metadata.summary.title.is_empty() {
            self.summary.title = metadata.summary.title.clone();
        }
        if metadata.summary.folder_id.is_some() {
            self.summary.folder_id = metadata.summary.folder_id;
        }
        if metadata.summary.last_modified.is_some() {
            self.summary.last_modified = metadata.summary.last_modified;
        }
        self.chart_type = metadata
            .summary
            .chart_type
            .clone()
            .or(self.chart_type);
        self.published_at = metadata.published_at;
        self.public_version = metadata.public_version;
        self.extra = extra_fields.iter().map(|f| metadata.field(f)).collect();
        self
    }

    /// Whether the chart has a public version
    pub fn is_published(&self) -> bool {
        self.published_at.is_some() || self.public_version.is_some_and(|v| v > 0)
    }
}

// ============================================================================
// Folder Models
// ============================================================================

/// A Datawrapper folder from `GET /folders/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    /// Charts directly inside this folder
    pub charts: Vec<ChartSummary>,
    /// Ids of child folders
    pub children: Vec<u64>,
}
