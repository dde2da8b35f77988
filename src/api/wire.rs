//! Response bodies of the Datawrapper v3 endpoints
//!
//! Only the fields dwexport reads are declared; everything else is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{ChartSummary, Folder};

/// A chart object as it appears in `/charts`, `/charts/{id}` and `/folders/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChartRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub last_modified_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub public_version: Option<u32>,
}

impl ChartRecord {
    pub fn summary(&self) -> ChartSummary {
        ChartSummary {
            id: self.id.clone(),
            title: self.title.clone().unwrap_or_default(),
            chart_type: self.chart_type.clone(),
            folder_id: self.folder_id,
            last_modified: parse_timestamp(self.last_modified_at.as_deref()),
        }
    }
}

/// `GET /charts`
#[derive(Debug, Deserialize)]
pub(crate) struct ChartPage {
    #[serde(default)]
    pub list: Vec<ChartRecord>,
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderRef {
    pub id: u64,
}

/// `GET /folders/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct FolderRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub charts: Vec<ChartRecord>,
    #[serde(default)]
    pub children: Vec<FolderRef>,
}

impl From<FolderRecord> for Folder {
    fn from(record: FolderRecord) -> Self {
        Folder {
            id: record.id,
            name: record.name,
            charts: record.charts.iter().map(ChartRecord::summary).collect(),
            children: record.children.into_iter().map(|c| c.id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbedCode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub code: String,
}

/// `GET /charts/{id}/embed-codes`
///
/// Normally a list of `{id, code}` templates; older responses are a single
/// object keyed by template name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EmbedCodes {
    List(Vec<EmbedCode>),
    Map(HashMap<String, Value>),
}

impl EmbedCodes {
    /// The responsive iframe code, if the response carries one
    pub fn responsive(self) -> Option<String> {
        match self {
            EmbedCodes::List(codes) => {
                let idx = codes
                    .iter()
                    .position(|c| c.id == "responsive")
                    .unwrap_or(0);
                codes.into_iter().nth(idx).map(|c| c.code)
            }
            EmbedCodes::Map(map) => match map.get("responsive") {
                Some(Value::String(code)) => Some(code.clone()),
                _ => None,
            },
        }
        .filter(|code| !code.is_empty())
    }
}

pub(crate) fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
