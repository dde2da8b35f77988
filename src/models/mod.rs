//! Data models module
//!
//! Defines domain models for charts, folders, export requests and run reports.

pub mod chart;
pub mod export;
pub mod report;

pub use chart::{ChartDetail, ChartEntry, ChartMetadata, ChartSummary, Folder, PLACEHOLDER_TITLE};
pub use export::{ExportFormat, ExportOptions, ExportRequest, Height};
pub use report::{ChartFailure, RunReport, RunStats, SkippedChart};
