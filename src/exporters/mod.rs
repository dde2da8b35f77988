//! Exporters module
//!
//! Implements the two single-pass pipelines:
//! - DetailExporter: charts → rows of an `.xlsx` workbook
//! - ImageExporter: charts × formats → image files
//!
//! Both collect charts the same way and share the per-chart failure policy.

mod details;
mod images;

pub use details::DetailExporter;
pub use images::ImageExporter;

use std::collections::HashSet;
use tracing::{error, info, warn};

use crate::api::ChartApi;
use crate::config::FailurePolicy;
use crate::error::{ExportError, Result};
use crate::models::{ChartEntry, RunReport};

/// Collect the charts a run operates on
///
/// Without a folder every chart visible to the token is listed. With a
/// folder its existence is checked first; `recursive` walks the folder tree
/// and records each chart's folder path ("Parent/Child").
pub fn collect_charts<A: ChartApi>(
    api: &A,
    folder_id: Option<u64>,
    recursive: bool,
) -> Result<Vec<ChartEntry>> {
    let Some(root_id) = folder_id else {
        if recursive {
            warn!("--recursive needs a folder id; listing all charts instead");
        }
        let charts = api.list_charts(None)?;
        info!("Found {} charts", charts.len());
        return Ok(charts
            .into_iter()
            .map(|chart| ChartEntry {
                chart,
                folder_path: String::new(),
            })
            .collect());
    };

    let root = api.get_folder(root_id)?;
    info!("Processing folder: {}", root.name);

    if !recursive {
        let charts = api.list_charts(Some(root_id))?;
        info!("Found {} charts in {}", charts.len(), root.name);
        return Ok(charts
            .into_iter()
            .map(|chart| ChartEntry {
                chart,
                folder_path: root.name.clone(),
            })
            .collect());
    }

    let mut entries = Vec::new();
    let mut visited = HashSet::from([root.id]);
    // (folder, path) pairs still to visit; reversed so children keep API order
    let mut pending = vec![(root.clone(), root.name.clone())];

    while let Some((folder, path)) = pending.pop() {
        entries.extend(folder.charts.iter().cloned().map(|chart| ChartEntry {
            chart,
            folder_path: path.clone(),
        }));

        let mut children = Vec::new();
        for child_id in &folder.children {
            if !visited.insert(*child_id) {
                continue;
            }
            let child = api.get_folder(*child_id)?;
            let child_path = format!("{}/{}", path, child.name);
            info!("Processing folder: {}", child_path);
            children.push((child, child_path));
        }
        pending.extend(children.into_iter().rev());
    }

    info!("Found {} charts under {}", entries.len(), root.name);
    Ok(entries)
}

/// Apply the failure policy to an error raised while processing one chart
///
/// Returns `Err` when the run must stop, `Ok` after recording the failure
/// when it may continue.
pub(crate) fn handle_failure(
    policy: FailurePolicy,
    report: &mut RunReport,
    chart_id: &str,
    err: ExportError,
) -> Result<()> {
    if err.is_fatal() || policy == FailurePolicy::Abort {
        error!("Stopping at chart {}: {}", chart_id, err);
        return Err(err);
    }

    warn!("Skipping chart {}: {}", chart_id, err);
    report.fail(chart_id, &err);
    Ok(())
}
