use tracing::{info, warn};

use super::{collect_charts, handle_failure};
use crate::api::ChartApi;
use crate::config::{Details, FailurePolicy};
use crate::error::Result;
use crate::models::{ChartDetail, RunReport};
use crate::output::write_details;

/// Cell text used when a chart's embed code could not be fetched
pub const EMBED_ERROR_TEXT: &str = "Error retrieving iframe code";

/// Writes one workbook row per chart
pub struct DetailExporter<'a, A: ChartApi> {
    api: &'a A,
    settings: &'a Details,
    policy: FailurePolicy,
}

impl<'a, A: ChartApi> DetailExporter<'a, A> {
    pub fn new(api: &'a A, settings: &'a Details, policy: FailurePolicy) -> Self {
        Self {
            api,
            settings,
            policy,
        }
    }

    /// Collect charts, fetch their details and write the workbook
    ///
    /// Nothing is written when no charts are found or when the run stops
    /// early under the abort policy.
    pub fn run(&self) -> Result<RunReport> {
        let entries = collect_charts(self.api, self.settings.folder_id, self.settings.recursive)?;
        let extra_fields = &self.settings.extra_fields;

        let mut report = RunReport {
            charts_seen: entries.len(),
            ..Default::default()
        };
        let mut details = Vec::with_capacity(entries.len());

        for entry in &entries {
            let chart_id = entry.chart.id.as_str();
            let mut detail = ChartDetail::from_entry(entry, extra_fields.len());

            if self.settings.fetch_details {
                match self.api.get_chart(chart_id) {
                    Ok(metadata) => detail = detail.with_metadata(&metadata, extra_fields),
                    Err(e) => {
                        handle_failure(self.policy, &mut report, chart_id, e)?;
                        if self.settings.include_embed_codes {
                            detail.embed_code = Some(EMBED_ERROR_TEXT.to_string());
                        }
                        details.push(detail);
                        continue;
                    }
                }
            }

            if self.settings.include_embed_codes {
                detail.embed_code = match self.api.get_embed_code(chart_id) {
                    Ok(code) => Some(code),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Could not get iframe code for chart {}: {}", chart_id, e);
                        Some(EMBED_ERROR_TEXT.to_string())
                    }
                };
            }

            info!("Found chart: {} - {}", chart_id, detail.summary.title);
            details.push(detail);
        }

        if details.is_empty() {
            info!("No charts found");
            return Ok(report);
        }

        let path = &self.settings.output_path;
        write_details(path, &details, extra_fields)?;
        info!("Saved {} charts to {}", details.len(), path.display());

        report.rows = details.len();
        report.written.push(path.clone());
        Ok(report)
    }
}
