use std::fs;
use tracing::{debug, info, warn};

use super::{collect_charts, handle_failure};
use crate::api::ChartApi;
use crate::config::{Export, FailurePolicy};
use crate::error::{ExportError, Result};
use crate::models::{ChartEntry, ExportRequest, RunReport};
use crate::output::{folder_dir, image_file_name, write_atomic, NumberingLookup};

/// Writes one image file per chart per configured format
pub struct ImageExporter<'a, A: ChartApi> {
    api: &'a A,
    settings: &'a Export,
    policy: FailurePolicy,
    numbering: Option<NumberingLookup>,
}

impl<'a, A: ChartApi> ImageExporter<'a, A> {
    pub fn new(api: &'a A, settings: &'a Export, policy: FailurePolicy) -> Self {
        Self {
            api,
            settings,
            policy,
            numbering: None,
        }
    }

    /// Name files after chart numbers found in `lookup`
    pub fn with_numbering(mut self, lookup: NumberingLookup) -> Self {
        self.numbering = Some(lookup);
        self
    }

    /// Export every collected chart
    ///
    /// Files are written as each chart completes, so a run stopped by the
    /// abort policy leaves the files of earlier charts in place.
    pub fn run(&self) -> Result<RunReport> {
        let entries = collect_charts(self.api, self.settings.folder_id, self.settings.recursive)?;
        fs::create_dir_all(&self.settings.output_dir)?;

        let mut report = RunReport {
            charts_seen: entries.len(),
            ..Default::default()
        };

        for entry in &entries {
            let chart_id = entry.chart.id.as_str();

            if self.settings.skip_untitled && entry.chart.has_placeholder_title() {
                debug!("Skipping chart {} with placeholder title", chart_id);
                report.skip(chart_id, "placeholder title");
                continue;
            }

            if let Err(e) = self.export_entry(entry, &mut report) {
                handle_failure(self.policy, &mut report, chart_id, e)?;
            }
        }

        Ok(report)
    }

    /// Publish (when asked) and export one chart in every format
    ///
    /// Each file is recorded in `report` once it is in place, so formats
    /// written before a failing one are still reported.
    fn export_entry(&self, entry: &ChartEntry, report: &mut RunReport) -> Result<()> {
        let chart = &entry.chart;

        if self.settings.publish {
            info!("Publishing chart {}", chart.id);
            self.api.publish_chart(&chart.id)?;
        }

        let dir = if self.settings.recursive {
            folder_dir(&self.settings.output_dir, &entry.folder_path)
        } else {
            self.settings.output_dir.clone()
        };

        let chart_number = self
            .numbering
            .as_ref()
            .and_then(|lookup| lookup.get(&chart.id));
        if self.numbering.is_some() && chart_number.is_none() {
            info!(
                "Chart ID {} not found in lookup table, using fallback name",
                chart.id
            );
        }

        for options in &self.settings.formats {
            let request = ExportRequest::new(&chart.id, options.clone(), self.settings.publish);
            let bytes = self.export_with_retries(&request)?;

            let path = dir.join(image_file_name(
                chart,
                request.format(),
                self.settings.naming,
                chart_number,
            ));
            write_atomic(&path, &bytes)?;
            info!("Exported chart {} - {} to {}", chart.id, chart.title, path.display());
            report.written.push(path);
        }

        Ok(())
    }

    /// Retry only requests that timed out
    fn export_with_retries(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let attempts = self.settings.max_retries.max(1);
        let mut attempt = 1;

        loop {
            match self.api.export_chart(request) {
                Err(ExportError::Timeout(resource)) if attempt < attempts => {
                    warn!(
                        "Export of {} as {} timed out (attempt {}/{}), retrying",
                        resource,
                        request.format(),
                        attempt,
                        attempts
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
