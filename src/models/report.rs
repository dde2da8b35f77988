use std::path::PathBuf;

/// A chart that was deliberately not processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChart {
    pub chart_id: String,
    pub reason: String,
}

/// A chart that failed and was passed over under the skip policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFailure {
    pub chart_id: String,
    pub error: String,
}

/// Outcome of one exporter run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Number of charts collected from the API
    pub charts_seen: usize,
    /// Files written (images, or the single workbook)
    pub written: Vec<PathBuf>,
    /// Spreadsheet rows written (detail export only)
    pub rows: usize,
    pub skipped: Vec<SkippedChart>,
    pub failures: Vec<ChartFailure>,
}

/// Summary statistics for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub charts_seen: usize,
    pub files_written: usize,
    pub rows: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn skip(&mut self, chart_id: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedChart {
            chart_id: chart_id.to_string(),
            reason: reason.into(),
        });
    }

    pub fn fail(&mut self, chart_id: &str, error: impl ToString) {
        self.failures.push(ChartFailure {
            chart_id: chart_id.to_string(),
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Compute summary statistics from the report
    pub fn stats(&self) -> RunStats {
        RunStats {
            charts_seen: self.charts_seen,
            files_written: self.written.len(),
            rows: self.rows,
            skipped: self.skipped.len(),
            failed: self.failures.len(),
        }
    }
}
