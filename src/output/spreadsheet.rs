//! Details workbook writer using rust_xlsxwriter

use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::partial_path;
use crate::error::Result;
use crate::models::ChartDetail;

/// Fixed leading columns of the details workbook
pub const HEADERS: [&str; 9] = [
    "Chart number",
    "Chart ID",
    "Chart title",
    "Type",
    "Folder ID",
    "Folder path",
    "Last modified",
    "Published at",
    "iframe code",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Excel rejects strings longer than this many characters in a cell
const MAX_CELL_CHARS: usize = 32_767;

/// Cut `value` to what a cell can hold
fn fit_cell<'a>(value: &'a str, chart_id: &str, column: &str) -> &'a str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(
                "Chart {}: {} has {} characters, truncated to {}",
                chart_id,
                column,
                value.chars().count(),
                MAX_CELL_CHARS
            );
            &value[..end]
        }
        None => value,
    }
}

/// Write one row per chart to an `.xlsx` workbook at `path`
///
/// The workbook is saved next to `path` first and renamed into place, so a
/// file at `path` is always complete.
pub fn write_details(path: &Path, details: &[ChartDetail], extra_fields: &[String]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Charts")?;

    let headers = HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(extra_fields.iter().cloned());
    for (col, header) in headers.enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (idx, detail) in details.iter().enumerate() {
        let row = idx as u32 + 1;
        let summary = &detail.summary;

        let id = summary.id.as_str();

        sheet.write_string(row, 1, fit_cell(id, id, HEADERS[1]))?;
        sheet.write_string(row, 2, fit_cell(&summary.title, id, HEADERS[2]))?;
        sheet.write_string(row, 3, detail.chart_type.clone().unwrap_or_default())?;
        if let Some(folder_id) = summary.folder_id {
            sheet.write_number(row, 4, folder_id as f64)?;
        }
        sheet.write_string(row, 5, fit_cell(&detail.folder_path, id, HEADERS[5]))?;
        if let Some(modified) = summary.last_modified {
            sheet.write_string(row, 6, modified.format(TIMESTAMP_FORMAT).to_string())?;
        }
        let published = match detail.published_at {
            Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
            None if detail.is_published() => "yes".to_string(),
            None => "no".to_string(),
        };
        sheet.write_string(row, 7, published)?;
        let embed_code = detail.embed_code.as_deref().unwrap_or_default();
        sheet.write_string(row, 8, fit_cell(embed_code, id, HEADERS[8]))?;

        for (offset, value) in detail.extra.iter().enumerate() {
            if let Some(value) = value {
                let field = extra_fields.get(offset).map_or("extra field", String::as_str);
                sheet.write_string(
                    row,
                    (HEADERS.len() + offset) as u16,
                    fit_cell(value, id, field),
                )?;
            }
        }
    }

    sheet.set_column_width(1, 10)?;
    sheet.set_column_width(2, 60)?;
    sheet.set_column_width(5, 30)?;
    sheet.set_column_width(8, 40)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path);
    workbook.save(&partial)?;
    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    debug!("Wrote {} rows to {}", details.len(), path.display());
    Ok(())
}
