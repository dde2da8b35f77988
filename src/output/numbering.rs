//! Chart numbering lookup
//!
//! Reads the first worksheet of a workbook whose header row has `Chart ID`
//! and `Chart number` columns (the layout `dwexport details` writes, after
//! someone has filled in the numbers).

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ExportError, Result};

const ID_HEADER: &str = "chart id";
const NUMBER_HEADER: &str = "chart number";

/// Map from chart id to publication chart number
#[derive(Debug, Clone, Default)]
pub struct NumberingLookup {
    numbers: HashMap<String, String>,
}

impl NumberingLookup {
    /// Load the lookup from a workbook on disk
    pub fn load(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            ExportError::Config(format!("'{}' contains no worksheets", path.display()))
        })??;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

        Self::from_rows(rows).map_err(|e| match e {
            ExportError::Config(msg) => {
                ExportError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Build the lookup from already-read rows, header row included
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut rows = rows.into_iter();
        let mut columns = None;

        for row in rows.by_ref() {
            let id_col = find_column(&row, ID_HEADER);
            let number_col = find_column(&row, NUMBER_HEADER);
            if let (Some(id_col), Some(number_col)) = (id_col, number_col) {
                columns = Some((id_col, number_col));
                break;
            }
        }

        let (id_col, number_col) = columns.ok_or_else(|| {
            ExportError::Config("no header row with 'Chart ID' and 'Chart number' columns".to_string())
        })?;

        let numbers = rows
            .filter_map(|row| {
                let id = row.get(id_col)?.trim().to_string();
                let number = row.get(number_col)?.trim().to_string();
                (!id.is_empty() && !number.is_empty()).then_some((id, number))
            })
            .collect();

        Ok(Self { numbers })
    }

    pub fn get(&self, chart_id: &str) -> Option<&str> {
        self.numbers.get(chart_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

fn find_column(row: &[String], header: &str) -> Option<usize> {
    row.iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case(header))
}

/// Cell text, with whole floats rendered without a fractional part
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
