//! Local output module
//!
//! File naming for exported images, partial-then-rename writes, the details
//! workbook and the chart numbering lookup.

pub mod numbering;
pub mod spreadsheet;

pub use numbering::NumberingLookup;
pub use spreadsheet::write_details;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::NamingScheme;
use crate::error::Result;
use crate::models::{ChartSummary, ExportFormat};

/// Characters that break file paths on at least one platform
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Longest file stem in bytes; leaves room for the extension and `.partial`
/// under the common 255-byte file name limit
const MAX_STEM_BYTES: usize = 200;

/// Remove characters that cannot appear in a file name
pub fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c) && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Longest prefix of `text` within `max_bytes`, cut on a char boundary
fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].trim_end()
}

/// File name for one chart in one format
///
/// A chart number from the lookup wins over the naming scheme. Long titles
/// are cut so the `{id}-` prefix always survives.
pub fn image_file_name(
    chart: &ChartSummary,
    format: ExportFormat,
    naming: NamingScheme,
    chart_number: Option<&str>,
) -> String {
    let id = sanitize_file_stem(&chart.id);
    let id = truncate_bytes(&id, MAX_STEM_BYTES);

    let stem = match chart_number.map(sanitize_file_stem) {
        Some(number) if !number.is_empty() => {
            truncate_bytes(&number, MAX_STEM_BYTES).to_string()
        }
        _ => match naming {
            NamingScheme::Id => id.to_string(),
            NamingScheme::IdTitle => {
                let title = sanitize_file_stem(&chart.title);
                let budget = MAX_STEM_BYTES.saturating_sub(id.len() + 1);
                let title = truncate_bytes(&title, budget);
                if title.is_empty() {
                    id.to_string()
                } else {
                    format!("{}-{}", id, title)
                }
            }
        },
    };

    format!("{}.{}", stem, format.as_str())
}

/// Directory for a chart, mirroring its Datawrapper folder path
pub fn folder_dir(output_dir: &Path, folder_path: &str) -> PathBuf {
    folder_path
        .split('/')
        .map(sanitize_file_stem)
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .fold(output_dir.to_path_buf(), |dir, segment| dir.join(segment))
}

/// Path next to `path` used while it is being written
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write `contents` so that `path` only ever holds a complete file
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path);
    let result = fs::write(&partial, contents).and_then(|()| fs::rename(&partial, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(())
}
