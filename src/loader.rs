//! Survey file discovery and loading.

use calamine::{Data, Reader, open_workbook_auto};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RaterError, Result};
use crate::table::{Cell, RawTable};

/// Spreadsheet extensions accepted as survey input.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Loads the first worksheet of a survey file.
pub trait TableLoader {
    fn load(&self, path: &Path) -> Result<RawTable>;
}

/// [`TableLoader`] backed by `calamine`, reading xlsx and xls workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineLoader;

impl TableLoader for CalamineLoader {
    fn load(&self, path: &Path) -> Result<RawTable> {
        let read_error = |reason: String| RaterError::FileRead {
            path: path.to_path_buf(),
            reason,
        };

        if !is_supported(path) {
            return Err(read_error(format!(
                "unsupported file type (expected one of: {})",
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| read_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| read_error("workbook has no worksheets".to_string()))?
            .map_err(|e| read_error(e.to_string()))?;

        let Some((last_row, last_col)) = range.end() else {
            debug!(path = %path.display(), "First worksheet is empty");
            return Ok(RawTable::default());
        };

        // Absolute coordinates, so leading blank rows and columns keep their place.
        let rows = (0..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| range.get_value((row, col)).map_or(Cell::Empty, to_cell))
                    .collect()
            })
            .collect();

        debug!(
            path = %path.display(),
            rows = last_row + 1,
            columns = last_col + 1,
            "Worksheet loaded"
        );
        Ok(RawTable::from_rows(rows))
    }
}

fn to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

/// True when the path has one of the [`SUPPORTED_EXTENSIONS`], in any case.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Lists survey files directly inside `dir`, sorted by path.
///
/// Office lock files (`~$name.xlsx`) are skipped.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_error = |source| RaterError::InputDirectory {
        dir: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();

        // `Path::is_file` follows symlinks; a broken link counts as not a file.
        if !path.is_file() || !is_supported(&path) {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with("~$") {
            debug!(path = %path.display(), "Skipping lock file");
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}
