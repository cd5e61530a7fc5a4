//! Output persistence: the results workbook, its charts and the error log.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Format, FormatAlign, Workbook, Worksheet, XlsxError,
};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::RaterError;
use crate::report::{ChartSpec, PlacedTable, ReportCell, ReportLayout};

/// Logs a run summary (or any serializable value) as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line of the error log.
#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub file: String,
    pub kind: &'static str,
    pub message: String,
}

impl LogEntry {
    pub fn from_error(error: &RaterError) -> Self {
        let file = match error {
            RaterError::FileRead { path, .. }
            | RaterError::StructuralValidation { path, .. }
            | RaterError::DataValidation { path, .. }
            | RaterError::Write { path, .. } => path.display().to_string(),
            RaterError::Aggregation { dir, .. } | RaterError::InputDirectory { dir, .. } => {
                dir.display().to_string()
            }
        };
        LogEntry {
            timestamp: Utc::now(),
            file,
            kind: error.kind(),
            message: error_chain(error),
        }
    }
}

/// The error and its sources joined with `: `.
fn error_chain(error: &RaterError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Append-only log of failures, one CSV line per entry.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an entry, writing the header only when the file is new.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let file_exists = self.path.exists();
        debug!(path = %self.path.display(), file_exists, "Appending error log entry");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists) // IMPORTANT when appending
            .from_writer(file);

        writer.serialize(entry)?;
        writer.flush()?;

        Ok(())
    }
}

/// Turns a [`ChartSpec`] into a chart ready to be placed on a worksheet.
pub trait ChartRenderer {
    fn render(&self, sheet_name: &str, spec: &ChartSpec) -> Chart;
}

/// Native Excel column chart with one series and value labels.
#[derive(Debug, Clone, Copy)]
pub struct XlsxBarChart {
    pub width: u32,
    pub height: u32,
}

impl Default for XlsxBarChart {
    fn default() -> Self {
        Self {
            width: 960,
            height: 380,
        }
    }
}

impl ChartRenderer for XlsxBarChart {
    fn render(&self, sheet_name: &str, spec: &ChartSpec) -> Chart {
        let categories = spec.category_range;
        let values = spec.value_range;

        let mut label = ChartDataLabel::new();
        label.show_value().set_num_format(spec.label_format());

        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_categories((
                sheet_name,
                categories.first_row,
                categories.column,
                categories.last_row,
                categories.column,
            ))
            .set_values((
                sheet_name,
                values.first_row,
                values.column,
                values.last_row,
                values.column,
            ))
            .set_data_label(&label);
        chart.title().set_name(&spec.title);
        chart.legend().set_hidden();
        chart.set_width(self.width).set_height(self.height);
        chart
    }
}

/// Serializes a [`ReportLayout`] to a file.
pub trait SpreadsheetWriter {
    fn write(&self, layout: &ReportLayout, path: &Path) -> std::result::Result<(), RaterError>;
}

/// [`SpreadsheetWriter`] producing an xlsx workbook via `rust_xlsxwriter`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxReportWriter<R = XlsxBarChart> {
    pub charts: R,
}

impl<R: ChartRenderer> SpreadsheetWriter for XlsxReportWriter<R> {
    fn write(&self, layout: &ReportLayout, path: &Path) -> std::result::Result<(), RaterError> {
        self.build(layout, path)
            .map_err(|e| RaterError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!(path = %path.display(), tables = layout.tables.len(), charts = layout.charts.len(), "Report written");
        Ok(())
    }
}

impl<R: ChartRenderer> XlsxReportWriter<R> {
    fn build(&self, layout: &ReportLayout, path: &Path) -> std::result::Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new()
            .set_bold()
            .set_text_wrap()
            .set_align(FormatAlign::Center);
        let number_format = Format::new().set_num_format("0.00");

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&layout.sheet_name)?;
        worksheet.set_column_width(0, 40)?;
        worksheet.set_column_width(1, 40)?;

        for placed in &layout.tables {
            write_table(worksheet, placed, &header_format, &number_format)?;
        }
        for spec in &layout.charts {
            let chart = self.charts.render(&layout.sheet_name, spec);
            worksheet.insert_chart(spec.anchor_row, spec.anchor_column, &chart)?;
        }

        workbook.save(path)
    }
}

fn write_table(
    worksheet: &mut Worksheet,
    placed: &PlacedTable,
    header_format: &Format,
    number_format: &Format,
) -> std::result::Result<(), XlsxError> {
    let start = placed.start_row;
    for (col, title) in placed.table.header.iter().enumerate() {
        worksheet.write_string_with_format(start, col as u16, title, header_format)?;
    }
    for (r, row) in placed.table.rows.iter().enumerate() {
        let sheet_row = start + 1 + r as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                ReportCell::Empty => {}
                ReportCell::Text(text) => {
                    worksheet.write_string(sheet_row, col, text)?;
                }
                ReportCell::Number(n) => {
                    worksheet.write_number_with_format(sheet_row, col, *n, number_format)?;
                }
                ReportCell::Integer(i) => {
                    worksheet.write_number(sheet_row, col, *i)?;
                }
            }
        }
    }
    Ok(())
}
