//! Report layout: which tables go where on the results sheet, and which
//! charts accompany them.
//!
//! The assembler only arranges already-computed results. Writing the sheet
//! and drawing the charts is left to [`crate::output`].

use serde::Serialize;

use crate::analyzers::types::{DeficiencyAggregate, DisciplineAggregate, Summary};
use crate::catalog::DISCIPLINES;
use crate::validator::{MAX_VALUE, ValidatedTable};

pub const SHEET_NAME: &str = "Results";

/// Blank rows between consecutive tables.
pub const TABLE_GAP: u32 = 2;

/// Rows reserved for each chart below the tables.
pub const CHART_ROWS: u32 = 20;

/// Decimal places shown on chart value labels.
pub const CHART_LABEL_DECIMALS: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReportCell {
    Empty,
    Text(String),
    Number(f64),
    Integer(u32),
}

impl From<Option<f64>> for ReportCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ReportCell::Empty, ReportCell::Number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl ReportTable {
    /// Rows occupied on the sheet, header included.
    pub fn height(&self) -> u32 {
        1 + self.rows.len() as u32
    }
}

/// A table and the sheet row its header starts on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTable {
    pub start_row: u32,
    pub table: ReportTable,
}

/// A rectangular column range on the results sheet, rows inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSpan {
    pub first_row: u32,
    pub last_row: u32,
    pub column: u16,
}

/// A bar chart of one value per category, plotted from cells of a placed
/// table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub category_range: CellSpan,
    pub value_range: CellSpan,
    pub anchor_row: u32,
    pub anchor_column: u16,
}

impl ChartSpec {
    /// Excel number format of the value labels.
    pub fn label_format(&self) -> String {
        format!("0.{}", "0".repeat(CHART_LABEL_DECIMALS))
    }
}

/// Everything that goes on the results sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLayout {
    pub sheet_name: String,
    pub tables: Vec<PlacedTable>,
    pub charts: Vec<ChartSpec>,
}

/// Arranges aggregate tables and charts on the results sheet.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    tables: Vec<PlacedTable>,
    next_row: u32,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays out the report. `mean_cells`, when given, is placed first.
    pub fn assemble(
        disciplines: &[DisciplineAggregate],
        deficiencies: &[DeficiencyAggregate],
        mean_cells: Option<&ValidatedTable>,
    ) -> ReportLayout {
        let mut assembler = ReportAssembler::new();

        if let Some(table) = mean_cells {
            assembler.place(mean_cell_table(table));
        }
        let discipline_row = assembler.place(discipline_table(disciplines));
        let deficiency_row = assembler.place(deficiency_table(deficiencies));

        let mut charts = Vec::with_capacity(2);
        let mut anchor_row = assembler.next_row;

        charts.push(ChartSpec {
            title: "Средний СУММПРОИЗВ по дисциплинам".to_string(),
            category_range: data_span(discipline_row, disciplines.len(), 0),
            value_range: data_span(discipline_row, disciplines.len(), 1),
            anchor_row,
            anchor_column: 0,
        });
        anchor_row += CHART_ROWS;

        charts.push(ChartSpec {
            title: "Средняя взвешенная сумма по недостаткам".to_string(),
            category_range: data_span(deficiency_row, deficiencies.len(), 0),
            value_range: data_span(deficiency_row, deficiencies.len(), 4),
            anchor_row,
            anchor_column: 0,
        });

        ReportLayout {
            sheet_name: SHEET_NAME.to_string(),
            tables: assembler.tables,
            charts,
        }
    }

    /// Places a table below the previous one and returns its start row.
    fn place(&mut self, table: ReportTable) -> u32 {
        let start_row = self.next_row;
        self.next_row = start_row + table.height() + TABLE_GAP;
        self.tables.push(PlacedTable { start_row, table });
        start_row
    }
}

fn data_span(start_row: u32, rows: usize, column: u16) -> CellSpan {
    CellSpan {
        first_row: start_row + 1,
        last_row: start_row + rows.max(1) as u32,
        column,
    }
}

fn discipline_table(rows: &[DisciplineAggregate]) -> ReportTable {
    ReportTable {
        header: vec![
            "Дисциплина".into(),
            "СУММПРОИЗВ (среднее)".into(),
            "СУММПРОИЗВ (ст. откл.)".into(),
            "Ранг".into(),
            "Анкет".into(),
        ],
        rows: rows
            .iter()
            .map(|r| {
                let mut cells = vec![ReportCell::Text(r.name.clone())];
                push_summary(&mut cells, &r.total);
                cells.push(ReportCell::Integer(r.rank));
                cells.push(ReportCell::Integer(r.samples as u32));
                cells
            })
            .collect(),
    }
}

fn deficiency_table(rows: &[DeficiencyAggregate]) -> ReportTable {
    ReportTable {
        header: vec![
            "Недостаток".into(),
            "Веса (среднее)".into(),
            "Веса (ст. откл.)".into(),
            "Сумма оценок (среднее)".into(),
            "Взвешенная сумма (среднее)".into(),
            "Взвешенная сумма (ст. откл.)".into(),
            "Ранг".into(),
        ],
        rows: rows
            .iter()
            .map(|r| {
                let mut cells = vec![ReportCell::Text(r.label.clone())];
                push_summary(&mut cells, &r.weight);
                cells.push(ReportCell::Number(r.score_sum.mean));
                push_summary(&mut cells, &r.weighted_total);
                cells.push(ReportCell::Integer(r.rank));
                cells
            })
            .collect(),
    }
}

fn push_summary(cells: &mut Vec<ReportCell>, summary: &Summary) {
    cells.push(ReportCell::Number(summary.mean));
    cells.push(summary.stddev.into());
}

/// Absolute and relative (percent of the maximum) negative rating of every
/// discipline.
pub fn negative_ratings(table: &ValidatedTable) -> Vec<(f64, f64)> {
    let importance = table.importance();
    let maximum: f64 = importance.iter().map(|w| w * MAX_VALUE).sum();

    table
        .scores()
        .iter()
        .map(|row| {
            let absolute: f64 = row.iter().zip(importance).map(|(s, w)| s * w).sum();
            let relative = if maximum == 0.0 {
                0.0
            } else {
                absolute / maximum * 100.0
            };
            (absolute, relative)
        })
        .collect()
}

/// The survey grid rebuilt from cell-wise means, with negative ratings.
fn mean_cell_table(table: &ValidatedTable) -> ReportTable {
    let mut header = vec!["№".to_string(), "Дисциплина".to_string()];
    header.extend(table.labels().iter().map(|l| l.to_string()));
    header.push("Отрицательный рейтинг".into());
    header.push("Отрицательный рейтинг, %".into());

    let mut importance_row = vec![ReportCell::Empty, ReportCell::Text("Важность".into())];
    importance_row.extend(table.importance().iter().map(|w| ReportCell::Number(*w)));
    importance_row.extend([ReportCell::Empty, ReportCell::Empty]);

    let mut rows = vec![importance_row];
    for (i, (scores, (absolute, relative))) in table
        .scores()
        .iter()
        .zip(negative_ratings(table))
        .enumerate()
    {
        let mut row = vec![
            ReportCell::Integer(i as u32 + 1),
            ReportCell::Text(DISCIPLINES[i].to_string()),
        ];
        row.extend(scores.iter().map(|s| ReportCell::Number(*s)));
        row.push(ReportCell::Number(absolute));
        row.push(ReportCell::Number(relative));
        rows.push(row);
    }

    ReportTable { header, rows }
}
