//! Survey sheet validation.
//!
//! [`SheetValidator`] checks a [`RawTable`] against the fixed survey template
//! and, on success, produces a [`ValidatedTable`]. The checks run in a fixed
//! order and stop at the first failure.
//!
//! ```text
//!            col 0     col 1         col 2          cols 3..=8
//! header                             Недостаток
//! body 0               NB! marker    (theory)       six deficiency labels
//! body 1                             weight         weights
//! body 2     (blank)
//! body 3..=15  1..13   discipline    score          scores
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::analyzers::utility::mean;
use crate::catalog::{
    DISCIPLINE_COUNT, DeficiencyCatalog, FIRST_DEFICIENCY_COLUMN, LABEL_COLUMN,
    SURVEY_DEFICIENCIES, WEIGHTED_COLUMNS,
};
use crate::table::{Cell, RawTable};

pub const EXPECTED_COLUMNS: usize = 9;
pub const EXPECTED_BODY_ROWS: usize = 16;

/// Header text of the label column.
pub const LABEL_HEADER: &str = "Недостаток";

/// Marker text the survey template carries next to the deficiency labels.
pub const MARKER_TEXT: &str = "NB! Все числа - положительные!";

const LABEL_ROW: usize = 0;
const MARKER_COLUMN: usize = 1;
const IMPORTANCE_ROW: usize = 1;
const ORDINAL_COLUMN: usize = 0;
const FIRST_DISCIPLINE_ROW: usize = 3;

pub const MIN_VALUE: f64 = 0.0;
pub const MAX_VALUE: f64 = 10.0;

/// How strictly the sheet dimensions are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Exactly 9 columns and 16 body rows.
    Strict,
    /// At least 9 columns and 16 body rows; anything beyond is ignored.
    #[default]
    Tolerant,
}

impl ValidationMode {
    fn accepts(&self, expected: usize, found: usize) -> bool {
        match self {
            ValidationMode::Strict => found == expected,
            ValidationMode::Tolerant => found >= expected,
        }
    }

    fn describe(&self, expected: usize) -> String {
        match self {
            ValidationMode::Strict => expected.to_string(),
            ValidationMode::Tolerant => format!("at least {expected}"),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "tolerant" => Ok(Self::Tolerant),
            other => Err(format!(
                "unknown validation mode '{other}' (expected 'strict' or 'tolerant')"
            )),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Strict => f.write_str("strict"),
            ValidationMode::Tolerant => f.write_str("tolerant"),
        }
    }
}

/// Why a cell failed numeric validation.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericFault {
    Missing,
    NotANumber(String),
    OutOfRange(f64),
}

impl fmt::Display for NumericFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericFault::Missing => f.write_str("value is missing"),
            NumericFault::NotANumber(found) => write!(f, "{found} is not a number"),
            NumericFault::OutOfRange(v) => {
                write!(f, "{v} is outside [{MIN_VALUE}, {MAX_VALUE}]")
            }
        }
    }
}

/// A failed layout or data check. Rows are 0-based body rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: String, found: usize },

    #[error("column {column} header: expected {expected}, found {found}")]
    Header {
        column: usize,
        expected: String,
        found: String,
    },

    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: String, found: usize },

    #[error("deficiency label in column {column}: expected {expected:?}, found {found}")]
    DeficiencyLabel {
        column: usize,
        expected: String,
        found: String,
    },

    #[error("marker cell: expected {expected:?}, found {found}")]
    Marker { expected: String, found: String },

    #[error("importance weight in column {column}: {fault}")]
    Importance { column: usize, fault: NumericFault },

    #[error("discipline number in row {row}: expected {expected}, found {found}")]
    Ordinal {
        row: usize,
        expected: f64,
        found: String,
    },

    #[error("score in row {row}, column {column}: {fault}")]
    Score {
        row: usize,
        column: usize,
        fault: NumericFault,
    },
}

impl ValidationError {
    /// Layout problems, as opposed to bad weights or scores.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ValidationError::Importance { .. } | ValidationError::Score { .. }
        )
    }
}

/// Importance weights and scores of one survey, in catalog column order.
///
/// Every value is finite and within `[0, 10]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    labels: [&'static str; WEIGHTED_COLUMNS],
    importance: [f64; WEIGHTED_COLUMNS],
    scores: [[f64; WEIGHTED_COLUMNS]; DISCIPLINE_COUNT],
}

impl ValidatedTable {
    /// Builds a table from values already in catalog order.
    pub fn new(
        catalog: &DeficiencyCatalog,
        importance: [f64; WEIGHTED_COLUMNS],
        scores: [[f64; WEIGHTED_COLUMNS]; DISCIPLINE_COUNT],
    ) -> Result<Self, ValidationError> {
        let columns = catalog.sheet_columns();
        for (j, &weight) in importance.iter().enumerate() {
            check_range(weight).map_err(|fault| ValidationError::Importance {
                column: columns[j],
                fault,
            })?;
        }
        for (i, row) in scores.iter().enumerate() {
            for (j, &score) in row.iter().enumerate() {
                check_range(score).map_err(|fault| ValidationError::Score {
                    row: FIRST_DISCIPLINE_ROW + i,
                    column: columns[j],
                    fault,
                })?;
            }
        }
        Ok(Self {
            labels: catalog.labels(),
            importance,
            scores,
        })
    }

    /// Cell-wise mean of several tables sharing the same deficiency labels.
    ///
    /// Returns `None` for an empty slice or mismatched labels.
    pub fn mean_of(tables: &[ValidatedTable]) -> Option<ValidatedTable> {
        let labels = tables.first()?.labels;

        // Column of every table matching each label of the first one.
        let columns: Vec<[usize; WEIGHTED_COLUMNS]> = tables
            .iter()
            .map(|table| {
                let mut columns = [0; WEIGHTED_COLUMNS];
                for (slot, label) in columns.iter_mut().zip(&labels) {
                    *slot = table.labels.iter().position(|l| l == label)?;
                }
                Some(columns)
            })
            .collect::<Option<_>>()?;

        let cells = || tables.iter().zip(&columns);
        let mut importance = [0.0; WEIGHTED_COLUMNS];
        let mut scores = [[0.0; WEIGHTED_COLUMNS]; DISCIPLINE_COUNT];
        for j in 0..WEIGHTED_COLUMNS {
            importance[j] = sorted_mean(cells().map(|(t, c)| t.importance[c[j]]));
            for (i, row) in scores.iter_mut().enumerate() {
                row[j] = sorted_mean(cells().map(|(t, c)| t.scores[i][c[j]]));
            }
        }

        Some(ValidatedTable {
            labels,
            importance,
            scores,
        })
    }

    pub fn labels(&self) -> &[&'static str; WEIGHTED_COLUMNS] {
        &self.labels
    }

    pub fn importance(&self) -> &[f64; WEIGHTED_COLUMNS] {
        &self.importance
    }

    pub fn scores(&self) -> &[[f64; WEIGHTED_COLUMNS]; DISCIPLINE_COUNT] {
        &self.scores
    }
}

/// Checks raw survey sheets against the template.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetValidator {
    mode: ValidationMode,
    catalog: DeficiencyCatalog,
}

impl SheetValidator {
    pub fn new(mode: ValidationMode, catalog: DeficiencyCatalog) -> Self {
        Self { mode, catalog }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn catalog(&self) -> &DeficiencyCatalog {
        &self.catalog
    }

    pub fn validate(&self, table: &RawTable) -> Result<ValidatedTable, ValidationError> {
        self.check_column_count(table)?;
        check_headers(table)?;
        self.check_row_count(table)?;
        check_deficiency_labels(table)?;
        check_marker(table)?;
        let importance = self.read_importance(table)?;
        check_ordinals(table)?;
        let scores = self.read_scores(table)?;

        Ok(ValidatedTable {
            labels: self.catalog.labels(),
            importance,
            scores,
        })
    }

    fn check_column_count(&self, table: &RawTable) -> Result<(), ValidationError> {
        let found = table.column_count();
        if self.mode.accepts(EXPECTED_COLUMNS, found) {
            Ok(())
        } else {
            Err(ValidationError::ColumnCount {
                expected: self.mode.describe(EXPECTED_COLUMNS),
                found,
            })
        }
    }

    fn check_row_count(&self, table: &RawTable) -> Result<(), ValidationError> {
        let found = table.body_row_count();
        if self.mode.accepts(EXPECTED_BODY_ROWS, found) {
            Ok(())
        } else {
            Err(ValidationError::RowCount {
                expected: self.mode.describe(EXPECTED_BODY_ROWS),
                found,
            })
        }
    }

    fn read_importance(
        &self,
        table: &RawTable,
    ) -> Result<[f64; WEIGHTED_COLUMNS], ValidationError> {
        let mut importance = [0.0; WEIGHTED_COLUMNS];
        for (slot, column) in importance.iter_mut().zip(self.catalog.sheet_columns()) {
            *slot = number_in_range(table.body(IMPORTANCE_ROW, column))
                .map_err(|fault| ValidationError::Importance { column, fault })?;
        }
        Ok(importance)
    }

    fn read_scores(
        &self,
        table: &RawTable,
    ) -> Result<[[f64; WEIGHTED_COLUMNS]; DISCIPLINE_COUNT], ValidationError> {
        let columns = self.catalog.sheet_columns();
        let mut scores = [[0.0; WEIGHTED_COLUMNS]; DISCIPLINE_COUNT];
        for (i, scores_row) in scores.iter_mut().enumerate() {
            let row = FIRST_DISCIPLINE_ROW + i;
            for (slot, &column) in scores_row.iter_mut().zip(columns.iter()) {
                *slot = number_in_range(table.body(row, column))
                    .map_err(|fault| ValidationError::Score { row, column, fault })?;
            }
        }
        Ok(scores)
    }
}

fn check_headers(table: &RawTable) -> Result<(), ValidationError> {
    for column in 0..EXPECTED_COLUMNS {
        let cell = table.header(column);
        let matches = if column == LABEL_COLUMN {
            cell.trimmed_text() == Some(LABEL_HEADER)
        } else {
            cell.is_blank()
        };
        if !matches {
            let expected = if column == LABEL_COLUMN {
                format!("{LABEL_HEADER:?}")
            } else {
                "an unnamed column".to_string()
            };
            return Err(ValidationError::Header {
                column,
                expected,
                found: cell.to_string(),
            });
        }
    }
    Ok(())
}

fn check_deficiency_labels(table: &RawTable) -> Result<(), ValidationError> {
    for (i, expected) in SURVEY_DEFICIENCIES.iter().enumerate() {
        let column = FIRST_DEFICIENCY_COLUMN + i;
        let cell = table.body(LABEL_ROW, column);
        if cell.trimmed_text() != Some(*expected) {
            return Err(ValidationError::DeficiencyLabel {
                column,
                expected: expected.to_string(),
                found: cell.to_string(),
            });
        }
    }
    Ok(())
}

fn check_marker(table: &RawTable) -> Result<(), ValidationError> {
    let cell = table.body(LABEL_ROW, MARKER_COLUMN);
    if cell.trimmed_text() == Some(MARKER_TEXT) {
        Ok(())
    } else {
        Err(ValidationError::Marker {
            expected: MARKER_TEXT.to_string(),
            found: cell.to_string(),
        })
    }
}

fn check_ordinals(table: &RawTable) -> Result<(), ValidationError> {
    for i in 0..DISCIPLINE_COUNT {
        let row = FIRST_DISCIPLINE_ROW + i;
        let expected = (i + 1) as f64;
        let cell = table.body(row, ORDINAL_COLUMN);
        if !matches!(cell, Cell::Number(n) if *n == expected) {
            return Err(ValidationError::Ordinal {
                row,
                expected,
                found: cell.to_string(),
            });
        }
    }
    Ok(())
}

/// Mean taken in sorted order, so it does not depend on input order.
fn sorted_mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    mean(&values)
}

fn number_in_range(cell: &Cell) -> Result<f64, NumericFault> {
    if cell.is_blank() {
        return Err(NumericFault::Missing);
    }
    let value = cell
        .as_number()
        .ok_or_else(|| NumericFault::NotANumber(cell.to_string()))?;
    check_range(value)
}

fn check_range(value: f64) -> Result<f64, NumericFault> {
    if value.is_finite() && (MIN_VALUE..=MAX_VALUE).contains(&value) {
        Ok(value)
    } else {
        Err(NumericFault::OutOfRange(value))
    }
}
