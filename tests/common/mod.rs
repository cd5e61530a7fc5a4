//! Builders for survey workbooks written to disk.

#![allow(dead_code)]

use deficiency_rater::catalog::{DISCIPLINES, SURVEY_DEFICIENCIES, THEORY_DEFICIENCY};
use deficiency_rater::validator::{LABEL_HEADER, MARKER_TEXT};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

/// A survey sheet laid out the way respondents receive it. Weights and
/// scores are in sheet order, columns 2..=8.
#[derive(Debug, Clone)]
pub struct SurveyFixture {
    pub header: String,
    pub label_suffix: String,
    pub weights: [f64; 7],
    pub scores: [[f64; 7]; 13],
    pub extra_rows: u32,
    pub extra_columns: u16,
}

impl Default for SurveyFixture {
    fn default() -> Self {
        Self {
            header: LABEL_HEADER.to_string(),
            label_suffix: String::new(),
            weights: [5.0; 7],
            scores: [[1.0; 7]; 13],
            extra_rows: 0,
            extra_columns: 0,
        }
    }
}

impl SurveyFixture {
    pub fn uniform(weight: f64, score: f64) -> Self {
        Self {
            weights: [weight; 7],
            scores: [[score; 7]; 13],
            ..Default::default()
        }
    }

    /// Sets every score of one discipline (0-based catalog position).
    pub fn with_discipline_score(mut self, discipline: usize, score: f64) -> Self {
        self.scores[discipline] = [score; 7];
        self
    }

    pub fn write(&self, path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write_string(0, 2, &self.header)?;

        // Body rows start on sheet row 1.
        sheet.write_string(1, 1, MARKER_TEXT)?;
        sheet.write_string(1, 2, format!("{THEORY_DEFICIENCY}{}", self.label_suffix))?;
        for (i, label) in SURVEY_DEFICIENCIES.iter().enumerate() {
            sheet.write_string(1, 3 + i as u16, format!("{label}{}", self.label_suffix))?;
        }

        sheet.write_string(2, 1, "Важность")?;
        for (i, weight) in self.weights.iter().enumerate() {
            sheet.write_number(2, 2 + i as u16, *weight)?;
        }

        for (d, name) in DISCIPLINES.iter().enumerate() {
            let row = 4 + d as u32;
            sheet.write_number(row, 0, (d + 1) as f64)?;
            sheet.write_string(row, 1, *name)?;
            for (i, score) in self.scores[d].iter().enumerate() {
                sheet.write_number(row, 2 + i as u16, *score)?;
            }
        }

        let last_row = 4 + DISCIPLINES.len() as u32;
        for extra in 0..self.extra_rows {
            sheet.write_string(last_row + extra, 1, "примечание")?;
        }
        for extra in 0..self.extra_columns {
            sheet.write_string(1, 9 + extra, "комментарий")?;
        }

        workbook.save(path)
    }
}
