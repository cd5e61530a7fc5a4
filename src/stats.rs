//! Per-file weighted scoring of a validated survey.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::analyzers::rank::competition_ranks;
use crate::catalog::DISCIPLINES;
use crate::validator::ValidatedTable;

/// Weighted total of one discipline within one survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineResult {
    pub name: String,
    pub total: f64,
    pub rank: u32,
}

/// Weighted total of one deficiency within one survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeficiencyResult {
    pub label: String,
    pub weight: f64,
    pub score_sum: f64,
    pub weighted_total: f64,
    pub rank: u32,
}

/// Both result sets computed from one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileScores {
    pub source: PathBuf,
    pub disciplines: Vec<DisciplineResult>,
    pub deficiencies: Vec<DeficiencyResult>,
}

impl FileScores {
    pub fn from_table(source: &Path, table: &ValidatedTable) -> Self {
        FileScores {
            source: source.to_path_buf(),
            disciplines: discipline_results(table),
            deficiencies: deficiency_results(table),
        }
    }
}

/// Sum of products of importance weights and scores, per discipline, in
/// catalog order.
pub fn discipline_results(table: &ValidatedTable) -> Vec<DisciplineResult> {
    let importance = table.importance();
    let totals: Vec<f64> = table
        .scores()
        .iter()
        .map(|row| row.iter().zip(importance).map(|(s, w)| s * w).sum())
        .collect();
    let ranks = competition_ranks(&totals);

    DISCIPLINES
        .iter()
        .zip(totals)
        .zip(ranks)
        .map(|((name, total), rank)| DisciplineResult {
            name: name.to_string(),
            total,
            rank,
        })
        .collect()
}

/// Column sums of scores multiplied by their importance weight, per
/// deficiency, in catalog order.
pub fn deficiency_results(table: &ValidatedTable) -> Vec<DeficiencyResult> {
    let importance = table.importance();
    let sums: Vec<f64> = (0..importance.len())
        .map(|j| table.scores().iter().map(|row| row[j]).sum())
        .collect();
    let weighted: Vec<f64> = sums.iter().zip(importance).map(|(s, w)| s * w).collect();
    let ranks = competition_ranks(&weighted);

    table
        .labels()
        .iter()
        .enumerate()
        .map(|(j, label)| DeficiencyResult {
            label: label.to_string(),
            weight: importance[j],
            score_sum: sums[j],
            weighted_total: weighted[j],
            rank: ranks[j],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        DISCIPLINE_COUNT, DeficiencyCatalog, THEORY_DEFICIENCY, TheoryPlacement, WEIGHTED_COLUMNS,
    };

    fn table(importance: [f64; 7], scores: [[f64; 7]; 13]) -> ValidatedTable {
        ValidatedTable::new(&DeficiencyCatalog::default(), importance, scores).unwrap()
    }

    #[test]
    fn test_uniform_survey_is_a_full_tie() {
        let results = discipline_results(&table([10.0; 7], [[5.0; 7]; 13]));

        assert_eq!(results.len(), DISCIPLINE_COUNT);
        for r in &results {
            assert_eq!(r.total, 350.0);
            assert_eq!(r.rank, 1);
        }
        assert_eq!(results[2].name, "Алгебра");
    }

    #[test]
    fn test_discipline_totals_use_all_seven_columns() {
        let mut scores = [[0.0; 7]; 13];
        scores[0] = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        scores[1] = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0];
        let results = discipline_results(&table([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], scores));

        assert_eq!(results[0].total, 28.0);
        assert_eq!(results[1].total, 70.0);
        assert_eq!(results[1].rank, 1);
        assert_eq!(results[0].rank, 2);
        // Eleven disciplines tie at zero after the two ranked ones.
        assert!(results[2..].iter().all(|r| r.total == 0.0 && r.rank == 3));
    }

    #[test]
    fn test_deficiency_totals() {
        let mut scores = [[1.0; 7]; 13];
        scores[4][2] = 10.0;
        let results = deficiency_results(&table([2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0], scores));

        assert_eq!(results.len(), WEIGHTED_COLUMNS);
        assert_eq!(results[2].score_sum, 22.0);
        assert_eq!(results[2].weighted_total, 44.0);
        assert_eq!(results[2].rank, 1);
        assert_eq!(results[0].weighted_total, 26.0);
        assert_eq!(results[0].rank, 2);
        assert_eq!(results[6].label, THEORY_DEFICIENCY);
        assert_eq!(results[6].weight, 0.0);
        assert_eq!(results[6].rank, 7);
    }

    #[test]
    fn test_deficiency_labels_follow_catalog_placement() {
        let catalog = DeficiencyCatalog::new(TheoryPlacement::Leading);
        let table = ValidatedTable::new(&catalog, [1.0; 7], [[1.0; 7]; 13]).unwrap();
        let results = deficiency_results(&table);

        assert_eq!(results[0].label, THEORY_DEFICIENCY);
    }

    #[test]
    fn test_file_scores() {
        let scores = FileScores::from_table(Path::new("a.xlsx"), &table([1.0; 7], [[1.0; 7]; 13]));

        assert_eq!(scores.source, PathBuf::from("a.xlsx"));
        assert_eq!(scores.disciplines.len(), 13);
        assert_eq!(scores.deficiencies.len(), 7);
    }
}
