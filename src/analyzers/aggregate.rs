use crate::analyzers::rank::competition_ranks;
use crate::analyzers::types::{DeficiencyAggregate, DisciplineAggregate, Summary};
use crate::analyzers::utility::{mean, sample_stddev};
use crate::catalog::{DISCIPLINES, DeficiencyCatalog};
use crate::stats::{DeficiencyResult, DisciplineResult};
use std::collections::HashMap;
use thiserror::Error;

/// Returned when there is nothing to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no per-file results to aggregate")]
pub struct NoResults;

#[derive(Default)]
struct DeficiencySeries {
    weight: Vec<f64>,
    score_sum: Vec<f64>,
    weighted_total: Vec<f64>,
}

/// Combines per-file results into mean / standard deviation summaries.
///
/// Results are grouped by name, so files may list entities in any order.
/// Output rows follow catalog order and are ranked on the mean.
pub fn aggregate(
    discipline_sets: &[Vec<DisciplineResult>],
    deficiency_sets: &[Vec<DeficiencyResult>],
    catalog: &DeficiencyCatalog,
) -> Result<(Vec<DisciplineAggregate>, Vec<DeficiencyAggregate>), NoResults> {
    if discipline_sets.is_empty() || deficiency_sets.is_empty() {
        return Err(NoResults);
    }

    Ok((
        aggregate_disciplines(discipline_sets),
        aggregate_deficiencies(deficiency_sets, catalog),
    ))
}

/// Aggregates discipline totals across files.
pub fn aggregate_disciplines(sets: &[Vec<DisciplineResult>]) -> Vec<DisciplineAggregate> {
    let mut series: HashMap<&str, Vec<f64>> = HashMap::new();
    for result in sets.iter().flatten() {
        series.entry(result.name.as_str()).or_default().push(result.total);
    }

    let names = canonical_order(series.keys().copied(), &DISCIPLINES);
    let summaries: Vec<(usize, Summary)> = names
        .iter()
        .map(|name| {
            let values = &series[name];
            (values.len(), summarize(values))
        })
        .collect();
    let ranks = competition_ranks(&summaries.iter().map(|(_, s)| s.mean).collect::<Vec<_>>());

    names
        .into_iter()
        .zip(summaries)
        .zip(ranks)
        .map(|((name, (samples, total)), rank)| DisciplineAggregate {
            name: name.to_string(),
            samples,
            total,
            rank,
        })
        .collect()
}

/// Aggregates deficiency weights, score sums and weighted totals across files.
pub fn aggregate_deficiencies(
    sets: &[Vec<DeficiencyResult>],
    catalog: &DeficiencyCatalog,
) -> Vec<DeficiencyAggregate> {
    let mut series: HashMap<&str, DeficiencySeries> = HashMap::new();
    for result in sets.iter().flatten() {
        let entry = series.entry(result.label.as_str()).or_default();
        entry.weight.push(result.weight);
        entry.score_sum.push(result.score_sum);
        entry.weighted_total.push(result.weighted_total);
    }

    let labels = canonical_order(series.keys().copied(), &catalog.labels());
    let mut rows: Vec<DeficiencyAggregate> = labels
        .into_iter()
        .map(|label| {
            let s = &series[label];
            DeficiencyAggregate {
                label: label.to_string(),
                samples: s.weighted_total.len(),
                weight: summarize(&s.weight),
                score_sum: summarize(&s.score_sum),
                weighted_total: summarize(&s.weighted_total),
                rank: 0,
            }
        })
        .collect();

    let means: Vec<f64> = rows.iter().map(|r| r.weighted_total.mean).collect();
    for (row, rank) in rows.iter_mut().zip(competition_ranks(&means)) {
        row.rank = rank;
    }
    rows
}

/// Reduces a series in sorted order so the result does not depend on the
/// order files were read in.
fn summarize(values: &[f64]) -> Summary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let avg = mean(&sorted);
    Summary {
        mean: avg,
        stddev: sample_stddev(&sorted, avg),
    }
}

/// Sorts labels by catalog position; labels outside the catalog follow,
/// alphabetically.
fn canonical_order<'a>(labels: impl Iterator<Item = &'a str>, catalog: &[&str]) -> Vec<&'a str> {
    let mut labels: Vec<&str> = labels.collect();
    labels.sort_by_key(|label| {
        (
            catalog.iter().position(|c| c == label).unwrap_or(usize::MAX),
            *label,
        )
    });
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SURVEY_DEFICIENCIES, THEORY_DEFICIENCY, TheoryPlacement};
    use crate::stats::{deficiency_results, discipline_results};
    use crate::validator::ValidatedTable;

    fn disciplines(totals: &[f64; 13]) -> Vec<DisciplineResult> {
        let ranks = competition_ranks(totals);
        DISCIPLINES
            .iter()
            .zip(totals)
            .zip(ranks)
            .map(|((name, total), rank)| DisciplineResult {
                name: name.to_string(),
                total: *total,
                rank,
            })
            .collect()
    }

    fn survey(importance: f64, score: f64) -> ValidatedTable {
        ValidatedTable::new(
            &DeficiencyCatalog::default(),
            [importance; 7],
            [[score; 7]; 13],
        )
        .unwrap()
    }

    #[test]
    fn test_two_file_mean_and_stddev() {
        let mut a = [50.0; 13];
        let mut b = [50.0; 13];
        a[2] = 100.0;
        b[2] = 200.0;

        let rows = aggregate_disciplines(&[disciplines(&a), disciplines(&b)]);
        let algebra = &rows[2];

        assert_eq!(algebra.name, "Алгебра");
        assert_eq!(algebra.samples, 2);
        assert_eq!(algebra.total.mean, 150.0);
        let sd = algebra.total.stddev.unwrap();
        assert!((sd - 70.71).abs() < 0.01);
        assert_eq!(algebra.rank, 1);
        assert_eq!(rows[0].total.stddev, Some(0.0));
        assert_eq!(rows[0].rank, 2);
    }

    #[test]
    fn test_single_file_matches_its_own_results() {
        let table = survey(3.0, 4.0);
        let mut scores = *table.scores();
        scores[5][1] = 9.0;
        let table = ValidatedTable::new(&DeficiencyCatalog::default(), *table.importance(), scores)
            .unwrap();
        let per_file_disciplines = discipline_results(&table);
        let per_file_deficiencies = deficiency_results(&table);

        let (d, f) = aggregate(
            &[per_file_disciplines.clone()],
            &[per_file_deficiencies.clone()],
            &DeficiencyCatalog::default(),
        )
        .unwrap();

        for (agg, single) in d.iter().zip(&per_file_disciplines) {
            assert_eq!(agg.name, single.name);
            assert_eq!(agg.total.mean, single.total);
            assert_eq!(agg.total.stddev, None);
            assert_eq!(agg.rank, single.rank);
        }
        for (agg, single) in f.iter().zip(&per_file_deficiencies) {
            assert_eq!(agg.label, single.label);
            assert_eq!(agg.weighted_total.mean, single.weighted_total);
            assert_eq!(agg.rank, single.rank);
        }
    }

    #[test]
    fn test_aggregation_ignores_file_order() {
        // Equal means whose floating-point sums differ with summation order.
        let mut files: Vec<Vec<DisciplineResult>> = [(0.1, 0.3), (0.2, 0.2), (0.3, 0.1)]
            .iter()
            .map(|&(a, b)| {
                let mut totals = [0.0; 13];
                totals[0] = a;
                totals[1] = b;
                disciplines(&totals)
            })
            .collect();

        let forward = aggregate_disciplines(&files);
        files.reverse();
        let backward = aggregate_disciplines(&files);

        assert_eq!(forward, backward);
        assert_eq!(forward[0].total.mean, forward[1].total.mean);
        assert_eq!(forward[0].rank, 1);
        assert_eq!(forward[1].rank, 1);
    }

    #[test]
    fn test_full_aggregation_ignores_file_order() {
        let tables = [survey(1.0, 2.0), survey(7.0, 9.0), survey(10.0, 0.5)];
        let discipline_sets: Vec<_> = tables.iter().map(discipline_results).collect();
        let deficiency_sets: Vec<_> = tables.iter().map(deficiency_results).collect();

        let forward = aggregate(&discipline_sets, &deficiency_sets, &DeficiencyCatalog::default());

        let mut d_rev = discipline_sets.clone();
        let mut f_rev = deficiency_sets.clone();
        d_rev.reverse();
        f_rev.rotate_left(1);
        let backward = aggregate(&d_rev, &f_rev, &DeficiencyCatalog::default());

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_rows_are_restored_to_catalog_order() {
        let mut shuffled = deficiency_results(&survey(2.0, 3.0));
        shuffled.reverse();
        let mut results = disciplines(&[1.0; 13]);
        results.rotate_left(5);

        let discipline_rows = aggregate_disciplines(&[results]);
        let deficiency_rows = aggregate_deficiencies(&[shuffled], &DeficiencyCatalog::default());

        let names: Vec<_> = discipline_rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, DISCIPLINES);
        assert_eq!(deficiency_rows[0].label, SURVEY_DEFICIENCIES[0]);
        assert_eq!(deficiency_rows[6].label, THEORY_DEFICIENCY);
    }

    #[test]
    fn test_leading_placement_orders_deficiencies_theory_first() {
        let catalog = DeficiencyCatalog::new(TheoryPlacement::Leading);
        let table = ValidatedTable::new(&catalog, [2.0; 7], [[3.0; 7]; 13]).unwrap();
        let mut shuffled = deficiency_results(&table);
        shuffled.rotate_left(3);

        let rows = aggregate_deficiencies(&[shuffled], &catalog);
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();

        assert_eq!(labels, catalog.labels());
        assert_eq!(labels[0], THEORY_DEFICIENCY);
        assert_eq!(labels[1..], SURVEY_DEFICIENCIES);
    }

    #[test]
    fn test_unknown_labels_follow_catalog() {
        let mut results = disciplines(&[1.0; 13]);
        results.push(DisciplineResult {
            name: "Физкультура".into(),
            total: 5.0,
            rank: 1,
        });

        let rows = aggregate_disciplines(&[results]);
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[13].name, "Физкультура");
        assert_eq!(rows[13].rank, 1);
        assert_eq!(rows[0].rank, 2);
    }

    #[test]
    fn test_nothing_to_aggregate() {
        assert_eq!(
            aggregate(&[], &[], &DeficiencyCatalog::default()),
            Err(NoResults)
        );
    }
}
