//! Data types produced by the aggregation pipeline.

use serde::Serialize;
use std::path::PathBuf;

/// Mean and sample standard deviation of one metric across files.
///
/// `stddev` is `None` when only one file contributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub stddev: Option<f64>,
}

/// Aggregated result for a single discipline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineAggregate {
    pub name: String,
    pub samples: usize,
    pub total: Summary,
    pub rank: u32,
}

/// Aggregated result for a single deficiency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeficiencyAggregate {
    pub label: String,
    pub samples: usize,
    pub weight: Summary,
    pub score_sum: Summary,
    pub weighted_total: Summary,
    pub rank: u32,
}

/// A file that was skipped, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub kind: &'static str,
    pub message: String,
}

/// Outcome of a complete rating run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub discovered: usize,
    pub processed: usize,
    pub skipped: Vec<SkippedFile>,
    pub output: PathBuf,
    pub disciplines: Vec<DisciplineAggregate>,
    pub deficiencies: Vec<DeficiencyAggregate>,
}
