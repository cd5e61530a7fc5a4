//! Cross-file aggregation and the rating run.
//!
//! This module groups per-file results by entity, computes mean and sample
//! standard deviation for every metric, ranks entities on the mean, and
//! drives a complete run from input directory to report.

pub mod aggregate;
pub mod analyzer;
pub mod rank;
pub mod types;
pub mod utility;
