//! Run configuration.
//!
//! Every setting has a default and can be overridden from the environment
//! (a `.env` file is loaded by the binary). The three paths can additionally
//! be overridden on the command line.
//!
//! | Variable                 | Default               |
//! |--------------------------|-----------------------|
//! | `RATER_INPUT_DIR`        | `input`               |
//! | `RATER_OUTPUT`           | `output_results.xlsx` |
//! | `RATER_ERROR_LOG`        | `errors.log`          |
//! | `RATER_VALIDATION_MODE`  | `tolerant`            |
//! | `RATER_THEORY_PLACEMENT` | `trailing`            |
//! | `RATER_MEAN_TABLE`       | `true`                |

use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::catalog::{DeficiencyCatalog, TheoryPlacement};
use crate::validator::{SheetValidator, ValidationMode};

pub const INPUT_DIR_VAR: &str = "RATER_INPUT_DIR";
pub const OUTPUT_VAR: &str = "RATER_OUTPUT";
pub const ERROR_LOG_VAR: &str = "RATER_ERROR_LOG";
pub const VALIDATION_MODE_VAR: &str = "RATER_VALIDATION_MODE";
pub const THEORY_PLACEMENT_VAR: &str = "RATER_THEORY_PLACEMENT";
pub const MEAN_TABLE_VAR: &str = "RATER_MEAN_TABLE";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub error_log: PathBuf,
    pub validation_mode: ValidationMode,
    pub theory_placement: TheoryPlacement,
    pub include_mean_table: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output: PathBuf::from("output_results.xlsx"),
            error_log: PathBuf::from("errors.log"),
            validation_mode: ValidationMode::default(),
            theory_placement: TheoryPlacement::default(),
            include_mean_table: true,
        }
    }
}

impl RunConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset or blank keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            input_dir: get(INPUT_DIR_VAR).map_or(defaults.input_dir, PathBuf::from),
            output: get(OUTPUT_VAR).map_or(defaults.output, PathBuf::from),
            error_log: get(ERROR_LOG_VAR).map_or(defaults.error_log, PathBuf::from),
            validation_mode: parse_or(
                VALIDATION_MODE_VAR,
                get(VALIDATION_MODE_VAR),
                defaults.validation_mode,
            )?,
            theory_placement: parse_or(
                THEORY_PLACEMENT_VAR,
                get(THEORY_PLACEMENT_VAR),
                defaults.theory_placement,
            )?,
            include_mean_table: match get(MEAN_TABLE_VAR) {
                Some(v) => parse_bool(&v).ok_or_else(|| ConfigError {
                    key: MEAN_TABLE_VAR,
                    message: format!("'{v}' is not a boolean"),
                })?,
                None => defaults.include_mean_table,
            },
        })
    }

    /// Replaces the paths given on the command line.
    pub fn with_paths(
        mut self,
        input_dir: Option<PathBuf>,
        output: Option<PathBuf>,
        error_log: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = input_dir {
            self.input_dir = dir;
        }
        if let Some(out) = output {
            self.output = out;
        }
        if let Some(log) = error_log {
            self.error_log = log;
        }
        self
    }

    pub fn validator(&self) -> SheetValidator {
        SheetValidator::new(
            self.validation_mode,
            DeficiencyCatalog::new(self.theory_placement),
        )
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    match value {
        Some(v) => v.parse().map_err(|message| ConfigError { key, message }),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
