use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::{RunSummary, SkippedFile};
use crate::error::{RaterError, Result};
use crate::loader::{TableLoader, discover_files};
use crate::output::{ErrorLog, LogEntry, SpreadsheetWriter};
use crate::report::ReportAssembler;
use crate::stats::FileScores;
use crate::validator::{SheetValidator, ValidatedTable};
use std::path::Path;
use tracing::{error, info, info_span, warn};

/// Runs the rating pipeline over a directory of survey files.
///
/// Files are processed one at a time. Unreadable or invalid files are logged
/// and skipped; the run fails only when nothing can be aggregated or the
/// report cannot be written.
pub struct Analyzer<L, W> {
    loader: L,
    writer: W,
    validator: SheetValidator,
    error_log: ErrorLog,
    include_mean_table: bool,
}

impl<L: TableLoader, W: SpreadsheetWriter> Analyzer<L, W> {
    pub fn new(loader: L, writer: W, validator: SheetValidator, error_log: ErrorLog) -> Self {
        Self {
            loader,
            writer,
            validator,
            error_log,
            include_mean_table: true,
        }
    }

    /// Whether the report starts with the table of mean cell values.
    pub fn with_mean_table(mut self, include: bool) -> Self {
        self.include_mean_table = include;
        self
    }

    #[tracing::instrument(skip_all, fields(input_dir = %input_dir.display(), output = %output.display()))]
    pub fn analyze(&self, input_dir: &Path, output: &Path) -> Result<RunSummary> {
        let files = discover_files(input_dir).inspect_err(|e| self.record(e))?;
        info!(
            discovered = files.len(),
            mode = %self.validator.mode(),
            "Survey files discovered"
        );

        self.analyze_files(input_dir, &files, output)
    }

    /// Processes an explicit list of files. `input_dir` is only used for
    /// error reporting.
    pub fn analyze_files(
        &self,
        input_dir: &Path,
        files: &[impl AsRef<Path>],
        output: &Path,
    ) -> Result<RunSummary> {
        let mut tables = Vec::new();
        let mut scores = Vec::new();
        let mut skipped = Vec::new();

        for path in files {
            let path = path.as_ref();
            let _span = info_span!("process_file", file = %path.display()).entered();

            match self.process_file(path) {
                Ok((table, file_scores)) => {
                    info!("Survey processed successfully");
                    tables.push(table);
                    scores.push(file_scores);
                }
                Err(e) if e.is_file_scoped() => {
                    warn!(kind = e.kind(), error = %e, "Skipping survey file");
                    self.record(&e);
                    skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let discipline_sets: Vec<_> = scores.iter().map(|s| s.disciplines.clone()).collect();
        let deficiency_sets: Vec<_> = scores.iter().map(|s| s.deficiencies.clone()).collect();

        let (disciplines, deficiencies) =
            aggregate(&discipline_sets, &deficiency_sets, self.validator.catalog()).map_err(
                |_| {
                    let e = RaterError::Aggregation {
                        dir: input_dir.to_path_buf(),
                        skipped: skipped.len(),
                    };
                    error!(error = %e, "Nothing to aggregate");
                    self.record(&e);
                    e
                },
            )?;

        let mean_cells = if self.include_mean_table {
            ValidatedTable::mean_of(&tables)
        } else {
            None
        };
        let layout = ReportAssembler::assemble(&disciplines, &deficiencies, mean_cells.as_ref());

        self.writer.write(&layout, output).inspect_err(|e| {
            error!(error = %e, "Report could not be written");
            self.record(e);
        })?;

        Ok(RunSummary {
            discovered: files.len(),
            processed: scores.len(),
            skipped,
            output: output.to_path_buf(),
            disciplines,
            deficiencies,
        })
    }

    fn process_file(&self, path: &Path) -> Result<(ValidatedTable, FileScores)> {
        let raw = self.loader.load(path)?;
        let table = self
            .validator
            .validate(&raw)
            .map_err(|e| RaterError::validation(path, e))?;
        let scores = FileScores::from_table(path, &table);
        Ok((table, scores))
    }

    fn record(&self, error: &RaterError) {
        if let Err(e) = self.error_log.append(&LogEntry::from_error(error)) {
            warn!(
                path = %self.error_log.path().display(),
                error = %e,
                "Failed to append to error log"
            );
        }
    }
}
