//! Import orchestration: read → normalize → validate → persist → report.
//!
//! # Example
//!
//! ```rust,ignore
//! use customer_import::{load_countries, run, ImportJob, SqliteSink, SystemResolver};
//!
//! let countries = load_countries(&Default::default(), false).await?;
//! let resolver = SystemResolver::from_system_conf()?;
//! let mut sink = SqliteSink::open("customers.sqlite")?;
//! let job = ImportJob::new("customers.csv", "reports");
//! let summary = run(&job, &countries, &resolver, &mut sink)?;
//! println!("{} imported, {} rejected", summary.accepted, summary.rejected);
//! ```

use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::countries::{CountryIndex, CountrySources};
use crate::error::{ImportError, ImportResult, ParseResult};
use crate::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::models::{Customer, Outcome, RawRow, Rejection};
use crate::parser::RowReader;
use crate::report::write_error_report;
use crate::sink::RecordSink;
use crate::validation::{DomainResolver, Validator};

/// What to import and where the report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJob {
    /// CSV file to read.
    pub input: PathBuf,
    /// Directory receiving the error report.
    pub report_dir: PathBuf,
}

impl ImportJob {
    pub fn new(input: impl Into<PathBuf>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            report_dir: report_dir.into(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Data rows read (header excluded).
    pub rows_read: usize,
    /// Rows stored in the sink.
    pub accepted: usize,
    /// Rows listed in the error report.
    pub rejected: usize,
    /// Report file, when any row was rejected.
    pub report_path: Option<PathBuf>,
}

/// Accepted and rejected rows of one pass over the input.
#[derive(Debug, Default)]
pub struct Partition {
    pub accepted: Vec<Customer>,
    pub rejected: Vec<Rejection>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find the input file and make sure it can be opened.
///
/// A path that is not a file is retried relative to `fallback_dir`
/// (typically the executable's directory).
pub fn locate_input(path: &Path, fallback_dir: Option<&Path>) -> ImportResult<PathBuf> {
    let found = if path.is_file() {
        path.to_path_buf()
    } else {
        fallback_dir
            .map(|dir| dir.join(path))
            .filter(|candidate| candidate.is_file())
            .ok_or_else(|| ImportError::InputNotFound(path.to_path_buf()))?
    };

    open_input(&found)?;
    Ok(found)
}

/// Open the input for reading, distinguishing missing from unreadable.
fn open_input(path: &Path) -> ImportResult<File> {
    File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ImportError::InputNotFound(path.to_path_buf())
        } else {
            ImportError::InputUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Build the country index once for the whole run.
///
/// With `allow_missing`, a failing service yields an empty index and a
/// warning instead of an error.
pub async fn load_countries(
    sources: &CountrySources,
    allow_missing: bool,
) -> ImportResult<CountryIndex> {
    match CountryIndex::fetch(sources).await {
        Ok(index) => Ok(index),
        Err(e) if allow_missing => {
            log_warning(format!("Country lookup unavailable, continuing without codes: {}", e));
            Ok(CountryIndex::empty())
        }
        Err(e) => Err(e.into()),
    }
}

/// Classify every row of the stream.
///
/// Row failures are collected; only read errors stop the pass.
pub fn partition<I>(rows: I, validator: &Validator<'_>) -> ImportResult<Partition>
where
    I: IntoIterator<Item = ParseResult<RawRow>>,
{
    let mut result = Partition::default();

    for row in rows {
        match validator.classify(row?) {
            Outcome::Accepted(customer) => result.accepted.push(customer),
            Outcome::Rejected(rejection) => {
                let failed: Vec<String> = rejection
                    .errors
                    .iter()
                    .map(|e| e.field.to_string())
                    .collect();
                log_warning_indent(
                    format!("Line {} rejected: {}", rejection.row.line, failed.join(", ")),
                    1,
                );
                result.rejected.push(rejection);
            }
        }
    }

    Ok(result)
}

/// Run a complete import.
///
/// Accepted rows reach the sink in a single `insert_batch` call, and only
/// if there are any. The error report is written only if a row was rejected.
pub fn run(
    job: &ImportJob,
    countries: &CountryIndex,
    resolver: &dyn DomainResolver,
    sink: &mut dyn RecordSink,
) -> ImportResult<ImportSummary> {
    let file = open_input(&job.input)?;

    log_info(format!("📖 Reading {}", job.input.display()));
    let validator = Validator::new(countries, resolver);
    let partition = partition(RowReader::new(file), &validator)?;
    log_success(format!(
        "Read {} rows: {} valid, {} invalid",
        partition.len(),
        partition.accepted.len(),
        partition.rejected.len()
    ));

    let rows_read = partition.len();
    let Partition { accepted, rejected } = partition;

    let stored = if accepted.is_empty() {
        0
    } else {
        log_info(format!("💾 Saving {} customers...", accepted.len()));
        let stored = sink.insert_batch(&accepted)?;
        log_success(format!("Saved {} customers", stored));
        stored
    };

    let report_path = if rejected.is_empty() {
        None
    } else {
        let path = write_error_report(&job.report_dir, &rejected, Local::now().naive_local())?;
        log_warning(format!("📝 Error report written to {}", path.display()));
        Some(path)
    };

    Ok(ImportSummary {
        rows_read,
        accepted: stored,
        rejected: rejected.len(),
        report_path,
    })
}
