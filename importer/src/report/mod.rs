//! CSV error report for rejected rows.
//!
//! The report opens in any spreadsheet tool. Each rejected row appears once per
//! failing field:
//!
//! ```text
//! id,name,email,age,location,error
//! 4,Bob Lee,bob@example.com,15,Italy,age
//! 9,Al,bad,12,,surname
//! 9,Al,bad,12,,email
//! 9,Al,bad,12,,age
//! ```

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, ReportResult};
use crate::models::{Rejection, COLUMNS, ROW_WIDTH};

/// File name prefix of every report.
pub const REPORT_PREFIX: &str = "import-error-report-";

/// Name of the trailing column holding the failing field.
pub const ERROR_COLUMN: &str = "error";

/// `import-error-report-YYYYMMDD-HHMMSS.csv`
pub fn report_file_name(at: NaiveDateTime) -> String {
    format!("{}{}.csv", REPORT_PREFIX, at.format("%Y%m%d-%H%M%S"))
}

/// Write the report for `rejections` into `dir` and return its path.
///
/// The content goes to a hidden temporary file first and is renamed into
/// place once complete. An existing report with the same name is replaced.
pub fn write_error_report(
    dir: &Path,
    rejections: &[Rejection],
    at: NaiveDateTime,
) -> ReportResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let file_name = report_file_name(at);
    let path = dir.join(&file_name);
    let partial = dir.join(format!(".{}.partial", file_name));

    if let Err(e) = write_rows(&partial, rejections) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, &path).map_err(|source| ReportError::Persist {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

fn write_rows(path: &Path, rejections: &[Rejection]) -> ReportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = COLUMNS.to_vec();
    header.push(ERROR_COLUMN);
    writer.write_record(&header)?;

    let mut record: Vec<&str> = Vec::with_capacity(ROW_WIDTH + 1);
    for rejection in rejections {
        for error in &rejection.errors {
            record.clear();
            record.extend(rejection.row.fields().iter().map(String::as_str));
            record.push(error.field.as_str());
            writer.write_record(&record)?;
        }
    }

    writer.flush()?;
    Ok(())
}
