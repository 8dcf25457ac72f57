//! Error types for the customer import pipeline.
//!
//! Each stage has its own error enum:
//!
//! - [`ParseError`] - CSV stream reading errors
//! - [`CountryError`] - Country code service errors
//! - [`SinkError`] - Record persistence errors
//! - [`ReportError`] - Error report writing errors
//! - [`ConfigError`] - Configuration errors
//! - [`ResolverError`] - DNS resolver setup errors
//! - [`ImportError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Row-level validation failures are not errors in this sense: they are
//! collected as [`crate::models::FieldError`] values and never abort a run.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while streaming rows out of the input file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to open or read the file.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying CSV reader failure (I/O mid-stream).
    #[error("Failed to read CSV record near line {line}: {message}")]
    Read { line: u64, message: String },
}

// =============================================================================
// Country Service Errors
// =============================================================================

/// Errors from the country code service.
#[derive(Debug, Error)]
pub enum CountryError {
    /// HTTP request failed (connection, DNS, TLS...).
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not the expected JSON object of strings.
    #[error("Malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors from the record sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// SQLite failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Could not prepare the database location.
    #[error("Database IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while writing the error report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem failure.
    #[error("Report IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer failure.
    #[error("Report CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Temporary file could not be moved into place.
    #[error("Could not finalize report {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed.
    #[error("Invalid value for {key}: '{value}' ({expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Could not determine the executable directory.
    #[error("Cannot determine executable directory: {0}")]
    ExecutableDir(#[from] std::io::Error),
}

// =============================================================================
// Resolver Errors
// =============================================================================

/// Errors while setting up DNS lookups for email domains.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The system DNS configuration could not be read.
    #[error("Cannot load system DNS configuration: {0}")]
    SystemConfig(String),

    /// The resolver could not be started.
    #[error("Cannot start DNS resolver: {0}")]
    Init(#[from] std::io::Error),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import errors.
///
/// Everything in here is fatal to the run. Returned by
/// [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input path does not point at a file.
    #[error("File {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    /// Input file exists but cannot be opened.
    #[error("File {} is not readable: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading error.
    #[error("CSV error: {0}")]
    Parse(#[from] ParseError),

    /// Country service error.
    #[error("Country lookup error: {0}")]
    Country(#[from] CountryError),

    /// Sink error.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Report error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// DNS resolver error.
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// The blocking import task did not finish.
    #[error("Import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reading operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for country lookups.
pub type CountryResult<T> = Result<T, CountryError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for report generation.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for the import run.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CountryError -> ImportError
        let err = CountryError::Status {
            url: "http://country.io/iso3.json".into(),
            status: 503,
        };
        let import_err: ImportError = err.into();
        let msg = import_err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("iso3.json"));

        // ParseError -> ImportError
        let parse_err = ParseError::Read {
            line: 7,
            message: "broken pipe".into(),
        };
        let import_err: ImportError = parse_err.into();
        assert!(import_err.to_string().contains("line 7"));
    }

    #[test]
    fn test_input_errors_name_the_file() {
        let err = ImportError::InputNotFound(PathBuf::from("/tmp/missing.csv"));
        assert_eq!(err.to_string(), "File /tmp/missing.csv does not exist");

        let err = ImportError::InputUnreadable {
            path: PathBuf::from("locked.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("locked.csv is not readable"));
    }

    #[test]
    fn test_config_error_format() {
        let err = ConfigError::InvalidValue {
            key: "ALLOW_MISSING_COUNTRIES".into(),
            value: "maybe".into(),
            expected: "true or false",
        };
        let msg = err.to_string();
        assert!(msg.contains("ALLOW_MISSING_COUNTRIES"));
        assert!(msg.contains("maybe"));
    }

    #[test]
    fn test_resolver_error_conversion() {
        let err = ResolverError::SystemConfig("no nameservers".into());
        let import_err: ImportError = err.into();
        assert_eq!(
            import_err.to_string(),
            "DNS resolver error: Cannot load system DNS configuration: no nameservers"
        );
    }
}
