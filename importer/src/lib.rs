//! # customer-import - validate and import customer CSV files
//!
//! Reads a CSV of customers, normalizes and validates each row, enriches it
//! with an ISO3 country code, stores valid rows and writes an error report
//! listing the invalid ones.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│  RowReader  │────▶│  Validator  │────▶│   SQLite    │
//! │  (header +  │     │  (streamed) │     │ (+ country  │     │  customers  │
//! │   rows)     │     │             │     │    index)   │     └─────────────┘
//! └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                │ rejected
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │ error report│
//!                                         │    (CSV)    │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use customer_import::{load_countries, run, ImportJob, SqliteSink, SystemResolver};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let countries = load_countries(&Default::default(), false).await.unwrap();
//!     let summary = tokio::task::spawn_blocking(move || {
//!         let resolver = SystemResolver::from_system_conf()?;
//!         let mut sink = SqliteSink::open("customers.sqlite")?;
//!         let job = ImportJob::new("customers.csv", ".");
//!         run(&job, &countries, &resolver, &mut sink)
//!     })
//!     .await
//!     .unwrap()
//!     .unwrap();
//!     println!("Imported {} customers", summary.accepted);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Rows, customers, validation outcomes
//! - [`parser`] - Streaming CSV reader
//! - [`countries`] - Country name to ISO3 index
//! - [`validation`] - Rule table and email domain checks
//! - [`transform`] - Normalization and the import pipeline
//! - [`sink`] - Persistence of accepted customers
//! - [`report`] - CSV error report
//! - [`config`] - Environment configuration
//! - [`logs`] - Operator-facing logging

// Core modules
pub mod error;
pub mod models;

// Ambient
pub mod config;
pub mod logs;

// Reading
pub mod parser;

// Enrichment and validation
pub mod countries;
pub mod validation;

// Pipeline
pub mod transform;

// Output
pub mod report;
pub mod sink;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConfigError, CountryError, ImportError, ImportResult, ParseError, ReportError, ResolverError,
    SinkError,
};

pub use models::{Customer, Field, FieldError, Outcome, RawRow, Rejection};

pub use parser::RowReader;

pub use countries::{CountryIndex, CountrySources};

pub use validation::{
    validate, CachingResolver, DomainResolver, SystemResolver, Validator, RULES,
};

pub use transform::{
    load_countries, locate_input, normalize, partition, run, ImportJob, ImportSummary, Partition,
};

pub use report::{report_file_name, write_error_report};

pub use sink::{RecordSink, SqliteSink};

pub use config::ImportConfig;
