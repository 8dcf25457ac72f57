//! customer-import CLI - import customers from a CSV file
//!
//! ```bash
//! customer-import customers.csv
//! customer-import customers.csv --database crm.sqlite --report-dir reports/
//! customer-import customers.csv --allow-missing-countries --quiet
//! ```
//!
//! Valid rows are stored in SQLite; invalid rows are listed in
//! `import-error-report-<timestamp>.csv`.

use clap::Parser;
use customer_import::config::executable_dir;
use customer_import::logs::{log_error, LogFormat, LogLevel, LOGGER};
use customer_import::{
    load_countries, locate_input, run, CachingResolver, ImportConfig, ImportError, ImportJob,
    ImportSummary, SqliteSink, SystemResolver,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "customer-import")]
#[command(about = "Import customers from a CSV file", long_about = None)]
struct Cli {
    /// Input CSV file (id,name,email,age,location)
    file: PathBuf,

    /// SQLite database receiving valid customers [env: DATABASE_PATH]
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory for the error report [env: REPORT_DIR] (default: next to the executable)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// URL of the ISO2 -> ISO3 document [env: COUNTRY_CODES_URL]
    #[arg(long)]
    codes_url: Option<String>,

    /// URL of the ISO2 -> country name document [env: COUNTRY_NAMES_URL]
    #[arg(long)]
    names_url: Option<String>,

    /// Import without country codes if the lookup service fails
    #[arg(long)]
    allow_missing_countries: bool,

    /// Only print warnings, errors and the final summary
    #[arg(short, long)]
    quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    LOGGER.set_format(cli.log_format);
    if cli.quiet {
        LOGGER.set_min_level(LogLevel::Warning);
    }

    match cmd_import(cli).await {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            log_error(format!("Error: {}", e));
            std::process::exit(1);
        }
    }
}

async fn cmd_import(cli: Cli) -> Result<ImportSummary, ImportError> {
    let mut config = ImportConfig::from_env()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(dir) = cli.report_dir {
        config.report_dir = Some(dir);
    }
    if let Some(url) = cli.codes_url {
        config.countries.codes_url = url;
    }
    if let Some(url) = cli.names_url {
        config.countries.names_url = url;
    }
    config.allow_missing_countries |= cli.allow_missing_countries;

    // Fail on a missing or unreadable input before touching the network.
    let exe_dir = executable_dir().ok();
    let input = locate_input(&cli.file, exe_dir.as_deref())?;
    let report_dir = config.resolved_report_dir()?;

    let countries = load_countries(&config.countries, config.allow_missing_countries).await?;

    // DNS lookups and SQLite block, so the row loop runs off the async runtime.
    let database_path = config.database_path;
    tokio::task::spawn_blocking(move || {
        let resolver = CachingResolver::new(SystemResolver::from_system_conf()?);
        let mut sink = SqliteSink::open(&database_path)?;

        let job = ImportJob::new(input, report_dir);
        run(&job, &countries, &resolver, &mut sink)
    })
    .await?
}

fn print_summary(summary: &ImportSummary) {
    println!("Import complete!");
    println!("Imported rows: {}", summary.accepted);
    eprintln!("Rows with errors: {}", summary.rejected);
    if let Some(ref path) = summary.report_path {
        eprintln!("Error report: {}", path.display());
    }
}
