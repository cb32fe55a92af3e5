//! Command-line loader: `sheet-loader [--config FILE] [--database FILE] <REPORT> <XLSX>`

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use rusty_sheet_loader::config::LoaderConfig;
use rusty_sheet_loader::Ingestor;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheet-loader")]
#[command(author, version, about = "Load an xlsx report into DuckDB", long_about = None)]
struct Cli {
    /// Report kind, e.g. SALES (loaded into SALES_DATA)
    #[arg(value_name = "REPORT")]
    report: String,

    /// Workbook to upload
    #[arg(value_name = "XLSX")]
    file: PathBuf,

    /// TOML configuration with report kinds and loader options
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// DuckDB database file, overriding the configuration
    #[arg(short, long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Print the loaded table as tab-separated text
    #[arg(short, long)]
    export: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match error.downcast_ref::<rusty_sheet_loader::IngestError>() {
                Some(ingest) => eprintln!("error [{}]: {error:#}", ingest.category()),
                None => eprintln!("error: {error:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(database) = &cli.database {
        config.database = Some(database.to_owned());
    }

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read file: {}", cli.file.display()))?;
    let ingestor = Ingestor::from_config(&config)?;
    let report = ingestor.ingest(&cli.report, &bytes)?;
    println!("Inserted {} rows into {}", report.rows_written, report.table_name);

    if cli.export {
        let table = ingestor.store().read_table(&report.table_name)?;
        print!("{}", table.to_tsv());
    }
    Ok(())
}
