use anyhow::{anyhow, Context, Result};
use colored::*;
use ixviewer::{
    report::{Report, Taxonomy},
    table::{DirectorySink, TableExport},
    ExportConfig,
};
use scraper::Html;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "ixviewer", about = "Inspect inline XBRL documents and export their tables")]
enum Command {
    /// List tables that contain tagged facts
    Tables {
        #[structopt(parse(from_os_str))]
        document: PathBuf,
    },
    /// Export one table as an xlsx workbook
    Export {
        #[structopt(parse(from_os_str))]
        document: PathBuf,
        /// Position in the list printed by `tables`
        #[structopt(short, long, default_value = "0")]
        table: usize,
        /// Output directory, overrides IXVIEWER_OUTPUT_DIR
        #[structopt(short, long, parse(from_os_str))]
        out: Option<PathBuf>,
        /// Print the labelled grid as JSON instead of writing a workbook
        #[structopt(long)]
        json: bool,
    },
    /// Describe a single fact
    Inspect {
        #[structopt(parse(from_os_str))]
        document: PathBuf,
        fact_id: String,
    },
}

async fn load(path: &Path, config: &ExportConfig) -> Result<(Html, Report)> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Html::parse_document(&source);
    let mut report = Report::from_document(&document)?;

    if let Some(taxonomy_path) = &config.taxonomy_path {
        log::debug!("Loading taxonomy from {}", taxonomy_path.display());
        let json = tokio::fs::read_to_string(taxonomy_path)
            .await
            .with_context(|| format!("Failed to read {}", taxonomy_path.display()))?;
        report = report.with_taxonomy(Taxonomy::from_json(&json)?);
    }
    Ok((document, report))
}

async fn run(command: Command, config: ExportConfig) -> Result<()> {
    match command {
        Command::Tables { document } => {
            let (html, report) = load(&document, &config).await?;
            let tables = TableExport::discover(&html);
            if tables.is_empty() {
                println!("No tables with tagged facts found.");
            }
            for (position, table) in tables.iter().enumerate() {
                let grid = table.grid(&report);
                println!(
                    "{} table #{}: {} rows x {} columns, {} facts",
                    format!("[{}]", position).green().bold(),
                    table.index,
                    grid.height(),
                    grid.width(),
                    grid.fact_count()
                );
            }
        }
        Command::Export {
            document,
            table,
            out,
            json,
        } => {
            let (html, report) = load(&document, &config).await?;
            let tables = TableExport::discover(&html);
            let export = tables.get(table).ok_or_else(|| {
                anyhow!(
                    "Table {} not found, document has {} exportable tables",
                    table,
                    tables.len()
                )
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&export.build(&report))?);
                return Ok(());
            }

            let config = config.with_output_dir(out);
            let sink = DirectorySink::new(config.output_dir.clone());
            let path = export.export(&report, &sink).await?;
            println!("{} {}", "Saved".green().bold(), path.display());
        }
        Command::Inspect { document, fact_id } => {
            let (_, report) = load(&document, &config).await?;
            let description = report
                .describe(&fact_id)
                .ok_or_else(|| anyhow!("Fact {} not found", fact_id))?;

            println!("{} {}", description.label.bold(), format!("({})", description.concept).dimmed());
            if !description.documentation.is_empty() {
                println!("  {}", description.documentation.dimmed());
            }
            if let Some(period) = &description.period {
                println!("  {:<10} {}", "Period".cyan(), period);
            }
            if let Some(unit) = &description.unit {
                println!("  {:<10} {}", "Unit".cyan(), unit);
            }
            for (dimension, member) in &description.dimensions {
                println!("  {:<10} {}: {}", "Dimension".cyan(), dimension, member);
            }
            println!("  {:<10} {}", "Value".cyan(), description.value);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    log::debug!("Logger initialized");

    let command = Command::from_args();
    let config = ExportConfig::from_env()?;

    if let Err(e) = run(command, config).await {
        log::error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
