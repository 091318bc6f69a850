//! `laudos`: exam report billing from the command line
//!
//! Usage:
//!   laudos process --rows <csv|json> --catalog <json|yaml> [filters] [--invoice] [--export <path>]
//!   laudos mappings --catalog <json|yaml>
//!   laudos exam-types
//!
//! Settings come from `laudos.{yaml,toml,json}` (or `--config`) and
//! `LAUDOS__*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::*;
use config_engine::{BillingSettings, SettingsLoader};
use exam_billing::{
    default_export_file_name, specialist_summary, write_records_csv, BillingService,
    Classification, ExamRecord, FilterCriteria, MappingStore, UploadOutcome,
};
use ops_cli::{prompt, render, row_source, CatalogStore};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "laudos")]
#[command(version, about = "Classify, price and total exam report uploads")]
struct Cli {
    /// Settings file; defaults to laudos.yaml/.toml/.json in the working directory when present
    #[arg(long, global = true, env = "LAUDOS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process an upload and print the totals
    Process(ProcessArgs),

    /// List stored custom exam type mappings
    Mappings {
        /// Catalog file (.json, .yaml or .yml)
        #[arg(long)]
        catalog: PathBuf,
    },

    /// List the built-in exam types per category
    ExamTypes,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Uploaded rows (.csv or .json)
    #[arg(long)]
    rows: PathBuf,

    /// Catalog with clinic prices, specialist prices and custom mappings
    #[arg(long)]
    catalog: PathBuf,

    /// Show only these clinics (repeatable)
    #[arg(long = "clinic")]
    clinics: Vec<String>,

    /// Show only these specialists (repeatable)
    #[arg(long = "specialist")]
    specialists: Vec<String>,

    /// Show only these exam types (repeatable)
    #[arg(long = "exam-type")]
    exam_types: Vec<String>,

    /// Show only these categories, e.g. "2D Total" or "Sem Categoria" (repeatable)
    #[arg(long = "category", value_parser = parse_classification)]
    categories: Vec<Classification>,

    /// Also print totals grouped by specialist
    #[arg(long)]
    invoice: bool,

    /// Write the displayed records as CSV; a directory gets the default file name
    #[arg(long)]
    export: Option<PathBuf>,

    /// Fail instead of prompting when unknown exam types are found
    #[arg(long, conflicts_with = "accept_suggested")]
    non_interactive: bool,

    /// Map every unknown exam type to the suggested category without prompting
    #[arg(long)]
    accept_suggested: bool,
}

fn parse_classification(value: &str) -> Result<Classification, String> {
    value.parse().map_err(|e: exam_billing::BillingError| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = SettingsLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let settings = loader.load().context("Failed to load settings")?;
    let _guard = logger_redacted::init(&settings.logging)?;

    match cli.command {
        Command::Process(args) => run_process(&settings, args),
        Command::Mappings { catalog } => {
            let store = CatalogStore::open(&catalog)?;
            render::print_mappings(&store.load_all()?);
            Ok(())
        }
        Command::ExamTypes => {
            render::print_exam_types();
            Ok(())
        }
    }
}

fn run_process(settings: &BillingSettings, args: ProcessArgs) -> anyhow::Result<()> {
    let rows = row_source::load_rows(&args.rows)?;
    let store = CatalogStore::open(&args.catalog)?;
    let clinics = store.catalog().clinics.clone();
    let specialist_prices = store.catalog().specialist_prices.clone();

    let mut service = BillingService::from_settings(settings, store)?;
    service.set_clinics(clinics);
    service.set_specialist_prices(specialist_prices);
    service.set_criteria(FilterCriteria {
        clinics: args.clinics,
        specialists: args.specialists,
        exam_types: args.exam_types,
        categories: args.categories,
    });

    if let UploadOutcome::NeedsResolution(unknown) = service.upload(rows)? {
        render::print_unknown_types(&unknown);

        if args.non_interactive {
            service.cancel_resolution()?;
            let names: Vec<&str> = unknown.iter().map(|u| u.name.as_str()).collect();
            bail!("Exam types need a category: {}", names.join(", "));
        }

        let choices = if args.accept_suggested {
            Some(service.suggested_choices())
        } else {
            prompt::choose_categories(&unknown, service.suggested_category())?
        };

        match choices {
            Some(choices) => service.save_mappings(&choices)?,
            None => {
                let dropped = service.cancel_resolution()?;
                println!("{}", format!("Upload cancelado ({dropped} linha(s) descartadas)").yellow());
                return Ok(());
            }
        }
    }

    let outputs = service.outputs();
    render::print_totals(outputs.display_totals(), outputs.filter_active);
    render::print_missing_prices(&outputs.missing_price_clinics);
    if args.invoice {
        render::print_invoice(&specialist_summary(outputs.display_totals()));
    }

    if let Some(target) = args.export {
        let path = export_records(&target, outputs.display_records())?;
        println!("{} {}", "Registros exportados para".green(), path.display());
    }

    Ok(())
}

fn export_records(target: &Path, records: &[ExamRecord]) -> anyhow::Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(default_export_file_name(chrono::Local::now().date_naive()))
    } else {
        target.to_path_buf()
    };

    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_records_csv(std::io::BufWriter::new(file), records)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), records = records.len(), "Records exported");
    Ok(path)
}
