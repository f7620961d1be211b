//! `tender-checkr` — load procurement datasets, classify contractor risk, and report.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load risk policy config ([`config::load_config`]).
//! 3. Auto-detect dataset files ([`detector::detect_sources`]).
//! 4. Load both tables through the session cache ([`cache`], [`loader`]).
//! 5. Apply the risk policy to every contractor ([`config::apply_policy`]).
//! 6. Apply record filters and compute KPIs ([`summary`]).
//! 7. Render the requested report ([`report`]).
//! 8. Exit `0`; exit `1` only when no dataset was found at all.

mod cache;
mod cli;
mod config;
mod detector;
mod loader;
mod models;
mod report;
mod schema;
mod summary;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use cache::DatasetCache;
use cli::{Cli, ReportFormat};
use config::{apply_policy, load_config};
use detector::detect_sources;
use models::{Contractor, Entity};
use summary::{Filters, Summary};

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a Summary,
    entities: &'a [Entity],
    contractors: &'a [Contractor],
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Resolve data directory
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    // Load risk policy config
    let config = load_config(&path, cli.config.as_deref())?;

    // Detect dataset files
    let sources = detect_sources(&path);
    if sources.is_empty() {
        eprintln!("No procurement datasets found in {}", path.display());
        std::process::exit(1);
    }

    // Load both tables through the session cache; a missing dataset
    // degrades to an empty table with a visible warning.
    let mut cache = DatasetCache::new();

    let entities: Arc<Vec<Entity>> = match &sources.entities {
        Some(p) => cache.entities(p),
        None => {
            eprintln!("  {} entities table not found; rendering without it", "⚠".yellow());
            Arc::new(Vec::new())
        }
    };
    if !cli.quiet {
        eprintln!("  {} {} entities", "→".cyan(), entities.len());
    }

    let contractors: Arc<Vec<Contractor>> = match &sources.contractors {
        Some(src) => cache.contractors(src),
        None => {
            eprintln!("  {} contractor table not found; rendering without it", "⚠".yellow());
            Arc::new(Vec::new())
        }
    };
    if !cli.quiet {
        eprintln!("  {} {} contractors", "→".cyan(), contractors.len());
    }

    // Policy pass: assign a verdict to every contractor
    let mut contractors: Vec<Contractor> = (*contractors).clone();
    apply_verdicts(&mut contractors, &config, cli.quiet)?;

    // Record filters (the dashboard's sidebar controls)
    let filters = Filters {
        municipality: cli.municipality.clone(),
        risks: cli.risk.iter().map(Into::into).collect(),
        entity: cli.entity.clone(),
    };
    let (entities, contractors) = summary::apply_filters(&entities, &contractors, &filters);
    if filters.is_active() && !cli.quiet {
        eprintln!(
            "  {} filtered to {} entities / {} contractors",
            "→".cyan(),
            entities.len(),
            contractors.len()
        );
    }

    let summary = summary::summarize(&entities, &contractors, cli.top);

    // Resolve effective report format: --pdf implies PDF format
    let report_format = match &cli.pdf {
        Some(_) => ReportFormat::Pdf,
        None => cli.report,
    };
    let pdf_path = cli
        .pdf
        .unwrap_or_else(|| std::path::PathBuf::from("procurement-report.pdf"));

    match report_format {
        ReportFormat::Terminal => {
            report::terminal::render(&summary, &contractors, &path, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            let out = JsonReport {
                summary: &summary,
                entities: &entities,
                contractors: &contractors,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ReportFormat::Pdf => {
            report::pdf::render(
                &summary,
                &contractors,
                &path,
                sources.branding.as_deref(),
                &pdf_path,
            )?;
        }
    }

    Ok(())
}

fn apply_verdicts(contractors: &mut [Contractor], config: &config::Config, quiet: bool) -> Result<()> {
    let pb = if !quiet && !contractors.is_empty() {
        let pb = ProgressBar::new(contractors.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for c in contractors.iter_mut() {
        c.verdict = apply_policy(config, c.risk);
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(())
}
