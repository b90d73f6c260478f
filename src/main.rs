//! Cardio Insights - Heart Disease Dataset Analysis & Dashboard Statistics
//!
//! Console consumer of the analysis pipeline: loads the configured CSV,
//! applies any requested filters and prints the aggregate report the
//! dashboard layer would render.

use anyhow::{bail, Result};
use cardio_insights::config::{AppConfig, DATA_PATH_ENV};
use cardio_insights::data::{DataStore, FilterParams, LoaderError};
use cardio_insights::stats::StatsCalculator;
use polars::prelude::DataFrame;
use std::path::Path;

const CONFIG_PATH: &str = "cardio_insights.json";

/// Columns charted as stacked disease-vs-healthy bars.
const BREAKDOWN_COLUMNS: &[&str] = &["age_group", "sex", "cp", "chol_category", "exang"];

/// Columns charted as risk-rate bars.
const RISK_COLUMNS: &[&str] = &["chol_category", "bp_category", "fbs"];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Boundary between the pipeline and the (here: console) presentation
    // layer: failures surface as a short message, never a crash.
    if let Err(e) = run() {
        log::error!("failed to prepare the dashboard data: {e}");
        println!("The dashboard data could not be computed; check the input file.");
    }
}

fn run() -> Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_PATH))?;
    let filters = parse_filters(std::env::args().skip(1))?;

    let mut store = DataStore::new();
    match store.load(&config.data_path) {
        Ok(_) => {}
        Err(LoaderError::SourceNotFound(path)) => {
            log::warn!("no dataset at {}", path.display());
            println!(
                "No data available. Place the heart disease CSV at '{}' (or point {} at it) and rerun.",
                path.display(),
                DATA_PATH_ENV
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }
    let Some(frame) = store.frame() else {
        return Ok(());
    };

    let view = filters.apply(frame)?;
    if view.height() != frame.height() {
        log::info!(
            "filters active: showing {} of {} records",
            view.height(),
            frame.height()
        );
    }

    print_report(&view)
}

fn parse_filters<I: Iterator<Item = String>>(mut args: I) -> Result<FilterParams> {
    let mut params = FilterParams::default();
    while let Some(arg) = args.next() {
        let mut value = |name: &str| -> Result<String> {
            match args.next() {
                Some(v) => Ok(v),
                None => bail!("{name} expects a value"),
            }
        };
        match arg.as_str() {
            "--age-min" => params.age_min = Some(value("--age-min")?.parse()?),
            "--age-max" => params.age_max = Some(value("--age-max")?.parse()?),
            "--sex" => params.sex = FilterParams::choice(&value("--sex")?),
            "--dataset" => params.dataset = FilterParams::choice(&value("--dataset")?),
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(params)
}

fn print_report(df: &DataFrame) -> Result<()> {
    let overview = StatsCalculator::overview_metrics(df)?;
    println!("Heart Disease Analysis");
    println!("======================");
    println!("Total patients:  {}", overview.total_patients);
    println!(
        "Heart cases:     {} ({:.1}%)",
        overview.heart_disease_count, overview.heart_disease_rate
    );
    println!("Average age:     {:.1} years", overview.mean_age);
    println!(
        "Male patients:   {} ({:.1}%)",
        overview.male_count, overview.male_percentage
    );

    let breakdowns = StatsCalculator::breakdowns_parallel(df, BREAKDOWN_COLUMNS)?;
    for column in BREAKDOWN_COLUMNS {
        println!("\nBy {column}:");
        for row in &breakdowns[*column] {
            let status = if row.has_disease {
                "heart disease"
            } else {
                "no heart disease"
            };
            println!(
                "  {:<22} {:<17} {:>4}  ({:.1}%)",
                row.category, status, row.count, row.percentage
            );
        }
    }

    println!("\nDisease risk by category:");
    for column in RISK_COLUMNS {
        for rate in StatsCalculator::risk_by(df, column)? {
            println!("  {column}: {:<22} {:.1}%", rate.category, rate.mean);
        }
    }

    let insights = StatsCalculator::key_insights(df)?;
    println!("\nKey findings:");
    println!("  Overall risk: {:.1}% of patients", insights.overall_rate);
    println!(
        "  Gender disparity: males {:.1}% vs females {:.1}%",
        insights.male_rate, insights.female_rate
    );
    match insights.age_gap_p_value {
        Some(p) => println!(
            "  Age factor: diseased patients are {:.1} years older on average (p = {:.3}{})",
            insights.age_gap_years,
            p,
            if insights.age_gap_significant {
                ", significant"
            } else {
                ""
            }
        ),
        None => println!(
            "  Age factor: diseased patients are {:.1} years older on average",
            insights.age_gap_years
        ),
    }
    if let Some(top) = insights.highest_risk_chest_pain {
        println!(
            "  Highest risk: chest pain type {} at {:.1}%",
            top.category, top.mean
        );
    }

    Ok(())
}
