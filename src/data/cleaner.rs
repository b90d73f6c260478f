//! Data Cleaner Module
//! Fixed-order cleaning, imputation and derivation pipeline over the raw frame.

use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

use super::categories::{
    AgeGroup, BpCategory, CholCategory, FastingBloodSugar, HrCategory, RestEcg,
    HIGH_BP_THRESHOLD, HIGH_CHOL_THRESHOLD, LOW_HR_THRESHOLD,
};

/// Columns that must be present in the raw frame.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "age", "sex", "chol", "trestbps", "thalch", "num", "cp", "fbs", "exang", "restecg", "dataset",
];

/// Dropped outright: these carry too many missing entries to be usable.
const PRUNED_COLUMNS: &[&str] = &["ca", "thal", "slope"];

/// Numeric columns filled with the column median.
const MEDIAN_IMPUTED: &[&str] = &["chol", "trestbps", "thalch", "oldpeak"];

/// Categorical code columns filled with the column mode.
const MODE_IMPUTED: &[&str] = &["cp", "fbs", "restecg", "exang"];

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("missing required column(s): {0}")]
    MissingColumns(String),
    #[error("dataset contains no records")]
    EmptyDataset,
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Run the full enrichment pipeline over a raw frame.
///
/// Stages run in a fixed order: sentinel correction, column pruning, median
/// imputation, mode imputation, target derivation, code-to-label remapping,
/// binning, quality flags. Binning reads the imputed columns, so no band can
/// be computed from a missing value. The input frame is left untouched.
pub fn enrich(df: &DataFrame) -> Result<DataFrame, CleanError> {
    check_required_columns(df)?;
    if df.height() == 0 {
        return Err(CleanError::EmptyDataset);
    }

    let mut out = df.clone();

    // A cholesterol of zero is not a measurement; treat it as missing.
    let chol = out.column("chol")?.cast(&DataType::Float64)?;
    let corrected: Vec<Option<f64>> = chol
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| *x != 0.0))
        .collect();
    out.with_column(Column::new("chol".into(), corrected))?;

    for name in PRUNED_COLUMNS {
        if out.column(name).is_ok() {
            out = out.drop(name)?;
        }
    }

    for name in MEDIAN_IMPUTED {
        if out.column(name).is_err() {
            continue;
        }
        let values = out.column(name)?.cast(&DataType::Float64)?;
        let ca = values.f64()?;
        let filled: Vec<Option<f64>> = match (ca.null_count() > 0, column_median(ca)) {
            (true, Some(median)) => ca.into_iter().map(|v| v.or(Some(median))).collect(),
            _ => ca.into_iter().collect(),
        };
        out.with_column(Column::new((*name).into(), filled))?;
    }

    for name in MODE_IMPUTED {
        if out.column(name).is_err() {
            continue;
        }
        let codes = out.column(name)?.cast(&DataType::Int64)?;
        let ca = codes.i64()?;
        // An all-missing column degenerates to code 0.
        let fill = if ca.null_count() > 0 {
            Some(column_mode(ca).unwrap_or(0))
        } else {
            None
        };
        let filled: Vec<Option<i64>> = ca.into_iter().map(|v| v.or(fill)).collect();
        out.with_column(Column::new((*name).into(), filled))?;
    }

    let num = out.column("num")?.cast(&DataType::Int64)?;
    let target: Vec<i32> = num
        .i64()?
        .into_iter()
        .map(|v| match v {
            Some(n) if n > 0 => 1,
            _ => 0,
        })
        .collect();
    out.with_column(Column::new("has_heart_disease".into(), target))?;

    let fbs = out.column("fbs")?.cast(&DataType::Int64)?;
    let fbs_labels: Vec<Option<&str>> = fbs
        .i64()?
        .into_iter()
        .map(|v| v.and_then(FastingBloodSugar::from_code).map(|c| c.label()))
        .collect();
    out.with_column(Column::new("fbs".into(), fbs_labels))?;

    let restecg = out.column("restecg")?.cast(&DataType::Int64)?;
    let restecg_labels: Vec<Option<&str>> = restecg
        .i64()?
        .into_iter()
        .map(|v| v.and_then(RestEcg::from_code).map(|c| c.label()))
        .collect();
    out.with_column(Column::new("restecg".into(), restecg_labels))?;

    let age = out.column("age")?.cast(&DataType::Float64)?;
    let age_group: Vec<Option<&str>> = age
        .f64()?
        .into_iter()
        .map(|v| v.and_then(AgeGroup::from_age).map(|g| g.label()))
        .collect();
    out.with_column(Column::new("age_group".into(), age_group))?;

    let chol = out.column("chol")?.cast(&DataType::Float64)?;
    let chol_category: Vec<Option<&str>> = chol
        .f64()?
        .into_iter()
        .map(|v| v.and_then(CholCategory::from_chol).map(|c| c.label()))
        .collect();
    out.with_column(Column::new("chol_category".into(), chol_category))?;

    let bp = out.column("trestbps")?.cast(&DataType::Float64)?;
    let bp_category: Vec<Option<&str>> = bp
        .f64()?
        .into_iter()
        .map(|v| v.and_then(BpCategory::from_bp).map(|c| c.label()))
        .collect();
    out.with_column(Column::new("bp_category".into(), bp_category))?;

    let hr = out.column("thalch")?.cast(&DataType::Float64)?;
    let hr_category: Vec<Option<&str>> = hr
        .f64()?
        .into_iter()
        .map(|v| v.and_then(HrCategory::from_hr).map(|c| c.label()))
        .collect();
    out.with_column(Column::new("hr_category".into(), hr_category))?;

    // Flags read the imputed columns: a median fill can never fire one.
    let hr = out.column("thalch")?.cast(&DataType::Float64)?;
    let low_hr: Vec<i32> = threshold_flag(hr.f64()?, |v| v < LOW_HR_THRESHOLD);
    out.with_column(Column::new("low_hr_flag".into(), low_hr))?;

    let chol = out.column("chol")?.cast(&DataType::Float64)?;
    let high_chol: Vec<i32> = threshold_flag(chol.f64()?, |v| v > HIGH_CHOL_THRESHOLD);
    out.with_column(Column::new("high_chol_flag".into(), high_chol))?;

    let bp = out.column("trestbps")?.cast(&DataType::Float64)?;
    let high_bp: Vec<i32> = threshold_flag(bp.f64()?, |v| v > HIGH_BP_THRESHOLD);
    out.with_column(Column::new("high_bp_flag".into(), high_bp))?;

    Ok(out)
}

fn check_required_columns(df: &DataFrame) -> Result<(), CleanError> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.iter().any(|p| p == c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CleanError::MissingColumns(missing.join(", ")))
    }
}

/// Median over the non-missing values, `None` for an all-missing column.
fn column_median(ca: &Float64Chunked) -> Option<f64> {
    let mut values: Vec<f64> = ca.into_iter().flatten().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 0 {
        Some((values[n / 2 - 1] + values[n / 2]) / 2.0)
    } else {
        Some(values[n / 2])
    }
}

/// Most frequent non-missing code; ties resolve to the lowest code.
fn column_mode(ca: &Int64Chunked) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in ca.into_iter().flatten() {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    for (code, count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((code, count)),
        }
    }
    best.map(|(code, _)| code)
}

fn threshold_flag<F: Fn(f64) -> bool>(ca: &Float64Chunked, fires: F) -> Vec<i32> {
    ca.into_iter()
        .map(|v| match v {
            Some(x) if fires(x) => 1,
            _ => 0,
        })
        .collect()
}
