//! Statistics Calculator Module
//! Group-by aggregates and headline insights for the dashboard layer.

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::{BTreeMap, HashMap};

/// Significance threshold for the age-gap t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Count of records in one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u32,
}

/// Mean of a numeric column within one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryMean {
    pub category: String,
    pub mean: f64,
}

/// One bar segment of a per-category disease chart.
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownRow {
    pub category: String,
    pub has_disease: bool,
    pub count: u32,
    /// Share of this segment within its category, in percent.
    pub percentage: f64,
}

/// Headline numbers for the overview cards.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewMetrics {
    pub total_patients: usize,
    pub heart_disease_count: u32,
    pub heart_disease_rate: f64,
    pub mean_age: f64,
    pub male_count: u32,
    pub male_percentage: f64,
}

/// Findings for the insights panel.
#[derive(Debug, Clone, Serialize)]
pub struct KeyInsights {
    pub overall_rate: f64,
    pub male_rate: f64,
    pub female_rate: f64,
    /// Mean age of diseased minus healthy patients, in years.
    pub age_gap_years: f64,
    pub age_gap_p_value: Option<f64>,
    pub age_gap_significant: bool,
    /// Chest-pain code with the highest disease rate, rate in percent.
    pub highest_risk_chest_pain: Option<CategoryMean>,
}

/// Handles aggregate queries over the enriched frame. All functions take the
/// frame by shared reference; concurrent callers can share one cached frame.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Count records per category of `column`, missing categories excluded.
    pub fn count_by(df: &DataFrame, column: &str) -> PolarsResult<Vec<CategoryCount>> {
        let keys = Self::category_keys(df, column)?;
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for key in keys.into_iter().flatten() {
            *counts.entry(key).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }

    /// Mean of `value_column` per category of `group_column`.
    pub fn mean_by(
        df: &DataFrame,
        group_column: &str,
        value_column: &str,
    ) -> PolarsResult<Vec<CategoryMean>> {
        let keys = Self::category_keys(df, group_column)?;
        let values_col = df.column(value_column)?.cast(&DataType::Float64)?;
        let values = values_col.f64()?;

        let mut acc: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for (key, value) in keys.into_iter().zip(values) {
            if let (Some(key), Some(value)) = (key, value) {
                let entry = acc.entry(key).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        Ok(acc
            .into_iter()
            .map(|(category, (sum, n))| CategoryMean {
                category,
                mean: sum / n as f64,
            })
            .collect())
    }

    /// Disease rate in percent per category of `column` (the risk bars).
    pub fn risk_by(df: &DataFrame, column: &str) -> PolarsResult<Vec<CategoryMean>> {
        let mut rates = Self::mean_by(df, column, "has_heart_disease")?;
        for rate in &mut rates {
            rate.mean *= 100.0;
        }
        Ok(rates)
    }

    /// Per-(category, disease) counts with the within-category share.
    pub fn disease_breakdown(df: &DataFrame, column: &str) -> PolarsResult<Vec<BreakdownRow>> {
        let keys = Self::category_keys(df, column)?;
        let target = Self::target_values(df)?;

        let mut counts: BTreeMap<(String, bool), u32> = BTreeMap::new();
        let mut totals: BTreeMap<String, u32> = BTreeMap::new();
        for (key, has) in keys.into_iter().zip(target) {
            if let (Some(key), Some(has)) = (key, has) {
                *counts.entry((key.clone(), has > 0)).or_insert(0) += 1;
                *totals.entry(key).or_insert(0) += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|((category, has_disease), count)| {
                let total = totals[&category];
                BreakdownRow {
                    has_disease,
                    count,
                    percentage: count as f64 / total as f64 * 100.0,
                    category,
                }
            })
            .collect())
    }

    /// Compute breakdowns for several columns in parallel over the shared
    /// read-only frame.
    pub fn breakdowns_parallel(
        df: &DataFrame,
        columns: &[&str],
    ) -> PolarsResult<HashMap<String, Vec<BreakdownRow>>> {
        columns
            .par_iter()
            .map(|column| {
                Self::disease_breakdown(df, column).map(|rows| ((*column).to_string(), rows))
            })
            .collect()
    }

    /// Headline numbers for the overview cards.
    pub fn overview_metrics(df: &DataFrame) -> PolarsResult<OverviewMetrics> {
        let total = df.height();
        let disease_count = Self::target_values(df)?
            .into_iter()
            .flatten()
            .filter(|v| *v > 0)
            .count() as u32;

        let age_col = df.column("age")?.cast(&DataType::Float64)?;
        let ages: Vec<f64> = age_col.f64()?.into_iter().flatten().collect();

        let sex_col = df.column("sex")?.cast(&DataType::String)?;
        let male_count = sex_col
            .str()?
            .into_iter()
            .flatten()
            .filter(|s| *s == "Male")
            .count() as u32;

        Ok(OverviewMetrics {
            total_patients: total,
            heart_disease_count: disease_count,
            heart_disease_rate: percent(disease_count, total),
            mean_age: mean(&ages),
            male_count,
            male_percentage: percent(male_count, total),
        })
    }

    /// Findings for the insights panel: gender disparity, the age gap between
    /// diseased and healthy patients (with a Welch t-test), and the
    /// chest-pain type carrying the highest disease rate.
    pub fn key_insights(df: &DataFrame) -> PolarsResult<KeyInsights> {
        let overview = Self::overview_metrics(df)?;

        let by_sex = Self::risk_by(df, "sex")?;
        let rate_for = |sex: &str| {
            by_sex
                .iter()
                .find(|r| r.category == sex)
                .map(|r| r.mean)
                .unwrap_or(0.0)
        };

        let age_col = df.column("age")?.cast(&DataType::Float64)?;
        let ages = age_col.f64()?;
        let target = Self::target_values(df)?;
        let mut diseased: Vec<f64> = Vec::new();
        let mut healthy: Vec<f64> = Vec::new();
        for (age, has) in ages.into_iter().zip(target) {
            if let (Some(age), Some(has)) = (age, has) {
                if has > 0 {
                    diseased.push(age);
                } else {
                    healthy.push(age);
                }
            }
        }

        let (p_value, significant) = welch_ttest(&diseased, &healthy);

        let highest_risk_chest_pain = Self::risk_by(df, "cp")?
            .into_iter()
            .max_by(|a, b| {
                a.mean
                    .partial_cmp(&b.mean)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        Ok(KeyInsights {
            overall_rate: overview.heart_disease_rate,
            male_rate: rate_for("Male"),
            female_rate: rate_for("Female"),
            age_gap_years: mean(&diseased) - mean(&healthy),
            age_gap_p_value: (!p_value.is_nan()).then_some(p_value),
            age_gap_significant: significant,
            highest_risk_chest_pain,
        })
    }

    /// Category keys of a column as display strings, missing entries as None.
    fn category_keys(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<String>>> {
        let series = df.column(column)?.as_materialized_series();
        Ok(series
            .iter()
            .map(|v| {
                if v.is_null() {
                    None
                } else {
                    Some(v.to_string().trim_matches('"').to_string())
                }
            })
            .collect())
    }

    fn target_values(df: &DataFrame) -> PolarsResult<Vec<Option<i64>>> {
        let target = df.column("has_heart_disease")?.cast(&DataType::Int64)?;
        Ok(target.i64()?.into_iter().collect())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn percent(part: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Welch's t-test (independent samples, unequal variance). Returns the
/// two-tailed p-value and whether it clears [`SIGNIFICANCE_THRESHOLD`];
/// `NaN` when either sample is too small.
fn welch_ttest(group_values: &[f64], control_values: &[f64]) -> (f64, bool) {
    let n1 = group_values.len() as f64;
    let n2 = control_values.len() as f64;

    if n1 < 2.0 || n2 < 2.0 {
        return (f64::NAN, false);
    }

    let mean1 = mean(group_values);
    let mean2 = mean(control_values);

    let var1 = group_values
        .iter()
        .map(|x| (x - mean1).powi(2))
        .sum::<f64>()
        / (n1 - 1.0);
    let var2 = control_values
        .iter()
        .map(|x| (x - mean2).powi(2))
        .sum::<f64>()
        / (n2 - 1.0);

    let se = (var1 / n1 + var2 / n2).sqrt();
    if se == 0.0 {
        return (1.0, false); // No variance difference
    }

    let t = (mean1 - mean2) / se;

    // Welch-Satterthwaite degrees of freedom
    let df_num = (var1 / n1 + var2 / n2).powi(2);
    let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
    let df = df_num / df_denom;

    if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
        let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
        (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
    } else {
        (f64::NAN, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("age".into(), vec![63i64, 41, 55, 39, 70]),
            Column::new(
                "sex".into(),
                vec!["Male", "Female", "Male", "Female", "Male"],
            ),
            Column::new(
                "dataset".into(),
                vec!["Cleveland", "Cleveland", "Hungary", "Hungary", "Cleveland"],
            ),
            Column::new("cp".into(), vec![1i64, 2, 2, 4, 1]),
            Column::new("has_heart_disease".into(), vec![0i32, 1, 1, 0, 1]),
            Column::new(
                "age_group".into(),
                vec![
                    Some("60-69"),
                    Some("40-49"),
                    Some("50-59"),
                    Some("<40"),
                    Some("60-69"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn count_by_sorts_categories_and_skips_missing() {
        let mut df = enriched_frame();
        df.with_column(Column::new(
            "age_group".into(),
            vec![Some("60-69"), Some("40-49"), None, Some("<40"), Some("60-69")],
        ))
        .unwrap();

        let counts = StatsCalculator::count_by(&df, "age_group").unwrap();
        let pairs: Vec<(String, u32)> = counts
            .into_iter()
            .map(|c| (c.category, c.count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("40-49".to_string(), 1),
                ("60-69".to_string(), 2),
                ("<40".to_string(), 1),
            ]
        );
    }

    #[test]
    fn mean_by_averages_within_each_category() {
        let df = enriched_frame();
        let means = StatsCalculator::mean_by(&df, "sex", "age").unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].category, "Female");
        assert!((means[0].mean - 40.0).abs() < 1e-9);
        assert_eq!(means[1].category, "Male");
        assert!((means[1].mean - (63.0 + 55.0 + 70.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn overview_metrics_match_the_five_record_scenario() {
        let df = enriched_frame();
        let metrics = StatsCalculator::overview_metrics(&df).unwrap();
        assert_eq!(metrics.total_patients, 5);
        assert_eq!(metrics.heart_disease_count, 3);
        assert!((metrics.heart_disease_rate - 60.0).abs() < 1e-9);
        assert_eq!(metrics.male_count, 3);
        assert!((metrics.male_percentage - 60.0).abs() < 1e-9);
        assert!((metrics.mean_age - 53.6).abs() < 1e-9);
    }

    #[test]
    fn disease_breakdown_computes_within_category_shares() {
        let df = enriched_frame();
        let rows = StatsCalculator::disease_breakdown(&df, "sex").unwrap();

        let male_diseased = rows
            .iter()
            .find(|r| r.category == "Male" && r.has_disease)
            .unwrap();
        assert_eq!(male_diseased.count, 2);
        assert!((male_diseased.percentage - 2.0 / 3.0 * 100.0).abs() < 1e-9);

        let female_healthy = rows
            .iter()
            .find(|r| r.category == "Female" && !r.has_disease)
            .unwrap();
        assert_eq!(female_healthy.count, 1);
        assert!((female_healthy.percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn risk_by_reports_rates_in_percent() {
        let df = enriched_frame();
        let rates = StatsCalculator::risk_by(&df, "cp").unwrap();
        let for_code = |code: &str| rates.iter().find(|r| r.category == code).unwrap().mean;
        assert!((for_code("1") - 50.0).abs() < 1e-9);
        assert!((for_code("2") - 100.0).abs() < 1e-9);
        assert!((for_code("4") - 0.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_breakdowns_match_the_serial_ones() {
        let df = enriched_frame();
        let parallel = StatsCalculator::breakdowns_parallel(&df, &["sex", "age_group"]).unwrap();
        assert_eq!(parallel.len(), 2);

        let serial = StatsCalculator::disease_breakdown(&df, "sex").unwrap();
        let from_parallel = &parallel["sex"];
        assert_eq!(serial.len(), from_parallel.len());
        for (a, b) in serial.iter().zip(from_parallel) {
            assert_eq!(a.category, b.category);
            assert_eq!(a.has_disease, b.has_disease);
            assert_eq!(a.count, b.count);
        }
    }

    #[test]
    fn key_insights_report_gender_rates_and_riskiest_chest_pain() {
        let df = enriched_frame();
        let insights = StatsCalculator::key_insights(&df).unwrap();
        assert!((insights.overall_rate - 60.0).abs() < 1e-9);
        assert!((insights.male_rate - 2.0 / 3.0 * 100.0).abs() < 1e-9);
        assert!((insights.female_rate - 50.0).abs() < 1e-9);

        let top = insights.highest_risk_chest_pain.unwrap();
        assert_eq!(top.category, "2");
        assert!((top.mean - 100.0).abs() < 1e-9);

        // diseased ages {41, 55, 70}, healthy ages {63, 39}
        let expected_gap = (41.0 + 55.0 + 70.0) / 3.0 - (63.0 + 39.0) / 2.0;
        assert!((insights.age_gap_years - expected_gap).abs() < 1e-9);
    }

    #[test]
    fn welch_ttest_separates_distinct_samples() {
        let a = vec![70.0, 71.0, 72.0, 69.0, 70.5];
        let b = vec![40.0, 41.0, 39.0, 40.5, 41.5];
        let (p, significant) = welch_ttest(&a, &b);
        assert!(p < 0.01);
        assert!(significant);
    }

    #[test]
    fn welch_ttest_needs_two_values_per_sample() {
        let (p, significant) = welch_ttest(&[70.0], &[40.0, 41.0]);
        assert!(p.is_nan());
        assert!(!significant);
    }
}
