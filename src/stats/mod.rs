//! Stats module - Aggregate queries and insights

mod calculator;

pub use calculator::{
    BreakdownRow, CategoryCount, CategoryMean, KeyInsights, OverviewMetrics, StatsCalculator,
    SIGNIFICANCE_THRESHOLD,
};
