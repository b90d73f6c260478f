//! Dataset Filter Module
//! Read-only, AND-composed predicate views over the enriched frame.

use polars::prelude::*;

/// Caller-supplied predicates. `None` leaves a dimension unfiltered; an
/// age bound is inclusive.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub age_min: Option<f64>,
    pub age_max: Option<f64>,
    pub sex: Option<String>,
    pub dataset: Option<String>,
}

impl FilterParams {
    /// Interpret a sidebar-style choice where "All" disables the predicate.
    pub fn choice(value: &str) -> Option<String> {
        if value.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.age_min.is_none()
            && self.age_max.is_none()
            && self.sex.is_none()
            && self.dataset.is_none()
    }

    /// Apply the active predicates, producing an independent frame. The
    /// input frame is never modified.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let mut lazy = df.clone().lazy();
        if let Some(min) = self.age_min {
            lazy = lazy.filter(col("age").gt_eq(lit(min)));
        }
        if let Some(max) = self.age_max {
            lazy = lazy.filter(col("age").lt_eq(lit(max)));
        }
        if let Some(sex) = &self.sex {
            lazy = lazy.filter(col("sex").eq(lit(sex.as_str())));
        }
        if let Some(dataset) = &self.dataset {
            lazy = lazy.filter(col("dataset").eq(lit(dataset.as_str())));
        }
        lazy.collect()
    }
}
