//! Category Model Module
//! Bin edges, display labels and code mappings for the derived analytic fields.

/// Heart rate below this is flagged as a potential data quality issue.
pub const LOW_HR_THRESHOLD: f64 = 80.0;
/// Cholesterol above this is flagged as an extreme value.
pub const HIGH_CHOL_THRESHOLD: f64 = 400.0;
/// Resting blood pressure above this is flagged as an extreme value.
pub const HIGH_BP_THRESHOLD: f64 = 180.0;

/// Returns true when `value` falls in the half-open interval `(low, high]`.
fn in_bin(value: f64, low: f64, high: f64) -> bool {
    value > low && value <= high
}

/// Age bucket. A value equal to an upper edge falls in the lower bucket, so
/// age 40 is still `<40`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    Under40,
    Forties,
    Fifties,
    Sixties,
    SeventyPlus,
}

impl AgeGroup {
    /// Bucket for an age, or `None` outside `(0, 100]`.
    pub fn from_age(age: f64) -> Option<Self> {
        if in_bin(age, 0.0, 40.0) {
            Some(Self::Under40)
        } else if in_bin(age, 40.0, 50.0) {
            Some(Self::Forties)
        } else if in_bin(age, 50.0, 60.0) {
            Some(Self::Fifties)
        } else if in_bin(age, 60.0, 70.0) {
            Some(Self::Sixties)
        } else if in_bin(age, 70.0, 100.0) {
            Some(Self::SeventyPlus)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Under40 => "<40",
            Self::Forties => "40-49",
            Self::Fifties => "50-59",
            Self::Sixties => "60-69",
            Self::SeventyPlus => "70+",
        }
    }
}

/// Serum cholesterol band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CholCategory {
    Normal,
    Borderline,
    High,
}

impl CholCategory {
    pub fn from_chol(chol: f64) -> Option<Self> {
        if in_bin(chol, 0.0, 200.0) {
            Some(Self::Normal)
        } else if in_bin(chol, 200.0, 240.0) {
            Some(Self::Borderline)
        } else if in_bin(chol, 240.0, 1000.0) {
            Some(Self::High)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal (<200)",
            Self::Borderline => "Borderline (200-239)",
            Self::High => "High (≥240)",
        }
    }
}

/// Resting blood pressure band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpCategory {
    Normal,
    Elevated,
    High,
}

impl BpCategory {
    pub fn from_bp(trestbps: f64) -> Option<Self> {
        if in_bin(trestbps, 0.0, 120.0) {
            Some(Self::Normal)
        } else if in_bin(trestbps, 120.0, 140.0) {
            Some(Self::Elevated)
        } else if in_bin(trestbps, 140.0, 1000.0) {
            Some(Self::High)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal (<120)",
            Self::Elevated => "Elevated (120-139)",
            Self::High => "High (≥140)",
        }
    }
}

/// Maximum achieved heart rate band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrCategory {
    Low,
    Normal,
    High,
}

impl HrCategory {
    pub fn from_hr(thalch: f64) -> Option<Self> {
        if in_bin(thalch, 0.0, 120.0) {
            Some(Self::Low)
        } else if in_bin(thalch, 120.0, 150.0) {
            Some(Self::Normal)
        } else if in_bin(thalch, 150.0, 220.0) {
            Some(Self::High)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low (<120)",
            Self::Normal => "Normal (120-149)",
            Self::High => "High (≥150)",
        }
    }
}

/// Fasting blood sugar reading, decoded from the 0/1 flag. Codes outside the
/// mapping have no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastingBloodSugar {
    AtOrBelow120,
    Above120,
}

impl FastingBloodSugar {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::AtOrBelow120),
            1 => Some(Self::Above120),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AtOrBelow120 => "≤120 mg/dl",
            Self::Above120 => ">120 mg/dl",
        }
    }
}

/// Resting electrocardiogram result, decoded from the 0..=2 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestEcg {
    Normal,
    SttAbnormality,
    LvHypertrophy,
}

impl RestEcg {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::SttAbnormality),
            2 => Some(Self::LvHypertrophy),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::SttAbnormality => "ST-T Abnormality",
            Self::LvHypertrophy => "LV Hypertrophy",
        }
    }
}
