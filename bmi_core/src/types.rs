//! Core domain types for the BMI tracker.
//!
//! This module defines:
//! - Age categories, genders and health categories
//! - The caller-built calculation input
//! - The persisted result record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Classification Inputs
// ============================================================================

/// Age bucket selecting which threshold table applies
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Infant,
    Child,
    #[default]
    Adult,
}

impl AgeCategory {
    /// Resolve a category name, falling back to `Adult` for anything unknown
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "infant" => AgeCategory::Infant,
            "child" => AgeCategory::Child,
            _ => AgeCategory::Adult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Infant => "infant",
            AgeCategory::Child => "child",
            AgeCategory::Adult => "adult",
        }
    }

    /// Human-readable label including the age span
    pub fn label(&self) -> &'static str {
        match self {
            AgeCategory::Infant => "Infant (0-2 years)",
            AgeCategory::Child => "Child (2-18 years)",
            AgeCategory::Adult => "Adult (18+ years)",
        }
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored histories may carry category names this build doesn't know;
// those read back as adult rather than failing the whole history.
impl<'de> Deserialize<'de> for AgeCategory {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(AgeCategory::from_name(&raw))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(crate::Error::Validation(format!(
                "unknown gender '{}', expected male or female",
                other
            ))),
        }
    }
}

// ============================================================================
// Classification Output
// ============================================================================

/// Health category assigned from a BMI value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::NormalWeight => "Normal weight",
            Category::Overweight => "Overweight",
            Category::Obese => "Obese",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Calculation Records
// ============================================================================

/// Biometrics gathered by the caller for a single calculation
///
/// Weight is kilograms and height centimetres when `use_metric` is set,
/// otherwise pounds and inches.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationInput {
    pub age: f64,
    pub weight: f64,
    pub height: f64,
    pub age_category: AgeCategory,
    pub gender: Gender,
    pub use_metric: bool,
}

/// JSON has no infinity or NaN: non-finite values are written as `null`
/// and `null` reads back as NaN.
mod lenient_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

/// A classified calculation, the unit stored in history
///
/// Fields are only readable; records are built by [`crate::engine`] or
/// decoded from storage. `timestamp` doubles as the record's key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BmiResult {
    #[serde(with = "lenient_f64")]
    pub(crate) bmi: f64,
    pub(crate) category: Category,
    #[serde(with = "lenient_f64")]
    pub(crate) age: f64,
    #[serde(with = "lenient_f64")]
    pub(crate) weight: f64,
    #[serde(with = "lenient_f64")]
    pub(crate) height: f64,
    pub(crate) age_category: AgeCategory,
    pub(crate) gender: Gender,
    pub(crate) use_metric: bool,
    pub(crate) timestamp: String,
}

impl BmiResult {
    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn age_category(&self) -> AgeCategory {
        self.age_category
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn use_metric(&self) -> bool {
        self.use_metric
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Parse the stored timestamp, if it is valid RFC 3339
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn weight_unit(&self) -> &'static str {
        if self.use_metric {
            "kg"
        } else {
            "lbs"
        }
    }

    pub fn height_unit(&self) -> &'static str {
        if self.use_metric {
            "cm"
        } else {
            "in"
        }
    }
}
