//! BMI calculation and classification.
//!
//! Everything here is pure: inputs are normalized to kilograms and metres,
//! the BMI is computed, then looked up in the threshold table for the
//! age category. Inputs are not validated here, see [`crate::validation`].

use crate::{AgeCategory, BmiResult, CalculationInput, Category};
use chrono::{DateTime, SecondsFormat, Utc};

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

/// Metres per inch
pub const M_PER_INCH: f64 = 0.0254;

/// One half-open band `[lower, upper)`; `None` means unbounded above
pub type Band = (f64, Option<f64>, Category);

const INFANT_BANDS: [Band; 4] = [
    (0.0, Some(14.0), Category::Underweight),
    (14.0, Some(17.0), Category::NormalWeight),
    (17.0, Some(19.0), Category::Overweight),
    (19.0, None, Category::Obese),
];

const CHILD_BANDS: [Band; 4] = [
    (0.0, Some(14.0), Category::Underweight),
    (14.0, Some(18.0), Category::NormalWeight),
    (18.0, Some(20.0), Category::Overweight),
    (20.0, None, Category::Obese),
];

const ADULT_BANDS: [Band; 4] = [
    (0.0, Some(18.5), Category::Underweight),
    (18.5, Some(25.0), Category::NormalWeight),
    (25.0, Some(30.0), Category::Overweight),
    (30.0, None, Category::Obese),
];

/// Threshold table for an age category, ordered by lower bound
pub fn bands(age_category: AgeCategory) -> &'static [Band; 4] {
    match age_category {
        AgeCategory::Infant => &INFANT_BANDS,
        AgeCategory::Child => &CHILD_BANDS,
        AgeCategory::Adult => &ADULT_BANDS,
    }
}

/// Classify a BMI value for the given age category
///
/// Lower bounds are inclusive, so a value sitting exactly on a boundary
/// lands in the upper band. Values below zero count as underweight; a NaN
/// matches no band and falls through to the last one.
pub fn classify(bmi: f64, age_category: AgeCategory) -> Category {
    let table = bands(age_category);

    if bmi < table[0].0 {
        return table[0].2;
    }

    table
        .iter()
        .find(|(lower, upper, _)| bmi >= *lower && upper.map_or(true, |u| bmi < u))
        .map(|(_, _, category)| *category)
        .unwrap_or(table[table.len() - 1].2)
}

/// Weight in kilograms and height in metres
pub fn to_metric(weight: f64, height: f64, use_metric: bool) -> (f64, f64) {
    if use_metric {
        (weight, height / 100.0)
    } else {
        (weight * KG_PER_LB, height * M_PER_INCH)
    }
}

/// Body mass index from kilograms and metres
pub fn body_mass_index(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

/// Calculate and classify, stamping the record with the current time
pub fn calculate(input: &CalculationInput) -> BmiResult {
    calculate_at(input, Utc::now())
}

/// Calculate and classify with an explicit creation instant
pub fn calculate_at(input: &CalculationInput, now: DateTime<Utc>) -> BmiResult {
    let (weight_kg, height_m) = to_metric(input.weight, input.height, input.use_metric);
    let bmi = body_mass_index(weight_kg, height_m);
    let category = classify(bmi, input.age_category);

    tracing::debug!(
        "Calculated BMI {:.2} ({}) for {} input",
        bmi,
        category,
        input.age_category
    );

    BmiResult {
        bmi,
        category,
        age: input.age,
        weight: input.weight,
        height: input.height,
        age_category: input.age_category,
        gender: input.gender,
        use_metric: input.use_metric,
        timestamp: format_timestamp(now),
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
