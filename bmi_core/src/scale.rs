//! BMI scale used when displaying a result.
//!
//! The scale splits into four equal-width segments, one per category.
//! The open-ended top band is drawn up to a fixed display ceiling.

use crate::engine::bands;
use crate::{AgeCategory, Category};

/// A segment of the displayed scale
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleBand {
    pub category: Category,
    pub min: f64,
    pub max: f64,
    pub range_text: String,
}

fn display_ceiling(age_category: AgeCategory) -> f64 {
    match age_category {
        AgeCategory::Infant | AgeCategory::Child => 30.0,
        AgeCategory::Adult => 50.0,
    }
}

fn format_bound(value: f64) -> String {
    // 18.5 keeps its decimal, whole numbers drop it
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Display bands for an age category, lowest first
pub fn scale_bands(age_category: AgeCategory) -> Vec<ScaleBand> {
    let table = bands(age_category);
    let ceiling = display_ceiling(age_category);
    let last = table.len() - 1;

    table
        .iter()
        .enumerate()
        .map(|(i, (lower, upper, category))| {
            let max = upper.unwrap_or(ceiling);
            let range_text = if i == 0 {
                format!("<{}", format_bound(max))
            } else if i == last {
                format!(">{}", format_bound(*lower))
            } else {
                format!("{}-{}", format_bound(*lower), format_bound(max))
            };

            ScaleBand {
                category: *category,
                min: *lower,
                max,
                range_text,
            }
        })
        .collect()
}

/// Indicator position along the scale, in percent
///
/// Linear within the band the value falls in; anything past the top
/// ceiling pins to 100 and anything below zero (or NaN) to 0.
pub fn scale_position(bmi: f64, age_category: AgeCategory) -> f64 {
    let scale = scale_bands(age_category);
    let segment_width = 100.0 / scale.len() as f64;
    let mut position = 0.0;

    for (i, band) in scale.iter().enumerate() {
        if bmi >= band.min && bmi < band.max {
            let within = (bmi - band.min) / (band.max - band.min);
            position = i as f64 * segment_width + within * segment_width;
            break;
        }

        if i == scale.len() - 1 && bmi >= band.max {
            position = 100.0;
        }
    }

    position.clamp(0.0, 100.0)
}
