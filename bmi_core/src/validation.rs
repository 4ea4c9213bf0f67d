//! Input checks performed by callers before invoking the engine.

use crate::{Error, Result};

/// Parse a measurement typed by the user
pub fn parse_measurement(field: &str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }

    trimmed
        .parse::<f64>()
        .map_err(|_| Error::Validation(format!("{} must be a number, got '{}'", field, trimmed)))
}

/// Reject non-finite or non-positive age, weight or height
pub fn validate_input(age: f64, weight: f64, height: f64) -> Result<()> {
    for (field, value) in [("age", age), ("weight", weight), ("height", height)] {
        if !value.is_finite() {
            return Err(Error::Validation(format!("{} must be a number", field)));
        }
        if value <= 0.0 {
            return Err(Error::Validation(format!(
                "{} must be greater than zero",
                field
            )));
        }
    }
    Ok(())
}
