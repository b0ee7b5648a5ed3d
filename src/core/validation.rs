//! Input validation utilities.
//!
//! Fail-fast checks applied to configuration values before any processing
//! begins, so that bad thresholds surface as [`SplitError::ConfigError`]
//! instead of nonsense downstream geometry.

use crate::core::SplitError;

/// Validates that a float value is finite (not NaN or infinite).
#[inline]
pub fn validate_finite(value: f32, param_name: &str) -> Result<(), SplitError> {
    if !value.is_finite() {
        return Err(SplitError::ConfigError {
            message: format!("parameter '{}' must be finite, got: {}", param_name, value),
        });
    }
    Ok(())
}

/// Validates that a value is within a specified range (inclusive).
#[inline]
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    param_name: &str,
) -> Result<(), SplitError> {
    if value < min || value > max {
        return Err(SplitError::ConfigError {
            message: format!(
                "parameter '{}' must be in range [{}, {}], got: {}",
                param_name, min, max, value
            ),
        });
    }
    Ok(())
}

/// Validates that a value is positive (> 0).
#[inline]
pub fn validate_positive<T: PartialOrd + std::fmt::Display + Default>(
    value: T,
    param_name: &str,
) -> Result<(), SplitError> {
    if value <= T::default() {
        return Err(SplitError::ConfigError {
            message: format!("parameter '{}' must be positive, got: {}", param_name, value),
        });
    }
    Ok(())
}

/// Validates that a value is non-negative (>= 0).
#[inline]
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + Default>(
    value: T,
    param_name: &str,
) -> Result<(), SplitError> {
    if value < T::default() {
        return Err(SplitError::ConfigError {
            message: format!(
                "parameter '{}' must be non-negative, got: {}",
                param_name, value
            ),
        });
    }
    Ok(())
}

/// Validates that a ratio lies in the unit interval and is finite.
#[inline]
pub fn validate_unit_ratio(value: f32, param_name: &str) -> Result<(), SplitError> {
    validate_finite(value, param_name)?;
    validate_range(value, 0.0, 1.0, param_name)
}
