// Read-only reference data
pub mod catalog;

// Ore batches and equipment
pub mod inventory;

// Sales orders with line items
pub mod orders;

pub mod logs;
pub mod shipments;

use validator::ValidationError;

/// Rejects empty and whitespace-only strings
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Quantities must be finite and strictly positive
pub(crate) fn validate_positive_quantity(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        let mut err = ValidationError::new("quantity");
        err.message = Some("quantity must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

/// Normalizes an optional status, falling back to `default` when blank
pub(crate) fn status_or_default(status: Option<&str>, default: &str) -> String {
    status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
