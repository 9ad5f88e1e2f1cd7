pub mod auth;
pub mod dashboard;
pub mod health;
pub mod notification;
pub mod payment;
pub mod property;
pub mod tenant;
pub mod unit;
pub mod visitor;

use crate::error::AppError;

/// Trims `value`, rejecting it when nothing is left.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid(field, "This field may not be blank."));
    }
    Ok(value.to_string())
}
