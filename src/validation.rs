// Validation utilities module
// Custom validation functions for marketplace request DTOs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::ValidationError;

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Validates a phone number: digits with optional `+ - ( )` and spaces, 7 to 15 digits
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    let digits = phone.chars().filter(char::is_ascii_digit).count();

    if allowed && (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(error_with_message(
            "invalid_phone",
            "Please enter a valid phone number",
        ))
    }
}

/// Validates that a money amount is strictly positive
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(error_with_message(
            "amount_must_be_positive",
            "Amount must be greater than zero",
        ))
    }
}

/// Validates that a date is today or later
pub fn validate_not_in_past(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date >= Utc::now().date_naive() {
        Ok(())
    } else {
        Err(error_with_message(
            "date_in_past",
            "Date must not be in the past",
        ))
    }
}

/// Validates that a string is not only whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error_with_message("blank", "This field is required"))
    } else {
        Ok(())
    }
}
