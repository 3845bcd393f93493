// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Minimum customer name length, in characters.
pub const MIN_NAME_CHARS: usize = 2;

/// Maximum customer name length, in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// Maximum rejection reason length, in characters.
pub const MAX_REJECTION_REASON_CHARS: usize = 500;

/// Validates a customer name and returns it trimmed.
///
/// Lengths are counted in characters, not bytes, so names in any script
/// are measured the same way.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the trimmed name is shorter than
/// `MIN_NAME_CHARS` or longer than `MAX_NAME_CHARS`.
pub fn validate_customer_name(name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    let length: usize = trimmed.chars().count();

    // Rule: name must be at least 2 characters
    if length < MIN_NAME_CHARS {
        return Err(DomainError::InvalidName(format!(
            "Name must be at least {MIN_NAME_CHARS} characters"
        )));
    }

    // Rule: name must be at most 100 characters
    if length > MAX_NAME_CHARS {
        return Err(DomainError::InvalidName(format!(
            "Name must be at most {MAX_NAME_CHARS} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Validates a batch label and returns it trimmed.
///
/// # Errors
///
/// Returns `DomainError::InvalidBatch` if the batch is blank.
pub fn validate_batch(batch: &str) -> Result<String, DomainError> {
    let trimmed: &str = batch.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidBatch(String::from(
            "Batch cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates a phone number.
///
/// A phone number is 9 or 10 ASCII digits with no separators.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhone` if the number does not match.
pub fn validate_phone(phone: &str) -> Result<String, DomainError> {
    let trimmed: &str = phone.trim();
    let all_digits: bool = trimmed.chars().all(|c| c.is_ascii_digit());

    if !all_digits || !(9..=10).contains(&trimmed.len()) {
        return Err(DomainError::InvalidPhone(String::from(
            "Phone number must be 9 or 10 digits",
        )));
    }

    Ok(trimmed.to_string())
}

/// Normalizes an optional rejection reason.
///
/// Blank reasons become `None`.
///
/// # Errors
///
/// Returns `DomainError::InvalidRejectionReason` if the reason exceeds
/// `MAX_REJECTION_REASON_CHARS`.
pub fn normalize_rejection_reason(reason: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    if reason.chars().count() > MAX_REJECTION_REASON_CHARS {
        return Err(DomainError::InvalidRejectionReason(format!(
            "Reason must be at most {MAX_REJECTION_REASON_CHARS} characters"
        )));
    }

    Ok(Some(reason.to_string()))
}
