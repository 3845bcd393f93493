// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, MAX_NAME_CHARS, MAX_REJECTION_REASON_CHARS, normalize_rejection_reason,
    validate_batch, validate_customer_name, validate_phone,
};

#[test]
fn test_validate_customer_name_trims() {
    assert_eq!(validate_customer_name("  Somchai  ").unwrap(), "Somchai");
}

#[test]
fn test_validate_customer_name_rejects_single_character() {
    assert!(matches!(
        validate_customer_name(" A "),
        Err(DomainError::InvalidName(_))
    ));
}

#[test]
fn test_validate_customer_name_counts_characters_not_bytes() {
    // Two Thai characters are six bytes but only two characters.
    assert!(validate_customer_name("กข").is_ok());

    let at_limit: String = "ก".repeat(MAX_NAME_CHARS);
    assert!(validate_customer_name(&at_limit).is_ok());

    let over_limit: String = "a".repeat(MAX_NAME_CHARS + 1);
    assert!(validate_customer_name(&over_limit).is_err());
}

#[test]
fn test_validate_batch_rejects_blank() {
    assert!(matches!(
        validate_batch("   "),
        Err(DomainError::InvalidBatch(_))
    ));
    assert_eq!(validate_batch(" 42 ").unwrap(), "42");
}

#[test]
fn test_validate_phone_accepts_nine_and_ten_digits() {
    assert_eq!(validate_phone("021234567").unwrap(), "021234567");
    assert_eq!(validate_phone(" 0812345678 ").unwrap(), "0812345678");
}

#[test]
fn test_validate_phone_rejects_bad_numbers() {
    for phone in ["08123456", "08123456789", "081-234-5678", "08123abcde", ""] {
        assert!(
            matches!(validate_phone(phone), Err(DomainError::InvalidPhone(_))),
            "expected {phone:?} to be rejected"
        );
    }
}

#[test]
fn test_normalize_rejection_reason_blank_is_none() {
    assert_eq!(normalize_rejection_reason(None).unwrap(), None);
    assert_eq!(normalize_rejection_reason(Some("   ")).unwrap(), None);
    assert_eq!(
        normalize_rejection_reason(Some(" slip unreadable ")).unwrap(),
        Some(String::from("slip unreadable"))
    );
}

#[test]
fn test_normalize_rejection_reason_enforces_limit() {
    let too_long: String = "x".repeat(MAX_REJECTION_REASON_CHARS + 1);
    assert!(matches!(
        normalize_rejection_reason(Some(&too_long)),
        Err(DomainError::InvalidRejectionReason(_))
    ));
}
