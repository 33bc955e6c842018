//! # Error Types
//!
//! Domain-specific error types for pickup-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pickup-core errors (this file)                                        │
//! │  └── BarcodeError                                                      │
//! │      ├── InvalidFormat            - token is not 13 (or 12) digits     │
//! │      ├── CheckDigitMismatch       - strict mode only                   │
//! │      └── TokenAllocationExhausted - every candidate was taken          │
//! │                                                                         │
//! │  pickup-cli errors (app)                                               │
//! │  ├── ConfigError                  - bad environment values             │
//! │  └── anyhow::Error                - everything at the binary boundary  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Check Digit Policy
//! A mismatched check digit is NOT an error on the default path. The encoder
//! logs it and renders anyway. `CheckDigitMismatch` is only produced when a
//! caller opts into [`CheckDigitPolicy::Strict`](crate::ean13::CheckDigitPolicy).

use thiserror::Error;

// =============================================================================
// Barcode Error
// =============================================================================

/// Errors raised by encoding, rendering and token handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    /// The token is not made of the expected number of ASCII digits.
    ///
    /// ## When This Occurs
    /// - `encode("123")` - too short
    /// - `encode("40063813339x1")` - non-digit character
    /// - `PickupToken::complete("12345")` - neither 12 nor 13 digits
    #[error("Invalid token '{value}': {reason}")]
    InvalidFormat { value: String, reason: String },

    /// The 13th digit differs from the computed check digit.
    ///
    /// Only returned under `CheckDigitPolicy::Strict`.
    #[error("Check digit mismatch for {token}: expected {expected}, found {found}")]
    CheckDigitMismatch {
        token: String,
        expected: u8,
        found: u8,
    },

    /// Every generated candidate was already in use.
    #[error("Failed to allocate a pickup token after {attempts} attempts")]
    TokenAllocationExhausted { attempts: usize },
}

impl BarcodeError {
    /// Shorthand for an [`BarcodeError::InvalidFormat`].
    pub(crate) fn invalid_format(value: &str, reason: impl Into<String>) -> Self {
        BarcodeError::InvalidFormat {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with BarcodeError.
pub type BarcodeResult<T> = Result<T, BarcodeError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BarcodeError::invalid_format("123", "expected 13 digits, got 3");
        assert_eq!(
            err.to_string(),
            "Invalid token '123': expected 13 digits, got 3"
        );

        let err = BarcodeError::CheckDigitMismatch {
            token: "4006381333932".to_string(),
            expected: 1,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Check digit mismatch for 4006381333932: expected 1, found 2"
        );
    }

    #[test]
    fn test_allocation_error_message() {
        let err = BarcodeError::TokenAllocationExhausted { attempts: 8 };
        assert_eq!(
            err.to_string(),
            "Failed to allocate a pickup token after 8 attempts"
        );
    }
}
