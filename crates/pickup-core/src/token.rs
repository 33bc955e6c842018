//! # Pickup Tokens
//!
//! The 13-digit numeric token printed on every cafeteria order.
//!
//! ## Token Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Pickup Token Lifecycle                            │
//! │                                                                         │
//! │  Order created                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PickupToken::allocate(rng, 8, is_taken) ← 12 random digits + check   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Stored by the caller (never here)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Printed as an EAN-13 symbol (render / page scan)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Counter scanner types digits + Enter                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_scanned(raw) ──► ean13::is_valid ──► caller looks it up     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tokens are opaque: they carry no personal data, only random digits.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ean13::{self, CheckDigitPolicy, PAYLOAD_LENGTH, TOKEN_LENGTH};
use crate::error::{BarcodeError, BarcodeResult};

/// Default number of candidates tried by [`PickupToken::allocate`].
pub const DEFAULT_ALLOCATION_ATTEMPTS: usize = 8;

// =============================================================================
// Pickup Token
// =============================================================================

/// A validated 13-digit token.
///
/// ## Invariants
/// - Exactly 13 characters, each in `0`-`9`
/// - Immutable once constructed
///
/// The check digit is NOT guaranteed to be correct unless the token was built
/// with [`PickupToken::parse_strict`], [`PickupToken::from_payload`] or
/// [`PickupToken::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PickupToken(String);

impl PickupToken {
    /// Accepts any 13-digit string, whatever its check digit.
    ///
    /// ## Example
    /// ```rust
    /// use pickup_core::PickupToken;
    ///
    /// assert!(PickupToken::parse("4006381333931").is_ok());
    /// assert!(PickupToken::parse("4006381333932").is_ok()); // lenient
    /// assert!(PickupToken::parse("400638133393").is_err());
    /// ```
    pub fn parse(value: &str) -> BarcodeResult<Self> {
        ean13::parse_digits::<TOKEN_LENGTH>(value)?;
        Ok(PickupToken(value.to_string()))
    }

    /// Accepts a 13-digit string only if its check digit is correct.
    pub fn parse_strict(value: &str) -> BarcodeResult<Self> {
        let token = Self::parse(value)?;
        let expected = token.expected_check_digit();
        let found = token.check_digit();
        if expected != found {
            return Err(BarcodeError::CheckDigitMismatch {
                token: value.to_string(),
                expected,
                found,
            });
        }
        Ok(token)
    }

    /// Builds a token from a 12-digit payload by appending its check digit.
    pub fn from_payload(payload: &str) -> BarcodeResult<Self> {
        let check = ean13::compute_check_digit(payload)?;
        Ok(PickupToken(format!("{payload}{check}")))
    }

    /// Resolves a 12- or 13-digit string into a token.
    ///
    /// ## Rules
    /// - 12 digits: the check digit is computed and appended
    /// - 13 digits: used as-is (check digit not enforced)
    /// - anything else: `InvalidFormat`
    pub fn complete(value: &str) -> BarcodeResult<Self> {
        if value.len() == PAYLOAD_LENGTH {
            Self::from_payload(value)
        } else {
            Self::parse(value)
        }
    }

    /// Generates a fresh token: 12 uniformly random digits plus check digit.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut digits = [0u8; TOKEN_LENGTH];
        for digit in digits.iter_mut().take(PAYLOAD_LENGTH) {
            *digit = rng.gen_range(0..10u8);
        }
        digits[PAYLOAD_LENGTH] = ean13::check_digit_of(&digits);
        PickupToken(digits.iter().map(|&d| char::from(b'0' + d)).collect())
    }

    /// Generates tokens until one is not taken.
    ///
    /// Uniqueness is the caller's concern: `is_taken` typically asks the
    /// order store whether the candidate already exists.
    ///
    /// ## Errors
    /// `TokenAllocationExhausted` after `attempts` collisions.
    pub fn allocate<R, F>(rng: &mut R, attempts: usize, mut is_taken: F) -> BarcodeResult<Self>
    where
        R: Rng,
        F: FnMut(&PickupToken) -> bool,
    {
        for _ in 0..attempts {
            let candidate = Self::generate(rng);
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(token = %candidate, "Pickup token collision, retrying");
        }
        Err(BarcodeError::TokenAllocationExhausted { attempts })
    }

    /// The token digits.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first 12 digits.
    #[inline]
    pub fn payload(&self) -> &str {
        &self.0[..PAYLOAD_LENGTH]
    }

    /// The supplied 13th digit.
    #[inline]
    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[PAYLOAD_LENGTH] - b'0'
    }

    /// The check digit the payload calls for.
    pub fn expected_check_digit(&self) -> u8 {
        let digits: Vec<u8> = self.0.bytes().map(|b| b - b'0').collect();
        ean13::check_digit_of(&digits)
    }

    /// True when the supplied check digit matches the payload.
    pub fn has_valid_check_digit(&self) -> bool {
        self.check_digit() == self.expected_check_digit()
    }

    /// Encodes this token into its 95-module pattern.
    pub fn encode(&self, policy: CheckDigitPolicy) -> BarcodeResult<String> {
        ean13::encode_with(&self.0, policy)
    }
}

impl fmt::Display for PickupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PickupToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PickupToken {
    type Error = BarcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PickupToken::parse(&value)
    }
}

impl From<PickupToken> for String {
    fn from(token: PickupToken) -> Self {
        token.0
    }
}

impl std::str::FromStr for PickupToken {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PickupToken::parse(s)
    }
}

// =============================================================================
// Scanner Input
// =============================================================================

/// Keeps only the ASCII digits of raw scanner or keyboard input.
///
/// ## Example
/// ```rust
/// use pickup_core::token::normalize_scanned;
///
/// assert_eq!(normalize_scanned("  400-6381 333931\n"), "4006381333931");
/// ```
pub fn normalize_scanned(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
