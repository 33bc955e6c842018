//! # EAN-13 Symbology
//!
//! Check-digit arithmetic and module-pattern encoding for EAN-13.
//!
//! ## Symbol Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    EAN-13 Module Pattern (95 bits)                      │
//! │                                                                         │
//! │   token:  4 │ 0 0 6 3 8 1 │ 3 3 3 9 3 1                                 │
//! │           │   └── L/G ──┘   └── R ────┘                                 │
//! │           └── selects the parity plan (not encoded directly)            │
//! │                                                                         │
//! │   101  │ 6 × 7 bits │ 01010 │ 6 × 7 bits │ 101                          │
//! │   start   left half   middle   right half   end                         │
//! │   [0,3)   [3,45)      [45,50)  [50,92)      [92,95)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Check Digit Policy
//! The encoder always computes the expected check digit. Under the default
//! [`CheckDigitPolicy::Lenient`] a mismatch is logged with `tracing::warn!`
//! and the token is encoded anyway; pickup counters must never be blocked
//! by a mis-typed legacy token.
//!
//! ## Usage
//! ```rust
//! use pickup_core::ean13::{compute_check_digit, encode};
//!
//! assert_eq!(compute_check_digit("400638133393").unwrap(), 1);
//!
//! let pattern = encode("4006381333931").unwrap();
//! assert_eq!(pattern.len(), 95);
//! assert!(pattern.starts_with("101"));
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::error::{BarcodeError, BarcodeResult};

// =============================================================================
// Symbology Constants
// =============================================================================

/// Number of digits in a complete token.
pub const TOKEN_LENGTH: usize = 13;

/// Number of digits before the check digit.
pub const PAYLOAD_LENGTH: usize = 12;

/// Number of modules in an encoded symbol.
pub const PATTERN_LENGTH: usize = 95;

/// Start guard, drawn before the left half.
pub const START_GUARD: &str = "101";

/// Middle guard, between the left and right halves.
pub const MIDDLE_GUARD: &str = "01010";

/// End guard, drawn after the right half.
pub const END_GUARD: &str = "101";

/// Offset of the middle guard inside a pattern (start guard + 6 × 7 bits).
pub const MIDDLE_GUARD_OFFSET: usize = 3 + 6 * 7;

/// Left-hand odd parity codes, indexed by digit.
const L_CODES: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];

/// Left-hand even parity codes, indexed by digit.
const G_CODES: [&str; 10] = [
    "0100111", "0110011", "0011011", "0100001", "0011101", "0111001", "0000101", "0010001",
    "0001001", "0010111",
];

/// Right-hand codes, indexed by digit.
const R_CODES: [&str; 10] = [
    "1110010", "1100110", "1101100", "1000010", "1011100", "1001110", "1010000", "1000100",
    "1001000", "1110100",
];

/// Parity plan for the left half, indexed by the first digit.
const PARITY_PLAN: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

// =============================================================================
// Check Digit Policy
// =============================================================================

/// How the encoder reacts to a 13th digit that does not match.
///
/// ## Modes
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LENIENT (Default)                                                     │
/// │  • Mismatch is logged at WARN level                                    │
/// │  • Pattern is produced from the digits as supplied                     │
/// │                                                                         │
/// │  STRICT (Opt-in)                                                       │
/// │  • Mismatch returns BarcodeError::CheckDigitMismatch                   │
/// │  • Nothing is encoded                                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CheckDigitPolicy {
    /// Warn and render anyway.
    #[default]
    Lenient,
    /// Reject tokens whose check digit is wrong.
    Strict,
}

// =============================================================================
// Digit Parsing
// =============================================================================

/// Parses exactly `N` ASCII digits into their numeric values.
///
/// Anything else (wrong length, a sign, a space, a non-ASCII digit) is an
/// `InvalidFormat` error. Nothing is ever coerced to zero.
pub(crate) fn parse_digits<const N: usize>(value: &str) -> BarcodeResult<[u8; N]> {
    let count = value.chars().count();
    if count != N {
        return Err(BarcodeError::invalid_format(
            value,
            format!("expected {} digits, got {}", N, count),
        ));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BarcodeError::invalid_format(
            value,
            "must contain only digits 0-9",
        ));
    }

    let mut digits = [0u8; N];
    for (slot, byte) in digits.iter_mut().zip(value.bytes()) {
        *slot = byte - b'0';
    }

    Ok(digits)
}

// =============================================================================
// Check Digit
// =============================================================================

/// Weighted modulo-10 check over the first 12 digits.
///
/// Even 0-based positions weigh 1, odd 0-based positions weigh 3.
pub(crate) fn check_digit_of(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .take(PAYLOAD_LENGTH)
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d as u32 } else { 3 * d as u32 })
        .sum();
    ((10 - (sum % 10)) % 10) as u8
}

/// Computes the EAN-13 check digit for a 12-digit payload.
///
/// ## Example
/// ```rust
/// use pickup_core::ean13::compute_check_digit;
///
/// assert_eq!(compute_check_digit("400638133393").unwrap(), 1);
/// assert!(compute_check_digit("4006381333").is_err());
/// ```
pub fn compute_check_digit(payload: &str) -> BarcodeResult<u8> {
    let digits = parse_digits::<PAYLOAD_LENGTH>(payload)?;
    Ok(check_digit_of(&digits))
}

/// Strict validity check used by the counter scan lane.
///
/// True only for 13 ASCII digits whose last digit is the correct check digit.
/// Rendering never calls this; see [`CheckDigitPolicy`].
pub fn is_valid(code: &str) -> bool {
    match parse_digits::<TOKEN_LENGTH>(code) {
        Ok(digits) => check_digit_of(&digits) == digits[PAYLOAD_LENGTH],
        Err(_) => false,
    }
}

// =============================================================================
// Encoder
// =============================================================================

/// Encodes a 13-digit token into its 95-module pattern (lenient).
///
/// ## Errors
/// `InvalidFormat` when the token is not exactly 13 ASCII digits. A wrong
/// check digit is logged, never returned.
pub fn encode(token: &str) -> BarcodeResult<String> {
    encode_with(token, CheckDigitPolicy::Lenient)
}

/// Encodes a 13-digit token with an explicit check-digit policy.
///
/// ## Flow
/// ```text
/// token ──► parse 13 digits ──► expected check digit ──► policy
///                                                          │
///              ┌───────────────────────────────────────────┘
///              ▼
/// "101" + L/G(d1..d6 per plan[d0]) + "01010" + R(d7..d12) + "101"
/// ```
pub fn encode_with(token: &str, policy: CheckDigitPolicy) -> BarcodeResult<String> {
    let digits = parse_digits::<TOKEN_LENGTH>(token)?;

    let expected = check_digit_of(&digits);
    let found = digits[PAYLOAD_LENGTH];
    if expected != found {
        match policy {
            CheckDigitPolicy::Lenient => {
                warn!(
                    token = %token,
                    expected,
                    found,
                    "EAN-13 check digit mismatch, encoding as supplied"
                );
            }
            CheckDigitPolicy::Strict => {
                return Err(BarcodeError::CheckDigitMismatch {
                    token: token.to_string(),
                    expected,
                    found,
                });
            }
        }
    }

    let plan = PARITY_PLAN[digits[0] as usize].as_bytes();

    let mut pattern = String::with_capacity(PATTERN_LENGTH);
    pattern.push_str(START_GUARD);

    for (parity, &digit) in plan.iter().zip(&digits[1..7]) {
        let table = if *parity == b'G' { &G_CODES } else { &L_CODES };
        pattern.push_str(table[digit as usize]);
    }

    pattern.push_str(MIDDLE_GUARD);

    for &digit in &digits[7..TOKEN_LENGTH] {
        pattern.push_str(R_CODES[digit as usize]);
    }

    pattern.push_str(END_GUARD);

    debug_assert_eq!(pattern.len(), PATTERN_LENGTH);
    Ok(pattern)
}

// =============================================================================
// Unit Tests
// =============================================================================
