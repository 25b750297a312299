//! Domain error types.

use thiserror::Error;

/// Errors produced by money arithmetic.
///
/// Every variant is a malformed-value condition; callers treat all of them as
/// the `InvalidValue` kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// An operand violated the sign or nanos-range rules.
    #[error("invalid money value: units={units}, nanos={nanos}")]
    InvalidValue { units: i64, nanos: i32 },

    /// Operands were in different currencies.
    #[error("cannot add {left} to {right}: currencies differ")]
    CurrencyMismatch { left: String, right: String },

    /// The units component overflowed.
    #[error("money amount overflowed")]
    Overflow,
}
