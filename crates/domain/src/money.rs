//! Fixed-point money with nine fractional digits.
//!
//! A [`Money`] value is an integral `units` amount plus a `nanos` remainder in
//! billionths. Both parts must carry the same sign (either may be zero), which
//! keeps every amount in a single canonical form and lets [`Money::checked_add`]
//! combine values exactly, without floating point.

use serde::{Deserialize, Serialize};

use crate::error::MoneyError;

/// Smallest legal `nanos` value.
pub const NANOS_MIN: i32 = -999_999_999;

/// Largest legal `nanos` value.
pub const NANOS_MAX: i32 = 999_999_999;

/// Number of nanos in one unit.
pub const NANOS_MOD: i32 = 1_000_000_000;

/// An amount of money in a single currency.
///
/// Immutable: arithmetic always produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Money {
    #[serde(alias = "currencyCode", default)]
    currency_code: String,
    #[serde(default)]
    units: i64,
    #[serde(default)]
    nanos: i32,
}

impl Money {
    /// Creates a money value without validating it.
    ///
    /// Validity is checked where values are combined; use [`Money::is_valid`]
    /// to check up front.
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }

    /// The additive identity for `currency_code`.
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(currency_code, 0, 0)
    }

    /// ISO 4217 currency code, e.g. `"USD"`. May be empty for an amount whose
    /// currency is not yet known.
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0 && self.nanos == 0
    }

    /// Returns true if `nanos` is in range and its sign agrees with `units`.
    pub fn is_valid(&self) -> bool {
        self.sign_matches() && (NANOS_MIN..=NANOS_MAX).contains(&self.nanos)
    }

    fn sign_matches(&self) -> bool {
        self.nanos == 0 || self.units == 0 || (self.nanos < 0) == (self.units < 0)
    }

    /// Adds two amounts exactly.
    ///
    /// # Errors
    ///
    /// - [`MoneyError::InvalidValue`] if either operand fails [`Money::is_valid`].
    /// - [`MoneyError::CurrencyMismatch`] if both operands name a currency and
    ///   the codes differ. An empty code adopts the other operand's code.
    /// - [`MoneyError::Overflow`] if the units overflow `i64`.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        for operand in [self, other] {
            if !operand.is_valid() {
                return Err(MoneyError::InvalidValue {
                    units: operand.units,
                    nanos: operand.nanos,
                });
            }
        }

        let currency_code = match (self.currency_code.as_str(), other.currency_code.as_str()) {
            ("", code) | (code, "") => code.to_string(),
            (left, right) if left == right => left.to_string(),
            (left, right) => {
                return Err(MoneyError::CurrencyMismatch {
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }
        };

        let mut units = self
            .units
            .checked_add(other.units)
            .ok_or(MoneyError::Overflow)?;
        // Both operands are in range, so the raw sum fits in an i32.
        let mut nanos = self.nanos + other.nanos;

        if (units >= 0 && nanos >= 0) || (units <= 0 && nanos <= 0) {
            units = units
                .checked_add(i64::from(nanos / NANOS_MOD))
                .ok_or(MoneyError::Overflow)?;
            nanos %= NANOS_MOD;
        } else if units > 0 {
            // Signs disagree, so |nanos| < NANOS_MOD and one borrow suffices.
            units -= 1;
            nanos += NANOS_MOD;
        } else {
            units += 1;
            nanos -= NANOS_MOD;
        }

        Ok(Money {
            currency_code,
            units,
            nanos,
        })
    }

    /// Folds `amounts` onto `start` left to right with [`Money::checked_add`].
    pub fn try_sum<'a, I>(start: Money, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(start, |total, amount| total.checked_add(amount))
    }
}

/// Free-function form of [`Money::checked_add`].
pub fn sum(left: &Money, right: &Money) -> Result<Money, MoneyError> {
    left.checked_add(right)
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.units < 0 || self.nanos < 0 {
            "-"
        } else {
            ""
        };
        if !self.currency_code.is_empty() {
            write!(f, "{} ", self.currency_code)?;
        }
        write!(
            f,
            "{sign}{}.{:09}",
            self.units.unsigned_abs(),
            self.nanos.unsigned_abs()
        )
    }
}
