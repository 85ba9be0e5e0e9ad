//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Minor Units?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Split three ways:                                                     │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units, tagged with a currency             │
//! │    1000 cents / 3 = 333 r 1 → [334, 333, 333]                          │
//! │    The leftover cent is always handed to somebody, never dropped       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentage math happens in `rust_decimal` and is rounded exactly once,
//! at the point the value becomes a `Money`.
//!
//! ## Usage
//! ```rust
//! use tabulate_core::{Currency, Money, Percentage};
//! use rust_decimal::Decimal;
//!
//! let price = Money::new(1099, Currency::Usd); // $10.99
//! let total = price.checked_add(Money::new(500, Currency::Usd)).unwrap();
//! assert_eq!(total.minor_units(), 1599);
//!
//! let fee = price.percentage_of(Percentage::new(Decimal::new(10, 0)).unwrap()).unwrap();
//! assert_eq!(fee.minor_units(), 110); // $1.099 → $1.10
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::currency::Currency;
use crate::error::{SettlementError, TabulationResult, ValidationError};
use crate::types::Percentage;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of its currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts and deductions
/// - **Currency tag**: Combining two currencies is an error, not a conversion
/// - **Checked arithmetic**: Overflow and mismatches surface as errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use tabulate_core::{Currency, Money};
    ///
    /// let price = Money::new(1099, Currency::Usd); // Represents $10.99
    /// assert_eq!(price.minor_units(), 1099);
    /// ```
    #[inline]
    pub const fn new(minor_units: i64, currency: Currency) -> Self {
        Money {
            minor_units,
            currency,
        }
    }

    /// Zero in the given currency.
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money::new(0, currency)
    }

    /// Converts an exact decimal amount into Money.
    ///
    /// Fails with `ImproperlyQuantized` if the value carries more digits than
    /// the currency's scale. Nothing is rounded here.
    ///
    /// ## Example
    /// ```rust
    /// use tabulate_core::{Currency, Money};
    /// use rust_decimal::Decimal;
    ///
    /// let ok = Money::from_decimal(Decimal::new(1050, 2), Currency::Usd).unwrap();
    /// assert_eq!(ok.minor_units(), 1050);
    ///
    /// assert!(Money::from_decimal(Decimal::new(1050, 2), Currency::Jpy).is_err());
    /// ```
    pub fn from_decimal(amount: Decimal, currency: Currency) -> TabulationResult<Self> {
        let scaled = scale_up(amount, currency)?;
        if !scaled.fract().is_zero() {
            return Err(ValidationError::ImproperlyQuantized {
                value: amount.to_string(),
                scale: currency.scale(),
            }
            .into());
        }
        to_minor_units(scaled, currency)
    }

    /// Converts a decimal amount into Money, rounding half away from zero to
    /// the currency's minor unit.
    ///
    /// This is the single rounding point for percentage math.
    pub fn from_decimal_rounded(amount: Decimal, currency: Currency) -> TabulationResult<Self> {
        let scaled = scale_up(amount, currency)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        to_minor_units(scaled, currency)
    }

    /// Parses a decimal string such as `"10.00"` or `"-5"`.
    pub fn parse(amount: &str, currency: Currency) -> TabulationResult<Self> {
        let value = Decimal::from_str_exact(amount.trim()).map_err(|err| {
            ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: err.to_string(),
            }
        })?;
        Money::from_decimal(value, currency)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the currency this amount is denominated in.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Exact decimal representation, e.g. `12.34` for 1234 USD cents.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor_units, self.currency.scale())
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.minor_units > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Fails with `CurrencyMismatch` unless both values share a currency.
    pub fn ensure_same_currency(&self, other: &Money) -> TabulationResult<()> {
        if self.currency != other.currency {
            return Err(SettlementError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(&self, other: Money) -> TabulationResult<Money> {
        self.ensure_same_currency(&other)?;
        self.minor_units
            .checked_add(other.minor_units)
            .map(|minor| Money::new(minor, self.currency))
            .ok_or(SettlementError::Overflow("money addition"))
    }

    /// Subtracts `other` from `self`; both must share a currency.
    pub fn checked_sub(&self, other: Money) -> TabulationResult<Money> {
        self.ensure_same_currency(&other)?;
        self.minor_units
            .checked_sub(other.minor_units)
            .map(|minor| Money::new(minor, self.currency))
            .ok_or(SettlementError::Overflow("money subtraction"))
    }

    /// Returns the negated amount.
    pub fn negate(&self) -> TabulationResult<Money> {
        self.minor_units
            .checked_neg()
            .map(|minor| Money::new(minor, self.currency))
            .ok_or(SettlementError::Overflow("money negation"))
    }

    /// Computes `rate` percent of this amount, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use tabulate_core::{Currency, Money, Percentage};
    /// use rust_decimal::Decimal;
    ///
    /// let amount = Money::new(1000, Currency::Usd);       // $10.00
    /// let rate = Percentage::new(Decimal::new(825, 2)).unwrap(); // 8.25%
    /// // $0.825 → $0.83
    /// assert_eq!(amount.percentage_of(rate).unwrap().minor_units(), 83);
    /// ```
    pub fn percentage_of(&self, rate: Percentage) -> TabulationResult<Money> {
        let exact = self
            .to_decimal()
            .checked_mul(rate.fraction())
            .ok_or(SettlementError::Overflow("percentage of money"))?;
        Money::from_decimal_rounded(exact, self.currency)
    }

    /// Sums an iterator of amounts, all of which must be in `currency`.
    pub fn sum<I>(currency: Currency, amounts: I) -> TabulationResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, amount| acc.checked_add(amount))
    }
}

fn scale_up(amount: Decimal, currency: Currency) -> TabulationResult<Decimal> {
    amount
        .checked_mul(Decimal::from(currency.minor_per_major()))
        .ok_or(SettlementError::Overflow("decimal scaling"))
}

fn to_minor_units(scaled: Decimal, currency: Currency) -> TabulationResult<Money> {
    scaled
        .trunc()
        .to_i64()
        .map(|minor| Money::new(minor, currency))
        .ok_or(SettlementError::Overflow("minor unit conversion"))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with its currency code, e.g. `-5.50 USD` or `1200 JPY`.
///
/// ## Note
/// This is for logs and error messages. Localized formatting belongs in the
/// frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero(Currency::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
