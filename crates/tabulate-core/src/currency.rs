//! # Currency Module
//!
//! Currencies the engine can settle in, and how many minor-unit digits each
//! one carries.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  Code   Scale   Smallest unit                 │
//! │  USD    2       0.01  (one cent)              │
//! │  JPY    0       1     (no fractional yen)     │
//! │  KWD    3       0.001 (one fils)              │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The engine never converts between currencies; the scale only tells
//! [`Money`](crate::money::Money) where the decimal point sits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// A settlement currency, identified by its ISO-4217 code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Nzd,
    Chf,
    Mxn,
    Brl,
    Jpy,
    Krw,
    Bhd,
    Kwd,
}

impl Currency {
    /// Number of minor-unit digits after the decimal point.
    pub const fn scale(&self) -> u32 {
        match self {
            Currency::Jpy | Currency::Krw => 0,
            Currency::Bhd | Currency::Kwd => 3,
            _ => 2,
        }
    }

    /// Minor units per major unit (100 for USD, 1 for JPY).
    pub const fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.scale())
    }

    /// The three-letter ISO code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Nzd => "NZD",
            Currency::Chf => "CHF",
            Currency::Mxn => "MXN",
            Currency::Brl => "BRL",
            Currency::Jpy => "JPY",
            Currency::Krw => "KRW",
            Currency::Bhd => "BHD",
            Currency::Kwd => "KWD",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "NZD" => Ok(Currency::Nzd),
            "CHF" => Ok(Currency::Chf),
            "MXN" => Ok(Currency::Mxn),
            "BRL" => Ok(Currency::Brl),
            "JPY" => Ok(Currency::Jpy),
            "KRW" => Ok(Currency::Krw),
            "BHD" => Ok(Currency::Bhd),
            "KWD" => Ok(Currency::Kwd),
            _ => Err(ValidationError::UnknownCurrency(s.to_string())),
        }
    }
}
