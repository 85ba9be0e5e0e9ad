//! # Error Types
//!
//! Domain-specific error types for tabulate-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tabulate-core errors (this file)                                      │
//! │  ├── SettlementError  - Settlement and reconciliation failures         │
//! │  └── ValidationError  - Malformed wire input (decimals, currencies)    │
//! │                                                                         │
//! │  Flow: ValidationError → SettlementError → caller (invoice, webhook)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a local, synchronous failure. Nothing in the engine is
//! retried: it is a pure function, so a retry would fail the same way.

use thiserror::Error;

use crate::currency::Currency;
use crate::money::Money;
use crate::types::LineId;

// =============================================================================
// Settlement Error
// =============================================================================

/// Errors raised while settling or reconciling line items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Two Money values of different currencies were combined.
    ///
    /// ## When This Occurs
    /// - A line item list mixes currencies
    /// - A processor reports a charge in another currency
    ///
    /// Always a caller bug: the engine never converts currencies.
    #[error("Currency mismatch: cannot combine {left} with {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// A line item was supplied without a priority.
    #[error("Line {0} has no priority")]
    InvalidPriorityInput(LineId),

    /// A percentage is outside [0, 100], or a back-into percentage would
    /// leave no base to back into.
    #[error("Invalid percentage {value}: {reason}")]
    InvalidPercentage { value: String, reason: String },

    /// A computed or reckoned total disagrees with an externally reported
    /// amount. There is no tolerance window.
    ///
    /// ## User Workflow
    /// ```text
    /// Processor webhook: charged 10.99 USD
    ///      │
    ///      ▼
    /// reconcile(expected = 11.00 USD, reported = 10.99 USD)
    ///      │
    ///      ▼
    /// ReconciliationMismatch → capture fails, order stays unpaid
    /// ```
    #[error("Reconciliation mismatch: expected {expected}, reported {reported}")]
    ReconciliationMismatch { expected: Money, reported: Money },

    /// Two line items share one id. Identity is by id, so allocations
    /// would collide.
    #[error("Duplicate line id: {0}")]
    DuplicateLine(LineId),

    /// An amount was divided into zero shares.
    #[error("Cannot divide an amount into zero shares")]
    DivisionByZero,

    /// A minor-unit calculation left the i64 range.
    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    /// An absorbed fee had no lower-priority line to be taken from.
    ///
    /// Usually means the base price line is missing. Include it even when
    /// the base price is zero.
    #[error("No lines available to absorb {fee}")]
    EmptyPool { fee: Money },

    /// The lines eligible to absorb a fee sum to a negative value, so
    /// no proportional split exists.
    #[error("Cannot distribute {fee} across a pool totalling {pool_total}")]
    NegativePool { fee: Money, pool_total: Money },

    /// Allocations no longer sum to the running total. Impossible by
    /// construction; raised rather than returning an inconsistent result.
    #[error("Settlement out of balance: total {total}, allocations sum to {allocated}")]
    UnbalancedSettlement { total: Money, allocated: Money },

    /// Wire input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for values arriving as strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Invalid format (e.g., a decimal string that does not parse).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Currency code is not one the engine knows the scale of.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A decimal amount carries more digits than the currency has.
    #[error("{value} has more than {scale} decimal places")]
    ImproperlyQuantized { value: String, scale: u32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with SettlementError.
pub type TabulationResult<T> = Result<T, SettlementError>;

// =============================================================================
// Unit Tests
// =============================================================================
