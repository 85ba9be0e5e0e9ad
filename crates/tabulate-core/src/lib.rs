//! # tabulate-core: Line Item Settlement for a Commissions Marketplace
//!
//! Every payable object in the marketplace (an order, a subscription term, a
//! tip) is an ordered list of line items. This crate combines them into one
//! authoritative charge and attributes every minor unit of it to exactly one
//! line.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marketplace Backend                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Orders, invoices, tips, subscription renewals          │   │
//! │  │     (decide WHICH line items apply, persist the results)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Vec<LineItem>                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tabulate-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ grouping  │  │    fee    │  │  cascade  │  │  engine   │  │   │
//! │  │   │  tiers    │─►│  FeeRule  │─►│   Pool    │─►│get_totals │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │distribute │  │  reckon   │  │   wire    │  │   │
//! │  │   │   Money   │  │ remainders│  │ reconcile │  │ JSON, TS  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FLOATS • NO GLOBAL STATE • DETERMINISTIC          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ SettlementResult                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           Payment processor (charge, webhook capture)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] / [`currency`] - Exact minor-unit amounts tagged with a currency
//! - [`types`] - Line items, percentages, categories
//! - [`grouping`] - Priority tiers
//! - [`fee`] - What one line owes, and who pays it
//! - [`distribute`] - Splitting amounts without losing a minor unit
//! - [`cascade`] - Applying one tier to the running pool
//! - [`engine`] - The full settlement
//! - [`reckon`] - Checking finalized amounts against a reported charge
//! - [`report`] - Category breakdowns
//! - [`wire`] - String-based input and display types
//! - [`config`] - Environment configuration
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tabulate_core::{get_totals, Currency, LineId, LineItem, Money, Percentage};
//! use rust_decimal::Decimal;
//!
//! // $10.00 commission, platform keeps a backed-in 10%
//! let lines = vec![
//!     LineItem::new(LineId(1), 0, Money::new(1000, Currency::Usd)),
//!     LineItem::new(LineId(2), 100, Money::zero(Currency::Usd))
//!         .with_percentage(Percentage::new(Decimal::new(10, 0)).unwrap())
//!         .cascading_percentage()
//!         .backed_into(),
//! ];
//!
//! let result = get_totals(lines).unwrap();
//! assert_eq!(result.total, Money::new(1000, Currency::Usd));
//! assert_eq!(result.get(LineId(1)), Some(Money::new(909, Currency::Usd)));
//! assert_eq!(result.get(LineId(2)), Some(Money::new(91, Currency::Usd)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cascade;
pub mod config;
pub mod currency;
pub mod distribute;
pub mod engine;
pub mod error;
pub mod fee;
pub mod grouping;
pub mod money;
pub mod reckon;
pub mod report;
pub mod types;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cascade::{CascadeAllocator, DiscountPolicy, Pool, TierOutcome};
pub use config::{ConfigError, EngineConfig};
pub use currency::Currency;
pub use distribute::{distribute_proportionally, divide_amount};
pub use engine::{get_totals, SettlementEngine, SettlementResult};
pub use error::{SettlementError, TabulationResult, ValidationError};
pub use fee::{compute_fee, FeeComputation, FeeRule};
pub use grouping::lines_by_priority;
pub use money::Money;
pub use reckon::{reckon_against, reckon_lines, reconcile, reconcile_minor_units};
pub use report::breakdown_by_category;
pub use types::*;
pub use wire::{lines_from_json, Calculation, LineItemRecord, Subtotal};

// =============================================================================
// Crate-Level Constants
// =============================================================================

use rust_decimal::Decimal;

/// Largest accepted percentage rate.
pub const MAX_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;
