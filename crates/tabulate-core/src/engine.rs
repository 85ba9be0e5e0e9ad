//! # Settlement Engine
//!
//! Turns a list of line items into a total, a discount figure, and one
//! allocation per line.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► lines_by_priority ──► tiers                                 │
//! │                                    │                                    │
//! │              ┌─────────────────────┘                                    │
//! │              ▼                                                          │
//! │   fold: (pool, total, discount) ──apply_tier──► (pool', total', disc')  │
//! │              │                                                          │
//! │              ▼                                                          │
//! │   check: sum(pool) == total   (raise if not, never patch it up)        │
//! │              │                                                          │
//! │              ▼                                                          │
//! │   SettlementResult { total, discount, allocation }                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call starts from an empty pool. Identical input always produces an
//! identical result, so callers simply re-run the engine whenever a record's
//! line items change and overwrite what they stored.

use serde::Serialize;
use tracing::debug;

use crate::cascade::{CascadeAllocator, Pool};
use crate::config::EngineConfig;
use crate::currency::Currency;
use crate::error::{SettlementError, TabulationResult};
use crate::grouping::lines_by_priority;
use crate::money::Money;
use crate::reckon::reconcile;
use crate::types::{LineId, LineItem};

// =============================================================================
// Settlement Result
// =============================================================================

/// The settled state of a list of line items.
///
/// ## Invariants
/// - `allocation` holds exactly one entry per input line, zero-valued ones
///   included, ordered by priority then declaration order
/// - the allocations sum to `total`, to the minor unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    pub total: Money,
    /// Sum of explicit discount lines. Informational only.
    pub discount: Money,
    pub allocation: Vec<(LineItem, Money)>,
}

impl SettlementResult {
    /// Allocation of one line.
    pub fn get(&self, id: LineId) -> Option<Money> {
        self.allocation
            .iter()
            .find(|(line, _)| line.id == id)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LineItem, Money)> {
        self.allocation.iter().map(|(line, amount)| (line, *amount))
    }

    /// Sum of every allocation. Equal to `total` for any result the engine
    /// returns.
    pub fn allocated(&self) -> TabulationResult<Money> {
        Money::sum(
            self.total.currency(),
            self.allocation.iter().map(|(_, amount)| *amount),
        )
    }

    /// Confirms a processor-reported charge equals `total`.
    pub fn verify_charge(&self, reported: Money) -> TabulationResult<()> {
        reconcile(self.total, reported)
    }
}

// =============================================================================
// Settlement Engine
// =============================================================================

/// Settles line items. Holds configuration only, never state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    allocator: CascadeAllocator,
}

impl SettlementEngine {
    pub fn new(config: EngineConfig) -> Self {
        SettlementEngine {
            allocator: CascadeAllocator::new(config.discount_policy),
        }
    }

    /// Settles `lines`, inferring the currency from the first line.
    ///
    /// An empty list settles to zero in the default currency.
    ///
    /// ## Example
    /// ```rust
    /// use tabulate_core::{Currency, LineId, LineItem, Money, Percentage, SettlementEngine};
    /// use rust_decimal::Decimal;
    ///
    /// let lines = vec![
    ///     LineItem::new(LineId(1), 0, Money::new(1000, Currency::Usd)),
    ///     LineItem::new(LineId(2), 1, Money::zero(Currency::Usd))
    ///         .with_percentage(Percentage::new(Decimal::new(10, 0)).unwrap()),
    /// ];
    /// let result = SettlementEngine::default().get_totals(lines).unwrap();
    /// assert_eq!(result.total, Money::new(1100, Currency::Usd));
    /// assert_eq!(result.get(LineId(2)), Some(Money::new(100, Currency::Usd)));
    /// ```
    pub fn get_totals<I>(&self, lines: I) -> TabulationResult<SettlementResult>
    where
        I: IntoIterator<Item = LineItem>,
    {
        let lines: Vec<LineItem> = lines.into_iter().collect();
        let currency = lines
            .first()
            .map(|line| line.amount.currency())
            .unwrap_or_default();
        self.get_totals_in(currency, lines)
    }

    /// Settles `lines`, all of which must be denominated in `currency`.
    pub fn get_totals_in<I>(&self, currency: Currency, lines: I) -> TabulationResult<SettlementResult>
    where
        I: IntoIterator<Item = LineItem>,
    {
        let lines: Vec<LineItem> = lines.into_iter().collect();
        let expected = Money::zero(currency);
        for line in &lines {
            expected.ensure_same_currency(&line.amount)?;
        }
        let line_count = lines.len();
        let tiers = lines_by_priority(lines)?;
        debug!(
            lines = line_count,
            tiers = tiers.len(),
            currency = %currency,
            policy = %self.allocator.policy(),
            "Settling line items"
        );

        let mut pool = Pool::new(currency);
        let mut total = Money::zero(currency);
        let mut discount = Money::zero(currency);
        for tier in &tiers {
            let (next, outcome) = self.allocator.apply_tier(pool, tier)?;
            pool = next;
            total = total.checked_add(outcome.added)?;
            discount = discount.checked_add(outcome.discount)?;
        }

        let allocated = pool.value()?;
        if allocated != total {
            return Err(SettlementError::UnbalancedSettlement { total, allocated });
        }

        debug!(total = %total, discount = %discount, "Settlement complete");
        Ok(SettlementResult {
            total,
            discount,
            allocation: pool.into_entries(),
        })
    }

    /// Settles `lines` and returns only the total.
    pub fn total_of<I>(&self, lines: I) -> TabulationResult<Money>
    where
        I: IntoIterator<Item = LineItem>,
    {
        Ok(self.get_totals(lines)?.total)
    }
}

/// Settles `lines` with the default configuration.
pub fn get_totals<I>(lines: I) -> TabulationResult<SettlementResult>
where
    I: IntoIterator<Item = LineItem>,
{
    SettlementEngine::default().get_totals(lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
