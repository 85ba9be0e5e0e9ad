//! # Cascade Allocation
//!
//! Applies one priority tier to the running pool.
//!
//! ## Tier Processing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pool before tier            Tier 2: 10% cut                            │
//! │  ───────────────             ───────────────                            │
//! │  base   $8.00                P = $10.00 (sum of the pool)               │
//! │  fee1   $2.00                fee = $1.00, absorbed                      │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                              distribute_proportionally($1.00, pool)     │
//! │                                   │   base −$0.80, fee1 −$0.20          │
//! │                                   ▼                                     │
//! │  Pool after tier             base $7.20, fee1 $1.80, fee2 $1.00         │
//! │                              still sums to $10.00                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Siblings in one tier never see each other: every member is resolved
//! against the same pre-tier `P`, and absorbed fees are only taken from lines
//! of lower tiers. The pool is passed in by value and handed back, so
//! settlement is a fold over tiers with no shared state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::config::ConfigError;
use crate::currency::Currency;
use crate::distribute::distribute_proportionally;
use crate::error::{SettlementError, TabulationResult};
use crate::fee::{compute_fee, FeeComputation};
use crate::money::Money;
use crate::types::{LineId, LineItem, PriorityTier};

// =============================================================================
// Discount Policy
// =============================================================================

/// Which pool members share in absorbed fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// Members whose current value is negative (discounts) take no share.
    #[default]
    Exclude,
    /// Every lower-tier member is weighted by its signed value.
    Include,
}

impl DiscountPolicy {
    fn shares_in(&self, value: &Money) -> bool {
        match self {
            DiscountPolicy::Exclude => !value.is_negative(),
            DiscountPolicy::Include => true,
        }
    }
}

impl fmt::Display for DiscountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountPolicy::Exclude => write!(f, "exclude"),
            DiscountPolicy::Include => write!(f, "include"),
        }
    }
}

impl FromStr for DiscountPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclude" => Ok(DiscountPolicy::Exclude),
            "include" => Ok(DiscountPolicy::Include),
            other => Err(ConfigError::InvalidConfig(format!(
                "Unknown discount policy: '{}'. Valid options: exclude, include",
                other
            ))),
        }
    }
}

// =============================================================================
// Pool
// =============================================================================

/// Everything settled so far, in processing order.
#[derive(Debug, Clone)]
pub struct Pool {
    currency: Currency,
    entries: Vec<(LineItem, Money)>,
    positions: HashMap<LineId, usize>,
}

impl Pool {
    pub fn new(currency: Currency) -> Self {
        Pool {
            currency,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Sum of all current allocations.
    pub fn value(&self) -> TabulationResult<Money> {
        Money::sum(self.currency, self.entries.iter().map(|(_, amount)| *amount))
    }

    /// Current allocation of a line, if it has been settled.
    pub fn get(&self, id: LineId) -> Option<Money> {
        self.positions.get(&id).map(|&index| self.entries[index].1)
    }

    pub fn entries(&self) -> &[(LineItem, Money)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(LineItem, Money)> {
        self.entries
    }

    fn insert(&mut self, line: LineItem, amount: Money) -> TabulationResult<()> {
        if self.positions.contains_key(&line.id) {
            return Err(SettlementError::DuplicateLine(line.id));
        }
        self.positions.insert(line.id, self.entries.len());
        self.entries.push((line, amount));
        Ok(())
    }

    fn deduct(&mut self, id: LineId, amount: Money) -> TabulationResult<()> {
        let index = *self
            .positions
            .get(&id)
            .ok_or(SettlementError::EmptyPool { fee: amount })?;
        let entry = &mut self.entries[index].1;
        *entry = entry.checked_sub(amount)?;
        Ok(())
    }
}

// =============================================================================
// Cascade Allocator
// =============================================================================

/// Totals produced by applying one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierOutcome {
    pub priority: i32,
    /// Pre-tier pool value every member was resolved against.
    pub base: Money,
    /// Fees taken out of lower tiers.
    pub absorbed: Money,
    /// Fees (and static amounts) added to the grand total.
    pub added: Money,
    /// Explicit discount-line amounts settled in this tier.
    pub discount: Money,
}

/// Applies tiers to a pool according to a [`DiscountPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeAllocator {
    policy: DiscountPolicy,
}

impl CascadeAllocator {
    pub fn new(policy: DiscountPolicy) -> Self {
        CascadeAllocator { policy }
    }

    pub fn policy(&self) -> DiscountPolicy {
        self.policy
    }

    /// Resolves every member of `tier` against `pool`, takes absorbed fees
    /// out of the lower tiers, then adds the members themselves.
    pub fn apply_tier(
        &self,
        mut pool: Pool,
        tier: &PriorityTier,
    ) -> TabulationResult<(Pool, TierOutcome)> {
        let currency = pool.currency();
        let base = pool.value()?;

        let resolved: Vec<(&LineItem, FeeComputation)> = tier
            .lines
            .iter()
            .map(|line| compute_fee(base, line).map(|fee| (line, fee)))
            .collect::<TabulationResult<_>>()?;

        let mut absorbed = Money::zero(currency);
        let mut added = Money::zero(currency);
        for (_, fee) in &resolved {
            absorbed = absorbed.checked_add(fee.absorbed()?)?;
            added = added.checked_add(fee.added()?)?;
        }

        if !absorbed.is_zero() {
            let members: Vec<(LineId, Money)> = pool
                .entries()
                .iter()
                .filter(|(_, value)| self.policy.shares_in(value))
                .map(|(line, value)| (line.id, *value))
                .collect();
            for (id, deduction) in distribute_proportionally(absorbed, &members)? {
                pool.deduct(id, deduction)?;
            }
        }

        let mut discount = Money::zero(currency);
        for (line, fee) in resolved {
            if line.is_discount() {
                discount = discount.checked_add(line.amount)?;
            }
            pool.insert(line.clone(), fee.allocation()?)?;
        }

        trace!(
            priority = tier.priority,
            base = %base,
            absorbed = %absorbed,
            added = %added,
            "Applied priority tier"
        );

        Ok((
            pool,
            TierOutcome {
                priority: tier.priority,
                base,
                absorbed,
                added,
                discount,
            },
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
