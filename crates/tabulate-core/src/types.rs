//! # Domain Types
//!
//! Settlement inputs: the line item and the values it is built from.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────────┐        ┌─────────────────┐                │
//! │  │        LineItem         │        │   Percentage    │                │
//! │  │  ─────────────────────  │        │  ─────────────  │                │
//! │  │  id (LineId)            │───────►│  Decimal 0-100  │                │
//! │  │  priority (i32)         │        └─────────────────┘                │
//! │  │  percentage             │        ┌─────────────────┐                │
//! │  │  amount (Money)         │───────►│     Money       │                │
//! │  │  cascade_percentage     │        └─────────────────┘                │
//! │  │  cascade_amount         │        ┌─────────────────┐                │
//! │  │  back_into_percentage   │        │    Category     │                │
//! │  │  category               │───────►│  reporting tag  │                │
//! │  └─────────────────────────┘        └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line items are immutable value objects. Equality, hashing and ordering
//! are by id alone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use ts_rs::TS;

use crate::error::{SettlementError, TabulationResult};
use crate::money::Money;
use crate::MAX_PERCENTAGE;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage rate in [0, 100], kept as an exact decimal.
///
/// `Percentage::new(dec!(8.25))` is 8.25%, not 825%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    /// Creates a percentage, rejecting values outside [0, 100].
    pub fn new(value: Decimal) -> TabulationResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(SettlementError::InvalidPercentage {
                value: value.to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        if value > MAX_PERCENTAGE {
            return Err(SettlementError::InvalidPercentage {
                value: value.to_string(),
                reason: format!("must not exceed {}", MAX_PERCENTAGE),
            });
        }
        Ok(Percentage(value))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(Decimal::ZERO)
    }

    /// The rate as written, e.g. `8.25`.
    #[inline]
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The rate as a fraction, e.g. `0.0825`.
    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = SettlementError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(rate: Percentage) -> Self {
        rate.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Line Identity
// =============================================================================

/// Stable identity of a line item.
///
/// Persisted lines carry their database id. Lines synthesized for a preview
/// conventionally use negative ids so they cannot collide with stored ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct LineId(pub i64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Category
// =============================================================================

/// Reporting category of a line item. Opaque to the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Amount held in escrow for the seller (base price, add-ons).
    EscrowHold,
    /// Platform fee for escrow-protected payments.
    ShieldFee,
    /// Fee levied by a card processor or payout provider.
    ThirdPartyFee,
    /// Light processing fee where no escrow service is sold (tips).
    ProcessingFee,
    /// Fee for handling orders at an event table.
    TableHandling,
    Taxes,
    /// Amount a buyer is tipping a seller.
    TipSend,
    /// Merchandise sold alongside the commission.
    ExtraItem,
    SubscriptionDues,
    /// Manual correction of an earlier mistake.
    Correction,
    #[default]
    Other,
}

// =============================================================================
// Line Item
// =============================================================================

/// One priced or percentage-based contribution to a payable object.
///
/// ## Flags
/// - `cascade_percentage`: the percentage part is taken out of lower
///   priority lines instead of being added to the total
/// - `cascade_amount`: same choice, for the static `amount` part
/// - `back_into_percentage`: the percentage is quoted against what remains
///   after the fee is removed
///
/// ## Example
/// ```rust
/// use tabulate_core::{Currency, LineId, LineItem, Money, Percentage};
/// use rust_decimal::Decimal;
///
/// let base = LineItem::new(LineId(1), 0, Money::new(1000, Currency::Usd));
/// let fee = LineItem::new(LineId(2), 100, Money::zero(Currency::Usd))
///     .with_percentage(Percentage::new(Decimal::new(10, 0)).unwrap())
///     .cascading_percentage();
/// assert!(fee.cascade_percentage);
/// assert!(!base.is_discount());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineId,
    /// Lower sorts first.
    pub priority: i32,
    pub percentage: Percentage,
    pub amount: Money,
    pub cascade_percentage: bool,
    pub cascade_amount: bool,
    pub back_into_percentage: bool,
    pub category: Category,
}

impl LineItem {
    /// A plain static-amount line with no percentage and no cascading.
    pub fn new(id: LineId, priority: i32, amount: Money) -> Self {
        LineItem {
            id,
            priority,
            percentage: Percentage::zero(),
            amount,
            cascade_percentage: false,
            cascade_amount: false,
            back_into_percentage: false,
            category: Category::default(),
        }
    }

    pub fn with_percentage(mut self, percentage: Percentage) -> Self {
        self.percentage = percentage;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn cascading_percentage(mut self) -> Self {
        self.cascade_percentage = true;
        self
    }

    pub fn cascading_amount(mut self) -> Self {
        self.cascade_amount = true;
        self
    }

    /// Sets both cascade flags.
    pub fn cascading(self) -> Self {
        self.cascading_percentage().cascading_amount()
    }

    pub fn backed_into(mut self) -> Self {
        self.back_into_percentage = true;
        self
    }

    /// A caller-declared reduction: negative static amount, zero percentage.
    #[inline]
    pub fn is_discount(&self) -> bool {
        self.amount.is_negative() && self.percentage.is_zero()
    }
}

impl PartialEq for LineItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LineItem {}

impl Hash for LineItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for LineItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LineItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

// =============================================================================
// Priority Tier
// =============================================================================

/// Line items sharing one priority, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTier {
    pub priority: i32,
    pub lines: Vec<LineItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
