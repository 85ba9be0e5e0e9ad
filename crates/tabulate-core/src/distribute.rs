//! # Remainder Distribution
//!
//! Splits one amount across several recipients without losing or inventing a
//! minor unit.
//!
//! ## Two Ways to Split
//! ```text
//! divide_amount($10.00, 3)              even shares
//!   1000 = 3 × 333 + 1
//!   → [$3.34, $3.33, $3.33]              leftover goes to the first shares
//!
//! distribute_proportionally($1.00, pool)  weighted shares
//!   pool: base $8.00, fee $2.00 (total $10.00)
//!   base: 100 × 800 / 1000 = 80          truncated toward zero
//!   fee:  100 × 200 / 1000 = 20
//!   → [$0.80, $0.20]                     leftover units go out in pool order
//! ```
//!
//! The weighted split is the only place the engine reconciles rounding. Its
//! shares always sum to the fee exactly, which is what keeps every
//! settlement in balance.

use crate::error::{SettlementError, TabulationResult};
use crate::money::Money;
use crate::types::LineId;

/// Splits `amount` into `shares` parts that differ by at most one minor unit.
///
/// Each share gets `floor(amount / shares)` minor units, then the first
/// `amount mod shares` shares get one more. Negative amounts floor toward
/// negative infinity, so the shares still differ by at most one unit, and
/// the larger-magnitude shares come last: `-$10.00` over three is
/// `[-$3.33, -$3.33, -$3.34]`.
///
/// ## Example
/// ```rust
/// use tabulate_core::{divide_amount, Currency, Money};
///
/// let shares = divide_amount(Money::new(1000, Currency::Usd), 3).unwrap();
/// let cents: Vec<i64> = shares.iter().map(|m| m.minor_units()).collect();
/// assert_eq!(cents, vec![334, 333, 333]);
/// ```
///
/// ## User Workflow
/// ```text
/// Refund of $10.00 to three payout accounts
///      │
///      ▼
/// divide_amount($10.00, 3) ← THIS FUNCTION
///      │
///      ▼
/// $3.34, $3.33, $3.33
/// ```
pub fn divide_amount(amount: Money, shares: usize) -> TabulationResult<Vec<Money>> {
    if shares == 0 {
        return Err(SettlementError::DivisionByZero);
    }
    let divisor =
        i64::try_from(shares).map_err(|_| SettlementError::Overflow("share count"))?;
    let base = amount.minor_units().div_euclid(divisor);
    let leftover = amount.minor_units().rem_euclid(divisor) as usize;
    let currency = amount.currency();

    Ok((0..shares)
        .map(|index| {
            if index < leftover {
                Money::new(base + 1, currency)
            } else {
                Money::new(base, currency)
            }
        })
        .collect())
}

/// Distributes `fee` across `members` in proportion to their current values.
///
/// Each ideal share `fee × value / pool_total` is computed exactly in i128
/// and truncated toward zero. The units that truncation left over are then
/// handed out one at a time, in member order, to members that carry weight.
///
/// When the members total exactly zero there is no proportion to follow, so
/// the fee is split evenly with [`divide_amount`].
///
/// Returns one deduction per member, in member order. The deductions always
/// sum to `fee`.
///
/// ## Errors
/// - `EmptyPool` if there are no members
/// - `NegativePool` if the members total less than zero
/// - `CurrencyMismatch` if any member is in another currency
pub fn distribute_proportionally(
    fee: Money,
    members: &[(LineId, Money)],
) -> TabulationResult<Vec<(LineId, Money)>> {
    if members.is_empty() {
        return Err(SettlementError::EmptyPool { fee });
    }
    for (_, value) in members {
        fee.ensure_same_currency(value)?;
    }

    let currency = fee.currency();
    let pool_total: i128 = members
        .iter()
        .map(|(_, value)| value.minor_units() as i128)
        .sum();

    if pool_total < 0 {
        let pool_total = i64::try_from(pool_total)
            .map_err(|_| SettlementError::Overflow("pool total"))?;
        return Err(SettlementError::NegativePool {
            fee,
            pool_total: Money::new(pool_total, currency),
        });
    }

    if pool_total == 0 {
        let shares = divide_amount(fee, members.len())?;
        return Ok(members
            .iter()
            .zip(shares)
            .map(|((id, _), share)| (*id, share))
            .collect());
    }

    let fee_units = fee.minor_units() as i128;
    let mut shares: Vec<i128> = members
        .iter()
        .map(|(_, value)| fee_units * value.minor_units() as i128 / pool_total)
        .collect();

    let mut leftover = fee_units - shares.iter().sum::<i128>();
    let step = leftover.signum();
    let recipients: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|(_, (_, value))| !value.is_zero())
        .map(|(index, _)| index)
        .collect();

    // Truncation loses less than one unit per weighted member, so a single
    // pass normally suffices. Cycling keeps the loop total regardless.
    let mut cursor = recipients.iter().cycle();
    while leftover != 0 {
        match cursor.next() {
            Some(&index) => {
                shares[index] += step;
                leftover -= step;
            }
            None => {
                return Err(SettlementError::EmptyPool {
                    fee: Money::new(leftover as i64, currency),
                })
            }
        }
    }

    let mut deductions = Vec::with_capacity(members.len());
    for ((id, _), share) in members.iter().zip(shares) {
        let share = i64::try_from(share)
            .map_err(|_| SettlementError::Overflow("proportional share"))?;
        deductions.push((*id, Money::new(share, currency)));
    }

    let distributed = Money::sum(currency, deductions.iter().map(|(_, share)| *share))?;
    if distributed != fee {
        return Err(SettlementError::UnbalancedSettlement {
            total: fee,
            allocated: distributed,
        });
    }
    Ok(deductions)
}

// =============================================================================
// Unit Tests
// =============================================================================
