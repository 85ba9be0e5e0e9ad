//! # Priority Grouping
//!
//! Orders line items into ascending priority tiers.
//!
//! ```text
//! input (declaration order)         tiers
//! ─────────────────────────         ─────────────────────
//! #1 prio 300                        0   → [#3]
//! #2 prio 100                        100 → [#2, #4]   ← declaration order kept
//! #3 prio 0                          300 → [#1]
//! #4 prio 100
//! ```
//!
//! A stable group-by then sort: no two tiers share a priority, and empty
//! input yields no tiers.

use std::collections::{BTreeMap, HashSet};

use crate::error::{SettlementError, TabulationResult};
use crate::types::{LineItem, PriorityTier};

/// Groups `lines` into tiers sorted ascending by priority.
///
/// Fails with `DuplicateLine` if two lines share an id, since every later
/// stage keys allocations by id.
pub fn lines_by_priority<I>(lines: I) -> TabulationResult<Vec<PriorityTier>>
where
    I: IntoIterator<Item = LineItem>,
{
    let mut seen = HashSet::new();
    let mut tiers: BTreeMap<i32, Vec<LineItem>> = BTreeMap::new();

    for line in lines {
        if !seen.insert(line.id) {
            return Err(SettlementError::DuplicateLine(line.id));
        }
        tiers.entry(line.priority).or_default().push(line);
    }

    Ok(tiers
        .into_iter()
        .map(|(priority, lines)| PriorityTier { priority, lines })
        .collect())
}
