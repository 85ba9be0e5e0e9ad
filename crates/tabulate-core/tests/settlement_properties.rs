// Property tests for the settlement engine
//
// Properties tested:
// 1. allocations always sum to the total, one entry per line
// 2. settling the same lines twice gives the same result
// 3. the order tiers are declared in never matters
// 4. any reordering leaves the total unchanged
// 5. divide_amount and distribute_proportionally never lose a minor unit

use proptest::prelude::*;
use rust_decimal::Decimal;

use tabulate_core::{
    distribute_proportionally, divide_amount, get_totals, Currency, LineId, LineItem, Money,
    Percentage,
};

#[derive(Debug, Clone)]
struct FeeShape {
    priority: i32,
    basis_points: i64,
    amount: i64,
    cascade_percentage: bool,
    cascade_amount: bool,
    back_into: bool,
}

fn fee_shape() -> impl Strategy<Value = FeeShape> {
    (
        1i32..=4,
        0i64..=2000,
        0i64..=100,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(priority, basis_points, amount, cascade_percentage, cascade_amount, back_into)| {
                FeeShape {
                    priority,
                    basis_points,
                    amount,
                    cascade_percentage,
                    cascade_amount,
                    back_into,
                }
            },
        )
}

fn build_lines(currency: Currency, bases: &[i64], fees: &[FeeShape]) -> Vec<LineItem> {
    let mut lines = Vec::new();
    let mut next_id = 1;
    for minor in bases {
        lines.push(LineItem::new(LineId(next_id), 0, Money::new(*minor, currency)));
        next_id += 1;
    }
    for shape in fees {
        let mut line = LineItem::new(
            LineId(next_id),
            shape.priority,
            Money::new(shape.amount, currency),
        )
        .with_percentage(Percentage::new(Decimal::new(shape.basis_points, 2)).unwrap());
        line.cascade_percentage = shape.cascade_percentage;
        line.cascade_amount = shape.cascade_amount;
        line.back_into_percentage = shape.back_into;
        lines.push(line);
        next_id += 1;
    }
    lines
}

fn settlement_lines() -> impl Strategy<Value = Vec<LineItem>> {
    (
        prop::sample::select(vec![Currency::Usd, Currency::Jpy, Currency::Kwd]),
        prop::collection::vec(10_000i64..1_000_000, 1..=3),
        prop::collection::vec(fee_shape(), 0..=4),
    )
        .prop_map(|(currency, bases, fees)| build_lines(currency, &bases, &fees))
}

proptest! {
    #[test]
    fn test_allocations_sum_to_total(lines in settlement_lines()) {
        let count = lines.len();
        let result = get_totals(lines).unwrap();
        prop_assert_eq!(result.allocation.len(), count);
        prop_assert_eq!(result.allocated().unwrap(), result.total);
    }

    #[test]
    fn test_settlement_is_idempotent(lines in settlement_lines()) {
        let first = get_totals(lines.clone()).unwrap();
        let second = get_totals(lines).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_tier_declaration_order_is_irrelevant(lines in settlement_lines()) {
        let mut regrouped = lines.clone();
        // Stable sort: tiers move, siblings keep their relative order.
        regrouped.sort_by_key(|line| std::cmp::Reverse(line.priority));

        let original = get_totals(lines).unwrap();
        let moved = get_totals(regrouped).unwrap();
        prop_assert_eq!(original.total, moved.total);
        for (line, amount) in original.iter() {
            prop_assert_eq!(moved.get(line.id), Some(amount));
        }
    }

    #[test]
    fn test_total_survives_any_reordering(lines in settlement_lines()) {
        let mut reversed = lines.clone();
        reversed.reverse();
        prop_assert_eq!(
            get_totals(lines).unwrap().total,
            get_totals(reversed).unwrap().total
        );
    }

    #[test]
    fn test_discount_lines_keep_balance(
        base in 10_000i64..1_000_000,
        discount in 1i64..5_000,
        fees in prop::collection::vec(fee_shape(), 1..=4),
    ) {
        let mut lines = build_lines(Currency::Usd, &[base], &fees);
        lines.push(LineItem::new(LineId(100), 0, Money::new(-discount, Currency::Usd)));

        let result = get_totals(lines).unwrap();
        prop_assert_eq!(result.discount, Money::new(-discount, Currency::Usd));
        prop_assert_eq!(result.allocated().unwrap(), result.total);
        // Excluded from absorption, so the discount line is never perturbed.
        prop_assert_eq!(result.get(LineId(100)), Some(Money::new(-discount, Currency::Usd)));
    }

    #[test]
    fn test_divide_amount_is_exact(amount in -1_000_000i64..1_000_000, shares in 1usize..50) {
        let parts = divide_amount(Money::new(amount, Currency::Usd), shares).unwrap();
        prop_assert_eq!(parts.len(), shares);

        let units: Vec<i64> = parts.iter().map(|part| part.minor_units()).collect();
        prop_assert_eq!(units.iter().sum::<i64>(), amount);
        let max = units.iter().max().copied().unwrap_or_default();
        let min = units.iter().min().copied().unwrap_or_default();
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn test_proportional_split_is_exact(
        fee in -100_000i64..100_000,
        weights in prop::collection::vec(0i64..100_000, 1..10),
    ) {
        let members: Vec<(LineId, Money)> = weights
            .iter()
            .enumerate()
            .map(|(index, minor)| (LineId(index as i64), Money::new(*minor, Currency::Usd)))
            .collect();
        let deductions =
            distribute_proportionally(Money::new(fee, Currency::Usd), &members).unwrap();

        prop_assert_eq!(deductions.len(), members.len());
        let distributed: i64 = deductions.iter().map(|(_, share)| share.minor_units()).sum();
        prop_assert_eq!(distributed, fee);
    }
}
