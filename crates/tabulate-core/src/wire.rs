//! # Wire Types
//!
//! String-based shapes for line items as they arrive from storage or an API
//! payload, and for calculation results as the frontend displays them.
//!
//! ## Conversion Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON / DB row                      Engine                              │
//! │  ─────────────                      ──────                              │
//! │  LineItemRecord ──TryFrom─────────► LineItem                           │
//! │    amount: "10.00"                    amount: Money(1000, USD)          │
//! │    percentage: "8.25"                 percentage: Percentage(8.25)      │
//! │    priority: null  ──► InvalidPriorityInput                             │
//! │                                                                         │
//! │  Calculation   ◄──From───────────── SettlementResult                   │
//! │    total: "11.00"                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimal strings are parsed exactly. A value with more digits than its
//! currency carries is rejected, never rounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::Currency;
use crate::engine::SettlementResult;
use crate::error::{SettlementError, TabulationResult, ValidationError};
use crate::money::Money;
use crate::types::{Category, LineId, LineItem, Percentage};

// =============================================================================
// Line Item Record
// =============================================================================

/// A line item as stored or transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRecord {
    pub id: i64,
    /// Required. Kept optional here so a missing value is reported by line.
    pub priority: Option<i32>,
    /// Decimal string, e.g. `"8.25"`. Absent means zero.
    #[serde(default)]
    pub percentage: Option<String>,
    /// Decimal string in major units, e.g. `"10.00"`.
    pub amount: String,
    /// ISO-4217 code, case-insensitive.
    pub currency: String,
    #[serde(default)]
    pub cascade_percentage: bool,
    #[serde(default)]
    pub cascade_amount: bool,
    #[serde(default)]
    pub back_into_percentage: bool,
    #[serde(default)]
    pub category: Category,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = SettlementError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        let id = LineId(record.id);
        let priority = record
            .priority
            .ok_or(SettlementError::InvalidPriorityInput(id))?;
        let currency: Currency = record.currency.parse()?;
        let amount = Money::parse(&record.amount, currency)?;
        let percentage = match record.percentage.as_deref() {
            Some(raw) => Percentage::new(parse_decimal("percentage", raw)?)?,
            None => Percentage::zero(),
        };

        Ok(LineItem {
            id,
            priority,
            percentage,
            amount,
            cascade_percentage: record.cascade_percentage,
            cascade_amount: record.cascade_amount,
            back_into_percentage: record.back_into_percentage,
            category: record.category,
        })
    }
}

impl From<&LineItem> for LineItemRecord {
    fn from(line: &LineItem) -> Self {
        LineItemRecord {
            id: line.id.0,
            priority: Some(line.priority),
            percentage: Some(line.percentage.value().to_string()),
            amount: line.amount.to_decimal().to_string(),
            currency: line.amount.currency().code().to_string(),
            cascade_percentage: line.cascade_percentage,
            cascade_amount: line.cascade_amount,
            back_into_percentage: line.back_into_percentage,
            category: line.category,
        }
    }
}

fn parse_decimal(field: &str, raw: &str) -> TabulationResult<Decimal> {
    Decimal::from_str_exact(raw.trim()).map_err(|err| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: err.to_string(),
        }
        .into()
    })
}

/// Parses a JSON array of [`LineItemRecord`] into line items.
///
/// ## Example
/// ```rust
/// use tabulate_core::lines_from_json;
///
/// let lines = lines_from_json(r#"[
///     {"id": 1, "priority": 0, "amount": "10.00", "currency": "USD"},
///     {"id": 2, "priority": 100, "amount": "0.00", "currency": "USD",
///      "percentage": "10", "cascade_percentage": true}
/// ]"#).unwrap();
/// assert_eq!(lines.len(), 2);
/// assert!(lines[1].cascade_percentage);
/// ```
pub fn lines_from_json(json: &str) -> TabulationResult<Vec<LineItem>> {
    let records: Vec<LineItemRecord> =
        serde_json::from_str(json).map_err(|err| ValidationError::InvalidFormat {
            field: "line_items".to_string(),
            reason: err.to_string(),
        })?;
    records.into_iter().map(LineItem::try_from).collect()
}

// =============================================================================
// Calculation
// =============================================================================

/// One line's settled amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Subtotal {
    pub id: LineId,
    pub amount: String,
}

/// A settlement result as displayed to users.
///
/// Amounts are decimal strings quantized to the currency, so `"10.00"` for
/// USD and `"1200"` for JPY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Calculation {
    pub currency: Currency,
    pub total: String,
    pub discount: String,
    /// In settlement order.
    pub subtotals: Vec<Subtotal>,
}

impl From<&SettlementResult> for Calculation {
    fn from(result: &SettlementResult) -> Self {
        Calculation {
            currency: result.total.currency(),
            total: result.total.to_decimal().to_string(),
            discount: result.discount.to_decimal().to_string(),
            subtotals: result
                .iter()
                .map(|(line, amount)| Subtotal {
                    id: line.id,
                    amount: amount.to_decimal().to_string(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::get_totals;

    fn record(id: i64, priority: Option<i32>, amount: &str) -> LineItemRecord {
        LineItemRecord {
            id,
            priority,
            percentage: None,
            amount: amount.to_string(),
            currency: "USD".to_string(),
            cascade_percentage: false,
            cascade_amount: false,
            back_into_percentage: false,
            category: Category::Other,
        }
    }

    #[test]
    fn test_record_converts() {
        let mut raw = record(7, Some(300), "0.30");
        raw.percentage = Some("2.9".to_string());
        raw.cascade_percentage = true;
        raw.cascade_amount = true;
        raw.category = Category::ThirdPartyFee;

        let line = LineItem::try_from(raw).unwrap();
        assert_eq!(line.id, LineId(7));
        assert_eq!(line.priority, 300);
        assert_eq!(line.amount, Money::new(30, Currency::Usd));
        assert_eq!(line.percentage.value(), Decimal::new(29, 1));
        assert!(line.cascade_percentage && line.cascade_amount);
        assert!(!line.back_into_percentage);
        assert_eq!(line.category, Category::ThirdPartyFee);
    }

    #[test]
    fn test_missing_priority() {
        assert_eq!(
            LineItem::try_from(record(3, None, "1.00")),
            Err(SettlementError::InvalidPriorityInput(LineId(3)))
        );
    }

    #[test]
    fn test_invalid_strings() {
        assert!(matches!(
            LineItem::try_from(record(1, Some(0), "ten dollars")),
            Err(SettlementError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            LineItem::try_from(record(1, Some(0), "1.005")),
            Err(SettlementError::Validation(ValidationError::ImproperlyQuantized { .. }))
        ));

        let mut raw = record(1, Some(0), "1.00");
        raw.currency = "DOGE".to_string();
        assert!(matches!(
            LineItem::try_from(raw),
            Err(SettlementError::Validation(ValidationError::UnknownCurrency(_)))
        ));

        let mut raw = record(1, Some(0), "1.00");
        raw.percentage = Some("150".to_string());
        assert!(matches!(
            LineItem::try_from(raw),
            Err(SettlementError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn test_lines_from_json_defaults() {
        let lines = lines_from_json(
            r#"[{"id": 1, "priority": 0, "amount": "10.00", "currency": "usd"}]"#,
        )
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].percentage.is_zero());
        assert!(!lines[0].cascade_amount);
        assert_eq!(lines[0].category, Category::Other);
    }

    #[test]
    fn test_lines_from_json_malformed() {
        assert!(matches!(
            lines_from_json("{not json"),
            Err(SettlementError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            lines_from_json(r#"[{"id": 1, "amount": "1.00", "currency": "USD"}]"#),
            Err(SettlementError::InvalidPriorityInput(LineId(1)))
        ));
    }

    #[test]
    fn test_from_line_item() {
        let line = LineItem::new(LineId(4), 100, Money::new(-250, Currency::Usd));
        let raw = LineItemRecord::from(&line);
        assert_eq!(raw.amount, "-2.50");
        assert_eq!(raw.priority, Some(100));
        assert_eq!(LineItem::try_from(raw).unwrap().amount, line.amount);
    }

    #[test]
    fn test_calculation_output() {
        let lines = lines_from_json(
            r#"[
                {"id": 1, "priority": 0, "amount": "10.00", "currency": "USD"},
                {"id": 2, "priority": 100, "amount": "0.00", "currency": "USD",
                 "percentage": "10", "cascade_percentage": true,
                 "back_into_percentage": true}
            ]"#,
        )
        .unwrap();
        let calculation = Calculation::from(&get_totals(lines).unwrap());
        assert_eq!(calculation.total, "10.00");
        assert_eq!(calculation.discount, "0.00");
        assert_eq!(
            calculation.subtotals,
            vec![
                Subtotal { id: LineId(1), amount: "9.09".to_string() },
                Subtotal { id: LineId(2), amount: "0.91".to_string() },
            ]
        );

        let json = serde_json::to_value(&calculation).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["subtotals"][1]["amount"], "0.91");
    }
}
