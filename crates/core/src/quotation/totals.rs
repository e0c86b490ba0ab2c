//! Line-item pricing.
//!
//! Totals are a pure function of the items. Caller-supplied line totals and
//! percentage-based tax amounts are overwritten.

use rust_decimal::Decimal;

use super::error::QuotationError;
use super::types::{QuotationItems, QuotationTotals};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Validate the items, derive every line total, and compute document totals.
///
/// - labor `total = hours × rate`
/// - material `total = quantity × unit_price`
/// - `subtotal = Σ labor + Σ material + Σ service`
/// - tax `amount = subtotal × percentage / 100` when a percentage is given
/// - `grand_total = subtotal + total_contingency + total_tax`
///
/// Money values are rounded to 2 decimal places.
///
/// # Errors
///
/// Returns `Validation` if any quantity, price, cost, amount, or percentage is
/// negative, or if a line or document total does not fit in a `Decimal`.
/// Nothing is returned partially priced.
pub fn price_items(
    mut items: QuotationItems,
) -> Result<(QuotationItems, QuotationTotals), QuotationError> {
    validate(&items)?;

    let mut subtotal = Decimal::ZERO;
    for item in &mut items.labor_items {
        item.total = in_range(item.hours.checked_mul(item.rate), "labor total")?.round_dp(2);
        subtotal = in_range(subtotal.checked_add(item.total), "subtotal")?;
    }
    for item in &mut items.material_items {
        item.total =
            in_range(item.quantity.checked_mul(item.unit_price), "material total")?.round_dp(2);
        subtotal = in_range(subtotal.checked_add(item.total), "subtotal")?;
    }
    for item in &items.service_items {
        subtotal = in_range(subtotal.checked_add(item.cost), "subtotal")?;
    }
    let subtotal = subtotal.round_dp(2);

    let mut total_contingency = Decimal::ZERO;
    for item in &items.contingency_items {
        total_contingency = in_range(
            total_contingency.checked_add(item.amount),
            "contingency total",
        )?;
    }
    let total_contingency = total_contingency.round_dp(2);

    let mut total_tax = Decimal::ZERO;
    for tax in &mut items.tax_items {
        if let Some(pct) = tax.percentage.filter(|p| *p > Decimal::ZERO) {
            let amount = subtotal
                .checked_mul(pct)
                .and_then(|v| v.checked_div(HUNDRED));
            tax.amount = in_range(amount, "tax amount")?.round_dp(2);
        }
        total_tax = in_range(total_tax.checked_add(tax.amount), "tax total")?;
    }
    let total_tax = total_tax.round_dp(2);

    let grand_total = subtotal
        .checked_add(total_contingency)
        .and_then(|v| v.checked_add(total_tax));

    Ok((
        items,
        QuotationTotals {
            subtotal,
            total_contingency,
            total_tax,
            grand_total: in_range(grand_total, "grand total")?,
        },
    ))
}

fn in_range(value: Option<Decimal>, what: &str) -> Result<Decimal, QuotationError> {
    value.ok_or_else(|| QuotationError::Validation(format!("{what} is too large")))
}

fn validate(items: &QuotationItems) -> Result<(), QuotationError> {
    fn non_negative(value: Decimal, what: &str) -> Result<(), QuotationError> {
        if value < Decimal::ZERO {
            return Err(QuotationError::Validation(format!(
                "{what} cannot be negative"
            )));
        }
        Ok(())
    }

    for item in &items.labor_items {
        non_negative(item.hours, "labor hours")?;
        non_negative(item.rate, "labor rate")?;
    }
    for item in &items.material_items {
        non_negative(item.quantity, "material quantity")?;
        non_negative(item.unit_price, "material unit price")?;
    }
    for item in &items.service_items {
        non_negative(item.cost, "service cost")?;
    }
    for item in &items.contingency_items {
        non_negative(item.amount, "contingency amount")?;
    }
    for item in &items.tax_items {
        non_negative(item.amount, "tax amount")?;
        if let Some(pct) = item.percentage {
            non_negative(pct, "tax percentage")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::types::{
        ContingencyItem, LaborItem, MaterialItem, ServiceItem, TaxItem,
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn labor(hours: Decimal, rate: Decimal) -> LaborItem {
        LaborItem {
            task: "Design".to_string(),
            hours,
            rate,
            total: Decimal::ZERO,
        }
    }

    /// 10^20; its square does not fit in a `Decimal`.
    fn huge() -> Decimal {
        Decimal::from_i128_with_scale(10_i128.pow(20), 0)
    }

    fn material(quantity: Decimal, unit_price: Decimal) -> MaterialItem {
        MaterialItem {
            material_id: None,
            description: "Cable".to_string(),
            quantity,
            unit_price,
            total: Decimal::ZERO,
        }
    }

    #[test]
    fn test_design_and_cable_total_600() {
        let items = QuotationItems {
            labor_items: vec![labor(dec!(10), dec!(50))],
            material_items: vec![material(dec!(5), dec!(20))],
            ..QuotationItems::default()
        };

        let (priced, totals) = price_items(items).unwrap();

        assert_eq!(priced.labor_items[0].total, dec!(500));
        assert_eq!(priced.material_items[0].total, dec!(100));
        assert_eq!(totals.subtotal, dec!(600));
        assert_eq!(totals.total_contingency, dec!(0));
        assert_eq!(totals.total_tax, dec!(0));
        assert_eq!(totals.grand_total, dec!(600));
    }

    #[test]
    fn test_caller_totals_are_ignored() {
        let mut item = labor(dec!(2), dec!(10));
        item.total = dec!(999_999);
        let items = QuotationItems {
            labor_items: vec![item],
            ..QuotationItems::default()
        };

        let (priced, totals) = price_items(items).unwrap();
        assert_eq!(priced.labor_items[0].total, dec!(20));
        assert_eq!(totals.grand_total, dec!(20));
    }

    #[test]
    fn test_all_sections_contribute() {
        let items = QuotationItems {
            labor_items: vec![labor(dec!(10), dec!(100))],
            material_items: vec![material(dec!(4), dec!(250))],
            service_items: vec![ServiceItem {
                service: "Transport".to_string(),
                cost: dec!(500),
            }],
            contingency_items: vec![ContingencyItem {
                description: "Buffer".to_string(),
                amount: dec!(250),
            }],
            tax_items: vec![
                TaxItem {
                    description: "VAT".to_string(),
                    percentage: Some(dec!(11)),
                    amount: dec!(0),
                },
                TaxItem {
                    description: "Stamp duty".to_string(),
                    percentage: None,
                    amount: dec!(10),
                },
            ],
        };

        let (priced, totals) = price_items(items).unwrap();

        assert_eq!(totals.subtotal, dec!(2500));
        assert_eq!(priced.tax_items[0].amount, dec!(275));
        assert_eq!(totals.total_tax, dec!(285));
        assert_eq!(totals.total_contingency, dec!(250));
        assert_eq!(totals.grand_total, dec!(3035));
    }

    #[test]
    fn test_empty_items_price_to_zero() {
        let (_, totals) = price_items(QuotationItems::default()).unwrap();
        assert_eq!(totals, QuotationTotals::default());
    }

    #[rstest]
    #[case(dec!(-1), dec!(50))]
    #[case(dec!(10), dec!(-0.01))]
    fn test_negative_labor_rejected(#[case] hours: Decimal, #[case] rate: Decimal) {
        let items = QuotationItems {
            labor_items: vec![labor(hours, rate)],
            ..QuotationItems::default()
        };
        assert!(matches!(
            price_items(items),
            Err(QuotationError::Validation(_))
        ));
    }

    #[rstest]
    #[case::labor_line(
        QuotationItems {
            labor_items: vec![labor(huge(), huge())],
            ..QuotationItems::default()
        }
    )]
    #[case::material_line(
        QuotationItems {
            material_items: vec![material(Decimal::MAX, dec!(2))],
            ..QuotationItems::default()
        }
    )]
    #[case::subtotal(
        QuotationItems {
            labor_items: vec![labor(Decimal::MAX, dec!(1))],
            service_items: vec![ServiceItem {
                service: "Transport".to_string(),
                cost: Decimal::MAX,
            }],
            ..QuotationItems::default()
        }
    )]
    #[case::tax(
        QuotationItems {
            labor_items: vec![labor(Decimal::MAX, dec!(1))],
            tax_items: vec![TaxItem {
                description: "VAT".to_string(),
                percentage: Some(dec!(200)),
                amount: dec!(0),
            }],
            ..QuotationItems::default()
        }
    )]
    #[case::grand_total(
        QuotationItems {
            labor_items: vec![labor(Decimal::MAX, dec!(1))],
            contingency_items: vec![ContingencyItem {
                description: "Buffer".to_string(),
                amount: Decimal::MAX,
            }],
            ..QuotationItems::default()
        }
    )]
    fn test_overflowing_totals_rejected(#[case] items: QuotationItems) {
        assert!(matches!(
            price_items(items),
            Err(QuotationError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_tax_percentage_rejected() {
        let items = QuotationItems {
            tax_items: vec![TaxItem {
                description: "VAT".to_string(),
                percentage: Some(dec!(-5)),
                amount: dec!(0),
            }],
            ..QuotationItems::default()
        };
        assert!(matches!(
            price_items(items),
            Err(QuotationError::Validation(_))
        ));
    }

    #[test]
    fn test_fractional_line_rounds_to_cents() {
        let items = QuotationItems {
            material_items: vec![material(dec!(3), dec!(0.333))],
            ..QuotationItems::default()
        };
        let (priced, totals) = price_items(items).unwrap();
        assert_eq!(priced.material_items[0].total, dec!(1.00));
        assert_eq!(totals.grand_total, dec!(1.00));
    }
}
