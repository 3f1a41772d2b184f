//! Tax-inclusive pricing engine.
//!
//! Unit prices already contain GST. For a unit price `p` and a rate of `r`
//! percent the pre-tax base is `p / (1 + r/100)` and the tax portion of one
//! unit is `p - base`. Line totals are `p * quantity`; document totals sum the
//! line totals and line taxes independently and derive the subtotal by
//! subtraction, so `subtotal + total_tax == grand_total` always holds.
//!
//! Every function here is pure. Inputs that cannot be priced (quantity below
//! one, negative price or rate, arithmetic overflow) yield `None` rather than
//! an error; callers zero the affected amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived amounts of one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAmounts {
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Document-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

/// Pre-tax price of one unit.
pub fn base_price(unit_price: Decimal, gst_rate: Decimal) -> Option<Decimal> {
    if unit_price < Decimal::ZERO || gst_rate < Decimal::ZERO {
        return None;
    }
    let divisor = Decimal::ONE.checked_add(gst_rate.checked_div(Decimal::ONE_HUNDRED)?)?;
    unit_price.checked_div(divisor)
}

/// Tax contained in one unit.
pub fn tax_per_unit(unit_price: Decimal, gst_rate: Decimal) -> Option<Decimal> {
    unit_price.checked_sub(base_price(unit_price, gst_rate)?)
}

/// Tax and total of `quantity` units at a tax-inclusive `unit_price`.
pub fn line_amounts(unit_price: Decimal, quantity: i64, gst_rate: Decimal) -> Option<LineAmounts> {
    if quantity < 1 {
        return None;
    }
    let quantity = Decimal::from(quantity);
    let tax_amount = tax_per_unit(unit_price, gst_rate)?.checked_mul(quantity)?;
    let total_amount = unit_price.checked_mul(quantity)?;
    Some(LineAmounts {
        tax_amount,
        total_amount,
    })
}

/// Aggregate line amounts into document totals.
pub fn document_totals<I>(lines: I) -> DocumentTotals
where
    I: IntoIterator<Item = LineAmounts>,
{
    let sums = lines
        .into_iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(total, tax), line| {
            Some((
                total.checked_add(line.total_amount)?,
                tax.checked_add(line.tax_amount)?,
            ))
        });

    match sums {
        Some((grand_total, total_tax)) => DocumentTotals {
            subtotal: grand_total - total_tax,
            total_tax,
            grand_total,
        },
        None => {
            tracing::warn!("Document totals overflowed; reporting zero totals");
            DocumentTotals::default()
        }
    }
}
