use rust_decimal::Decimal;

use crate::core::{
    AggregatedOrder, AggregatedResult, EmptyReason, FetchUnit, NormalizedOrder, OrdersError,
    RangeOutcome,
};

/// Numbers and totals per-unit results.
///
/// `per_unit` must be in segmentation order; records are numbered 1..N by
/// walking the units in that order and each unit's records in response order.
/// Zero records overall yields [`RangeOutcome::Empty`] rather than a
/// zero-valued result.
///
/// # Errors
///
/// Returns [`OrdersError::Data`] if a grand total overflows the decimal range.
pub fn aggregate<I>(per_unit: I) -> Result<RangeOutcome, OrdersError>
where
    I: IntoIterator<Item = (FetchUnit, Vec<NormalizedOrder>)>,
{
    let mut orders = Vec::new();
    let mut grand_base_total = Decimal::ZERO;
    let mut grand_total_amount = Decimal::ZERO;

    for (unit, records) in per_unit {
        for order in records {
            grand_base_total = add_amount(grand_base_total, order.base_amount, unit, &order)?;
            grand_total_amount = add_amount(grand_total_amount, order.total_amount, unit, &order)?;
            orders.push(AggregatedOrder {
                serial_number: orders.len() + 1,
                order,
            });
        }
    }

    if orders.is_empty() {
        return Ok(RangeOutcome::Empty(EmptyReason::NoQualifyingOrders));
    }
    Ok(RangeOutcome::Orders(AggregatedResult {
        orders,
        grand_base_total,
        grand_total_amount,
    }))
}

fn add_amount(
    total: Decimal,
    amount: Decimal,
    unit: FetchUnit,
    order: &NormalizedOrder,
) -> Result<Decimal, OrdersError> {
    total.checked_add(amount).ok_or_else(|| {
        OrdersError::Data(format!(
            "grand total overflows at order {} ({unit})",
            order.order_number
        ))
    })
}
