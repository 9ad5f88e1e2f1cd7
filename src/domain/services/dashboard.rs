use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use crate::domain::models::{
    payment::Payment,
    property::{Property, Unit},
    stats::DashboardStats,
};

fn percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
        .to_f64()
        .unwrap_or(0.0)
}

/// Aggregates already-scoped rows. Inactive properties are not counted.
pub fn compute_stats<'a>(
    properties: &[Property],
    units: impl IntoIterator<Item = &'a Unit>,
    payments: &[Payment],
) -> DashboardStats {
    let total_properties = properties.iter().filter(|p| p.is_active).count() as i64;

    let (total_units, occupied_units) = units
        .into_iter()
        .fold((0i64, 0i64), |(total, occupied), unit| (total + 1, occupied + i64::from(unit.is_occupied)));

    let total_amount_due: Decimal = payments.iter().map(|p| p.amount_due.amount()).sum();
    let total_amount_paid: Decimal = payments.iter().map(|p| p.amount_paid.amount()).sum();
    let total_balance = total_amount_due - total_amount_paid;

    DashboardStats {
        total_properties,
        total_units,
        occupied_units,
        non_occupied_units: total_units - occupied_units,
        occupancy_percentage: percentage(Decimal::from(occupied_units), Decimal::from(total_units)),
        total_payments: payments.len() as i64,
        total_amount_due: total_amount_due.to_f64().unwrap_or(0.0),
        total_amount_paid: total_amount_paid.to_f64().unwrap_or(0.0),
        total_balance: total_balance.to_f64().unwrap_or(0.0),
        collection_percentage: percentage(total_amount_paid, total_amount_due),
    }
}
