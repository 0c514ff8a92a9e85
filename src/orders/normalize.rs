//! Status filtering and display normalization of raw order records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::wire::RawOrder;
use crate::core::NormalizedOrder;

const EXCLUDED_STATUSES: [&str; 2] = ["cancelled", "paymentfailed"];

/// Whether a record with this status belongs in the result.
///
/// The status is trimmed and lowercased first. Missing or blank statuses are
/// dropped, as are cancelled and payment-failed orders.
#[must_use]
pub fn is_reportable(status: Option<&str>) -> bool {
    let Some(status) = status.map(|s| s.trim().to_lowercase()) else {
        return false;
    };
    !status.is_empty() && !EXCLUDED_STATUSES.contains(&status.as_str())
}

/// Uppercases the first character and lowercases the rest.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Formats a delivery timestamp as `DD.MM.YYYY`, or `N/A` when it is
/// missing or unparseable. The calendar date is taken as written, without
/// shifting time zones.
#[must_use]
pub fn format_delivery_date(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_delivery_date)
        .map_or_else(|| "N/A".to_string(), |d| d.format("%d.%m.%Y").to_string())
}

fn parse_delivery_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn normalize(raw: RawOrder) -> NormalizedOrder {
    let (first, last) = raw
        .user_detail
        .map(|u| (u.first_name, u.last_name))
        .unwrap_or_default();
    let customer_name = format!(
        "{} {}",
        capitalize(first.as_deref().unwrap_or_default()),
        capitalize(last.as_deref().unwrap_or_default())
    )
    .trim()
    .to_string();

    NormalizedOrder {
        order_number: raw
            .order_number
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
        customer_name,
        delivery_date: format_delivery_date(raw.delivery_slot_date.as_deref()),
        base_amount: raw.amount.unwrap_or(Decimal::ZERO),
        total_amount: raw.total_amount.unwrap_or(Decimal::ZERO),
    }
}

/// Drops non-reportable records and normalizes the rest, keeping response order.
pub(crate) fn normalize_orders(raw: Vec<RawOrder>) -> Vec<NormalizedOrder> {
    raw.into_iter()
        .filter(|o| is_reportable(o.order_status.as_deref()))
        .map(normalize)
        .collect()
}
