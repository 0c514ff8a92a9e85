//! Hand-off of aggregated results to a presentation layer.
//!
//! Rendering is the sink's business; this module only defines the hand-off
//! and ships the tab-separated export used for spreadsheet paste/download.

use std::fmt::Write as _;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::AggregatedResult;

/// Consumes one aggregated result per run.
pub trait OrderSink {
    fn accept(&mut self, result: &AggregatedResult);
}

/// Column headers of the tabular export, in order.
pub const TSV_HEADER: [&str; 6] = [
    "S.No.",
    "Order Number",
    "Date",
    "Customer Name",
    "Amount",
    "Total Amount",
];

fn money(d: Decimal) -> String {
    format!(
        "{:.2}",
        d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Renders `result` as tab-separated text: the two grand totals, a blank
/// line, the header row, then one row per order.
#[must_use]
pub fn to_tsv(result: &AggregatedResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Grand Total (Amount - without fees):\t{}",
        money(result.grand_base_total)
    );
    let _ = writeln!(
        out,
        "Grand Total (Total Amount):\t{}",
        money(result.grand_total_amount)
    );
    out.push('\n');
    out.push_str(&TSV_HEADER.join("\t"));
    out.push('\n');

    for row in &result.orders {
        let o = &row.order;
        let cells = [
            row.serial_number.to_string(),
            quoted(&o.order_number),
            quoted(&o.delivery_date),
            quoted(&o.customer_name),
            quoted(&money(o.base_amount)),
            quoted(&money(o.total_amount)),
        ];
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// A sink that keeps the TSV export of the last result it was handed.
#[derive(Debug, Default, Clone)]
pub struct TsvSink {
    last: Option<String>,
}

impl TsvSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent export, if any result has been accepted.
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl OrderSink for TsvSink {
    fn accept(&mut self, result: &AggregatedResult) {
        self.last = Some(to_tsv(result));
    }
}
