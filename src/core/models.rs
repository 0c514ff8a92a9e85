use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::OrdersError;

/* ----- RANGES (shared by segment/ and range/) ----- */

/// A validated, inclusive calendar date range.
///
/// Both bounds are time-zone-naive whole days and `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range from typed dates.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::InvalidRange`] if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, OrdersError> {
        if start > end {
            return Err(OrdersError::InvalidRange(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses a range from two `YYYY-MM-DD` strings, as typed into a date input.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::InvalidRange`] if either bound is empty, does not
    /// parse, or if the end date is before the start date.
    pub fn parse(start: &str, end: &str) -> Result<Self, OrdersError> {
        let start = parse_bound("start", start)?;
        let end = parse_bound("end", end)?;
        Self::new(start, end)
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    #[must_use]
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn parse_bound(which: &str, raw: &str) -> Result<NaiveDate, OrdersError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(OrdersError::InvalidRange(format!("missing {which} date")));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| OrdersError::InvalidRange(format!("bad {which} date {raw:?}: {e}")))
}

/// One remote query window, `from <= to`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FetchUnit {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl FetchUnit {
    /// A unit covering a single day.
    #[must_use]
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
        }
    }

    /// Inclusive day count of the window.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

impl fmt::Display for FetchUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}..={}", self.from, self.to)
        }
    }
}

/* ----- ORDERS (shared by orders/, aggregate/ and export/) ----- */

/// An order that passed the status filter, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOrder {
    pub order_number: String,
    pub customer_name: String,
    /// `DD.MM.YYYY`, or `N/A` when the source had no usable delivery date.
    pub delivery_date: String,
    /// Order amount without fees and discounts.
    pub base_amount: Decimal,
    pub total_amount: Decimal,
}

/// A [`NormalizedOrder`] numbered in its final aggregation position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedOrder {
    /// 1-based and strictly increasing across [`AggregatedResult::orders`].
    pub serial_number: usize,
    #[serde(flatten)]
    pub order: NormalizedOrder,
}

/// The totalled output of one run. `orders` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedResult {
    pub orders: Vec<AggregatedOrder>,
    pub grand_base_total: Decimal,
    pub grand_total_amount: Decimal,
}

impl AggregatedResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Why a successful run has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmptyReason {
    /// Segmentation produced no units (e.g. the range is a single Sunday).
    NoFetchableDays,
    /// Units were fetched but no record survived the status filter.
    NoQualifyingOrders,
}

/// The result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RangeOutcome {
    Orders(AggregatedResult),
    Empty(EmptyReason),
}

impl RangeOutcome {
    /// The aggregated result, if there was anything to aggregate.
    #[must_use]
    pub const fn orders(&self) -> Option<&AggregatedResult> {
        match self {
            Self::Orders(result) => Some(result),
            Self::Empty(_) => None,
        }
    }
}

/// A unit that contributed no records because its fetch failed.
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: FetchUnit,
    pub error: OrdersError,
}

/// Everything a completed run hands back to its caller.
#[derive(Debug)]
pub struct RangeReport {
    pub outcome: RangeOutcome,
    /// Failed units in segmentation order.
    pub failed_units: Vec<UnitFailure>,
}
