//! orders-rs: fetch every order in a calendar date range from a service that
//! only answers bounded, authenticated queries.
//!
//! A run validates the range, splits it into fetch units ([`segment`]),
//! acquires one credential, fetches the units in bounded-concurrency chunks
//! with per-unit retry ([`schedule`], [`orders`]), and numbers and totals the
//! surviving records in segmentation order ([`aggregate`]). The result can be
//! handed to any [`export::OrderSink`].
//!
//! Start with [`RangeFetchBuilder`].

pub mod aggregate;
pub mod core;
pub mod export;
pub mod orders;
pub mod range;
pub mod schedule;
pub mod segment;

pub use crate::core::client::{
    Backoff, RefreshTokenProvider, RetryConfig, RetryStep, StaticCredentials,
};
pub use crate::core::{
    AggregatedOrder, AggregatedResult, Credential, CredentialProvider, DateRange, EmptyReason,
    FetchUnit, NormalizedOrder, OrderService, OrdersClient, OrdersClientBuilder, OrdersError,
    RangeOutcome, RangeReport, Sleeper, UnitFailure,
};
pub use export::{OrderSink, TsvSink, to_tsv};
pub use range::RangeFetchBuilder;
pub use schedule::CancelFlag;

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG`
/// (default `orders_rs=info`). Meant for demos and tests.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orders_rs=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
