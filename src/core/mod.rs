//! Core components of the `orders-rs` crate.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The [`OrdersClient`] and its builder, retry policy and credential providers.
//! - The primary [`OrdersError`] type.
//! - Shared data models like [`DateRange`], [`FetchUnit`] and [`AggregatedResult`].
//! - The service traits the scheduler and orchestrator are written against.

/// The HTTP client (`OrdersClient`), builder, retry policy and credentials.
pub mod client;
/// The primary error type (`OrdersError`) for the crate.
pub mod error;
/// Shared data models used across modules.
pub mod models;
/// Service traits for abstracting fetching, credentials and backoff timers.
pub mod services;
pub(crate) mod wire;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::OrdersClient`
pub use client::{Credential, OrdersClient, OrdersClientBuilder, RetryConfig};
pub use error::OrdersError;
pub use models::{
    AggregatedOrder, AggregatedResult, DateRange, EmptyReason, FetchUnit, NormalizedOrder,
    RangeOutcome, RangeReport, UnitFailure,
};
pub use services::{BoxFuture, CredentialProvider, OrderService, Sleeper, TokioSleeper};
