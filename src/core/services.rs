use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::core::client::Credential;
use crate::core::{FetchUnit, NormalizedOrder, OrdersError};

/// Boxed future returned by the service traits in this module.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A trait for services that can fetch the orders of one fetch unit.
///
/// This decouples the scheduler and orchestrator from the HTTP client so they
/// can be driven by in-process fakes. It is implemented by [`OrdersClient`].
///
/// [`OrdersClient`]: crate::core::OrdersClient
pub trait OrderService: Send + Sync {
    /// Fetches, filters and normalizes the orders of `unit`, in response order.
    ///
    /// Implementations apply their own retry policy; an `Err` here is final
    /// for the unit.
    fn fetch_unit<'a>(
        &'a self,
        unit: FetchUnit,
        credential: &'a Credential,
    ) -> BoxFuture<'a, Result<Vec<NormalizedOrder>, OrdersError>>;
}

/// Supplies the opaque token every order request of a run is authorized with.
pub trait CredentialProvider: Send + Sync {
    /// Acquires a token. Called exactly once per run, before any fetch.
    fn acquire_token(&self) -> BoxFuture<'_, Result<Credential, OrdersError>>;
}

/// Waits between retry attempts. Injected so backoff can be observed in tests
/// without real timers.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()>;
}

/// The default [`Sleeper`], backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}
