use std::sync::Arc;

use chrono::NaiveDate;

use crate::aggregate::aggregate;
use crate::core::{
    CredentialProvider, DateRange, EmptyReason, OrderService, OrdersClient, OrdersError,
    RangeOutcome, RangeReport, RetryConfig, UnitFailure,
};
use crate::schedule::{CancelFlag, DEFAULT_CONCURRENCY, run_chunked};
use crate::segment::segment;

/// A builder for fetching every order in a calendar date range.
///
/// The range is split into fetch units, the units are fetched in chunks of at
/// most `concurrency`, and the surviving records are numbered and totalled in
/// segmentation order.
///
/// ```no_run
/// # async fn demo() -> Result<(), orders_rs::OrdersError> {
/// use orders_rs::{OrdersClient, RangeFetchBuilder, StaticCredentials};
///
/// let client = OrdersClient::builder()
///     .base_url("https://shop.example.com/".parse()?)
///     .build()?;
/// let report = RangeFetchBuilder::new(&client, StaticCredentials::new("token"))
///     .dates("2024-03-04", "2024-03-13")
///     .run()
///     .await?;
/// if let Some(result) = report.outcome.orders() {
///     println!("{} orders, {}", result.len(), result.grand_total_amount);
/// }
/// # Ok(())
/// # }
/// ```
pub struct RangeFetchBuilder {
    service: Arc<dyn OrderService>,
    credentials: Arc<dyn CredentialProvider>,
    client: Option<OrdersClient>,

    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    raw_dates: Option<(String, String)>,

    concurrency: usize,
    cancel: Option<CancelFlag>,
    retry: Option<RetryConfig>,
}

impl RangeFetchBuilder {
    /// Creates a builder fetching through `client`.
    #[must_use]
    pub fn new(client: &OrdersClient, credentials: impl CredentialProvider + 'static) -> Self {
        let mut b = Self::with_service(Arc::new(client.clone()), Arc::new(credentials));
        b.client = Some(client.clone());
        b
    }

    /// Creates a builder over any [`OrderService`] and [`CredentialProvider`].
    #[must_use]
    pub fn with_service(
        service: Arc<dyn OrderService>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            service,
            credentials,
            client: None,
            start: None,
            end: None,
            raw_dates: None,
            concurrency: DEFAULT_CONCURRENCY,
            cancel: None,
            retry: None,
        }
    }

    /// Sets the inclusive range with typed dates.
    #[must_use]
    pub const fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Sets the inclusive range from `YYYY-MM-DD` strings; validated in [`run`](Self::run).
    #[must_use]
    pub fn dates(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.raw_dates = Some((start.into(), end.into()));
        self
    }

    /// Sets how many units may be in flight at once. (Default: 5)
    #[must_use]
    pub const fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }

    /// Lets the caller stop the run from scheduling further chunks.
    #[must_use]
    pub fn cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Overrides the client's retry policy for this run.
    ///
    /// Needs a builder created with [`new`](Self::new); a custom service owns
    /// its retry policy and [`run`](Self::run) rejects the override.
    #[must_use]
    pub fn retry_policy(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    fn resolve_service(&self) -> Result<Arc<dyn OrderService>, OrdersError> {
        match (&self.retry, &self.client) {
            (None, _) => Ok(Arc::clone(&self.service)),
            (Some(cfg), Some(client)) => Ok(Arc::new(client.with_retry(cfg.clone()))),
            (Some(_), None) => Err(OrdersError::InvalidParams(
                "retry_policy requires a builder created from an OrdersClient".into(),
            )),
        }
    }

    fn resolve_range(&self) -> Result<DateRange, OrdersError> {
        if let Some((start, end)) = &self.raw_dates {
            return DateRange::parse(start, end);
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            _ => Err(OrdersError::InvalidRange(
                "both start and end dates are required".into(),
            )),
        }
    }

    /// Runs the fetch.
    ///
    /// Per-unit failures are recorded in [`RangeReport::failed_units`] and the
    /// unit contributes nothing. A run that fetched successfully but found
    /// nothing returns [`RangeOutcome::Empty`].
    ///
    /// # Errors
    ///
    /// - [`OrdersError::InvalidRange`] before any remote call.
    /// - [`OrdersError::InvalidParams`] if the concurrency limit is zero, or a
    ///   retry policy was set on a builder without a client.
    /// - [`OrdersError::Credential`] if the token cannot be acquired.
    /// - [`OrdersError::AllUnitsFailed`] if not a single unit succeeded.
    /// - [`OrdersError::Cancelled`] if the cancel flag stopped scheduling.
    /// - [`OrdersError::Data`] if a grand total overflows.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self), err, fields(concurrency = self.concurrency))
    )]
    pub async fn run(self) -> Result<RangeReport, OrdersError> {
        let range = self.resolve_range()?;
        if self.concurrency == 0 {
            return Err(OrdersError::InvalidParams(
                "concurrency must be > 0".into(),
            ));
        }
        let service = self.resolve_service()?;

        let units = segment(range);
        if units.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::info!(start = %range.start(), end = %range.end(), "no fetchable days in range");
            return Ok(RangeReport {
                outcome: RangeOutcome::Empty(EmptyReason::NoFetchableDays),
                failed_units: Vec::new(),
            });
        }

        let credential = self
            .credentials
            .acquire_token()
            .await
            .map_err(|e| match e {
                OrdersError::Credential(_) => e,
                other => OrdersError::Credential(other.to_string()),
            })?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            units = units.len(),
            days = range.day_count(),
            "fetching orders"
        );

        let service = service.as_ref();
        let credential = &credential;
        let results = run_chunked(&units, self.concurrency, self.cancel.as_ref(), |unit| {
            service.fetch_unit(unit, credential)
        })
        .await?;

        if results
            .iter()
            .any(|(_, r)| matches!(r, Err(OrdersError::Cancelled)))
        {
            return Err(OrdersError::Cancelled);
        }

        let mut per_unit = Vec::with_capacity(results.len());
        let mut failed_units = Vec::new();
        for (unit, result) in results {
            match result {
                Ok(records) => per_unit.push((unit, records)),
                Err(error) if !error.is_unit_failure() => return Err(error),
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(unit = %unit, error = %error, "unit failed, contributing no records");
                    failed_units.push(UnitFailure { unit, error });
                }
            }
        }

        if per_unit.is_empty() {
            let failed = failed_units.len();
            let first = failed_units
                .into_iter()
                .next()
                .map_or(OrdersError::Cancelled, |f| f.error);
            return Err(OrdersError::AllUnitsFailed {
                failed,
                first: Box::new(first),
            });
        }

        let outcome = aggregate(per_unit)?;

        #[cfg(feature = "tracing")]
        {
            if let Some(result) = outcome.orders() {
                tracing::info!(
                    orders = result.len(),
                    grand_base_total = %result.grand_base_total,
                    grand_total_amount = %result.grand_total_amount,
                    "orders aggregated"
                );
            }
        }

        Ok(RangeReport {
            outcome,
            failed_units,
        })
    }
}
