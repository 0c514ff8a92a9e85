//! Fetching the orders of one fetch unit.
//!
//! One remote call is made per unit (never per day of a week unit). The
//! response is status-filtered and normalized in [`normalize`]. Rate-limit,
//! upstream-unavailable and network failures are retried per the client's
//! [`RetryConfig`](crate::core::RetryConfig); other non-2xx statuses fail the
//! unit immediately.

pub mod normalize;
pub(crate) mod wire;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::core::client::ID_TOKEN_HEADER;
use crate::core::client::retry::{AttemptFailure, run_with_retry};
use crate::core::services::BoxFuture;
use crate::core::{Credential, FetchUnit, NormalizedOrder, OrderService, OrdersClient, OrdersError};
use wire::OrdersEnvelope;

pub use normalize::{capitalize, format_delivery_date, is_reportable};

/// Builds the unit's query URL: an inclusive `from`T00:00:00 .. `to`T23:59:59
/// window plus the page-size cap.
pub(crate) fn unit_url(client: &OrdersClient, unit: FetchUnit) -> Result<Url, OrdersError> {
    let mut url = client.orders_url()?;
    url.query_pairs_mut()
        .append_pair(
            "deliveryDateTimeFrom",
            &format!("{}T00:00:00.000Z", unit.from.format("%Y-%m-%d")),
        )
        .append_pair(
            "deliveryDateTimeTo",
            &format!("{}T23:59:59.000Z", unit.to.format("%Y-%m-%d")),
        )
        .append_pair("pageSize", &client.page_size().to_string());
    Ok(url)
}

/// Fetches one unit with retry and returns its reportable orders in response order.
///
/// # Errors
///
/// - [`OrdersError::TransientFetch`] when rate-limit/unavailable/network
///   failures outlast the attempt budget.
/// - [`OrdersError::FatalUnit`] for any other non-2xx status.
/// - [`OrdersError::Data`] when a 2xx body is not the expected JSON.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip(client, credential), err, fields(unit = %unit))
)]
pub async fn fetch_unit(
    client: &OrdersClient,
    unit: FetchUnit,
    credential: &Credential,
) -> Result<Vec<NormalizedOrder>, OrdersError> {
    let url = unit_url(client, unit)?;

    run_with_retry(client.retry_config(), client.sleeper(), unit, |_attempt| {
        let req = client
            .http()
            .get(url.clone())
            .header(ID_TOKEN_HEADER, credential.expose())
            .header(CONTENT_TYPE, "application/json");
        async move { attempt_once(req, unit).await }
    })
    .await
}

async fn attempt_once(
    req: reqwest::RequestBuilder,
    unit: FetchUnit,
) -> Result<Vec<NormalizedOrder>, AttemptFailure> {
    let resp = req
        .send()
        .await
        .map_err(|e| AttemptFailure::from_transport(&e))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AttemptFailure::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = crate::core::net::get_text(resp, "orders", unit)
        .await
        .map_err(|e| AttemptFailure::from_transport(&e))?;
    let envelope: OrdersEnvelope = serde_json::from_str(&body)
        .map_err(|e| AttemptFailure::Decode(format!("json parse error: {e}")))?;

    Ok(normalize::normalize_orders(envelope.into_orders()))
}

impl OrderService for OrdersClient {
    fn fetch_unit<'a>(
        &'a self,
        unit: FetchUnit,
        credential: &'a Credential,
    ) -> BoxFuture<'a, Result<Vec<NormalizedOrder>, OrdersError>> {
        Box::pin(fetch_unit(self, unit, credential))
    }
}
