#![allow(dead_code)]

use httpmock::{Method::GET, Mock, MockServer};
use orders_rs::{Backoff, OrdersClient, RetryConfig};
use std::time::Duration;
use std::{fs, path::Path};
use url::Url;

pub const ORDERS_PATH: &str = "/order-management/api/v1/orders";
pub const TOKEN: &str = "id-token-value";

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture(endpoint: &str, from: &str, to: &str) -> String {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let path = dir.join(format!("{endpoint}_{from}_{to}.json"));
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

/// Retry policy with the default budget but a 1ms fixed delay, for fast tests.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        backoff: Backoff::Fixed(Duration::from_millis(1)),
        ..RetryConfig::default()
    }
}

pub fn client_for(server: &MockServer) -> OrdersClient {
    OrdersClient::builder()
        .base_url(Url::parse(&format!("{}/", server.base_url())).unwrap())
        .retry_config(fast_retry())
        .build()
        .unwrap()
}

/// Mocks the orders endpoint for one window, answering with `status` and `body`.
pub fn mock_orders<'a>(
    server: &'a MockServer,
    from: &str,
    to: &str,
    status: u16,
    body: String,
) -> Mock<'a> {
    let from = format!("{from}T00:00:00.000Z");
    let to = format!("{to}T23:59:59.000Z");
    server.mock(|when, then| {
        when.method(GET)
            .path(ORDERS_PATH)
            .query_param("deliveryDateTimeFrom", from.as_str())
            .query_param("deliveryDateTimeTo", to.as_str())
            .query_param("pageSize", "75")
            .header("Idtoken", TOKEN);
        then.status(status)
            .header("content-type", "application/json")
            .body(body);
    })
}

/// Mocks one window with its recorded fixture.
pub fn mock_orders_fixture<'a>(server: &'a MockServer, from: &str, to: &str) -> Mock<'a> {
    mock_orders(server, from, to, 200, fixture("orders", from, to))
}
