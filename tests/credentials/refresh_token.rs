use crate::common;
use httpmock::Method::{GET, POST};
use orders_rs::{CredentialProvider, OrdersError, RangeFetchBuilder};
use serde_json::json;

const REFRESH_PATH: &str = "/user-management/api/v1/users/6/refreshToken";

#[tokio::test]
async fn refresh_exchange_yields_trimmed_token_and_remembers_it() {
    let server = common::setup_server();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path(REFRESH_PATH)
            .header("Idtoken", "stale-token")
            .json_body(json!({ "refreshToken": "refresh-1" }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "data": { "idToken": "  fresh-token \n" } }));
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path(REFRESH_PATH)
            .header("Idtoken", "fresh-token");
        then.status(200)
            .json_body(json!({ "data": { "idToken": "fresher-token" } }));
    });

    let client = common::client_for(&server);
    let provider = client
        .refresh_token_provider("6", "stale-token", "refresh-1")
        .unwrap();

    let token = provider.acquire_token().await.unwrap();
    assert_eq!(token, orders_rs::Credential::new("fresh-token"));
    first.assert_hits(1);

    let token = provider.acquire_token().await.unwrap();
    assert_eq!(token, orders_rs::Credential::new("fresher-token"));
    second.assert_hits(1);
}

#[tokio::test]
async fn refreshed_token_authorizes_order_requests() {
    let server = common::setup_server();
    let refresh = server.mock(|when, then| {
        when.method(POST).path(REFRESH_PATH);
        then.status(200)
            .json_body(json!({ "data": { "idToken": common::TOKEN } }));
    });
    let orders = common::mock_orders_fixture(&server, "2024-03-04", "2024-03-04");

    let client = common::client_for(&server);
    let provider = client
        .refresh_token_provider("6", "old", "refresh")
        .unwrap();
    let report = RangeFetchBuilder::new(&client, provider)
        .dates("2024-03-04", "2024-03-04")
        .run()
        .await
        .unwrap();

    refresh.assert_hits(1);
    orders.assert_hits(1);
    assert_eq!(report.outcome.orders().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_refresh_is_fatal_and_no_orders_are_fetched() {
    let server = common::setup_server();
    let refresh = server.mock(|when, then| {
        when.method(POST).path(REFRESH_PATH);
        then.status(401).body("expired");
    });
    let orders = server.mock(|when, then| {
        when.method(GET).path(common::ORDERS_PATH);
        then.status(200).body("{}");
    });

    let client = common::client_for(&server);
    let provider = client
        .refresh_token_provider("6", "old", "refresh")
        .unwrap();
    let err = RangeFetchBuilder::new(&client, provider)
        .dates("2024-03-04", "2024-03-08")
        .run()
        .await
        .unwrap_err();

    refresh.assert_hits(1);
    orders.assert_hits(0);
    match err {
        OrdersError::Credential(msg) => assert!(msg.contains("401"), "{msg}"),
        other => panic!("expected Credential, got {other:?}"),
    }
}

#[tokio::test]
async fn refresh_without_token_in_body_is_rejected() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(POST).path(REFRESH_PATH);
        then.status(200).json_body(json!({ "data": {} }));
    });

    let client = common::client_for(&server);
    let provider = client
        .refresh_token_provider("6", "old", "refresh")
        .unwrap();
    let err = provider.acquire_token().await.unwrap_err();
    assert!(matches!(err, OrdersError::Credential(_)));
}
