use crate::common;
use chrono::NaiveDate;
use orders_rs::core::services::BoxFuture;
use orders_rs::{
    CancelFlag, Credential, CredentialProvider, FetchUnit, NormalizedOrder, OrderService,
    OrdersError, RangeFetchBuilder, StaticCredentials,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingCredentials {
    calls: AtomicUsize,
    fail: bool,
}

impl CredentialProvider for CountingCredentials {
    fn acquire_token(&self) -> BoxFuture<'_, Result<Credential, OrdersError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(OrdersError::Data("token endpoint said no".into()))
            } else {
                Ok(Credential::new("tok"))
            }
        })
    }
}

/// Fails the units whose `from` day is listed, returns one record otherwise.
struct FlakyService {
    failing_days: Vec<u32>,
    calls: AtomicUsize,
    cancel_after_first: Option<CancelFlag>,
}

impl OrderService for FlakyService {
    fn fetch_unit<'a>(
        &'a self,
        unit: FetchUnit,
        _credential: &'a Credential,
    ) -> BoxFuture<'a, Result<Vec<NormalizedOrder>, OrdersError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(flag) = &self.cancel_after_first {
                flag.cancel();
            }
            if self.failing_days.contains(&chrono::Datelike::day(&unit.from)) {
                return Err(OrdersError::FatalUnit {
                    unit,
                    status: 404,
                    body: "not found".into(),
                });
            }
            Ok(vec![NormalizedOrder {
                order_number: unit.from.to_string(),
                customer_name: "A B".into(),
                delivery_date: "N/A".into(),
                base_amount: Decimal::ONE,
                total_amount: Decimal::TWO,
            }])
        })
    }
}

fn flaky(failing_days: Vec<u32>) -> Arc<FlakyService> {
    Arc::new(FlakyService {
        failing_days,
        calls: AtomicUsize::new(0),
        cancel_after_first: None,
    })
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[tokio::test]
async fn failed_units_are_dropped_and_reported() {
    let service = flaky(vec![5]);
    let report = RangeFetchBuilder::with_service(
        service.clone(),
        Arc::new(StaticCredentials::new("tok")),
    )
    .between(d(4), d(6))
    .concurrency(2)
    .run()
    .await
    .unwrap();

    assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    assert_eq!(report.failed_units.len(), 1);
    assert_eq!(report.failed_units[0].unit, FetchUnit::day(d(5)));
    let result = report.outcome.orders().unwrap();
    let numbers: Vec<_> = result
        .orders
        .iter()
        .map(|o| (o.serial_number, o.order.order_number.as_str()))
        .collect();
    assert_eq!(numbers, vec![(1, "2024-03-04"), (2, "2024-03-06")]);
    assert_eq!(result.grand_base_total, Decimal::from(2));
}

#[tokio::test]
async fn every_unit_failing_fails_the_run() {
    let service = flaky(vec![4, 5]);
    let err = RangeFetchBuilder::with_service(service, Arc::new(StaticCredentials::new("tok")))
        .between(d(4), d(5))
        .run()
        .await
        .unwrap_err();

    match err {
        OrdersError::AllUnitsFailed { failed, first } => {
            assert_eq!(failed, 2);
            assert!(matches!(*first, OrdersError::FatalUnit { status: 404, .. }));
        }
        other => panic!("expected AllUnitsFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn credential_failure_aborts_before_fetching() {
    let service = flaky(vec![]);
    let creds = Arc::new(CountingCredentials {
        calls: AtomicUsize::new(0),
        fail: true,
    });
    let err = RangeFetchBuilder::with_service(service.clone(), creds.clone())
        .between(d(4), d(9))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OrdersError::Credential(_)));
    assert_eq!(creds.calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn token_is_acquired_once_per_run() {
    let service = flaky(vec![]);
    let creds = Arc::new(CountingCredentials {
        calls: AtomicUsize::new(0),
        fail: false,
    });
    RangeFetchBuilder::with_service(service.clone(), creds.clone())
        .between(d(4), d(9))
        .concurrency(2)
        .run()
        .await
        .unwrap();

    assert_eq!(creds.calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn invalid_and_missing_ranges_make_no_calls() {
    let service = flaky(vec![]);
    let creds = Arc::new(CountingCredentials {
        calls: AtomicUsize::new(0),
        fail: false,
    });

    let reversed = RangeFetchBuilder::with_service(service.clone(), creds.clone())
        .dates("2024-03-09", "2024-03-04")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(reversed, OrdersError::InvalidRange(_)));

    let missing = RangeFetchBuilder::with_service(service.clone(), creds.clone())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(missing, OrdersError::InvalidRange(_)));

    assert_eq!(creds.calls.load(Ordering::SeqCst), 0);
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_concurrency_is_rejected() {
    let err = RangeFetchBuilder::with_service(flaky(vec![]), Arc::new(StaticCredentials::new("t")))
        .between(d(4), d(4))
        .concurrency(0)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::InvalidParams(_)));
}

#[tokio::test]
async fn cancellation_stops_scheduling_and_fails_the_run() {
    let cancel = CancelFlag::new();
    let service = Arc::new(FlakyService {
        failing_days: vec![],
        calls: AtomicUsize::new(0),
        cancel_after_first: Some(cancel.clone()),
    });
    let err = RangeFetchBuilder::with_service(service.clone(), Arc::new(StaticCredentials::new("t")))
        .between(d(4), d(9))
        .concurrency(2)
        .cancel_flag(cancel)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OrdersError::Cancelled));
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn http_unit_failures_do_not_abort_siblings() {
    let server = common::setup_server();
    let ok = common::mock_orders_fixture(&server, "2024-03-04", "2024-03-04");
    let gone = common::mock_orders(&server, "2024-03-05", "2024-03-05", 404, "gone".into());
    let client = common::client_for(&server);

    let report = RangeFetchBuilder::new(&client, StaticCredentials::new(common::TOKEN))
        .dates("2024-03-04", "2024-03-05")
        .run()
        .await
        .unwrap();

    ok.assert_hits(1);
    gone.assert_hits(1);
    assert_eq!(report.failed_units.len(), 1);
    assert!(matches!(
        report.failed_units[0].error,
        OrdersError::FatalUnit { status: 404, .. }
    ));
    assert_eq!(report.outcome.orders().unwrap().len(), 1);
}

#[tokio::test]
async fn retry_policy_override_applies_to_the_run() {
    let server = common::setup_server();
    let unavailable = common::mock_orders(
        &server,
        "2024-03-04",
        "2024-03-04",
        503,
        "Service Unavailable".into(),
    );
    let client = common::client_for(&server);

    let err = RangeFetchBuilder::new(&client, StaticCredentials::new(common::TOKEN))
        .dates("2024-03-04", "2024-03-04")
        .retry_policy(orders_rs::RetryConfig {
            max_attempts: 1,
            ..common::fast_retry()
        })
        .run()
        .await
        .unwrap_err();

    unavailable.assert_hits(1);
    match err {
        OrdersError::AllUnitsFailed { failed, first } => {
            assert_eq!(failed, 1);
            assert!(matches!(*first, OrdersError::TransientFetch { attempts: 1, .. }));
        }
        other => panic!("expected AllUnitsFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn retry_policy_without_client_is_rejected() {
    let service = flaky(vec![]);
    let err = RangeFetchBuilder::with_service(service.clone(), Arc::new(StaticCredentials::new("t")))
        .between(d(4), d(4))
        .retry_policy(orders_rs::RetryConfig::default())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, OrdersError::InvalidParams(_)));
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn overflowing_amounts_fail_with_data_error() {
    let server = common::setup_server();
    let max = Decimal::MAX.to_string();
    let order = |n: &str| {
        serde_json::json!({
            "orderNumber": n,
            "orderStatus": "Delivered",
            "amount": max,
            "totalAmount": 1,
        })
    };
    let body = serde_json::json!({ "data": { "orders": [order("X-1"), order("X-2")] } });
    let mock = common::mock_orders(&server, "2024-03-04", "2024-03-04", 200, body.to_string());
    let client = common::client_for(&server);

    let err = RangeFetchBuilder::new(&client, StaticCredentials::new(common::TOKEN))
        .dates("2024-03-04", "2024-03-04")
        .run()
        .await
        .unwrap_err();

    mock.assert_hits(1);
    match err {
        OrdersError::Data(msg) => assert!(msg.contains("X-2"), "{msg}"),
        other => panic!("expected Data, got {other:?}"),
    }
}
