//! Fetch a date range and print the TSV export.
//!
//! ```sh
//! ORDERS_BASE_URL=https://shop.example.com/ ORDERS_USER_ID=6 \
//! ORDERS_ID_TOKEN=... ORDERS_REFRESH_TOKEN=... \
//! cargo run --example fetch_range --features tracing-subscriber -- 2024-03-04 2024-03-13
//! ```

use orders_rs::{EmptyReason, OrderSink, OrdersClient, RangeFetchBuilder, RangeOutcome, TsvSink};

fn env(key: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::env::var(key).map_err(|_| format!("{key} is not set").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    orders_rs::init_tracing();

    let mut args = std::env::args().skip(1);
    let start = args.next().unwrap_or_default();
    let end = args.next().unwrap_or_else(|| start.clone());

    let client = OrdersClient::builder()
        .base_url(env("ORDERS_BASE_URL")?.parse()?)
        .build()?;
    let credentials = client.refresh_token_provider(
        &env("ORDERS_USER_ID")?,
        env("ORDERS_ID_TOKEN")?,
        env("ORDERS_REFRESH_TOKEN")?,
    )?;

    let report = RangeFetchBuilder::new(&client, credentials)
        .dates(start, end)
        .run()
        .await?;

    for failure in &report.failed_units {
        eprintln!("skipped {}: {}", failure.unit, failure.error);
    }

    match report.outcome {
        RangeOutcome::Orders(result) => {
            let mut sink = TsvSink::new();
            sink.accept(&result);
            print!("{}", sink.contents().unwrap_or_default());
            eprintln!("{} orders", result.len());
        }
        RangeOutcome::Empty(EmptyReason::NoFetchableDays) => {
            println!("No valid days found in the selected date range.");
        }
        RangeOutcome::Empty(EmptyReason::NoQualifyingOrders) => {
            println!("No valid orders found for the selected date range.");
        }
    }
    Ok(())
}
