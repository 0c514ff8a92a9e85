use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::wire::{de_decimal_lenient, de_string_lenient};

#[derive(Deserialize)]
pub(crate) struct OrdersEnvelope {
    #[serde(default)]
    data: Option<OrdersData>,
}

#[derive(Deserialize)]
struct OrdersData {
    #[serde(default)]
    orders: Option<Vec<Option<RawOrder>>>,
}

impl OrdersEnvelope {
    /// Raw records in response order. Missing `data`/`orders` and null
    /// entries yield nothing.
    pub(crate) fn into_orders(self) -> Vec<RawOrder> {
        self.data
            .and_then(|d| d.orders)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOrder {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub(crate) order_status: Option<String>,
    #[serde(default)]
    pub(crate) user_detail: Option<UserDetail>,
    #[serde(default, deserialize_with = "de_decimal_lenient")]
    pub(crate) amount: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_lenient")]
    pub(crate) total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub(crate) delivery_slot_date: Option<String>,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub(crate) order_number: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDetail {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub(crate) first_name: Option<String>,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub(crate) last_name: Option<String>,
}
