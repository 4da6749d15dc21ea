use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::context::StoreId;
use crate::domain::customer::CustomerGroupId;

/// Quantity-break price, optionally scoped to a store, currency, customer
/// group and validity window. Unscoped fields match everything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPrice {
    pub id: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub customer_group_id: Option<CustomerGroupId>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl TierPrice {
    pub fn new(id: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            id: id.into(),
            quantity,
            price,
            store_id: None,
            currency_code: None,
            customer_group_id: None,
            start_date: None,
            end_date: None,
        }
    }
}
