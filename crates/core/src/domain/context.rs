use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::inventory::WarehouseId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreId(pub String);

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageId(pub String);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub default_warehouse_id: Option<WarehouseId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxDisplay {
    #[default]
    IncludingTax,
    ExcludingTax,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Everything a resolution depends on besides the product itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionContext {
    pub customer: Customer,
    pub store: Store,
    pub currency: Currency,
    pub language: LanguageId,
    pub quantity: u32,
    pub tax_display: TaxDisplay,
    pub warehouse_id: Option<WarehouseId>,
    pub reservation: Option<ReservationRange>,
    pub customer_entered_price: Option<Decimal>,
    pub as_of: DateTime<Utc>,
}

impl SelectionContext {
    pub fn new(customer: Customer, store: Store, currency: Currency, as_of: DateTime<Utc>) -> Self {
        Self {
            customer,
            store,
            currency,
            language: LanguageId("en".to_owned()),
            quantity: 1,
            tax_display: TaxDisplay::default(),
            warehouse_id: None,
            reservation: None,
            customer_entered_price: None,
            as_of,
        }
    }

    pub fn price_includes_tax(&self) -> bool {
        matches!(self.tax_display, TaxDisplay::IncludingTax)
    }
}
