use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::attribute::{MappingId, ProductAttributeMapping};
use crate::domain::combination::ProductAttributeCombination;
use crate::domain::inventory::WarehouseInventory;
use crate::domain::tier_price::TierPrice;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Simple,
    Grouped,
    Bundle,
    Reservation,
    Auction,
    GiftVoucher,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManageInventoryMethod {
    #[default]
    DontManageStock,
    ManageStock,
    ManageStockByAttributes,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackorderMode {
    #[default]
    NoBackorders,
    AllowQtyBelowZero,
    AllowQtyBelowZeroAndNotifyCustomer,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Minute,
    Hour,
    #[default]
    Day,
}

/// Reference-unit pricing, e.g. "2.50 per 100 g" for a 500 g pack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePricePerUnit {
    pub amount: Decimal,
    pub base_amount: Decimal,
    pub unit: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionDetails {
    pub highest_bid: Decimal,
    pub end_date: Option<DateTime<Utc>>,
    pub ended: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDetails {
    pub interval: u32,
    pub interval_unit: IntervalUnit,
    pub include_both_dates: bool,
}

/// Catalog aggregate as read from the store. Never mutated during resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub mpn: Option<String>,
    pub gtin: Option<String>,
    pub product_type: ProductType,
    pub published: bool,
    pub available_start_date: Option<DateTime<Utc>>,
    pub available_end_date: Option<DateTime<Utc>>,
    pub parent_grouped_product_id: Option<ProductId>,
    pub display_order: i32,

    pub price: Decimal,
    pub old_price: Decimal,
    pub catalog_price: Decimal,
    pub start_price: Decimal,
    pub call_for_price: bool,
    pub entered_price: bool,
    pub min_entered_price: Decimal,
    pub max_entered_price: Decimal,
    pub base_price: Option<BasePricePerUnit>,
    pub tax_category_id: Option<String>,

    pub manage_inventory: ManageInventoryMethod,
    pub backorder_mode: BackorderMode,
    pub stock_quantity: i32,
    pub reserved_quantity: i32,
    pub low_stock_threshold: i32,
    pub use_multiple_warehouses: bool,
    pub warehouse_inventory: Vec<WarehouseInventory>,
    pub display_stock_availability: bool,

    pub attribute_mappings: Vec<ProductAttributeMapping>,
    pub attribute_combinations: Vec<ProductAttributeCombination>,
    pub tier_prices: Vec<TierPrice>,

    pub auction: Option<AuctionDetails>,
    pub reservation: Option<ReservationDetails>,
}

impl Product {
    pub fn mapping(&self, id: &MappingId) -> Option<&ProductAttributeMapping> {
        self.attribute_mappings.iter().find(|mapping| &mapping.id == id)
    }

    /// Mappings whose control type carries predefined values.
    pub fn enumerated_mappings(&self) -> impl Iterator<Item = &ProductAttributeMapping> {
        self.attribute_mappings.iter().filter(|mapping| mapping.should_have_values())
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.available_start_date.map_or(true, |start| start <= now);
        let not_ended = self.available_end_date.map_or(true, |end| now <= end);
        started && not_ended
    }

    pub fn has_tier_prices(&self) -> bool {
        !self.tier_prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{Product, ProductId};

    #[test]
    fn availability_window_treats_open_ends_as_unbounded() {
        let now = Utc::now();
        let mut product = Product { id: ProductId("p-1".to_owned()), ..Product::default() };
        assert!(product.is_available_at(now));

        product.available_start_date = Some(now + Duration::days(1));
        assert!(!product.is_available_at(now));

        product.available_start_date = Some(now - Duration::days(1));
        product.available_end_date = Some(now - Duration::hours(1));
        assert!(!product.is_available_at(now));
    }
}
