use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::inventory::WarehouseInventory;
use crate::domain::selection::CustomAttribute;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombinationId(pub String);

/// A stocked, purchasable assignment of values across the enumerated mappings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttributeCombination {
    pub id: CombinationId,
    pub attributes: Vec<CustomAttribute>,
    pub stock_quantity: i32,
    pub reserved_quantity: i32,
    pub allow_out_of_stock_orders: bool,
    pub overridden_price: Option<Decimal>,
    pub sku: Option<String>,
    pub mpn: Option<String>,
    pub gtin: Option<String>,
    pub warehouse_inventory: Vec<WarehouseInventory>,
}

impl ProductAttributeCombination {
    /// Sellable units; negative when reservations exceed stock.
    pub fn sellable_quantity(&self) -> i32 {
        self.stock_quantity.saturating_sub(self.reserved_quantity)
    }

    pub fn contains_value(&self, value_id: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute.value == value_id)
    }
}
