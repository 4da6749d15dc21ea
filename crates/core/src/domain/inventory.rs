use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WarehouseId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseInventory {
    pub warehouse_id: WarehouseId,
    pub stock_quantity: i32,
    pub reserved_quantity: i32,
}

impl WarehouseInventory {
    pub fn sellable_quantity(&self) -> i32 {
        self.stock_quantity.saturating_sub(self.reserved_quantity)
    }
}

/// Sums sellable quantity, optionally narrowed to a single warehouse.
/// Saturates at the `i32` bounds.
pub fn sellable_across(records: &[WarehouseInventory], warehouse_id: Option<&WarehouseId>) -> i32 {
    records
        .iter()
        .filter(|record| warehouse_id.map_or(true, |id| &record.warehouse_id == id))
        .map(WarehouseInventory::sellable_quantity)
        .fold(0_i32, i32::saturating_add)
}
