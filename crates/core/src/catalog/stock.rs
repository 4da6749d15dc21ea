use serde::{Deserialize, Serialize};

use crate::catalog::combination::find_combination;
use crate::catalog::resources::{self, ResourceMessage};
use crate::config::CatalogSettings;
use crate::domain::combination::{CombinationId, ProductAttributeCombination};
use crate::domain::context::SelectionContext;
use crate::domain::inventory::{sellable_across, WarehouseId};
use crate::domain::product::{BackorderMode, ManageInventoryMethod, Product};
use crate::domain::selection::Selection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    LowStock,
    OutOfStock,
    Backordering,
    /// Stocked by attributes but the selection matches no combination yet.
    NoCombination,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStatus {
    pub availability: Availability,
    /// `None` when the product hides its stock availability.
    pub message: Option<ResourceMessage>,
    /// Sellable quantity; product-level fallback when no combination matched.
    pub quantity: Option<i32>,
    pub combination_id: Option<CombinationId>,
}

/// Warehouse used for stock lookups: the customer's pick when the store lets
/// them choose, otherwise the store default. `None` aggregates all warehouses.
pub fn effective_warehouse(context: &SelectionContext, settings: &CatalogSettings) -> Option<WarehouseId> {
    let chosen = settings.allow_to_select_warehouse.then(|| context.warehouse_id.clone()).flatten();
    chosen.or_else(|| context.store.default_warehouse_id.clone())
}

pub fn total_stock_quantity(product: &Product, warehouse_id: Option<&WarehouseId>) -> i32 {
    if product.use_multiple_warehouses {
        sellable_across(&product.warehouse_inventory, warehouse_id)
    } else {
        product.stock_quantity.saturating_sub(product.reserved_quantity)
    }
}

pub fn total_stock_quantity_for_combination(
    product: &Product,
    combination: &ProductAttributeCombination,
    warehouse_id: Option<&WarehouseId>,
) -> i32 {
    if product.use_multiple_warehouses && !combination.warehouse_inventory.is_empty() {
        sellable_across(&combination.warehouse_inventory, warehouse_id)
    } else {
        combination.sellable_quantity()
    }
}

pub fn format_stock_message(
    product: &Product,
    warehouse_id: Option<&WarehouseId>,
    selection: &Selection,
    settings: &CatalogSettings,
) -> StockStatus {
    let (availability, message, quantity, combination_id) = match product.manage_inventory {
        ManageInventoryMethod::DontManageStock => {
            (Availability::InStock, ResourceMessage::new(resources::IN_STOCK), None, None)
        }
        ManageInventoryMethod::ManageStock => {
            let quantity = total_stock_quantity(product, warehouse_id);
            let (availability, message) = if quantity > 0 {
                positive_stock(quantity, product.low_stock_threshold, settings)
            } else {
                match product.backorder_mode {
                    BackorderMode::NoBackorders => {
                        (Availability::OutOfStock, ResourceMessage::new(resources::OUT_OF_STOCK))
                    }
                    BackorderMode::AllowQtyBelowZero => {
                        (Availability::InStock, ResourceMessage::new(resources::IN_STOCK))
                    }
                    BackorderMode::AllowQtyBelowZeroAndNotifyCustomer => {
                        (Availability::Backordering, ResourceMessage::new(resources::BACKORDERING))
                    }
                }
            };
            (availability, message, Some(quantity), None)
        }
        ManageInventoryMethod::ManageStockByAttributes => match find_combination(product, selection) {
            Some(combination) => {
                let quantity = total_stock_quantity_for_combination(product, combination, warehouse_id);
                let (availability, message) = if quantity > 0 {
                    positive_stock(quantity, product.low_stock_threshold, settings)
                } else if combination.allow_out_of_stock_orders {
                    (Availability::Backordering, ResourceMessage::new(resources::BACKORDERING))
                } else {
                    (Availability::OutOfStock, ResourceMessage::new(resources::OUT_OF_STOCK))
                };
                (availability, message, Some(quantity), Some(combination.id.clone()))
            }
            None => (
                Availability::NoCombination,
                ResourceMessage::new(resources::NO_COMBINATION),
                Some(total_stock_quantity(product, warehouse_id)),
                None,
            ),
        },
    };

    StockStatus {
        availability,
        message: product.display_stock_availability.then_some(message),
        quantity,
        combination_id,
    }
}

fn positive_stock(quantity: i32, low_stock_threshold: i32, settings: &CatalogSettings) -> (Availability, ResourceMessage) {
    let low = low_stock_threshold > 0 && quantity <= low_stock_threshold;
    let message = match (low, settings.display_stock_quantity) {
        (true, true) => ResourceMessage::with_args(resources::LOW_STOCK_WITH_QUANTITY, [quantity.to_string()]),
        (true, false) => ResourceMessage::new(resources::LOW_STOCK),
        (false, true) => ResourceMessage::with_args(resources::IN_STOCK_WITH_QUANTITY, [quantity.to_string()]),
        (false, false) => ResourceMessage::new(resources::IN_STOCK),
    };
    let availability = if low { Availability::LowStock } else { Availability::InStock };
    (availability, message)
}
