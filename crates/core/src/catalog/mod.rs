//! Variant resolution and pricing engine.

pub mod assembler;
pub mod codec;
pub mod collaborators;
pub mod combination;
pub mod conditions;
pub mod pricing;
pub mod resources;
pub mod stock;
pub mod tier_price;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};

use crate::catalog::codec::AttributeWarning;
use crate::catalog::conditions::ConditionResult;
use crate::catalog::stock::StockStatus;
use crate::config::CatalogSettings;
use crate::domain::combination::ProductAttributeCombination;
use crate::domain::context::SelectionContext;
use crate::domain::product::Product;
use crate::domain::selection::Selection;

/// Everything derived from a selection apart from money.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantEvaluation {
    /// Input selection minus entries of mappings disabled by their condition.
    pub selection: Selection,
    pub conditions: ConditionResult,
    pub combination: Option<ProductAttributeCombination>,
    pub stock: StockStatus,
    pub warnings: Vec<AttributeWarning>,
}

impl VariantEvaluation {
    /// SKU, MPN and GTIN with the matched combination's values taking precedence.
    pub fn identifiers(&self, product: &Product) -> (Option<String>, Option<String>, Option<String>) {
        let combination = self.combination.as_ref();
        (
            combination.and_then(|found| found.sku.clone()).or_else(|| product.sku.clone()),
            combination.and_then(|found| found.mpn.clone()).or_else(|| product.mpn.clone()),
            combination.and_then(|found| found.gtin.clone()).or_else(|| product.gtin.clone()),
        )
    }
}

pub fn evaluate_variant(
    product: &Product,
    selection: &Selection,
    context: &SelectionContext,
    settings: &CatalogSettings,
) -> VariantEvaluation {
    let selection = conditions::prune_disabled(product, selection);
    let conditions = conditions::evaluate(product, &selection);
    let combination = combination::find_combination(product, &selection).cloned();
    let warehouse = stock::effective_warehouse(context, settings);
    let stock = stock::format_stock_message(product, warehouse.as_ref(), &selection, settings);
    let warnings = codec::validate(&product.attribute_mappings, &selection, &conditions.disabled_mapping_ids);

    VariantEvaluation { selection, conditions, combination, stock, warnings }
}
