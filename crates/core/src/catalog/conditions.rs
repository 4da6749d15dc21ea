use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::combination::{find_combination, is_consistent, restricted_pairs};
use crate::domain::attribute::{AttributeCondition, MappingId, ValueId};
use crate::domain::combination::ProductAttributeCombination;
use crate::domain::product::{ManageInventoryMethod, Product};
use crate::domain::selection::Selection;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// Conditioned mappings whose requirements are all selected.
    pub enabled_mapping_ids: BTreeSet<MappingId>,
    pub disabled_mapping_ids: BTreeSet<MappingId>,
    pub blocked_value_ids: BTreeSet<ValueId>,
}

pub fn is_condition_met(condition: &AttributeCondition, selection: &Selection) -> bool {
    condition
        .requirements
        .iter()
        .all(|requirement| selection.contains(&requirement.mapping_id, &requirement.value_id.0))
}

pub fn evaluate(product: &Product, selection: &Selection) -> ConditionResult {
    let mut result = ConditionResult::default();
    for mapping in &product.attribute_mappings {
        let Some(condition) = mapping.active_condition() else {
            continue;
        };
        if is_condition_met(condition, selection) {
            result.enabled_mapping_ids.insert(mapping.id.clone());
        } else {
            result.disabled_mapping_ids.insert(mapping.id.clone());
        }
    }
    result.blocked_value_ids = blocked_values(product, selection);
    result
}

/// Drops entries of mappings whose condition is unmet. Repeats until stable
/// since removing one entry can disable a mapping conditioned on it.
pub fn prune_disabled(product: &Product, selection: &Selection) -> Selection {
    let mut pruned = selection.clone();
    loop {
        let disabled: BTreeSet<MappingId> = product
            .attribute_mappings
            .iter()
            .filter(|mapping| {
                mapping.active_condition().is_some_and(|condition| !is_condition_met(condition, &pruned))
            })
            .map(|mapping| mapping.id.clone())
            .collect();

        let before = pruned.len();
        pruned.retain(|entry| !disabled.contains(&entry.key));
        if pruned.len() == before {
            return pruned;
        }
    }
}

/// Values that cannot lead to a sellable variant. Computed only for products
/// stocked by attributes that have exactly one enumerated mapping; this is a
/// single-pass exclusion rule, not a solver over several free dimensions.
fn blocked_values(product: &Product, selection: &Selection) -> BTreeSet<ValueId> {
    if product.manage_inventory != ManageInventoryMethod::ManageStockByAttributes
        || product.enumerated_mappings().count() != 1
    {
        return BTreeSet::new();
    }

    let consistent: Vec<&ProductAttributeCombination> = product
        .attribute_combinations
        .iter()
        .filter(|combination| is_consistent(product, combination))
        .collect();
    let selected: BTreeSet<String> =
        restricted_pairs(product, selection).into_iter().map(|(_, value)| value).collect();

    if selected.is_empty() {
        return unavailable_values(consistent.iter().copied())
            .into_iter()
            .map(ValueId)
            .collect();
    }

    let exact = find_combination(product, selection).map(|combination| &combination.id);
    let mut blocked = BTreeSet::new();
    for value in &selected {
        let related = consistent
            .iter()
            .copied()
            .filter(|combination| Some(&combination.id) != exact)
            .filter(|combination| combination.contains_value(value));
        blocked.extend(
            unavailable_values(related)
                .into_iter()
                .filter(|candidate| !selected.contains(candidate))
                .map(ValueId),
        );
    }
    blocked
}

/// Values seen only in combinations with no sellable stock.
fn unavailable_values<'a>(
    combinations: impl Iterator<Item = &'a ProductAttributeCombination>,
) -> BTreeSet<String> {
    let mut out_of_stock = BTreeSet::new();
    let mut in_stock = BTreeSet::new();
    for combination in combinations {
        let target = if combination.sellable_quantity() <= 0 { &mut out_of_stock } else { &mut in_stock };
        target.extend(combination.attributes.iter().map(|attribute| attribute.value.clone()));
    }
    out_of_stock.difference(&in_stock).cloned().collect()
}
