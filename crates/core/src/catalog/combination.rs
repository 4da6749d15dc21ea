use std::collections::BTreeSet;

use tracing::warn;

use crate::domain::attribute::MappingId;
use crate::domain::combination::ProductAttributeCombination;
use crate::domain::product::Product;
use crate::domain::selection::Selection;

pub type PairSet = BTreeSet<(MappingId, String)>;

/// Selection pairs that participate in combination matching: entries of
/// enumerated mappings only. Free text, dates and uploads never match.
pub fn restricted_pairs(product: &Product, selection: &Selection) -> PairSet {
    selection
        .entries()
        .iter()
        .filter(|entry| product.mapping(&entry.key).is_some_and(|mapping| mapping.should_have_values()))
        .map(|entry| (entry.key.clone(), entry.value.clone()))
        .collect()
}

/// A combination is usable only when every pair names an existing enumerated
/// mapping and one of its values.
pub fn is_consistent(product: &Product, combination: &ProductAttributeCombination) -> bool {
    !combination.attributes.is_empty()
        && combination.attributes.iter().all(|attribute| {
            product
                .mapping(&attribute.key)
                .filter(|mapping| mapping.should_have_values())
                .is_some_and(|mapping| mapping.value(&attribute.value).is_some())
        })
}

fn combination_pairs(combination: &ProductAttributeCombination) -> PairSet {
    combination
        .attributes
        .iter()
        .map(|attribute| (attribute.key.clone(), attribute.value.clone()))
        .collect()
}

/// Set-exact match against the restricted selection. Partial and superset
/// selections never match; `None` means "fall back to product-level stock".
pub fn find_combination<'a>(
    product: &'a Product,
    selection: &Selection,
) -> Option<&'a ProductAttributeCombination> {
    if product.attribute_combinations.is_empty() {
        return None;
    }

    let wanted = restricted_pairs(product, selection);
    if wanted.is_empty() {
        return None;
    }

    product.attribute_combinations.iter().find(|combination| {
        if !is_consistent(product, combination) {
            warn!(
                event_name = "catalog.combination.inconsistent",
                product_id = %product.id.0,
                combination_id = %combination.id.0,
                "combination references a mapping or value missing from the product; skipped"
            );
            return false;
        }
        combination_pairs(combination) == wanted
    })
}
