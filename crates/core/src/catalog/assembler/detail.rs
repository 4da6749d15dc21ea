use std::collections::BTreeSet;

use futures::future::try_join;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::codec::{self, AttributeForm, AttributeWarning};
use crate::catalog::collaborators::Collaborators;
use crate::catalog::pricing::{PriceResolution, PriceResolver, TierPriceRow};
use crate::catalog::stock::StockStatus;
use crate::catalog::{evaluate_variant, VariantEvaluation};
use crate::config::CatalogSettings;
use crate::domain::attribute::{AttributeControlType, MappingId, ValueId};
use crate::domain::combination::CombinationId;
use crate::domain::context::SelectionContext;
use crate::domain::product::{Product, ProductId, ProductType};
use crate::domain::selection::Selection;
use crate::errors::CollaboratorError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValueModel {
    pub id: ValueId,
    pub name: String,
    pub color_rgb: Option<String>,
    pub image_id: Option<String>,
    /// `+2.50` / `+10%`; `None` for values without an adjustment.
    pub price_adjustment: Option<String>,
    pub is_pre_selected: bool,
    pub selected: bool,
    /// Only sold-out combinations contain this value.
    pub blocked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeModel {
    pub id: MappingId,
    pub name: String,
    pub control_type: AttributeControlType,
    pub is_required: bool,
    pub enabled: bool,
    pub values: Vec<AttributeValueModel>,
    /// Current free-form entry (text, ISO date or upload guid).
    pub entered_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetailModel {
    pub product_id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    pub sku: Option<String>,
    pub mpn: Option<String>,
    pub gtin: Option<String>,
    pub quantity: u32,
    pub selection: Selection,
    /// The selection re-encoded for the page's attribute form.
    pub form: AttributeForm,
    pub attributes: Vec<AttributeModel>,
    pub combination_id: Option<CombinationId>,
    pub price: PriceResolution,
    pub tier_prices: Vec<TierPriceRow>,
    pub stock: StockStatus,
    pub warnings: Vec<AttributeWarning>,
}

/// Partial recompute returned when the customer changes an attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChangeModel {
    pub product_id: ProductId,
    pub sku: Option<String>,
    pub mpn: Option<String>,
    pub gtin: Option<String>,
    pub combination_id: Option<CombinationId>,
    pub price: PriceResolution,
    pub stock: StockStatus,
    pub enabled_mapping_ids: BTreeSet<MappingId>,
    pub disabled_mapping_ids: BTreeSet<MappingId>,
    pub blocked_value_ids: BTreeSet<ValueId>,
    pub warnings: Vec<AttributeWarning>,
}

#[derive(Clone)]
pub struct ProductDetailAssembler {
    resolver: PriceResolver,
}

impl ProductDetailAssembler {
    pub fn new(collaborators: Collaborators, settings: CatalogSettings) -> Self {
        Self { resolver: PriceResolver::new(collaborators, settings) }
    }

    /// Without a posted form the page starts from the pre-selected values.
    pub async fn prepare(
        &self,
        product: &Product,
        form: Option<&AttributeForm>,
        context: &SelectionContext,
    ) -> Result<ProductDetailModel, CollaboratorError> {
        let selection = match form {
            Some(form) => codec::parse(&product.attribute_mappings, form),
            None => codec::preselected(product),
        };
        let variant = evaluate_variant(product, &selection, context, self.resolver.settings());
        let quantity = context.quantity.max(1);

        let (price, tier_prices) = try_join(
            self.resolver.resolve_display_price(product, &variant.selection, quantity, context),
            self.tier_table(product, context),
        )
        .await?;
        let attributes = self.attribute_models(product, &variant, context).await?;
        let (sku, mpn, gtin) = variant.identifiers(product);
        let combination_id = variant.combination.as_ref().map(|combination| combination.id.clone());

        debug!(
            event_name = "catalog.detail.prepared",
            product_id = %product.id.0,
            combination_id = ?combination_id.as_ref().map(|id| id.0.as_str()),
            availability = ?variant.stock.availability,
            warnings = variant.warnings.len(),
            "detail model prepared"
        );

        Ok(ProductDetailModel {
            product_id: product.id.clone(),
            name: product.name.clone(),
            product_type: product.product_type,
            sku,
            mpn,
            gtin,
            quantity,
            form: codec::format(&product.attribute_mappings, &variant.selection),
            selection: variant.selection,
            attributes,
            combination_id,
            price,
            tier_prices,
            stock: variant.stock,
            warnings: variant.warnings,
        })
    }

    /// `Ok(None)` when the catalog has no such product.
    pub async fn prepare_by_id(
        &self,
        id: &ProductId,
        form: Option<&AttributeForm>,
        context: &SelectionContext,
    ) -> Result<Option<ProductDetailModel>, CollaboratorError> {
        let Some(product) = self.resolver.collaborators().catalog.product_by_id(id).await? else {
            debug!(event_name = "catalog.detail.not_found", product_id = %id.0, "product not found");
            return Ok(None);
        };
        self.prepare(&product, form, context).await.map(Some)
    }

    pub async fn attribute_change(
        &self,
        product: &Product,
        form: &AttributeForm,
        context: &SelectionContext,
    ) -> Result<AttributeChangeModel, CollaboratorError> {
        let selection = codec::parse(&product.attribute_mappings, form);
        let variant = evaluate_variant(product, &selection, context, self.resolver.settings());
        let price =
            self.resolver.resolve_display_price(product, &variant.selection, context.quantity.max(1), context).await?;
        let (sku, mpn, gtin) = variant.identifiers(product);

        debug!(
            event_name = "catalog.detail.attribute_changed",
            product_id = %product.id.0,
            selected = variant.selection.len(),
            "attribute change recomputed"
        );

        Ok(AttributeChangeModel {
            product_id: product.id.clone(),
            sku,
            mpn,
            gtin,
            combination_id: variant.combination.map(|combination| combination.id),
            price,
            stock: variant.stock,
            enabled_mapping_ids: variant.conditions.enabled_mapping_ids,
            disabled_mapping_ids: variant.conditions.disabled_mapping_ids,
            blocked_value_ids: variant.conditions.blocked_value_ids,
            warnings: variant.warnings,
        })
    }

    async fn tier_table(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<Vec<TierPriceRow>, CollaboratorError> {
        let priced_by_tier = !product.call_for_price
            && !product.entered_price
            && !matches!(product.product_type, ProductType::Grouped | ProductType::Auction);
        if !priced_by_tier {
            return Ok(Vec::new());
        }
        self.resolver.tier_price_table(product, context).await
    }

    async fn attribute_models(
        &self,
        product: &Product,
        variant: &VariantEvaluation,
        context: &SelectionContext,
    ) -> Result<Vec<AttributeModel>, CollaboratorError> {
        let mut models = Vec::with_capacity(product.attribute_mappings.len());
        for mapping in &product.attribute_mappings {
            let mut values = Vec::with_capacity(mapping.values.len());
            for value in &mapping.values {
                values.push(AttributeValueModel {
                    id: value.id.clone(),
                    name: value.name.clone(),
                    color_rgb: value.color_rgb.clone(),
                    image_id: value.image_id.clone(),
                    price_adjustment: self.resolver.adjustment_label(product, value, context).await?,
                    is_pre_selected: value.is_pre_selected,
                    selected: variant.selection.contains(&mapping.id, &value.id.0),
                    blocked: variant.conditions.blocked_value_ids.contains(&value.id),
                });
            }
            let entered_value = if mapping.should_have_values() {
                None
            } else {
                variant.selection.values_for(&mapping.id).next().map(str::to_owned)
            };
            models.push(AttributeModel {
                id: mapping.id.clone(),
                name: mapping.name.clone(),
                control_type: mapping.control_type,
                is_required: mapping.is_required,
                enabled: !variant.conditions.disabled_mapping_ids.contains(&mapping.id),
                values,
                entered_value,
            });
        }
        Ok(models)
    }
}
