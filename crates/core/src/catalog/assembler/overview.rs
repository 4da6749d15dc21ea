use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::collaborators::Collaborators;
use crate::catalog::pricing::{PriceResolution, PriceResolver};
use crate::catalog::stock::{effective_warehouse, format_stock_message, StockStatus};
use crate::config::CatalogSettings;
use crate::domain::attribute::{AttributeControlType, MappingId, ValueId};
use crate::domain::context::SelectionContext;
use crate::domain::product::{ManageInventoryMethod, Product, ProductId, ProductType};
use crate::domain::selection::Selection;
use crate::errors::CollaboratorError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwatchValueModel {
    pub id: ValueId,
    pub name: String,
    pub color_rgb: Option<String>,
    pub image_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwatchModel {
    pub mapping_id: MappingId,
    pub name: String,
    pub control_type: AttributeControlType,
    pub values: Vec<SwatchValueModel>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOverviewModel {
    pub product_id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    pub sku: Option<String>,
    pub price: PriceResolution,
    /// Omitted for products stocked by attributes; listings carry no selection.
    pub stock: Option<StockStatus>,
    pub swatches: Vec<SwatchModel>,
}

/// Listing pages. Products are resolved concurrently, bounded by
/// `overview_concurrency`, and returned in input order.
#[derive(Clone)]
pub struct ProductOverviewAssembler {
    resolver: PriceResolver,
}

impl ProductOverviewAssembler {
    pub fn new(collaborators: Collaborators, settings: CatalogSettings) -> Self {
        Self { resolver: PriceResolver::new(collaborators, settings) }
    }

    pub async fn prepare(
        &self,
        products: &[Product],
        context: &SelectionContext,
    ) -> Result<Vec<ProductOverviewModel>, CollaboratorError> {
        let concurrency = self.resolver.settings().overview_concurrency.max(1);
        let models: Vec<ProductOverviewModel> = stream::iter(products.iter().map(|product| self.prepare_one(product, context)))
            .buffered(concurrency)
            .try_collect()
            .await?;
        debug!(event_name = "catalog.overview.prepared", products = models.len(), concurrency, "overview prepared");
        Ok(models)
    }

    /// Unknown ids are skipped.
    pub async fn prepare_by_ids(
        &self,
        ids: &[ProductId],
        context: &SelectionContext,
    ) -> Result<Vec<ProductOverviewModel>, CollaboratorError> {
        let products = self.resolver.collaborators().catalog.products_by_ids(ids).await?;
        self.prepare(&products, context).await
    }

    async fn prepare_one(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<ProductOverviewModel, CollaboratorError> {
        let tiered = product.product_type == ProductType::Simple
            && !self.resolver.applicable_tiers(product, context).is_empty();
        let price = if tiered {
            self.resolver.resolve_from_price(product, context).await?
        } else {
            self.resolver.resolve_display_price(product, &Selection::default(), 1, context).await?
        };

        let settings = self.resolver.settings();
        let stock = (product.manage_inventory != ManageInventoryMethod::ManageStockByAttributes).then(|| {
            let warehouse = effective_warehouse(context, settings);
            format_stock_message(product, warehouse.as_ref(), &Selection::default(), settings)
        });

        Ok(ProductOverviewModel {
            product_id: product.id.clone(),
            name: product.name.clone(),
            product_type: product.product_type,
            sku: product.sku.clone(),
            price,
            stock,
            swatches: swatches(product),
        })
    }
}

fn swatches(product: &Product) -> Vec<SwatchModel> {
    product
        .attribute_mappings
        .iter()
        .filter(|mapping| mapping.show_on_catalog_page && mapping.should_have_values())
        .map(|mapping| SwatchModel {
            mapping_id: mapping.id.clone(),
            name: mapping.name.clone(),
            control_type: mapping.control_type,
            values: mapping
                .values
                .iter()
                .map(|value| SwatchValueModel {
                    id: value.id.clone(),
                    name: value.name.clone(),
                    color_rgb: value.color_rgb.clone(),
                    image_id: value.image_id.clone(),
                })
                .collect(),
        })
        .collect()
}
