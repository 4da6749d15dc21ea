use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use storefront_core::catalog::collaborators::CatalogReader;
use storefront_core::domain::product::{Product, ProductId};
use storefront_core::errors::CollaboratorError;

use super::{ProductRepository, RepositoryError};

/// Catalog store held in memory. Associated products are found through
/// their `parent_grouped_product_id`.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryCatalogRepository {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(
                products.into_iter().map(|product| (product.id.0.clone(), product)).collect(),
            ),
        }
    }

    /// Loads a JSON array of products, e.g. an export of the catalog store.
    pub fn from_json(raw: &str) -> Result<Self, RepositoryError> {
        let products: Vec<Product> =
            serde_json::from_str(raw).map_err(|error| RepositoryError::Decode(error.to_string()))?;
        for product in &products {
            if product.id.0.trim().is_empty() {
                return Err(RepositoryError::InvalidProduct {
                    product_id: product.id.0.clone(),
                    reason: "product id must not be empty".to_string(),
                });
            }
        }
        info!(event_name = "catalog.repository.loaded", products = products.len(), "catalog loaded from JSON");
        Ok(Self::with_products(products))
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    /// All products ordered by display order, then id.
    pub async fn list(&self) -> Vec<Product> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products.values().cloned().collect();
        listed.sort_by(|left, right| {
            left.display_order.cmp(&right.display_order).then_with(|| left.id.cmp(&right.id))
        });
        listed
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryCatalogRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let replaced = products.insert(product.id.0.clone(), product.clone()).is_some();
        debug!(event_name = "catalog.repository.saved", product_id = %product.id.0, replaced, "product saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogReader for InMemoryCatalogRepository {
    async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, CollaboratorError> {
        Ok(self.find_by_id(id).await?)
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CollaboratorError> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(&id.0).cloned()).collect())
    }

    async fn associated_products(&self, grouped_id: &ProductId) -> Result<Vec<Product>, CollaboratorError> {
        let products = self.products.read().await;
        let mut associated: Vec<Product> = products
            .values()
            .filter(|product| product.parent_grouped_product_id.as_ref() == Some(grouped_id))
            .cloned()
            .collect();
        associated.sort_by(|left, right| {
            left.display_order.cmp(&right.display_order).then_with(|| left.id.cmp(&right.id))
        });
        Ok(associated)
    }
}
