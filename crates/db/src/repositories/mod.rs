use async_trait::async_trait;
use thiserror::Error;

use storefront_core::domain::product::{Product, ProductId};
use storefront_core::errors::CollaboratorError;

pub mod memory;

pub use memory::InMemoryCatalogRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid product `{product_id}`: {reason}")]
    InvalidProduct { product_id: String, reason: String },
}

impl From<RepositoryError> for CollaboratorError {
    fn from(error: RepositoryError) -> Self {
        CollaboratorError::Catalog(error.to_string())
    }
}

/// Write side of the catalog store. Reads go through
/// [`storefront_core::catalog::collaborators::CatalogReader`].
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}
