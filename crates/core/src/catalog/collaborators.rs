//! Contracts of the services the engine depends on but does not implement:
//! catalog reads, tax, currency conversion, discount resolution and price
//! formatting.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::context::{Currency, LanguageId, StoreId};
use crate::domain::customer::Customer;
use crate::domain::product::{Product, ProductId};
use crate::domain::tier_price::TierPrice;
use crate::errors::CollaboratorError;

#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, CollaboratorError>;

    /// Preserves the order of `ids`; unknown ids are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CollaboratorError>;

    async fn associated_products(&self, grouped_id: &ProductId) -> Result<Vec<Product>, CollaboratorError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxedAmount {
    pub amount: Decimal,
    pub tax_rate: Decimal,
}

#[async_trait]
pub trait TaxService: Send + Sync {
    async fn product_price(
        &self,
        product: &Product,
        amount: Decimal,
        include_tax: bool,
        customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError>;

    /// Same contract for amounts not tied to a product (checkout attributes, shipping).
    async fn checkout_amount(
        &self,
        amount: Decimal,
        include_tax: bool,
        customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError>;
}

#[async_trait]
pub trait CurrencyService: Send + Sync {
    async fn convert_from_primary_store_currency(
        &self,
        amount: Decimal,
        target: &Currency,
    ) -> Result<Decimal, CollaboratorError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub discount_id: String,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug)]
pub struct DiscountRequest<'a> {
    pub product: &'a Product,
    pub customer: &'a Customer,
    pub store_id: &'a StoreId,
    pub currency: &'a Currency,
    pub quantity: u32,
    pub include_discounts: bool,
    /// Product price, or the matched combination's overridden price.
    pub base_price: Decimal,
    pub as_of: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountQuote {
    pub final_price: Decimal,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub preferred_tier_price: Option<TierPrice>,
}

impl DiscountQuote {
    pub fn undiscounted(price: Decimal) -> Self {
        Self { final_price: price, applied_discounts: Vec::new(), preferred_tier_price: None }
    }
}

#[async_trait]
pub trait DiscountService: Send + Sync {
    async fn final_price(&self, request: DiscountRequest<'_>) -> Result<DiscountQuote, CollaboratorError>;
}

pub trait PriceFormatter: Send + Sync {
    fn format_price(
        &self,
        amount: Decimal,
        currency: &Currency,
        language: &LanguageId,
        price_includes_tax: bool,
    ) -> Result<String, CollaboratorError>;
}

/// The injected services, shared by every resolver and assembler clone.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn CatalogReader>,
    pub tax: Arc<dyn TaxService>,
    pub currency: Arc<dyn CurrencyService>,
    pub discounts: Arc<dyn DiscountService>,
    pub formatter: Arc<dyn PriceFormatter>,
}
