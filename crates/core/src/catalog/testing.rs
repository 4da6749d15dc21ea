//! Fixtures and in-process collaborator fakes shared by the catalog tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::catalog::collaborators::{
    CatalogReader, Collaborators, CurrencyService, DiscountQuote, DiscountRequest, DiscountService,
    PriceFormatter, TaxService, TaxedAmount,
};
use crate::domain::attribute::{
    AttributeCondition, AttributeControlType, ConditionRequirement, MappingId, ProductAttributeMapping,
    ProductAttributeValue, ValueId,
};
use crate::domain::combination::{CombinationId, ProductAttributeCombination};
use crate::domain::context::{Currency, LanguageId, SelectionContext, Store, StoreId};
use crate::domain::customer::{Customer, CustomerGroupId, CustomerId};
use crate::domain::product::{ManageInventoryMethod, Product, ProductId};
use crate::domain::selection::CustomAttribute;
use crate::errors::CollaboratorError;

pub fn value(id: &str, name: &str) -> ProductAttributeValue {
    ProductAttributeValue { id: ValueId(id.to_owned()), name: name.to_owned(), ..ProductAttributeValue::default() }
}

pub fn mapping(
    id: &str,
    name: &str,
    control_type: AttributeControlType,
    values: Vec<ProductAttributeValue>,
) -> ProductAttributeMapping {
    ProductAttributeMapping {
        id: MappingId(id.to_owned()),
        attribute_id: format!("attr-{id}"),
        name: name.to_owned(),
        control_type,
        values,
        ..ProductAttributeMapping::default()
    }
}

pub fn with_condition(mut mapping: ProductAttributeMapping, requirements: &[(&str, &str)]) -> ProductAttributeMapping {
    mapping.condition = Some(AttributeCondition {
        requirements: requirements
            .iter()
            .map(|(mapping_id, value_id)| ConditionRequirement {
                mapping_id: MappingId((*mapping_id).to_owned()),
                value_id: ValueId((*value_id).to_owned()),
            })
            .collect(),
    });
    mapping
}

pub fn combination(id: &str, pairs: &[(&str, &str)], stock: i32, reserved: i32) -> ProductAttributeCombination {
    ProductAttributeCombination {
        id: CombinationId(id.to_owned()),
        attributes: pairs.iter().map(|(key, value)| CustomAttribute::new(*key, *value)).collect(),
        stock_quantity: stock,
        reserved_quantity: reserved,
        ..ProductAttributeCombination::default()
    }
}

/// Color (red/blue) by Size (s/m), stocked by attributes with a single
/// {red, s} combination holding 5 units, 2 of them reserved.
pub fn color_size_product() -> Product {
    Product {
        id: ProductId("tee".to_owned()),
        name: "Classic Tee".to_owned(),
        sku: Some("TEE".to_owned()),
        published: true,
        price: Decimal::new(2000, 2),
        manage_inventory: ManageInventoryMethod::ManageStockByAttributes,
        stock_quantity: 9,
        reserved_quantity: 1,
        display_stock_availability: true,
        attribute_mappings: vec![
            mapping("color", "Color", AttributeControlType::DropdownList, vec![value("red", "Red"), value("blue", "Blue")]),
            mapping("size", "Size", AttributeControlType::DropdownList, vec![value("s", "S"), value("m", "M")]),
        ],
        attribute_combinations: vec![combination("red-s", &[("color", "red"), ("size", "s")], 5, 2)],
        ..Product::default()
    }
}

pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap_or_else(Utc::now)
}

pub fn context_fixture() -> SelectionContext {
    SelectionContext::new(
        Customer {
            id: CustomerId("c-1".to_owned()),
            groups: vec![CustomerGroupId("registered".to_owned())],
        },
        Store { id: StoreId("store-main".to_owned()), default_warehouse_id: None },
        Currency { code: "USD".to_owned(), symbol: "$".to_owned() },
        as_of(),
    )
}

pub fn simple_product(id: &str, price: Decimal) -> Product {
    Product {
        id: ProductId(id.to_owned()),
        name: id.to_owned(),
        published: true,
        price,
        ..Product::default()
    }
}

/// Adds `rate` percent when prices include tax, otherwise passes through.
pub struct PercentTax {
    pub rate: Decimal,
}

impl PercentTax {
    fn apply(&self, amount: Decimal, include_tax: bool) -> TaxedAmount {
        let amount = if include_tax { amount + amount * self.rate / Decimal::ONE_HUNDRED } else { amount };
        TaxedAmount { amount, tax_rate: self.rate }
    }
}

#[async_trait]
impl TaxService for PercentTax {
    async fn product_price(
        &self,
        _product: &Product,
        amount: Decimal,
        include_tax: bool,
        _customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError> {
        Ok(self.apply(amount, include_tax))
    }

    async fn checkout_amount(
        &self,
        amount: Decimal,
        include_tax: bool,
        _customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError> {
        Ok(self.apply(amount, include_tax))
    }
}

pub struct FailingTax;

#[async_trait]
impl TaxService for FailingTax {
    async fn product_price(
        &self,
        _product: &Product,
        _amount: Decimal,
        _include_tax: bool,
        _customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError> {
        Err(CollaboratorError::Tax("rate table offline".to_owned()))
    }

    async fn checkout_amount(
        &self,
        _amount: Decimal,
        _include_tax: bool,
        _customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError> {
        Err(CollaboratorError::Tax("rate table offline".to_owned()))
    }
}

/// Multiplies by a fixed rate regardless of the target currency.
pub struct FixedRateCurrency {
    pub rate: Decimal,
}

#[async_trait]
impl CurrencyService for FixedRateCurrency {
    async fn convert_from_primary_store_currency(
        &self,
        amount: Decimal,
        _target: &Currency,
    ) -> Result<Decimal, CollaboratorError> {
        Ok(amount * self.rate)
    }
}

/// Takes `percent_off` from the base price when discounts are requested.
pub struct PercentDiscount {
    pub percent_off: Decimal,
}

#[async_trait]
impl DiscountService for PercentDiscount {
    async fn final_price(&self, request: DiscountRequest<'_>) -> Result<DiscountQuote, CollaboratorError> {
        if !request.include_discounts || self.percent_off.is_zero() {
            return Ok(DiscountQuote::undiscounted(request.base_price));
        }
        let amount = request.base_price * self.percent_off / Decimal::ONE_HUNDRED;
        Ok(DiscountQuote {
            final_price: request.base_price - amount,
            applied_discounts: vec![crate::catalog::collaborators::AppliedDiscount {
                discount_id: "spring".to_owned(),
                name: "Spring sale".to_owned(),
                amount,
            }],
            preferred_tier_price: None,
        })
    }
}

pub struct PlainFormatter;

impl PriceFormatter for PlainFormatter {
    fn format_price(
        &self,
        amount: Decimal,
        currency: &Currency,
        _language: &LanguageId,
        _price_includes_tax: bool,
    ) -> Result<String, CollaboratorError> {
        Ok(format!("{}{:.2}", currency.symbol, amount))
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    products: HashMap<ProductId, Product>,
}

impl FakeCatalog {
    pub fn with(products: Vec<Product>) -> Self {
        Self { products: products.into_iter().map(|product| (product.id.clone(), product)).collect() }
    }
}

#[async_trait]
impl CatalogReader for FakeCatalog {
    async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, CollaboratorError> {
        Ok(self.products.get(id).cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CollaboratorError> {
        Ok(ids.iter().filter_map(|id| self.products.get(id).cloned()).collect())
    }

    async fn associated_products(&self, grouped_id: &ProductId) -> Result<Vec<Product>, CollaboratorError> {
        let mut associated: Vec<Product> = self
            .products
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

/// Zero tax, identity conversion, no discounts.
pub fn neutral_collaborators(products: Vec<Product>) -> Collaborators {
    Collaborators {
        catalog: Arc::new(FakeCatalog::with(products)),
        tax: Arc::new(PercentTax { rate: Decimal::ZERO }),
        currency: Arc::new(FixedRateCurrency { rate: Decimal::ONE }),
        discounts: Arc::new(PercentDiscount { percent_off: Decimal::ZERO }),
        formatter: Arc::new(PlainFormatter),
    }
}
