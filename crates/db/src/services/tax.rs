use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use storefront_core::catalog::collaborators::{TaxService, TaxedAmount};
use storefront_core::domain::customer::{Customer, CustomerGroupId};
use storefront_core::domain::product::Product;
use storefront_core::errors::CollaboratorError;

use super::round_money;

/// Percentage rates keyed by tax category. Catalog prices are stored
/// excluding tax; members of an exempt group never pay tax.
#[derive(Clone, Debug, Default)]
pub struct TableTaxService {
    default_rate: Decimal,
    category_rates: HashMap<String, Decimal>,
    exempt_groups: Vec<CustomerGroupId>,
}

impl TableTaxService {
    pub fn new(default_rate: Decimal) -> Self {
        Self { default_rate, ..Self::default() }
    }

    pub fn with_category(mut self, category_id: impl Into<String>, rate: Decimal) -> Self {
        self.category_rates.insert(category_id.into(), rate);
        self
    }

    pub fn with_exempt_group(mut self, group: CustomerGroupId) -> Self {
        self.exempt_groups.push(group);
        self
    }

    fn rate_for(&self, category_id: Option<&str>, customer: &Customer) -> Result<Decimal, CollaboratorError> {
        if self.exempt_groups.iter().any(|group| customer.is_in_group(group)) {
            return Ok(Decimal::ZERO);
        }
        let rate = match category_id {
            Some(category) => self
                .category_rates
                .get(category)
                .copied()
                .ok_or_else(|| CollaboratorError::Tax(format!("no tax rate for category `{category}`")))?,
            None => self.default_rate,
        };
        Ok(rate)
    }

    fn apply(amount: Decimal, rate: Decimal, include_tax: bool) -> TaxedAmount {
        let amount = if include_tax { round_money(amount + amount * rate / Decimal::ONE_HUNDRED) } else { amount };
        TaxedAmount { amount, tax_rate: rate }
    }
}

#[async_trait]
impl TaxService for TableTaxService {
    async fn product_price(
        &self,
        product: &Product,
        amount: Decimal,
        include_tax: bool,
        customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError> {
        let rate = self.rate_for(product.tax_category_id.as_deref(), customer)?;
        Ok(Self::apply(amount, rate, include_tax))
    }

    async fn checkout_amount(
        &self,
        amount: Decimal,
        include_tax: bool,
        customer: &Customer,
    ) -> Result<TaxedAmount, CollaboratorError> {
        let rate = self.rate_for(None, customer)?;
        Ok(Self::apply(amount, rate, include_tax))
    }
}
