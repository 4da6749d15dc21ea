use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::warn;

use storefront_core::catalog::collaborators::CurrencyService;
use storefront_core::domain::context::Currency;
use storefront_core::errors::CollaboratorError;

use super::round_money;

/// Exchange rates relative to the primary store currency.
#[derive(Clone, Debug)]
pub struct TableCurrencyService {
    primary_code: String,
    rates: HashMap<String, Decimal>,
}

impl TableCurrencyService {
    pub fn new(primary_code: impl Into<String>) -> Self {
        let primary_code = primary_code.into();
        let rates = HashMap::from([(primary_code.to_ascii_uppercase(), Decimal::ONE)]);
        Self { primary_code, rates }
    }

    pub fn with_rate(mut self, code: impl Into<String>, rate: Decimal) -> Self {
        self.rates.insert(code.into().to_ascii_uppercase(), rate);
        self
    }

    pub fn primary_code(&self) -> &str {
        &self.primary_code
    }
}

#[async_trait]
impl CurrencyService for TableCurrencyService {
    async fn convert_from_primary_store_currency(
        &self,
        amount: Decimal,
        target: &Currency,
    ) -> Result<Decimal, CollaboratorError> {
        let rate = self.rates.get(&target.code.to_ascii_uppercase()).copied().ok_or_else(|| {
            warn!(event_name = "catalog.currency.missing_rate", currency = %target.code, "no exchange rate");
            CollaboratorError::Currency(format!("no exchange rate from {} to {}", self.primary_code, target.code))
        })?;
        Ok(round_money(amount * rate))
    }
}
