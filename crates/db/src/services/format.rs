use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use storefront_core::catalog::collaborators::PriceFormatter;
use storefront_core::domain::context::{Currency, LanguageId};
use storefront_core::errors::CollaboratorError;

/// `$12.50` style formatting with per-currency decimal places (two unless
/// configured). Prices shown excluding tax get an `excl. tax` suffix.
#[derive(Clone, Debug, Default)]
pub struct SymbolPriceFormatter {
    decimal_places: HashMap<String, u32>,
}

impl SymbolPriceFormatter {
    pub fn with_decimal_places(mut self, code: impl Into<String>, places: u32) -> Self {
        self.decimal_places.insert(code.into().to_ascii_uppercase(), places);
        self
    }
}

impl PriceFormatter for SymbolPriceFormatter {
    fn format_price(
        &self,
        amount: Decimal,
        currency: &Currency,
        _language: &LanguageId,
        price_includes_tax: bool,
    ) -> Result<String, CollaboratorError> {
        if currency.symbol.is_empty() && currency.code.is_empty() {
            return Err(CollaboratorError::Formatting("currency has neither symbol nor code".to_string()));
        }
        let places = self.decimal_places.get(&currency.code.to_ascii_uppercase()).copied().unwrap_or(2);
        let mut rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(places);
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        let symbol = if currency.symbol.is_empty() { &currency.code } else { &currency.symbol };
        let suffix = if price_includes_tax { "" } else { " excl. tax" };
        Ok(format!("{sign}{symbol}{}{suffix}", rounded.abs()))
    }
}
