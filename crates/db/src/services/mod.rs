//! In-memory implementations of the tax, currency, discount and formatting
//! collaborators. Tables are fixed at construction, so every call is a pure
//! read.

pub mod currency;
pub mod discount;
pub mod format;
pub mod tax;

pub use currency::TableCurrencyService;
pub use discount::{DiscountRule, TableDiscountService};
pub use format::SymbolPriceFormatter;
pub use tax::TableTaxService;

use rust_decimal::{Decimal, RoundingStrategy};

pub(crate) fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
