use chrono::{DateTime, Utc};

use crate::domain::context::StoreId;
use crate::domain::customer::Customer;
use crate::domain::tier_price::TierPrice;

/// Filters by store, currency, customer group and validity window, sorts by
/// quantity and keeps the first entry for each quantity. Unscoped fields and
/// open date bounds always pass. Among equal quantities the earlier entry in
/// the input wins, regardless of price.
pub fn select_applicable(
    tier_prices: &[TierPrice],
    store_id: &StoreId,
    currency_code: &str,
    customer: &Customer,
    as_of: DateTime<Utc>,
) -> Vec<TierPrice> {
    let mut applicable: Vec<TierPrice> = tier_prices
        .iter()
        .filter(|tier| tier.store_id.as_ref().map_or(true, |id| id == store_id))
        .filter(|tier| tier.currency_code.as_deref().map_or(true, |code| code.eq_ignore_ascii_case(currency_code)))
        .filter(|tier| tier.customer_group_id.as_ref().map_or(true, |group| customer.is_in_group(group)))
        .filter(|tier| tier.start_date.map_or(true, |start| start <= as_of))
        .filter(|tier| tier.end_date.map_or(true, |end| as_of <= end))
        .cloned()
        .collect();

    // stable: equal quantities keep their input order
    applicable.sort_by_key(|tier| tier.quantity);
    applicable.dedup_by_key(|tier| tier.quantity);
    applicable
}

/// Greatest threshold not above `quantity`; expects [`select_applicable`] output.
pub fn tier_for_quantity(tiers: &[TierPrice], quantity: u32) -> Option<&TierPrice> {
    tiers.iter().rev().find(|tier| tier.quantity <= quantity)
}
