use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use storefront_core::catalog::collaborators::{AppliedDiscount, DiscountQuote, DiscountRequest, DiscountService};
use storefront_core::domain::context::StoreId;
use storefront_core::domain::customer::CustomerGroupId;
use storefront_core::domain::product::ProductId;
use storefront_core::errors::CollaboratorError;

use super::round_money;

/// A percentage-off rule. Empty `product_ids` applies to every product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRule {
    pub id: String,
    pub name: String,
    pub percentage: Decimal,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub customer_group_id: Option<CustomerGroupId>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub minimum_quantity: u32,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl DiscountRule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            percentage,
            product_ids: Vec::new(),
            customer_group_id: None,
            store_id: None,
            minimum_quantity: 0,
            start_date: None,
            end_date: None,
        }
    }

    fn applies_to(&self, request: &DiscountRequest<'_>) -> bool {
        (self.product_ids.is_empty() || self.product_ids.contains(&request.product.id))
            && self.customer_group_id.as_ref().map_or(true, |group| request.customer.is_in_group(group))
            && self.store_id.as_ref().map_or(true, |store| store == request.store_id)
            && request.quantity >= self.minimum_quantity
            && self.start_date.map_or(true, |start| start <= request.as_of)
            && self.end_date.map_or(true, |end| request.as_of <= end)
    }
}

/// Applies the single rule with the largest saving. Tier prices are left to
/// the resolver, so quotes never carry a preferred tier.
#[derive(Clone, Debug, Default)]
pub struct TableDiscountService {
    rules: Vec<DiscountRule>,
}

impl TableDiscountService {
    pub fn new(rules: Vec<DiscountRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DiscountRule] {
        &self.rules
    }
}

#[async_trait]
impl DiscountService for TableDiscountService {
    async fn final_price(&self, request: DiscountRequest<'_>) -> Result<DiscountQuote, CollaboratorError> {
        if !request.include_discounts {
            return Ok(DiscountQuote::undiscounted(request.base_price));
        }
        for rule in &self.rules {
            if rule.percentage.is_sign_negative() || rule.percentage > Decimal::ONE_HUNDRED {
                warn!(event_name = "catalog.discount.invalid_rule", rule_id = %rule.id, "discount rule rejected");
                return Err(CollaboratorError::Discount(format!(
                    "rule `{}` has out-of-range percentage {}",
                    rule.id, rule.percentage
                )));
            }
        }

        let best = self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(&request))
            .map(|rule| (rule, round_money(request.base_price * rule.percentage / Decimal::ONE_HUNDRED)))
            .fold(None::<(&DiscountRule, Decimal)>, |best, candidate| match best {
                Some((_, amount)) if amount >= candidate.1 => best,
                _ => Some(candidate),
            });

        Ok(match best {
            Some((rule, amount)) if !amount.is_zero() => DiscountQuote {
                final_price: request.base_price - amount,
                applied_discounts: vec![AppliedDiscount {
                    discount_id: rule.id.clone(),
                    name: rule.name.clone(),
                    amount,
                }],
                preferred_tier_price: None,
            },
            _ => DiscountQuote::undiscounted(request.base_price),
        })
    }
}
