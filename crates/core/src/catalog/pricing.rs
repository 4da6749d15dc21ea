use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::collaborators::{AppliedDiscount, Collaborators, DiscountRequest};
use crate::catalog::combination::find_combination;
use crate::catalog::resources::{self, ResourceMessage};
use crate::catalog::tier_price::{select_applicable, tier_for_quantity};
use crate::config::CatalogSettings;
use crate::domain::attribute::ProductAttributeValue;
use crate::domain::context::{ReservationRange, SelectionContext};
use crate::domain::product::{IntervalUnit, Product, ProductId, ProductType, ReservationDetails};
use crate::domain::selection::Selection;
use crate::domain::tier_price::TierPrice;
use crate::errors::CollaboratorError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceState {
    Priced,
    /// Numeric price suppressed; show the call-for-price message instead.
    CallForPrice,
    EnteredPrice,
    Auction,
    /// Grouped product with no published, available associated product, or
    /// a reservation total outside the decimal range.
    Unavailable,
}

/// Unformatted amount in the working currency plus its display string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPrice {
    pub amount: Decimal,
    pub formatted: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnteredPriceRange {
    pub minimum: DisplayPrice,
    pub maximum: DisplayPrice,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionPrice {
    pub start_price: DisplayPrice,
    pub highest_bid: Option<DisplayPrice>,
    pub end_date: Option<DateTime<Utc>>,
    pub ended: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePriceDisplay {
    pub price: DisplayPrice,
    pub message: ResourceMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub product_id: ProductId,
    pub currency: String,
    pub steps: Vec<PricingTraceStep>,
}

impl PricingTrace {
    fn new(product_id: &ProductId, context: &SelectionContext) -> Self {
        Self { product_id: product_id.clone(), currency: context.currency.code.clone(), steps: Vec::new() }
    }

    fn record(&mut self, stage: &str, detail: impl Into<String>, amount: Decimal) {
        self.steps.push(PricingTraceStep { stage: stage.to_owned(), detail: detail.into(), amount });
    }

    pub fn stages(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.stage.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResolution {
    pub product_id: ProductId,
    pub state: PriceState,
    pub price: Option<DisplayPrice>,
    pub old_price: Option<DisplayPrice>,
    pub catalog_price: Option<DisplayPrice>,
    /// Set for grouped products and overview "from" prices.
    pub from_price: bool,
    pub message: Option<ResourceMessage>,
    pub base_price_per_unit: Option<BasePriceDisplay>,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub tier_used: Option<TierPrice>,
    pub currency_code: String,
    pub entered_price: Option<EnteredPriceRange>,
    pub auction: Option<AuctionPrice>,
    pub reservation_intervals: Option<u32>,
    pub trace: PricingTrace,
}

impl PriceResolution {
    fn empty(product: &Product, state: PriceState, context: &SelectionContext) -> Self {
        Self {
            product_id: product.id.clone(),
            state,
            price: None,
            old_price: None,
            catalog_price: None,
            from_price: false,
            message: None,
            base_price_per_unit: None,
            applied_discounts: Vec::new(),
            tier_used: None,
            currency_code: context.currency.code.clone(),
            entered_price: None,
            auction: None,
            reservation_intervals: None,
            trace: PricingTrace::new(&product.id, context),
        }
    }

    fn mark_from(&mut self) {
        self.from_price = true;
        self.message = self
            .price
            .as_ref()
            .map(|price| ResourceMessage::with_args(resources::PRICE_RANGE_FROM, [price.formatted.clone()]));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPriceRow {
    pub quantity: u32,
    pub price: DisplayPrice,
}

/// Percentages are taken of `base`; adjustments never compound across values.
pub fn value_adjustment(value: &ProductAttributeValue, base: Decimal) -> Decimal {
    if value.price_adjustment_use_percentage {
        base.saturating_mul(value.price_adjustment) / Decimal::ONE_HUNDRED
    } else {
        value.price_adjustment
    }
}

/// Sum of adjustments over the selected values of enumerated mappings.
/// Unknown mappings and values contribute nothing. Saturates at the
/// `Decimal` bounds.
pub fn attribute_adjustments(product: &Product, selection: &Selection, base: Decimal) -> Decimal {
    selection
        .entries()
        .iter()
        .filter_map(|entry| {
            let mapping = product.mapping(&entry.key).filter(|mapping| mapping.should_have_values())?;
            mapping.value(&entry.value)
        })
        .map(|value| value_adjustment(value, base))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Number of started intervals in `range`. Day intervals count the end date
/// too when the product includes both dates.
pub fn reservation_intervals(details: &ReservationDetails, range: &ReservationRange) -> u32 {
    let unit_minutes: i64 = match details.interval_unit {
        IntervalUnit::Minute => 1,
        IntervalUnit::Hour => 60,
        IntervalUnit::Day => 1_440,
    };
    let interval_minutes = unit_minutes * i64::from(details.interval.max(1));
    let mut minutes = (range.end - range.start).num_minutes();
    if details.include_both_dates && details.interval_unit == IntervalUnit::Day {
        minutes += 1_440;
    }
    let intervals = (minutes + interval_minutes - 1).div_euclid(interval_minutes).max(1);
    u32::try_from(intervals).unwrap_or(u32::MAX)
}

/// Final displayed price: discount and tier, value adjustments, tax,
/// currency conversion and formatting, strictly in that order.
#[derive(Clone)]
pub struct PriceResolver {
    collaborators: Collaborators,
    settings: CatalogSettings,
}

impl PriceResolver {
    pub fn new(collaborators: Collaborators, settings: CatalogSettings) -> Self {
        Self { collaborators, settings }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub async fn resolve_display_price(
        &self,
        product: &Product,
        selection: &Selection,
        quantity: u32,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        let resolution = match product.product_type {
            ProductType::Grouped => self.resolve_grouped(product, context).await?,
            _ => self.resolve_single(product, selection, quantity, context).await?,
        };
        debug!(
            event_name = "catalog.price.resolved",
            product_id = %product.id.0,
            state = ?resolution.state,
            price = ?resolution.price.as_ref().map(|price| price.amount),
            quantity,
            "display price resolved"
        );
        Ok(resolution)
    }

    /// Lowest reachable price for listings: empty selection at the largest
    /// quantity so the deepest tier applies.
    pub async fn resolve_from_price(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        let mut resolution = self.resolve_display_price(product, &Selection::default(), u32::MAX, context).await?;
        if resolution.state == PriceState::Priced {
            resolution.mark_from();
        }
        Ok(resolution)
    }

    pub fn applicable_tiers(&self, product: &Product, context: &SelectionContext) -> Vec<TierPrice> {
        if self.settings.ignore_tier_prices {
            return Vec::new();
        }
        select_applicable(&product.tier_prices, &context.store.id, &context.currency.code, &context.customer, context.as_of)
    }

    pub async fn tier_price_table(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<Vec<TierPriceRow>, CollaboratorError> {
        let tiers = self.applicable_tiers(product, context);
        let mut rows = Vec::with_capacity(tiers.len());
        for tier in &tiers {
            let price = if self.settings.display_tier_prices_with_discounts {
                match self.resolve_priced(product, &Selection::default(), tier.quantity, context).await?.price {
                    Some(price) => price,
                    None => continue,
                }
            } else {
                self.to_display(product, tier.price, context).await?
            };
            rows.push(TierPriceRow { quantity: tier.quantity, price });
        }
        Ok(rows)
    }

    /// `+2.50` style label for fixed adjustments (taxed, converted and
    /// formatted), `+10%` for percentages, `None` when there is nothing to add.
    pub async fn adjustment_label(
        &self,
        product: &Product,
        value: &ProductAttributeValue,
        context: &SelectionContext,
    ) -> Result<Option<String>, CollaboratorError> {
        if value.price_adjustment.is_zero() {
            return Ok(None);
        }
        let sign = if value.price_adjustment.is_sign_negative() { "-" } else { "+" };
        if value.price_adjustment_use_percentage {
            return Ok(Some(format!("{sign}{}%", value.price_adjustment.abs().normalize())));
        }
        let display = self.to_display(product, value.price_adjustment.abs(), context).await?;
        Ok(Some(format!("{sign}{}", display.formatted)))
    }

    async fn resolve_single(
        &self,
        product: &Product,
        selection: &Selection,
        quantity: u32,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        if product.call_for_price {
            let mut resolution = PriceResolution::empty(product, PriceState::CallForPrice, context);
            resolution.message = Some(ResourceMessage::new(resources::CALL_FOR_PRICE));
            return Ok(resolution);
        }
        if product.entered_price {
            return self.resolve_entered(product, context).await;
        }
        if product.product_type == ProductType::Auction {
            return self.resolve_auction(product, context).await;
        }
        self.resolve_priced(product, selection, quantity, context).await
    }

    async fn resolve_priced(
        &self,
        product: &Product,
        selection: &Selection,
        quantity: u32,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        let mut resolution = PriceResolution::empty(product, PriceState::Priced, context);
        let trace = &mut resolution.trace;

        let overridden = find_combination(product, selection).and_then(|combination| combination.overridden_price);
        let base = overridden.unwrap_or(product.price);
        trace.record("base", if overridden.is_some() { "combination overridden price" } else { "product price" }, base);

        let quote = self
            .collaborators
            .discounts
            .final_price(DiscountRequest {
                product,
                customer: &context.customer,
                store_id: &context.store.id,
                currency: &context.currency,
                quantity,
                include_discounts: !self.settings.ignore_discounts,
                base_price: base,
                as_of: context.as_of,
            })
            .await?;
        trace.record("discount", format!("{} discount(s) applied", quote.applied_discounts.len()), quote.final_price);

        let tiers = self.applicable_tiers(product, context);
        let final_price = match tier_for_quantity(&tiers, quantity) {
            Some(tier) if tier.price < quote.final_price => {
                trace.record("tier", format!("tier {} from quantity {}", tier.id, tier.quantity), tier.price);
                resolution.tier_used = Some(tier.clone());
                tier.price
            }
            _ => {
                resolution.applied_discounts = quote.applied_discounts;
                resolution.tier_used = quote.preferred_tier_price;
                quote.final_price
            }
        };

        let adjustments = match overridden {
            Some(_) => Decimal::ZERO,
            None => attribute_adjustments(product, selection, product.price),
        };
        trace.record("adjustments", "selected value adjustments", adjustments);

        let mut price = final_price.saturating_add(adjustments).max(Decimal::ZERO);
        if let (Some(details), Some(range)) = (product.reservation.as_ref(), context.reservation.as_ref()) {
            let intervals = reservation_intervals(details, range);
            let Some(total) = price.checked_mul(Decimal::from(intervals)) else {
                warn!(
                    event_name = "catalog.price.reservation_overflow",
                    product_id = %product.id.0,
                    intervals,
                    "reservation total exceeds the decimal range"
                );
                return Ok(PriceResolution::empty(product, PriceState::Unavailable, context));
            };
            price = total;
            trace.record("reservation", format!("{intervals} interval(s)"), price);
            resolution.reservation_intervals = Some(intervals);
        }

        let taxed = self
            .collaborators
            .tax
            .product_price(product, price, context.price_includes_tax(), &context.customer)
            .await?;
        trace.record("tax", format!("rate {}%", taxed.tax_rate.normalize()), taxed.amount);
        let converted =
            self.collaborators.currency.convert_from_primary_store_currency(taxed.amount, &context.currency).await?;
        trace.record("currency", format!("to {}", context.currency.code), converted);
        let display = self.display(converted, context)?;

        if product.old_price > Decimal::ZERO {
            let old = self.to_display(product, product.old_price, context).await?;
            resolution.old_price = (old.amount != display.amount).then_some(old);
        }
        if product.catalog_price > Decimal::ZERO {
            resolution.catalog_price = Some(self.to_display(product, product.catalog_price, context).await?);
        }
        resolution.base_price_per_unit = self.base_price_per_unit(product, display.amount, context)?;
        resolution.price = Some(display);
        Ok(resolution)
    }

    async fn resolve_grouped(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        let associated = self.collaborators.catalog.associated_products(&product.id).await?;
        let mut considered = 0_usize;
        let mut cheapest: Option<(Decimal, PriceResolution)> = None;

        for candidate in associated
            .iter()
            .filter(|candidate| candidate.published && candidate.is_available_at(context.as_of))
            .filter(|candidate| !candidate.call_for_price)
        {
            let resolution = self.resolve_single(candidate, &Selection::default(), u32::MAX, context).await?;
            let Some(amount) = resolution.price.as_ref().map(|price| price.amount) else {
                continue;
            };
            if resolution.state != PriceState::Priced {
                continue;
            }
            considered += 1;
            if cheapest.as_ref().map_or(true, |(best, _)| amount < *best) {
                cheapest = Some((amount, resolution));
            }
        }

        let Some((amount, mut resolution)) = cheapest else {
            debug!(
                event_name = "catalog.price.grouped_unavailable",
                product_id = %product.id.0,
                "grouped product has no priceable associated products"
            );
            return Ok(PriceResolution::empty(product, PriceState::Unavailable, context));
        };

        resolution.trace.record(
            "grouped",
            format!("minimum of {considered} associated product(s), {}", resolution.product_id.0),
            amount,
        );
        resolution.product_id = product.id.clone();
        resolution.trace.product_id = product.id.clone();
        resolution.old_price = None;
        resolution.catalog_price = None;
        resolution.mark_from();
        Ok(resolution)
    }

    async fn resolve_entered(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        let currency = &self.collaborators.currency;
        let minimum = currency.convert_from_primary_store_currency(product.min_entered_price, &context.currency).await?;
        let maximum = currency.convert_from_primary_store_currency(product.max_entered_price, &context.currency).await?;

        let requested = context.customer_entered_price.unwrap_or(minimum);
        let amount = if maximum > minimum { requested.clamp(minimum, maximum) } else { requested.max(minimum) };

        let mut resolution = PriceResolution::empty(product, PriceState::EnteredPrice, context);
        resolution.trace.record("entered", "customer entered price within bounds", amount);
        resolution.price = Some(self.display(amount, context)?);
        resolution.entered_price = Some(EnteredPriceRange {
            minimum: self.display(minimum, context)?,
            maximum: self.display(maximum, context)?,
        });
        Ok(resolution)
    }

    async fn resolve_auction(
        &self,
        product: &Product,
        context: &SelectionContext,
    ) -> Result<PriceResolution, CollaboratorError> {
        let details = product.auction.clone().unwrap_or_default();
        let start_price = self.to_display(product, product.start_price, context).await?;
        let highest_bid = if details.highest_bid > Decimal::ZERO {
            Some(self.to_display(product, details.highest_bid, context).await?)
        } else {
            None
        };

        let mut resolution = PriceResolution::empty(product, PriceState::Auction, context);
        let current = highest_bid.clone().unwrap_or_else(|| start_price.clone());
        resolution.trace.record(
            "auction",
            if highest_bid.is_some() { "highest bid" } else { "start price" },
            current.amount,
        );
        resolution.price = Some(current);
        resolution.auction =
            Some(AuctionPrice { start_price, highest_bid, end_date: details.end_date, ended: details.ended });
        Ok(resolution)
    }

    fn base_price_per_unit(
        &self,
        product: &Product,
        price: Decimal,
        context: &SelectionContext,
    ) -> Result<Option<BasePriceDisplay>, CollaboratorError> {
        let Some(unit) = product.base_price.as_ref().filter(|unit| !unit.amount.is_zero()) else {
            return Ok(None);
        };
        let Some(per_unit) = price.checked_mul(unit.base_amount).and_then(|scaled| scaled.checked_div(unit.amount))
        else {
            warn!(
                event_name = "catalog.price.base_price_overflow",
                product_id = %product.id.0,
                "base price per unit exceeds the decimal range"
            );
            return Ok(None);
        };
        let display = self.display(per_unit.round_dp(2), context)?;
        let message = ResourceMessage::with_args(
            resources::BASE_PRICE,
            [display.formatted.clone(), unit.base_amount.normalize().to_string(), unit.unit.clone()],
        );
        Ok(Some(BasePriceDisplay { price: display, message }))
    }

    async fn to_display(
        &self,
        product: &Product,
        amount: Decimal,
        context: &SelectionContext,
    ) -> Result<DisplayPrice, CollaboratorError> {
        let taxed = self
            .collaborators
            .tax
            .product_price(product, amount, context.price_includes_tax(), &context.customer)
            .await?;
        let converted =
            self.collaborators.currency.convert_from_primary_store_currency(taxed.amount, &context.currency).await?;
        self.display(converted, context)
    }

    fn display(&self, amount: Decimal, context: &SelectionContext) -> Result<DisplayPrice, CollaboratorError> {
        let formatted = self.collaborators.formatter.format_price(
            amount,
            &context.currency,
            &context.language,
            context.price_includes_tax(),
        )?;
        Ok(DisplayPrice { amount, formatted })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{attribute_adjustments, reservation_intervals, PriceResolver, PriceState};
    use crate::catalog::collaborators::Collaborators;
    use crate::catalog::resources;
    use crate::catalog::testing::{
        color_size_product, context_fixture, mapping, neutral_collaborators, simple_product, value, FailingTax,
        FixedRateCurrency, PercentDiscount, PercentTax,
    };
    use crate::config::CatalogSettings;
    use crate::domain::attribute::AttributeControlType;
    use crate::domain::context::ReservationRange;
    use crate::domain::product::{
        AuctionDetails, BasePricePerUnit, IntervalUnit, Product, ProductType, ReservationDetails,
    };
    use crate::domain::selection::{CustomAttribute, Selection};
    use crate::domain::tier_price::TierPrice;
    use crate::errors::CollaboratorError;

    fn dec(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    fn select(pairs: &[(&str, &str)]) -> Selection {
        pairs.iter().map(|(key, value)| CustomAttribute::new(*key, *value)).collect()
    }

    fn resolver(collaborators: Collaborators) -> PriceResolver {
        PriceResolver::new(collaborators, CatalogSettings::default())
    }

    fn engraved_ring() -> Product {
        let mut engraving = value("engraving", "Engraving");
        engraving.price_adjustment = dec(250, 2);
        let mut gold = value("gold", "Gold");
        gold.price_adjustment = dec(10, 0);
        gold.price_adjustment_use_percentage = true;
        Product {
            attribute_mappings: vec![
                mapping("extras", "Extras", AttributeControlType::Checkboxes, vec![engraving]),
                mapping("metal", "Metal", AttributeControlType::RadioList, vec![gold, value("silver", "Silver")]),
            ],
            ..simple_product("ring", dec(2000, 2))
        }
    }

    #[test]
    fn adjustments_saturate_instead_of_overflowing() {
        let mut doubled = value("doubled", "Doubled");
        doubled.price_adjustment = dec(1000, 0);
        doubled.price_adjustment_use_percentage = true;
        let mut bulk = value("bulk", "Bulk");
        bulk.price_adjustment = Decimal::MAX;
        let product = Product {
            attribute_mappings: vec![mapping(
                "extras",
                "Extras",
                AttributeControlType::Checkboxes,
                vec![doubled, bulk],
            )],
            ..simple_product("vault", Decimal::MAX)
        };
        let selection = select(&[("extras", "doubled"), ("extras", "bulk")]);

        assert_eq!(attribute_adjustments(&product, &selection, product.price), Decimal::MAX);
    }

    fn tiered_product() -> Product {
        Product {
            tier_prices: vec![
                TierPrice::new("t1", 1, dec(1000, 2)),
                TierPrice::new("t5", 5, dec(800, 2)),
                TierPrice::new("t5-dup", 5, dec(900, 2)),
            ],
            ..simple_product("pens", dec(1000, 2))
        }
    }

    #[tokio::test]
    async fn scenario_c_adjustments_sum_fixed_and_percentage_of_base() {
        let product = engraved_ring();
        let selection = select(&[("extras", "engraving"), ("metal", "gold")]);

        assert_eq!(attribute_adjustments(&product, &selection, product.price), dec(450, 2));

        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_display_price(&product, &selection, 1, &context_fixture())
            .await
            .expect("resolves");
        let price = resolution.price.expect("priced");
        assert_eq!(price.amount, dec(2450, 2));
        assert_eq!(price.formatted, "$24.50");
    }

    #[tokio::test]
    async fn scenario_b_tier_selection_by_quantity() {
        let product = tiered_product();
        let resolver = resolver(neutral_collaborators(vec![]));
        let context = context_fixture();

        let six = resolver.resolve_display_price(&product, &Selection::default(), 6, &context).await.expect("resolves");
        assert_eq!(six.price.map(|price| price.amount), Some(dec(800, 2)));
        assert_eq!(six.tier_used.map(|tier| tier.id), Some("t5".to_owned()));

        let three =
            resolver.resolve_display_price(&product, &Selection::default(), 3, &context).await.expect("resolves");
        assert_eq!(three.price.map(|price| price.amount), Some(dec(1000, 2)));
        assert_eq!(three.tier_used, None);
    }

    #[tokio::test]
    async fn scenario_e_grouped_from_price_is_the_cheapest_associated_product() {
        let group = Product { product_type: ProductType::Grouped, ..simple_product("kit", Decimal::ZERO) };
        let mut products = Vec::new();
        for (id, price, published) in [("kit-a", 1500, true), ("kit-b", 1200, true), ("kit-draft", 500, false)] {
            products.push(Product {
                parent_grouped_product_id: Some(group.id.clone()),
                published,
                ..simple_product(id, dec(price, 2))
            });
        }
        let collaborators = Collaborators {
            tax: Arc::new(PercentTax { rate: dec(10, 0) }),
            ..neutral_collaborators(products)
        };

        let resolution = resolver(collaborators)
            .resolve_display_price(&group, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.state, PriceState::Priced);
        assert_eq!(resolution.product_id, group.id);
        assert!(resolution.from_price);
        assert_eq!(resolution.price.as_ref().map(|price| price.amount), Some(dec(1320, 2)));
        assert_eq!(
            resolution.message.map(|message| message.resource_key),
            Some(resources::PRICE_RANGE_FROM.to_owned())
        );
    }

    #[tokio::test]
    async fn grouped_product_without_associated_products_is_unavailable() {
        let group = Product { product_type: ProductType::Grouped, ..simple_product("empty-kit", Decimal::ZERO) };

        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_display_price(&group, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.state, PriceState::Unavailable);
        assert!(resolution.price.is_none());
    }

    #[tokio::test]
    async fn grouped_old_price_equal_to_price_is_hidden() {
        let group = Product { product_type: ProductType::Grouped, ..simple_product("kit", Decimal::ZERO) };
        let member = Product {
            parent_grouped_product_id: Some(group.id.clone()),
            old_price: dec(1200, 2),
            ..simple_product("kit-b", dec(1200, 2))
        };

        let resolution = resolver(neutral_collaborators(vec![member]))
            .resolve_display_price(&group, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert!(resolution.old_price.is_none());
    }

    #[tokio::test]
    async fn grouped_from_price_hides_member_old_and_catalog_prices() {
        let group = Product { product_type: ProductType::Grouped, ..simple_product("kit", Decimal::ZERO) };
        let member = Product {
            parent_grouped_product_id: Some(group.id.clone()),
            old_price: dec(1500, 2),
            catalog_price: dec(1400, 2),
            ..simple_product("kit-a", dec(1200, 2))
        };

        let resolution = resolver(neutral_collaborators(vec![member]))
            .resolve_display_price(&group, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert!(resolution.from_price);
        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(1200, 2)));
        assert!(resolution.old_price.is_none());
        assert!(resolution.catalog_price.is_none());
    }

    #[tokio::test]
    async fn call_for_price_suppresses_the_amount() {
        let product = Product { call_for_price: true, ..simple_product("quote-only", dec(999, 0)) };

        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_display_price(&product, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.state, PriceState::CallForPrice);
        assert!(resolution.price.is_none());
        assert_eq!(resolution.message.map(|message| message.resource_key), Some(resources::CALL_FOR_PRICE.to_owned()));
    }

    #[tokio::test]
    async fn entered_price_is_clamped_and_skips_discounts_and_tax() {
        let product = Product {
            entered_price: true,
            min_entered_price: dec(5, 0),
            max_entered_price: dec(50, 0),
            ..simple_product("donation", Decimal::ZERO)
        };
        let resolver = resolver(Collaborators {
            tax: Arc::new(PercentTax { rate: dec(20, 0) }),
            discounts: Arc::new(PercentDiscount { percent_off: dec(50, 0) }),
            ..neutral_collaborators(vec![])
        });
        let mut context = context_fixture();

        let defaulted =
            resolver.resolve_display_price(&product, &Selection::default(), 1, &context).await.expect("resolves");
        assert_eq!(defaulted.state, PriceState::EnteredPrice);
        assert_eq!(defaulted.price.map(|price| price.amount), Some(dec(5, 0)));

        context.customer_entered_price = Some(dec(80, 0));
        let capped = resolver.resolve_display_price(&product, &Selection::default(), 1, &context).await.expect("resolves");
        assert_eq!(capped.price.map(|price| price.amount), Some(dec(50, 0)));
        assert!(capped.applied_discounts.is_empty());
    }

    #[tokio::test]
    async fn discount_wins_when_cheaper_than_the_tier() {
        let product = tiered_product();
        let resolver = resolver(Collaborators {
            discounts: Arc::new(PercentDiscount { percent_off: dec(25, 0) }),
            ..neutral_collaborators(vec![])
        });

        let resolution = resolver
            .resolve_display_price(&product, &Selection::default(), 6, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(750, 2)));
        assert_eq!(resolution.applied_discounts.len(), 1);
        assert_eq!(resolution.tier_used, None);
    }

    #[tokio::test]
    async fn ignoring_discounts_and_tiers_leaves_the_base_price() {
        let product = tiered_product();
        let settings = CatalogSettings { ignore_discounts: true, ignore_tier_prices: true, ..CatalogSettings::default() };
        let resolver = PriceResolver::new(
            Collaborators {
                discounts: Arc::new(PercentDiscount { percent_off: dec(25, 0) }),
                ..neutral_collaborators(vec![])
            },
            settings,
        );

        let resolution = resolver
            .resolve_display_price(&product, &Selection::default(), 6, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(1000, 2)));
        assert!(resolution.applied_discounts.is_empty());
    }

    #[tokio::test]
    async fn overridden_combination_price_replaces_base_and_adjustments() {
        let mut product = color_size_product();
        product.attribute_mappings[0].values[0].price_adjustment = dec(5, 0);
        product.attribute_combinations[0].overridden_price = Some(dec(30, 0));
        let resolver = resolver(neutral_collaborators(vec![]));
        let context = context_fixture();

        let matched = resolver
            .resolve_display_price(&product, &select(&[("color", "red"), ("size", "s")]), 1, &context)
            .await
            .expect("resolves");
        assert_eq!(matched.price.map(|price| price.amount), Some(dec(30, 0)));

        let unmatched = resolver
            .resolve_display_price(&product, &select(&[("color", "red"), ("size", "m")]), 1, &context)
            .await
            .expect("resolves");
        assert_eq!(unmatched.price.map(|price| price.amount), Some(dec(25, 0)));
    }

    #[tokio::test]
    async fn tax_is_applied_before_currency_conversion() {
        let product = simple_product("lamp", dec(20, 0));
        let resolver = resolver(Collaborators {
            tax: Arc::new(PercentTax { rate: dec(10, 0) }),
            currency: Arc::new(FixedRateCurrency { rate: dec(2, 0) }),
            ..neutral_collaborators(vec![])
        });

        let resolution = resolver
            .resolve_display_price(&product, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(44, 0)));
        assert_eq!(resolution.trace.stages(), vec!["base", "discount", "adjustments", "tax", "currency"]);
    }

    #[tokio::test]
    async fn collaborator_failures_propagate_unmodified() {
        let resolver = resolver(Collaborators { tax: Arc::new(FailingTax), ..neutral_collaborators(vec![]) });

        let error = resolver
            .resolve_display_price(&simple_product("lamp", dec(20, 0)), &Selection::default(), 1, &context_fixture())
            .await
            .expect_err("tax failure surfaces");

        assert_eq!(error, CollaboratorError::Tax("rate table offline".to_owned()));
    }

    #[tokio::test]
    async fn resolving_twice_yields_identical_output() {
        let product = engraved_ring();
        let selection = select(&[("metal", "gold")]);
        let resolver = resolver(neutral_collaborators(vec![]));
        let context = context_fixture();

        let first = resolver.resolve_display_price(&product, &selection, 2, &context).await.expect("resolves");
        let second = resolver.resolve_display_price(&product, &selection, 2, &context).await.expect("resolves");

        assert_eq!(first, second);
    }

    #[test]
    fn reservation_counts_started_intervals() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().expect("valid date");
        let days = ReservationDetails { interval: 1, interval_unit: IntervalUnit::Day, include_both_dates: true };
        let range = ReservationRange { start, end: start + Duration::days(2) };
        assert_eq!(reservation_intervals(&days, &range), 3);

        let hours = ReservationDetails { interval: 2, interval_unit: IntervalUnit::Hour, include_both_dates: false };
        let range = ReservationRange { start, end: start + Duration::minutes(150) };
        assert_eq!(reservation_intervals(&hours, &range), 2);
    }

    #[tokio::test]
    async fn reservation_price_scales_with_the_range() {
        let product = Product {
            product_type: ProductType::Reservation,
            reservation: Some(ReservationDetails {
                interval: 1,
                interval_unit: IntervalUnit::Day,
                include_both_dates: false,
            }),
            ..simple_product("kayak", dec(40, 0))
        };
        let mut context = context_fixture();
        context.reservation = Some(ReservationRange { start: context.as_of, end: context.as_of + Duration::days(3) });

        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_display_price(&product, &Selection::default(), 1, &context)
            .await
            .expect("resolves");

        assert_eq!(resolution.reservation_intervals, Some(3));
        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(120, 0)));
    }

    #[tokio::test]
    async fn reservation_total_beyond_decimal_range_is_unavailable() {
        let product = Product {
            product_type: ProductType::Reservation,
            reservation: Some(ReservationDetails {
                interval: 1,
                interval_unit: IntervalUnit::Day,
                include_both_dates: false,
            }),
            ..simple_product("yacht", Decimal::from_i128_with_scale(10_i128.pow(27), 0))
        };
        let mut context = context_fixture();
        context.reservation = Some(ReservationRange { start: context.as_of, end: context.as_of + Duration::days(100) });

        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_display_price(&product, &Selection::default(), 1, &context)
            .await
            .expect("resolves");

        assert_eq!(resolution.state, PriceState::Unavailable);
        assert!(resolution.price.is_none());
    }

    #[tokio::test]
    async fn base_price_per_unit_beyond_decimal_range_is_omitted() {
        let product = Product {
            base_price: Some(BasePricePerUnit {
                amount: dec(1, 28),
                base_amount: dec(1_000_000_000, 0),
                unit: "g".to_owned(),
            }),
            ..simple_product("saffron", dec(1_000_000_000, 0))
        };

        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_display_price(&product, &Selection::default(), 1, &context_fixture())
            .await
            .expect("resolves");

        assert_eq!(resolution.state, PriceState::Priced);
        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(1_000_000_000, 0)));
        assert!(resolution.base_price_per_unit.is_none());
    }

    #[tokio::test]
    async fn auction_prefers_the_highest_bid() {
        let mut product = Product {
            product_type: ProductType::Auction,
            start_price: dec(100, 0),
            auction: Some(AuctionDetails::default()),
            ..simple_product("painting", Decimal::ZERO)
        };
        let resolver = resolver(neutral_collaborators(vec![]));
        let context = context_fixture();

        let opening = resolver.resolve_display_price(&product, &Selection::default(), 1, &context).await.expect("resolves");
        assert_eq!(opening.state, PriceState::Auction);
        assert_eq!(opening.price.map(|price| price.amount), Some(dec(100, 0)));

        product.auction = Some(AuctionDetails { highest_bid: dec(140, 0), ..AuctionDetails::default() });
        let bidding = resolver.resolve_display_price(&product, &Selection::default(), 1, &context).await.expect("resolves");
        assert_eq!(bidding.price.map(|price| price.amount), Some(dec(140, 0)));
        assert_eq!(bidding.auction.and_then(|auction| auction.highest_bid).map(|bid| bid.amount), Some(dec(140, 0)));
    }

    #[tokio::test]
    async fn tier_table_optionally_runs_each_tier_through_discounts() {
        let product = tiered_product();
        let collaborators = Collaborators {
            discounts: Arc::new(PercentDiscount { percent_off: dec(50, 0) }),
            ..neutral_collaborators(vec![])
        };
        let context = context_fixture();

        let with_discounts = PriceResolver::new(collaborators.clone(), CatalogSettings::default())
            .tier_price_table(&product, &context)
            .await
            .expect("table");
        let amounts: Vec<Decimal> = with_discounts.iter().map(|row| row.price.amount).collect();
        assert_eq!(amounts, vec![dec(5, 0), dec(5, 0)]);

        let plain = PriceResolver::new(
            collaborators,
            CatalogSettings { display_tier_prices_with_discounts: false, ..CatalogSettings::default() },
        )
        .tier_price_table(&product, &context)
        .await
        .expect("table");
        let rows: Vec<(u32, Decimal)> = plain.iter().map(|row| (row.quantity, row.price.amount)).collect();
        assert_eq!(rows, vec![(1, dec(1000, 2)), (5, dec(800, 2))]);
    }

    #[tokio::test]
    async fn from_price_uses_the_deepest_tier() {
        let resolution = resolver(neutral_collaborators(vec![]))
            .resolve_from_price(&tiered_product(), &context_fixture())
            .await
            .expect("resolves");

        assert!(resolution.from_price);
        assert_eq!(resolution.price.map(|price| price.amount), Some(dec(800, 2)));
    }

    #[tokio::test]
    async fn adjustment_labels_show_sign_and_unit() {
        let product = engraved_ring();
        let resolver = resolver(neutral_collaborators(vec![]));
        let context = context_fixture();
        let extras = &product.attribute_mappings[0].values[0];
        let gold = &product.attribute_mappings[1].values[0];
        let silver = &product.attribute_mappings[1].values[1];

        assert_eq!(resolver.adjustment_label(&product, extras, &context).await.expect("label"), Some("+$2.50".to_owned()));
        assert_eq!(resolver.adjustment_label(&product, gold, &context).await.expect("label"), Some("+10%".to_owned()));
        assert_eq!(resolver.adjustment_label(&product, silver, &context).await.expect("label"), None);
    }
}
