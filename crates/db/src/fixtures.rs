use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use storefront_core::catalog::collaborators::Collaborators;
use storefront_core::domain::attribute::{
    AttributeCondition, AttributeControlType, ConditionRequirement, MappingId, ProductAttributeMapping,
    ProductAttributeValue, ValueId,
};
use storefront_core::domain::combination::{CombinationId, ProductAttributeCombination};
use storefront_core::domain::customer::CustomerGroupId;
use storefront_core::domain::inventory::{WarehouseId, WarehouseInventory};
use storefront_core::domain::product::{
    AuctionDetails, BackorderMode, BasePricePerUnit, IntervalUnit, ManageInventoryMethod, Product, ProductId,
    ProductType, ReservationDetails,
};
use storefront_core::domain::selection::CustomAttribute;
use storefront_core::domain::tier_price::TierPrice;

use crate::repositories::{InMemoryCatalogRepository, ProductRepository, RepositoryError};
use crate::services::{DiscountRule, SymbolPriceFormatter, TableCurrencyService, TableDiscountService, TableTaxService};

/// Ids of the deterministic demo catalog, in display order.
pub const DEMO_PRODUCT_IDS: &[&str] = &[
    "classic-tee",
    "engraved-ring",
    "ballpoint-pens",
    "desk-kit",
    "desk-lamp",
    "desk-organizer",
    "desk-prototype",
    "gift-card",
    "vintage-print",
    "kayak-rental",
    "custom-sofa",
    "coffee-beans",
];

pub const DEMO_PRIMARY_CURRENCY: &str = "USD";
pub const VIP_GROUP: &str = "vip";
pub const WHOLESALE_GROUP: &str = "wholesale";

/// One product per product type plus the variant, tier, grouped and
/// base-price cases the storefront pages exercise.
pub struct DemoCatalog;

impl DemoCatalog {
    pub fn products() -> Vec<Product> {
        vec![
            classic_tee(),
            engraved_ring(),
            ballpoint_pens(),
            desk_kit(),
            associated("desk-lamp", "Desk Lamp", 1500, true, 5),
            associated("desk-organizer", "Desk Organizer", 1200, true, 6),
            associated("desk-prototype", "Desk Prototype", 500, false, 7),
            gift_card(),
            vintage_print(),
            kayak_rental(),
            custom_sofa(),
            coffee_beans(),
        ]
    }

    pub async fn load(repository: &impl ProductRepository) -> Result<SeedResult, RepositoryError> {
        let products = Self::products();
        let product_ids = products.iter().map(|product| product.id.0.clone()).collect();
        let count = products.len();
        for product in products {
            repository.save(product).await?;
        }
        Ok(SeedResult { products: count, product_ids })
    }

    pub fn repository() -> InMemoryCatalogRepository {
        InMemoryCatalogRepository::with_products(Self::products())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub products: usize,
    pub product_ids: Vec<String>,
}

/// Collaborators backed by the demo rate tables: 8% default tax (food is
/// zero-rated, wholesale customers are exempt), USD primary with EUR and
/// GBP rates, a 10% coffee promotion and a 15% VIP discount.
pub fn demo_collaborators(catalog: Arc<InMemoryCatalogRepository>) -> Collaborators {
    let tax = TableTaxService::new(Decimal::new(8, 0))
        .with_category("food", Decimal::ZERO)
        .with_category("standard", Decimal::new(8, 0))
        .with_exempt_group(CustomerGroupId(WHOLESALE_GROUP.to_string()));
    let currency = TableCurrencyService::new(DEMO_PRIMARY_CURRENCY)
        .with_rate("EUR", Decimal::new(92, 2))
        .with_rate("GBP", Decimal::new(79, 2));

    let mut coffee = DiscountRule::new("spring-coffee", "Spring coffee promotion", Decimal::new(10, 0));
    coffee.product_ids = vec![ProductId("coffee-beans".to_string())];
    let mut vip = DiscountRule::new("vip", "VIP pricing", Decimal::new(15, 0));
    vip.customer_group_id = Some(CustomerGroupId(VIP_GROUP.to_string()));

    Collaborators {
        catalog,
        tax: Arc::new(tax),
        currency: Arc::new(currency),
        discounts: Arc::new(TableDiscountService::new(vec![coffee, vip])),
        formatter: Arc::new(SymbolPriceFormatter::default()),
    }
}

fn base(id: &str, name: &str, price_cents: i64, display_order: i32) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        sku: Some(id.to_ascii_uppercase()),
        published: true,
        price: Decimal::new(price_cents, 2),
        display_order,
        display_stock_availability: true,
        ..Product::default()
    }
}

fn value(id: &str, name: &str) -> ProductAttributeValue {
    ProductAttributeValue { id: ValueId(id.to_string()), name: name.to_string(), ..ProductAttributeValue::default() }
}

fn mapping(
    id: &str,
    name: &str,
    control_type: AttributeControlType,
    values: Vec<ProductAttributeValue>,
) -> ProductAttributeMapping {
    ProductAttributeMapping {
        id: MappingId(id.to_string()),
        attribute_id: id.to_string(),
        name: name.to_string(),
        control_type,
        values,
        ..ProductAttributeMapping::default()
    }
}

fn combination(id: &str, pairs: &[(&str, &str)], stock: i32, reserved: i32) -> ProductAttributeCombination {
    ProductAttributeCombination {
        id: CombinationId(id.to_string()),
        attributes: pairs.iter().map(|(key, value)| CustomAttribute::new(*key, *value)).collect(),
        stock_quantity: stock,
        reserved_quantity: reserved,
        sku: Some(format!("TEE-{}", id.to_ascii_uppercase())),
        ..ProductAttributeCombination::default()
    }
}

fn classic_tee() -> Product {
    let mut red = value("red", "Red");
    red.color_rgb = Some("#c0392b".to_string());
    red.is_pre_selected = true;
    let mut blue = value("blue", "Blue");
    blue.color_rgb = Some("#2980b9".to_string());
    let mut color = mapping("color", "Color", AttributeControlType::ColorSquares, vec![red, blue]);
    color.is_required = true;
    color.show_on_catalog_page = true;
    let mut large = value("l", "L");
    large.price_adjustment = Decimal::new(200, 2);
    let mut size = mapping("size", "Size", AttributeControlType::DropdownList, vec![value("s", "S"), value("m", "M"), large]);
    size.is_required = true;

    let mut blue_large = combination("blue-l", &[("color", "blue"), ("size", "l")], 4, 0);
    blue_large.overridden_price = Some(Decimal::new(2400, 2));
    blue_large.gtin = Some("00012345600012".to_string());
    let mut red_medium = combination("red-m", &[("color", "red"), ("size", "m")], 0, 0);
    red_medium.allow_out_of_stock_orders = true;
    let red_small = combination("red-s", &[("color", "red"), ("size", "s")], 5, 2);

    Product {
        manage_inventory: ManageInventoryMethod::ManageStockByAttributes,
        stock_quantity: 9,
        reserved_quantity: 2,
        low_stock_threshold: 2,
        mpn: Some("CT-100".to_string()),
        tax_category_id: Some("standard".to_string()),
        attribute_mappings: vec![color, size],
        attribute_combinations: vec![
            red_small,
            red_medium,
            combination("blue-s", &[("color", "blue"), ("size", "s")], 1, 1),
            blue_large,
        ],
        ..base("classic-tee", "Classic Tee", 2000, 1)
    }
}

fn engraved_ring() -> Product {
    let mut engraving = value("engraving", "Engraving");
    engraving.price_adjustment = Decimal::new(250, 2);
    let mut gift_wrap = value("gift-wrap", "Gift wrap");
    gift_wrap.price_adjustment = Decimal::new(100, 2);
    let mut gold = value("gold", "Gold");
    gold.price_adjustment = Decimal::new(10, 0);
    gold.price_adjustment_use_percentage = true;
    let mut silver = value("silver", "Silver");
    silver.is_pre_selected = true;

    let mut inscription = mapping("inscription", "Inscription", AttributeControlType::TextBox, vec![]);
    inscription.is_required = true;
    inscription.validation.max_length = Some(20);
    inscription.condition = Some(AttributeCondition {
        requirements: vec![ConditionRequirement {
            mapping_id: MappingId("extras".to_string()),
            value_id: ValueId("engraving".to_string()),
        }],
    });
    let mut metal = mapping("metal", "Metal", AttributeControlType::RadioList, vec![silver, gold]);
    metal.is_required = true;

    Product {
        manage_inventory: ManageInventoryMethod::ManageStock,
        stock_quantity: 4,
        low_stock_threshold: 5,
        backorder_mode: BackorderMode::AllowQtyBelowZeroAndNotifyCustomer,
        attribute_mappings: vec![
            metal,
            mapping("extras", "Extras", AttributeControlType::Checkboxes, vec![engraving, gift_wrap]),
            inscription,
            mapping("delivery", "Delivery date", AttributeControlType::Datepicker, vec![]),
        ],
        ..base("engraved-ring", "Engraved Ring", 12000, 2)
    }
}

fn ballpoint_pens() -> Product {
    let mut vip_tier = TierPrice::new("pens-vip-20", 20, Decimal::new(100, 2));
    vip_tier.customer_group_id = Some(CustomerGroupId(VIP_GROUP.to_string()));
    let mut expired = TierPrice::new("pens-launch-5", 5, Decimal::new(50, 2));
    expired.end_date = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).single();
    let mut euro_only = TierPrice::new("pens-eur-20", 20, Decimal::new(140, 2));
    euro_only.currency_code = Some("EUR".to_string());

    Product {
        manage_inventory: ManageInventoryMethod::ManageStock,
        use_multiple_warehouses: true,
        warehouse_inventory: vec![
            WarehouseInventory { warehouse_id: WarehouseId("east".to_string()), stock_quantity: 400, reserved_quantity: 20 },
            WarehouseInventory { warehouse_id: WarehouseId("west".to_string()), stock_quantity: 100, reserved_quantity: 0 },
        ],
        tier_prices: vec![
            TierPrice::new("pens-10", 10, Decimal::new(150, 2)),
            TierPrice::new("pens-50", 50, Decimal::new(120, 2)),
            TierPrice::new("pens-50-late", 50, Decimal::new(110, 2)),
            vip_tier,
            expired,
            euro_only,
        ],
        ..base("ballpoint-pens", "Ballpoint Pens", 200, 3)
    }
}

fn desk_kit() -> Product {
    Product { product_type: ProductType::Grouped, ..base("desk-kit", "Desk Kit", 0, 4) }
}

fn associated(id: &str, name: &str, price_cents: i64, published: bool, display_order: i32) -> Product {
    Product {
        parent_grouped_product_id: Some(ProductId("desk-kit".to_string())),
        published,
        old_price: if id == "desk-organizer" { Decimal::new(1200, 2) } else { Decimal::ZERO },
        ..base(id, name, price_cents, display_order)
    }
}

fn gift_card() -> Product {
    Product {
        product_type: ProductType::GiftVoucher,
        entered_price: true,
        min_entered_price: Decimal::new(10, 0),
        max_entered_price: Decimal::new(500, 0),
        ..base("gift-card", "Gift Card", 0, 8)
    }
}

fn vintage_print() -> Product {
    Product {
        product_type: ProductType::Auction,
        start_price: Decimal::new(100, 0),
        auction: Some(AuctionDetails {
            highest_bid: Decimal::new(140, 0),
            end_date: Utc.with_ymd_and_hms(2026, 12, 31, 18, 0, 0).single(),
            ended: false,
        }),
        ..base("vintage-print", "Vintage Print", 0, 9)
    }
}

fn kayak_rental() -> Product {
    Product {
        product_type: ProductType::Reservation,
        reservation: Some(ReservationDetails {
            interval: 1,
            interval_unit: IntervalUnit::Day,
            include_both_dates: true,
        }),
        ..base("kayak-rental", "Kayak Rental", 4000, 10)
    }
}

fn custom_sofa() -> Product {
    Product { product_type: ProductType::Bundle, call_for_price: true, ..base("custom-sofa", "Custom Sofa", 250000, 11) }
}

fn coffee_beans() -> Product {
    Product {
        tax_category_id: Some("food".to_string()),
        old_price: Decimal::new(1050, 2),
        base_price: Some(BasePricePerUnit {
            amount: Decimal::new(250, 0),
            base_amount: Decimal::new(100, 0),
            unit: "g".to_string(),
        }),
        ..base("coffee-beans", "Coffee Beans 250 g", 900, 12)
    }
}
