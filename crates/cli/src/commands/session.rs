use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;
use storefront_core::catalog::codec::AttributeForm;
use storefront_core::catalog::collaborators::Collaborators;
use storefront_core::config::{AppConfig, CatalogSettings};
use storefront_core::domain::context::{Currency, SelectionContext, Store, StoreId, TaxDisplay};
use storefront_core::domain::customer::{Customer, CustomerGroupId, CustomerId};
use storefront_core::domain::inventory::WarehouseId;
use storefront_core::errors::DomainError;
use storefront_db::{demo_collaborators, DemoCatalog, InMemoryCatalogRepository};

#[derive(Debug, Clone, Default, Args)]
pub struct CatalogArgs {
    #[arg(long, help = "JSON array of products to load instead of the demo catalog")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ContextArgs {
    #[arg(long, default_value = "USD", help = "Working currency code")]
    pub currency: String,
    #[arg(long = "customer-group", help = "Customer group membership; repeatable")]
    pub customer_groups: Vec<String>,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
    #[arg(long, default_value = "main")]
    pub store: String,
    #[arg(long)]
    pub warehouse: Option<String>,
    #[arg(long, help = "Show prices excluding tax")]
    pub excluding_tax: bool,
    #[arg(long, help = "Customer-entered amount for entered-price products")]
    pub entered_price: Option<Decimal>,
    #[arg(long, help = "RFC 3339 instant to resolve at; defaults to now")]
    pub as_of: Option<DateTime<Utc>>,
    #[arg(long = "attr", value_name = "MAPPING=VALUE", help = "Attribute selection; repeatable")]
    pub attributes: Vec<String>,
}

impl Default for ContextArgs {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            customer_groups: Vec::new(),
            quantity: 1,
            store: "main".to_string(),
            warehouse: None,
            excluding_tax: false,
            entered_price: None,
            as_of: None,
            attributes: Vec::new(),
        }
    }
}

impl ContextArgs {
    pub fn selection_context(&self) -> SelectionContext {
        let code = self.currency.trim().to_ascii_uppercase();
        let customer = Customer {
            id: CustomerId("cli".to_string()),
            groups: self.customer_groups.iter().map(|group| CustomerGroupId(group.clone())).collect(),
        };
        let store = Store { id: StoreId(self.store.clone()), default_warehouse_id: None };
        let currency = Currency { symbol: currency_symbol(&code), code };

        let mut context = SelectionContext::new(customer, store, currency, self.as_of.unwrap_or_else(Utc::now));
        context.quantity = self.quantity.max(1);
        context.warehouse_id = self.warehouse.clone().map(WarehouseId);
        context.customer_entered_price = self.entered_price;
        if self.excluding_tax {
            context.tax_display = TaxDisplay::ExcludingTax;
        }
        context
    }

    /// `--attr color=red` becomes the form field `product_attribute_color`.
    pub fn attribute_form(&self) -> Result<AttributeForm, DomainError> {
        let mut form = AttributeForm::default();
        for raw in &self.attributes {
            let Some((mapping, value)) = raw.split_once('=') else {
                return Err(DomainError::InvalidSelection(format!("attribute `{raw}` must look like MAPPING=VALUE")));
            };
            if mapping.trim().is_empty() {
                return Err(DomainError::InvalidSelection(format!("attribute `{raw}` is missing the mapping id")));
            }
            form.push(format!("product_attribute_{}", mapping.trim()), value.trim());
        }
        Ok(form)
    }
}

/// A catalog plus the collaborators and settings a command resolves with.
pub struct Session {
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub collaborators: Collaborators,
    pub settings: CatalogSettings,
}

impl Session {
    pub fn open(config: &AppConfig, args: &CatalogArgs) -> Result<Self> {
        let catalog = match &args.catalog {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("could not read catalog file `{}`", path.display()))?;
                InMemoryCatalogRepository::from_json(&raw)
                    .with_context(|| format!("could not load catalog file `{}`", path.display()))?
            }
            None => DemoCatalog::repository(),
        };
        let catalog = Arc::new(catalog);
        Ok(Self {
            collaborators: demo_collaborators(Arc::clone(&catalog)),
            catalog,
            settings: config.catalog.clone(),
        })
    }
}

fn currency_symbol(code: &str) -> String {
    match code {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{other} "),
    }
}
