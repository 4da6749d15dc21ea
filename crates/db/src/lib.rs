pub mod fixtures;
pub mod repositories;
pub mod services;

pub use fixtures::{demo_collaborators, DemoCatalog, SeedResult};
pub use repositories::{InMemoryCatalogRepository, ProductRepository, RepositoryError};
pub use services::{
    DiscountRule, SymbolPriceFormatter, TableCurrencyService, TableDiscountService, TableTaxService,
};
