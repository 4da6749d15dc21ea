pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::assembler::{
    AttributeChangeModel, ProductDetailAssembler, ProductDetailModel, ProductOverviewAssembler,
    ProductOverviewModel,
};
pub use catalog::codec::{AttributeForm, AttributeWarning};
pub use catalog::collaborators::{
    AppliedDiscount, CatalogReader, Collaborators, CurrencyService, DiscountQuote, DiscountRequest,
    DiscountService, PriceFormatter, TaxService, TaxedAmount,
};
pub use catalog::pricing::{DisplayPrice, PriceResolution, PriceResolver, PriceState};
pub use catalog::resources::ResourceMessage;
pub use catalog::stock::{Availability, StockStatus};
pub use catalog::{evaluate_variant, VariantEvaluation};
pub use config::{AppConfig, CatalogSettings};
pub use domain::context::{Currency, SelectionContext, Store, StoreId};
pub use domain::customer::{Customer, CustomerGroupId, CustomerId};
pub use domain::product::{Product, ProductId, ProductType};
pub use domain::selection::{CustomAttribute, Selection};
pub use errors::{ApplicationError, CollaboratorError, DomainError, InterfaceError};
