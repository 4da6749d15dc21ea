//! Presentation models for product pages and listings.

pub mod detail;
pub mod overview;

pub use detail::{AttributeChangeModel, AttributeModel, AttributeValueModel, ProductDetailAssembler, ProductDetailModel};
pub use overview::{ProductOverviewAssembler, ProductOverviewModel, SwatchModel, SwatchValueModel};
