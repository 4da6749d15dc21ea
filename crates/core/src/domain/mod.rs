pub mod attribute;
pub mod combination;
pub mod context;
pub mod customer;
pub mod inventory;
pub mod product;
pub mod selection;
pub mod tier_price;
