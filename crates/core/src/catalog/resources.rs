//! Localization resource keys. The engine only ever emits keys and arguments;
//! display text is looked up by the caller.

use serde::{Deserialize, Serialize};

pub const IN_STOCK: &str = "Products.Availability.InStock";
pub const IN_STOCK_WITH_QUANTITY: &str = "Products.Availability.InStockWithQuantity";
pub const LOW_STOCK: &str = "Products.Availability.LowStock";
pub const LOW_STOCK_WITH_QUANTITY: &str = "Products.Availability.LowStockWithQuantity";
pub const OUT_OF_STOCK: &str = "Products.Availability.OutOfStock";
pub const BACKORDERING: &str = "Products.Availability.Backordering";
pub const NO_COMBINATION: &str = "Products.Availability.SelectAttributes";

pub const PRICE_RANGE_FROM: &str = "Products.PriceRangeFrom";
pub const CALL_FOR_PRICE: &str = "Products.CallForPrice";
pub const BASE_PRICE: &str = "Products.BasePrice";

pub const SELECT_ATTRIBUTE: &str = "ShoppingCart.SelectAttribute";
pub const ENTER_ATTRIBUTE_VALUE: &str = "ShoppingCart.EnterAttributeValue";
pub const TEXTBOX_MINIMUM_LENGTH: &str = "ShoppingCart.TextboxMinimumLength";
pub const TEXTBOX_MAXIMUM_LENGTH: &str = "ShoppingCart.TextboxMaximumLength";
pub const ALLOWED_EXTENSIONS: &str = "ShoppingCart.AllowedExtensions";
pub const MAXIMUM_UPLOADED_FILE_SIZE: &str = "ShoppingCart.MaximumUploadedFileSize";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMessage {
    pub resource_key: String,
    pub args: Vec<String>,
}

impl ResourceMessage {
    pub fn new(resource_key: &str) -> Self {
        Self { resource_key: resource_key.to_owned(), args: Vec::new() }
    }

    pub fn with_args<I, S>(resource_key: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { resource_key: resource_key.to_owned(), args: args.into_iter().map(Into::into).collect() }
    }
}
