use storefront_core::catalog::assembler::ProductDetailAssembler;
use storefront_core::config::AppConfig;
use storefront_core::domain::product::ProductId;
use storefront_core::errors::{ApplicationError, DomainError};

use crate::commands::{runtime, CatalogArgs, CommandResult, ContextArgs, Session};

pub fn run(config: &AppConfig, catalog: &CatalogArgs, context: &ContextArgs, product_id: &str) -> CommandResult {
    let session = match Session::open(config, catalog) {
        Ok(session) => session,
        Err(error) => return CommandResult::failure("detail", "catalog_load", format!("{error:#}"), 2),
    };
    let form = match context.attribute_form() {
        Ok(form) => form,
        Err(error) => return CommandResult::from_application_error("detail", error.into()),
    };
    let runtime = match runtime("detail") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let selection_context = context.selection_context();
    let assembler = ProductDetailAssembler::new(session.collaborators, session.settings);
    let posted = (!context.attributes.is_empty()).then_some(&form);
    let result = runtime.block_on(async {
        assembler
            .prepare_by_id(&ProductId(product_id.to_string()), posted, &selection_context)
            .await
            .map_err(ApplicationError::from)?
            .ok_or_else(|| {
                ApplicationError::from(DomainError::ProductNotFound { product_id: product_id.to_string() })
            })
    });

    match result {
        Ok(model) => {
            let message = format!("detail model prepared for {}", model.product_id.0);
            CommandResult::success_with_data("detail", message, model)
        }
        Err(error) => CommandResult::from_application_error("detail", error),
    }
}
