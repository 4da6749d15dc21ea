use storefront_core::catalog::assembler::ProductDetailAssembler;
use storefront_core::catalog::collaborators::CatalogReader;
use storefront_core::config::AppConfig;
use storefront_core::domain::product::ProductId;
use storefront_core::errors::{ApplicationError, DomainError};

use crate::commands::{runtime, CatalogArgs, CommandResult, ContextArgs, Session};

pub fn run(config: &AppConfig, catalog: &CatalogArgs, context: &ContextArgs, product_id: &str) -> CommandResult {
    let session = match Session::open(config, catalog) {
        Ok(session) => session,
        Err(error) => {
            return CommandResult::failure("attribute-change", "catalog_load", format!("{error:#}"), 2)
        }
    };
    let form = match context.attribute_form() {
        Ok(form) => form,
        Err(error) => return CommandResult::from_application_error("attribute-change", error.into()),
    };
    let runtime = match runtime("attribute-change") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let selection_context = context.selection_context();
    let assembler = ProductDetailAssembler::new(session.collaborators, session.settings);
    let result = runtime.block_on(async {
        let product = session
            .catalog
            .product_by_id(&ProductId(product_id.to_string()))
            .await
            .map_err(ApplicationError::from)?
            .ok_or_else(|| DomainError::ProductNotFound { product_id: product_id.to_string() })?;
        assembler.attribute_change(&product, &form, &selection_context).await.map_err(ApplicationError::from)
    });

    match result {
        Ok(change) => {
            let message = match &change.combination_id {
                Some(id) => format!("selection matches combination {}", id.0),
                None => "selection matches no combination".to_string(),
            };
            CommandResult::success_with_data("attribute-change", message, change)
        }
        Err(error) => CommandResult::from_application_error("attribute-change", error),
    }
}
