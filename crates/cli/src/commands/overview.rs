use storefront_core::catalog::assembler::ProductOverviewAssembler;
use storefront_core::config::AppConfig;
use storefront_core::domain::product::ProductId;
use storefront_core::errors::ApplicationError;

use crate::commands::{runtime, CatalogArgs, CommandResult, ContextArgs, Session};

pub fn run(
    config: &AppConfig,
    catalog: &CatalogArgs,
    context: &ContextArgs,
    product_ids: &[String],
) -> CommandResult {
    let session = match Session::open(config, catalog) {
        Ok(session) => session,
        Err(error) => return CommandResult::failure("overview", "catalog_load", format!("{error:#}"), 2),
    };
    let runtime = match runtime("overview") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let selection_context = context.selection_context();
    let assembler = ProductOverviewAssembler::new(session.collaborators, session.settings);
    let result = runtime.block_on(async {
        let models = if product_ids.is_empty() {
            let products = session.catalog.list().await;
            assembler.prepare(&products, &selection_context).await
        } else {
            let ids: Vec<ProductId> = product_ids.iter().cloned().map(ProductId).collect();
            assembler.prepare_by_ids(&ids, &selection_context).await
        };
        models.map_err(ApplicationError::from)
    });

    match result {
        Ok(models) => {
            let message = format!("{} overview model(s) prepared", models.len());
            CommandResult::success_with_data("overview", message, models)
        }
        Err(error) => CommandResult::from_application_error("overview", error),
    }
}
