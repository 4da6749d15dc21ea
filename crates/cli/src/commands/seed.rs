use storefront_db::{DemoCatalog, InMemoryCatalogRepository};

use crate::commands::{runtime, CommandResult};

pub fn run() -> CommandResult {
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let repository = InMemoryCatalogRepository::default();
        let seeded = DemoCatalog::load(&repository)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let stored = repository.len().await;
        if stored != seeded.products {
            return Err((
                "seed_verification",
                format!("seeded {} products but the catalog holds {stored}", seeded.products),
                6u8,
            ));
        }
        Ok(seeded)
    });

    match result {
        Ok(seeded) => {
            let lines: Vec<String> = seeded.product_ids.iter().map(|id| format!("  - {id}")).collect();
            let message = format!("demo catalog loaded with {} products:\n{}", seeded.products, lines.join("\n"));
            CommandResult::success("seed", message)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
