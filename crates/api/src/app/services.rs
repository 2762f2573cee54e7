use std::sync::Arc;

use sqlx::PgPool;

use gearshop_infra::store::{
    CartStore, CatalogStore, InMemoryCartStore, InMemoryCatalogStore, PostgresCartStore,
    PostgresCatalogStore,
};
use gearshop_infra::{CartAggregator, CheckoutOrchestrator, ProductCatalog};

/// The service set handed to every request handler.
pub struct AppServices {
    pub catalog: ProductCatalog<Arc<dyn CatalogStore>>,
    pub carts: CartAggregator<Arc<dyn CatalogStore>, Arc<dyn CartStore>>,
    pub checkout: CheckoutOrchestrator<Arc<dyn CatalogStore>>,
}

/// Build the services against the configured store.
///
/// `DATABASE_URL` selects the Postgres-backed stores (migrations run on
/// startup); without it the in-memory stores are used (dev/test).
pub async fn build_services() -> anyhow::Result<AppServices> {
    let (catalog_store, cart_store): (Arc<dyn CatalogStore>, Arc<dyn CartStore>) =
        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                let pool = PgPool::connect(&url).await?;
                sqlx::migrate!("../../migrations").run(&pool).await?;
                tracing::info!("using postgres-backed stores");
                (
                    Arc::new(PostgresCatalogStore::new(pool.clone())),
                    Arc::new(PostgresCartStore::new(pool)),
                )
            }
            Err(_) => {
                tracing::info!("DATABASE_URL not set; using in-memory stores");
                (
                    Arc::new(InMemoryCatalogStore::new()),
                    Arc::new(InMemoryCartStore::new()),
                )
            }
        };

    Ok(AppServices {
        catalog: ProductCatalog::new(catalog_store.clone()),
        carts: CartAggregator::new(catalog_store.clone(), cart_store),
        checkout: CheckoutOrchestrator::new(catalog_store),
    })
}
