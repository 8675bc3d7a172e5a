use std::sync::Arc;

use groupblog_server::application::pagination::Paginator;
use groupblog_server::infrastructure::cache::ListingCache;
use groupblog_server::infrastructure::config::AppConfig;
use groupblog_server::infrastructure::database::{create_pool, run_migrations};
use groupblog_server::infrastructure::logging::init_logging;
use groupblog_server::infrastructure::security::JwtKeys;
use groupblog_server::server::{AppServices, Repositories, start_rest_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let paginator = Paginator::new(config.posts_per_page)?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let services = AppServices::new(
        Repositories::postgres(pool),
        paginator,
        Arc::new(ListingCache::new()),
        config.index_cache_ttl,
        JwtKeys::new(config.identity_secret.clone()),
    );

    start_rest_server(config, services).await
}
