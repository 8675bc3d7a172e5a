use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub identity_secret: String,
    pub cors_origins: Vec<String>,
    pub posts_per_page: i64,
    pub index_cache_ttl: Duration,
}

impl AppConfig {
    pub const DEFAULT_POSTS_PER_PAGE: i64 = 10;
    pub const DEFAULT_INDEX_CACHE_TTL_SECS: u64 = 20;

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let identity_secret = std::env::var("IDENTITY_SECRET")
            .map_err(|_| anyhow::anyhow!("IDENTITY_SECRET must be set"))?;
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
        );
        let posts_per_page = match std::env::var("POSTS_PER_PAGE") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid POSTS_PER_PAGE: {}", e))?,
            Err(_) => Self::DEFAULT_POSTS_PER_PAGE,
        };
        let index_cache_ttl = match std::env::var("INDEX_CACHE_TTL_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid INDEX_CACHE_TTL_SECS: {}", e))?,
            ),
            Err(_) => Duration::from_secs(Self::DEFAULT_INDEX_CACHE_TTL_SECS),
        };

        Ok(Self {
            host,
            port,
            database_url,
            identity_secret,
            cors_origins,
            posts_per_page,
            index_cache_ttl,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
