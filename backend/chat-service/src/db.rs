use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use sqlx::{Pool, Postgres};

pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    let mut cfg =
        DbPoolConfig::from_env("chat-service").unwrap_or_else(|_| DbPoolConfig::default());
    if cfg.database_url.is_empty() {
        cfg.database_url = database_url.to_string();
    }
    cfg.service_name = "chat-service".to_string();
    let pool = create_pg_pool(cfg).await?;
    Ok(pool)
}
