use std::sync::Arc;

use chat_service::{
    config, db, error, logging, migrations, redis_client::RedisClient, routes,
    services::storage::build_storage, state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let db = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    // Run embedded migrations (idempotent). Failures are fatal: the schema
    // must be in sync before the first request.
    migrations::run_all(&db)
        .await
        .map_err(|e| error::AppError::StartServer(format!("database migrations failed: {e}")))?;

    let redis = RedisClient::connect(&cfg.redis_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("redis: {e}")))?;

    let storage = match cfg.s3.as_ref() {
        Some(s3_cfg) => {
            let storage = build_storage(
                s3_cfg,
                cfg.upload_url_ttl_seconds,
                cfg.download_url_ttl_seconds,
            )
            .await?;
            Some(Arc::new(storage))
        }
        None => {
            tracing::warn!("no object store configured; attachment endpoints disabled");
            None
        }
    };

    let state = AppState {
        db,
        redis,
        config: cfg.clone(),
        storage,
    };

    let app = routes::build_router(&state).with_state(state);

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting chat-service");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}
