use crate::{config::Config, redis_client::RedisClient, services::storage::ObjectStorage};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub redis: RedisClient,
    pub config: Arc<Config>,
    /// Attachment store; None when the deployment has no object store
    /// configured (attachment endpoints then fail with a server error)
    pub storage: Option<Arc<ObjectStorage>>,
}
