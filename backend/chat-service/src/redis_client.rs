use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Thin wrapper around a multiplexed Redis connection. All ephemeral state
/// (typing signals, presence heartbeats) goes through here.
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
}

impl RedisClient {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> redis::RedisResult<()> {
        let mut conn = self.manager.clone();
        conn.set_ex(key, value, ttl_seconds).await
    }

    pub async fn get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key).await
    }

    pub async fn del(&self, key: &str) -> redis::RedisResult<()> {
        let mut conn = self.manager.clone();
        conn.del(key).await
    }

    /// MGET; preserves input order, None for absent keys
    pub async fn mget(&self, keys: &[String]) -> redis::RedisResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.manager.clone();
        conn.mget(keys).await
    }

    /// Non-blocking keyspace scan for a match pattern
    pub async fn scan_match(&self, pattern: &str) -> redis::RedisResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let mut keys = Vec::new();
        let mut iter: redis::AsyncIter<String> = conn.scan_match(pattern).await?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}
