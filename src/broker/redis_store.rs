//! Redis-backed implementation of [`KvStore`].
//!
//! Uses `redis::aio::ConnectionManager` for automatic reconnection, the
//! same approach the teacher's `rate_limit::redis::RedisRateLimitBackend`
//! takes for its distributed rate-limit state.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use super::kvstore::{BrokerError, KvStore, Result};

#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| BrokerError::BackendUnavailable(e.to_string()))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| BrokerError::BackendUnavailable(e.to_string()))?;
        Ok(Self { conn })
    }
}

fn unavailable(e: redis::RedisError) -> BrokerError {
    BrokerError::BackendUnavailable(e.to_string())
}

#[async_trait]
impl KvStore for RedisStore {
    async fn list_push_left(&self, name: &str, payload: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(name, payload)
            .await
            .map_err(unavailable)
    }

    async fn list_push_right(&self, name: &str, payload: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(name, payload)
            .await
            .map_err(unavailable)
    }

    async fn list_blocking_pop_left(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let result: Option<(String, String)> = conn
            .blpop(name, timeout.as_secs_f64())
            .await
            .map_err(unavailable)?;
        Ok(result.map(|(_, value)| value))
    }

    async fn list_blocking_pop_right(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let result: Option<(String, String)> = conn
            .brpop(name, timeout.as_secs_f64())
            .await
            .map_err(unavailable)?;
        Ok(result.map(|(_, value)| value))
    }

    async fn list_length(&self, name: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        conn.llen(name).await.map_err(unavailable)
    }

    async fn kv_set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(unavailable)
    }

    async fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(unavailable)
    }

    async fn kv_delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(unavailable)
    }

    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset_multiple::<_, _, _, ()>(key, fields)
            .await
            .map_err(unavailable)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        conn.hgetall(key).await.map_err(unavailable)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
    }
}
