//! The key/value + list capability set (C1, §4.1).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("record not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, BrokerError>;

/// A capability-set over a remote key/value + list store, providing
/// atomic list push/pop-blocking and keyed record set/get with TTL.
///
/// All operations fail with `BrokerError::BackendUnavailable` when the
/// remote store is unreachable; callers surface this as a
/// 503-equivalent (§4.1).
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn list_push_left(&self, name: &str, payload: &str) -> Result<()>;
    async fn list_push_right(&self, name: &str, payload: &str) -> Result<()>;
    async fn list_blocking_pop_left(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>>;
    async fn list_blocking_pop_right(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>>;
    async fn list_length(&self, name: &str) -> Result<u64>;

    async fn kv_set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
    async fn kv_get(&self, key: &str) -> Result<Option<String>>;
    async fn kv_delete(&self, key: &str) -> Result<()>;

    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> Result<()>;
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn ping(&self) -> Result<()>;
}
