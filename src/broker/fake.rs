//! In-memory [`KvStore`] used by tests in place of a live Redis, the
//! way the teacher tests its repositories against a temp SQLite file
//! instead of a live Postgres instance.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::kvstore::{KvStore, Result};

#[derive(Default)]
struct Inner {
    lists: HashMap<String, VecDeque<String>>,
    kv: HashMap<String, (String, Option<Instant>)>,
    hashes: HashMap<String, HashMap<String, String>>,
}

/// A process-local, non-persistent stand-in for the Redis broker.
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<Inner>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[async_trait]
impl KvStore for FakeStore {
    async fn list_push_left(&self, name: &str, payload: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .lists
            .entry(name.to_string())
            .or_default()
            .push_front(payload.to_string());
        Ok(())
    }

    async fn list_push_right(&self, name: &str, payload: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .lists
            .entry(name.to_string())
            .or_default()
            .push_back(payload.to_string());
        Ok(())
    }

    async fn list_blocking_pop_left(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        self.blocking_pop(name, timeout, true).await
    }

    async fn list_blocking_pop_right(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        self.blocking_pop(name, timeout, false).await
    }

    async fn list_length(&self, name: &str) -> Result<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.lists.get(name).map(|l| l.len()).unwrap_or(0) as u64)
    }

    async fn kv_set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let expiry = Instant::now() + Duration::from_secs(ttl_secs);
        inner
            .kv
            .insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(())
    }

    async fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.lock().await;
        if let Some((value, expiry)) = inner.kv.get(key).cloned() {
            if expiry.map(|e| Instant::now() < e).unwrap_or(true) {
                return Ok(Some(value));
            }
            inner.kv.remove(key);
        }
        Ok(None)
    }

    async fn kv_delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.kv.remove(key);
        Ok(())
    }

    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let entry = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            entry.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

impl FakeStore {
    async fn blocking_pop(
        &self,
        name: &str,
        timeout: Duration,
        from_left: bool,
    ) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut inner = self.inner.lock().await;
                if let Some(list) = inner.lists.get_mut(name) {
                    let popped = if from_left {
                        list.pop_front()
                    } else {
                        list.pop_back()
                    };
                    if popped.is_some() {
                        return Ok(popped);
                    }
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL_INTERVAL.min(deadline - Instant::now())).await;
        }
    }
}
