//! Key-Value Broker Client (C1) and Task Broker (C2).
//!
//! `kvstore` defines the thin capability set over a remote key/value +
//! list store (§4.1); `redis_store` backs it with Redis, the way the
//! teacher's `rate_limit::redis` module backs its rate limiter state.
//! `fake` is an in-memory stand-in used by tests. `task_broker` builds
//! the durable task/status protocol (§4.2) on top of either.

mod fake;
mod kvstore;
mod redis_store;
mod task_broker;

pub use fake::FakeStore;
pub use kvstore::{BrokerError, KvStore};
pub use redis_store::RedisStore;
pub use task_broker::TaskBroker;
