//! Configuration management for docsort.
//!
//! Settings are loaded once at startup from environment variables (with
//! `.env` support via `dotenvy`, loaded by `main` before this runs).
//! There is no durable config store: every field has a typed default
//! matching `SPEC_FULL.md` §D.

use std::path::PathBuf;
use std::time::Duration;

/// Resolved runtime configuration, shared by both the `serve` and
/// `worker` subcommands.
#[derive(Debug, Clone)]
pub struct Settings {
    pub redis_host: String,
    pub redis_port: u16,

    pub min_workers: u32,
    pub max_workers: u32,
    pub worker_replicas: u32,
    pub queue_high_threshold: u64,
    pub queue_low_threshold: u64,
    pub scaling_interval: Duration,
    pub cooldown: Duration,

    pub worker_id: String,
    pub shared_tmp_dir: PathBuf,
    pub task_ttl_secs: u64,
    pub max_upload_bytes: u64,
    pub health_check_path: PathBuf,
    pub health_check_interval: Duration,
    pub idle_threshold: Duration,
    pub bind_addr: String,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    /// Load settings from the process environment, falling back to the
    /// defaults in `SPEC_FULL.md` §D for anything unset or unparsable.
    pub fn from_env() -> Self {
        let redis_host = env_var("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
        let redis_port = env_parse("REDIS_PORT", 6379u16);

        let min_workers = env_parse("MIN_WORKERS", 2u32);
        let max_workers = env_parse("MAX_WORKERS", 10u32);
        let worker_replicas = env_parse("WORKER_REPLICAS", 3u32);
        let queue_high_threshold = env_parse("QUEUE_HIGH_THRESHOLD", 20u64);
        let queue_low_threshold = env_parse("QUEUE_LOW_THRESHOLD", 5u64);

        let worker_id = env_var("WORKER_ID").unwrap_or_else(|| "0".to_string());

        Self {
            redis_host,
            redis_port,
            min_workers,
            max_workers,
            worker_replicas,
            queue_high_threshold,
            queue_low_threshold,
            scaling_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
            worker_id,
            shared_tmp_dir: PathBuf::from("files/temp"),
            task_ttl_secs: 86_400,
            max_upload_bytes: 50 * 1024 * 1024,
            health_check_path: PathBuf::from("/app/worker_healthcheck.txt"),
            health_check_interval: Duration::from_secs(10),
            idle_threshold: Duration::from_secs(300),
            bind_addr: env_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
        }
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis_host, self.redis_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        // SAFETY-free: clears only the vars this test touches, and only
        // within the single-threaded test process.
        for key in ["MIN_WORKERS", "MAX_WORKERS", "WORKER_REPLICAS"] {
            std::env::remove_var(key);
        }
        let settings = Settings::from_env();
        assert_eq!(settings.min_workers, 2);
        assert_eq!(settings.max_workers, 10);
        assert_eq!(settings.worker_replicas, 3);
        assert_eq!(settings.queue_high_threshold, 20);
        assert_eq!(settings.queue_low_threshold, 5);
    }

    #[test]
    fn redis_url_format() {
        let mut s = Settings::from_env();
        s.redis_host = "cache".to_string();
        s.redis_port = 7000;
        assert_eq!(s.redis_url(), "redis://cache:7000");
    }
}
