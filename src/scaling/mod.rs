//! Scaling Controller (C6, §4.6): a background loop that reads queue
//! depth and worker count, and adjusts replica count within bounds
//! with cooldown.

mod orchestrator;

pub use orchestrator::{LoggingOrchestrator, Orchestrator, OrchestratorError};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::broker::KvStore;
use crate::task::ScalingMetrics;

const TASK_QUEUE: &str = "classification_tasks";
const METRICS_KEY: &str = "worker_scaling_metrics";

pub struct ScalingConfig {
    pub min_workers: u32,
    pub max_workers: u32,
    pub worker_replicas: u32,
    pub queue_high_threshold: u64,
    pub queue_low_threshold: u64,
    pub scaling_interval: Duration,
    pub cooldown: Duration,
}

/// Runs the periodic scale-up/scale-down decision loop. `current` is
/// the controller's cached worker count (§5: "no shared in-process
/// mutable state other than ... the scaling controller's cached
/// `current_worker_count`, mutated only by its own loop").
pub struct ScalingController {
    store: Arc<dyn KvStore>,
    orchestrator: Arc<dyn Orchestrator>,
    config: ScalingConfig,
    current: AtomicU32,
    last_scaling_time: RwLock<f64>,
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl ScalingController {
    pub fn new(store: Arc<dyn KvStore>, orchestrator: Arc<dyn Orchestrator>, config: ScalingConfig) -> Self {
        let current = config.worker_replicas;
        Self {
            store,
            orchestrator,
            config,
            current: AtomicU32::new(current),
            // Start past cooldown, like the original source's
            // `last_scaling_time = time.time() - 120`, so the first
            // tick is free to scale.
            last_scaling_time: RwLock::new(now_secs() - 120.0),
        }
    }

    pub fn current_worker_count(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }

    /// Run forever, firing one scaling decision every
    /// `config.scaling_interval` until `shutdown` resolves.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.scaling_interval) => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }

    /// Worker-count discovery order (§4.6): (a) metrics hash
    /// `current_worker_count`; (b) environment `WORKER_REPLICAS`;
    /// (c) orchestrator enumeration of worker processes.
    pub async fn discover_worker_count(&self) -> u32 {
        if let Ok(metrics) = self.store.hash_get_all(METRICS_KEY).await {
            if let Some(count) = metrics
                .get("current_worker_count")
                .and_then(|v| v.parse::<f64>().ok())
            {
                return count as u32;
            }
        }
        if let Some(count) = std::env::var("WORKER_REPLICAS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            return count;
        }
        if let Ok(count) = self.orchestrator.worker_count().await {
            return count;
        }
        self.current_worker_count()
    }

    async fn queue_length(&self) -> u64 {
        self.store.list_length(TASK_QUEUE).await.unwrap_or(0)
    }

    /// One scaling decision: read signals, publish metrics, maybe
    /// scale (§4.6 steps 1-7).
    pub async fn tick(&self) {
        let queue_length = self.queue_length().await;
        let worker_count = self.discover_worker_count().await;
        let timestamp = now_secs();

        let metrics = ScalingMetrics {
            current_worker_count: self.current_worker_count(),
            min_workers: self.config.min_workers,
            max_workers: self.config.max_workers,
            queue_length,
            worker_count,
            timestamp,
            last_scaling_time: *self.last_scaling_time.read().await,
        };
        self.publish_metrics(&metrics).await;

        let last_scaling_time = *self.last_scaling_time.read().await;
        if timestamp - last_scaling_time < self.config.cooldown.as_secs_f64() {
            return;
        }

        if let Some(target) = self.decide(queue_length, worker_count) {
            self.apply(target, timestamp).await;
        }
    }

    /// Decide a scaling target, or `None` for no action (§4.6 step 4-5).
    fn decide(&self, queue_length: u64, worker_count: u32) -> Option<u32> {
        let current = self.current_worker_count();

        let target = if queue_length > self.config.queue_high_threshold
            && worker_count < self.config.max_workers
        {
            let bump = (queue_length / 10).max(1) as u32;
            (current + bump).min(self.config.max_workers)
        } else if queue_length < self.config.queue_low_threshold && worker_count > self.config.min_workers
        {
            current.saturating_sub(1)
        } else {
            return None;
        };

        let target = target.clamp(self.config.min_workers, self.config.max_workers);
        if target == current {
            None
        } else {
            Some(target)
        }
    }

    async fn apply(&self, target: u32, timestamp: f64) {
        info!(from = self.current_worker_count(), to = target, "scaling workers");

        if let Err(e) = self.orchestrator.set_replicas(target).await {
            // Orchestrator unavailable: still record the intended
            // target for external orchestration (§4.6 step 6).
            warn!(error = %e, target, "orchestrator unavailable; recording intent only");
        }

        self.current.store(target, Ordering::SeqCst);
        *self.last_scaling_time.write().await = timestamp;

        let _ = self
            .store
            .hash_set_many(
                METRICS_KEY,
                &[
                    ("current_worker_count".to_string(), target.to_string()),
                    ("last_scaling_time".to_string(), timestamp.to_string()),
                ],
            )
            .await;
    }

    async fn publish_metrics(&self, metrics: &ScalingMetrics) {
        let fields = vec![
            ("current_worker_count".to_string(), metrics.current_worker_count.to_string()),
            ("min_workers".to_string(), metrics.min_workers.to_string()),
            ("max_workers".to_string(), metrics.max_workers.to_string()),
            ("queue_length".to_string(), metrics.queue_length.to_string()),
            ("worker_count".to_string(), metrics.worker_count.to_string()),
            ("timestamp".to_string(), metrics.timestamp.to_string()),
            ("last_scaling_time".to_string(), metrics.last_scaling_time.to_string()),
        ];
        if let Err(e) = self.store.hash_set_many(METRICS_KEY, &fields).await {
            warn!(error = %e, "failed to publish scaling metrics");
        }
    }

    pub async fn metrics_snapshot(&self) -> ScalingMetrics {
        if let Ok(fields) = self.store.hash_get_all(METRICS_KEY).await {
            if !fields.is_empty() {
                let get = |k: &str| fields.get(k).and_then(|v| v.parse::<f64>().ok());
                return ScalingMetrics {
                    current_worker_count: get("current_worker_count")
                        .unwrap_or(self.current_worker_count() as f64) as u32,
                    min_workers: get("min_workers").unwrap_or(self.config.min_workers as f64) as u32,
                    max_workers: get("max_workers").unwrap_or(self.config.max_workers as f64) as u32,
                    queue_length: get("queue_length").unwrap_or(0.0) as u64,
                    worker_count: get("worker_count").unwrap_or(0.0) as u32,
                    timestamp: get("timestamp").unwrap_or_else(now_secs),
                    last_scaling_time: get("last_scaling_time").unwrap_or(0.0),
                };
            }
        }
        // Broker unreachable: fall back to the in-memory snapshot
        // (§4.5's `/scaling/status` contract: best-effort).
        ScalingMetrics {
            current_worker_count: self.current_worker_count(),
            min_workers: self.config.min_workers,
            max_workers: self.config.max_workers,
            queue_length: 0,
            worker_count: self.current_worker_count(),
            timestamp: now_secs(),
            last_scaling_time: 0.0,
        }
    }

    pub async fn set_worker_count(&self, target: u32) -> Result<(), OrchestratorError> {
        let timestamp = now_secs();
        self.orchestrator.set_replicas(target).await?;
        self.current.store(target, Ordering::SeqCst);
        *self.last_scaling_time.write().await = timestamp;
        let _ = self
            .store
            .hash_set_many(
                METRICS_KEY,
                &[
                    ("current_worker_count".to_string(), target.to_string()),
                    ("last_scaling_time".to_string(), timestamp.to_string()),
                ],
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::FakeStore;
    use crate::scaling::orchestrator::LoggingOrchestrator;

    fn controller(queue_len: u64) -> (ScalingController, Arc<FakeStore>) {
        let store = Arc::new(FakeStore::new());
        let config = ScalingConfig {
            min_workers: 2,
            max_workers: 10,
            worker_replicas: 3,
            queue_high_threshold: 20,
            queue_low_threshold: 5,
            scaling_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
        };
        let controller = ScalingController::new(store.clone(), Arc::new(LoggingOrchestrator), config);
        let _ = queue_len;
        (controller, store)
    }

    #[tokio::test]
    async fn scale_up_under_load_stays_within_bounds() {
        let (controller, store) = controller(0);
        for i in 0..25 {
            store
                .list_push_left("classification_tasks", &format!("task-{i}"))
                .await
                .unwrap();
        }

        controller.tick().await;

        let count = controller.current_worker_count();
        assert!((4..=10).contains(&count), "got {count}");
    }

    #[tokio::test]
    async fn scale_down_on_idle_queue() {
        let store = Arc::new(FakeStore::new());
        let config = ScalingConfig {
            min_workers: 2,
            max_workers: 10,
            worker_replicas: 5,
            queue_high_threshold: 20,
            queue_low_threshold: 5,
            scaling_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
        };
        let controller = ScalingController::new(store, Arc::new(LoggingOrchestrator), config);

        controller.tick().await;

        assert_eq!(controller.current_worker_count(), 4);
    }

    #[tokio::test]
    async fn respects_min_max_bounds() {
        let store = Arc::new(FakeStore::new());
        let config = ScalingConfig {
            min_workers: 2,
            max_workers: 10,
            worker_replicas: 2,
            queue_high_threshold: 20,
            queue_low_threshold: 5,
            scaling_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
        };
        let controller = ScalingController::new(store, Arc::new(LoggingOrchestrator), config);

        // queue empty, already at min -> no scale-down below min.
        controller.tick().await;
        assert_eq!(controller.current_worker_count(), 2);
    }

    #[tokio::test]
    async fn cooldown_blocks_a_second_scaling_action() {
        let store = Arc::new(FakeStore::new());
        let config = ScalingConfig {
            min_workers: 2,
            max_workers: 10,
            worker_replicas: 5,
            queue_high_threshold: 20,
            queue_low_threshold: 5,
            scaling_interval: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
        };
        let controller = ScalingController::new(store, Arc::new(LoggingOrchestrator), config);

        controller.tick().await;
        assert_eq!(controller.current_worker_count(), 4);

        // Immediately ticking again should be blocked by cooldown.
        controller.tick().await;
        assert_eq!(controller.current_worker_count(), 4);
    }
}
