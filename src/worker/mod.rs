//! Worker (C4, §4.4): a long-running consumer that pops tasks,
//! classifies them, and reports results.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::broker::TaskBroker;
use crate::classifier::Classifier;
use crate::task::WorkerHealth;

const CLAIM_TIMEOUT: Duration = Duration::from_secs(1);
const BROKER_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct WorkerConfig {
    pub worker_id: String,
    pub health_check_path: PathBuf,
    pub health_check_interval: Duration,
    pub idle_threshold: Duration,
}

/// A single classification worker: one task in flight at a time, with
/// a background heartbeat activity (§5).
pub struct Worker {
    broker: Arc<TaskBroker>,
    classifier: Arc<dyn Classifier>,
    config: WorkerConfig,
    running: Arc<AtomicBool>,
    last_processed: Arc<Mutex<Instant>>,
}

impl Worker {
    pub fn new(broker: Arc<TaskBroker>, classifier: Arc<dyn Classifier>, config: WorkerConfig) -> Self {
        Self {
            broker,
            classifier,
            config,
            running: Arc::new(AtomicBool::new(true)),
            last_processed: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// A handle that, when invoked, asks the worker loop to exit after
    /// its current task. There is no requeue on shutdown (§4.4).
    pub fn shutdown_handle(&self) -> impl Fn() + Send + Sync + 'static {
        let running = self.running.clone();
        move || running.store(false, Ordering::SeqCst)
    }

    /// Run the consume/classify/report loop until shutdown is
    /// signaled. Spawns the health heartbeat as a background task.
    pub async fn run(&self) {
        let health_task = self.spawn_health_heartbeat();

        while self.running.load(Ordering::SeqCst) {
            match self.broker.claim_next(CLAIM_TIMEOUT).await {
                Ok(Some(task)) => {
                    *self.last_processed.lock().await = Instant::now();
                    self.process_task(&task).await;
                }
                Ok(None) => continue,
                Err(e) => {
                    error!(error = %e, "broker error while claiming task; retrying");
                    tokio::time::sleep(BROKER_RETRY_DELAY).await;
                }
            }
        }

        health_task.abort();
    }

    /// Process a single claimed task: classify, publish the terminal
    /// outcome, and unlink the staged file. `pub(crate)` so callers
    /// driving one claim/classify/publish cycle in isolation (e.g.
    /// the ingest API's own end-to-end tests) can invoke it without
    /// running the full consume loop.
    pub(crate) async fn process_task(&self, task: &crate::task::Task) {
        info!(task_id = %task.task_id, "processing task");

        match self.classify_staged_file(&task.file_path).await {
            Ok(label) => {
                if let Err(e) = self.broker.publish_result(task, &label, true, None).await {
                    error!(task_id = %task.task_id, error = %e, "failed to publish result");
                }
                info!(task_id = %task.task_id, label = %label, "task completed");
            }
            Err(message) => {
                if let Err(e) = self
                    .broker
                    .publish_result(task, "unknown", false, Some(message.clone()))
                    .await
                {
                    error!(task_id = %task.task_id, error = %e, "failed to publish failure result");
                }
                error!(task_id = %task.task_id, error = %message, "task failed");
            }
        }

        self.cleanup_staged_file(&task.file_path).await;
    }

    /// Resolve the staged file path (trying the container-mount
    /// compatibility prefix) and classify it.
    async fn classify_staged_file(&self, file_path: &str) -> Result<String, String> {
        let resolved = self.resolve_path(file_path).await?;
        self.classifier
            .classify(&resolved)
            .await
            .map_err(|e| e.to_string())
    }

    async fn resolve_path(&self, file_path: &str) -> Result<PathBuf, String> {
        let direct = Path::new(file_path);
        if tokio::fs::try_exists(direct).await.unwrap_or(false) {
            return Ok(direct.to_path_buf());
        }
        let prefixed = Path::new("/app").join(file_path);
        if tokio::fs::try_exists(&prefixed).await.unwrap_or(false) {
            return Ok(prefixed);
        }
        Err(format!(
            "file not found at {file_path} or {}",
            prefixed.display()
        ))
    }

    async fn cleanup_staged_file(&self, file_path: &str) {
        if let Err(e) = tokio::fs::remove_file(file_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(file_path, error = %e, "failed to remove staged file");
            }
        }
    }

    fn spawn_health_heartbeat(&self) -> tokio::task::JoinHandle<()> {
        let worker_id = self.config.worker_id.clone();
        let path = self.config.health_check_path.clone();
        let interval = self.config.health_check_interval;
        let idle_threshold = self.config.idle_threshold.as_secs_f64();
        let last_processed = self.last_processed.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let idle_seconds = last_processed.lock().await.elapsed().as_secs_f64();
                let health = WorkerHealth::new(worker_id.clone(), idle_seconds, idle_threshold);
                if let Err(e) = tokio::fs::write(&path, health.to_plain_text()).await {
                    warn!(error = %e, "failed to write health check file");
                }
                tokio::time::sleep(interval).await;
            }
        })
    }
}
