//! `docsortd worker`: a single classification worker loop.

use std::sync::Arc;

use tracing::info;

use crate::broker::{KvStore, RedisStore, TaskBroker};
use crate::classifier::{Classifier, HybridClassifier};
use crate::config::Settings;
use crate::worker::{Worker, WorkerConfig};

pub async fn run(settings: Arc<Settings>) -> anyhow::Result<()> {
    let store = RedisStore::connect(&settings.redis_url()).await?;
    let store: Arc<dyn KvStore> = Arc::new(store);

    let broker = Arc::new(TaskBroker::new(store, settings.task_ttl_secs));
    let classifier: Arc<dyn Classifier> = Arc::new(HybridClassifier::keyword_only());

    let worker = Worker::new(
        broker,
        classifier,
        WorkerConfig {
            worker_id: settings.worker_id.clone(),
            health_check_path: settings.health_check_path.clone(),
            health_check_interval: settings.health_check_interval,
            idle_threshold: settings.idle_threshold,
        },
    );

    let shutdown = worker.shutdown_handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received; finishing current task");
        shutdown();
    });

    worker.run().await;
    Ok(())
}
