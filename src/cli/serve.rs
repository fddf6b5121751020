//! `docsortd serve`: the ingest API plus the scaling controller loop.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::api::{build_router, AppState};
use crate::broker::{KvStore, RedisStore, TaskBroker};
use crate::config::Settings;
use crate::scaling::{LoggingOrchestrator, ScalingConfig, ScalingController};

pub async fn run(settings: Arc<Settings>) -> anyhow::Result<()> {
    let store = RedisStore::connect(&settings.redis_url()).await?;
    let store: Arc<dyn KvStore> = Arc::new(store);

    let broker = Arc::new(TaskBroker::new(store.clone(), settings.task_ttl_secs));

    let scaling_config = ScalingConfig {
        min_workers: settings.min_workers,
        max_workers: settings.max_workers,
        worker_replicas: settings.worker_replicas,
        queue_high_threshold: settings.queue_high_threshold,
        queue_low_threshold: settings.queue_low_threshold,
        scaling_interval: settings.scaling_interval,
        cooldown: settings.cooldown,
    };
    let scaling = Arc::new(ScalingController::new(
        store,
        Arc::new(LoggingOrchestrator),
        scaling_config,
    ));

    let state = AppState {
        broker,
        scaling: scaling.clone(),
        shared_tmp_dir: settings.shared_tmp_dir.clone(),
        max_upload_bytes: settings.max_upload_bytes,
    };
    let app = build_router(state);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scaling_loop = scaling.clone();
    let scaling_handle = tokio::spawn(async move {
        scaling_loop.run(shutdown_rx).await;
    });

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, "listening");

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = scaling_handle.await {
        error!(error = %e, "scaling controller task panicked");
    }

    serve_result.map_err(Into::into)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
