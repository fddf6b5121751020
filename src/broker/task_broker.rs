//! Task Broker (C2, §4.2): enqueues tasks, maintains per-task status,
//! and publishes results onto per-task result channels.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::task::{ResultRecord, StatusRecord, Task, TaskStatusKind};

use super::kvstore::{BrokerError, KvStore, Result};

const TASK_QUEUE: &str = "classification_tasks";

fn status_key(task_id: &str) -> String {
    format!("task_status_{task_id}")
}

fn data_key(task_id: &str) -> String {
    format!("task_data_{task_id}")
}

pub struct TaskBroker {
    store: Arc<dyn KvStore>,
    ttl_secs: u64,
}

impl TaskBroker {
    pub fn new(store: Arc<dyn KvStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// Mint a task, durably record pending status, and enqueue it.
    ///
    /// The two TTL writes precede the list push so a fast worker that
    /// pops and reads the status record always finds it (§4.2).
    pub async fn submit(&self, file_path: &str, filename: &str) -> Result<(String, String)> {
        let task_id = Uuid::new_v4().to_string();
        let result_queue = Task::result_channel_for(&task_id);

        let status = StatusRecord::pending(&task_id, filename);
        let status_json = serde_json::to_string(&status)?;
        self.store
            .kv_set_with_ttl(&status_key(&task_id), &status_json, self.ttl_secs)
            .await?;

        let task = Task {
            task_id: task_id.clone(),
            file_path: file_path.to_string(),
            filename: filename.to_string(),
            result_queue: result_queue.clone(),
            status: TaskStatusKind::Pending,
        };
        let task_json = serde_json::to_string(&task)?;
        self.store
            .kv_set_with_ttl(&data_key(&task_id), &task_json, self.ttl_secs)
            .await?;

        self.store.list_push_left(TASK_QUEUE, &task_json).await?;

        Ok((task_id, result_queue))
    }

    /// Block up to `timeout` for the next task, from the tail of the
    /// queue (so a single producer pushing left and a single consumer
    /// popping right gives FIFO order).
    pub async fn claim_next(&self, timeout: Duration) -> Result<Option<Task>> {
        let raw = self
            .store
            .list_blocking_pop_right(TASK_QUEUE, timeout)
            .await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let task: Task = serde_json::from_str(&raw)?;

        if let Err(e) = self
            .transition_status(&task.task_id, TaskStatusKind::Processing, None, None, None)
            .await
        {
            // At-least-once delivery: a missing/expired status record
            // does not fail the claim (§4.2).
            warn!(
                task_id = %task.task_id,
                error = %e,
                "status record missing on claim; returning task anyway"
            );
        }

        Ok(Some(task))
    }

    /// Publish a terminal outcome: append to the result channel and
    /// advance the status record. Both writes are attempted even if
    /// the status update fails (§4.2).
    pub async fn publish_result(
        &self,
        task: &Task,
        predicted_type: &str,
        success: bool,
        error: Option<String>,
    ) -> Result<()> {
        let next_status = if success {
            TaskStatusKind::Completed
        } else {
            TaskStatusKind::Failed
        };

        let status_result = self
            .transition_status(
                &task.task_id,
                next_status,
                Some(predicted_type.to_string()),
                Some(success),
                error.clone(),
            )
            .await;

        let result = ResultRecord {
            predicted_type: predicted_type.to_string(),
            success,
            error,
        };
        let result_json = serde_json::to_string(&result)?;
        self.store
            .list_push_right(&task.result_queue, &result_json)
            .await?;

        status_result
    }

    pub async fn ping_store(&self) -> Result<()> {
        self.store.ping().await
    }

    pub async fn get_status(&self, task_id: &str) -> Result<Option<StatusRecord>> {
        let raw = self.store.kv_get(&status_key(task_id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn transition_status(
        &self,
        task_id: &str,
        status: TaskStatusKind,
        predicted_type: Option<String>,
        success: Option<bool>,
        error: Option<String>,
    ) -> Result<()> {
        let raw = self
            .store
            .kv_get(&status_key(task_id))
            .await?
            .ok_or_else(|| BrokerError::NotFound(task_id.to_string()))?;
        let mut record: StatusRecord = serde_json::from_str(&raw)?;

        if !record.status.can_advance_to(status) {
            warn!(
                task_id,
                from = ?record.status,
                to = ?status,
                "ignoring illegal status transition"
            );
            return Ok(());
        }

        record.status = status;
        if predicted_type.is_some() {
            record.predicted_type = predicted_type;
        }
        if success.is_some() {
            record.success = success;
        }
        if error.is_some() {
            record.error = error;
        }

        let updated = serde_json::to_string(&record)?;
        self.store
            .kv_set_with_ttl(&status_key(task_id), &updated, self.ttl_secs)
            .await
    }
}
