//! Shared data types for the classification pipeline (§3 of the spec).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a task along its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusKind {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatusKind {
    /// True if `next` is a legal successor of `self` (or equal).
    ///
    /// pending -> processing -> {completed, failed}. No state may be
    /// skipped backward, and no terminal state transitions further.
    pub fn can_advance_to(self, next: TaskStatusKind) -> bool {
        use TaskStatusKind::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Processing)
                | (Processing, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Completed)
                | (Failed, Failed)
        )
    }
}

/// The durable status record for a task, keyed `task_status_<task_id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub task_id: String,
    pub filename: String,
    pub status: TaskStatusKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusRecord {
    pub fn pending(task_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            filename: filename.into(),
            status: TaskStatusKind::Pending,
            predicted_type: None,
            success: None,
            error: None,
        }
    }
}

/// The task-data record pushed onto the work queue and kept alongside
/// the status record, keyed `task_data_<task_id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub file_path: String,
    pub filename: String,
    pub result_queue: String,
    pub status: TaskStatusKind,
}

impl Task {
    /// Derive the result channel name for a task id (`results/<id>`).
    pub fn result_channel_for(task_id: &str) -> String {
        format!("results/{task_id}")
    }
}

/// A terminal outcome appended (at most once) to a task's result channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub predicted_type: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of the scaling controller's state, written to the
/// `worker_scaling_metrics` hash and read back by `/scaling/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingMetrics {
    pub current_worker_count: u32,
    pub min_workers: u32,
    pub max_workers: u32,
    pub queue_length: u64,
    pub worker_count: u32,
    pub timestamp: f64,
    pub last_scaling_time: f64,
}

/// A worker's self-reported health, written to the per-worker heartbeat
/// file every `health_check_interval`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHealth {
    pub worker_id: String,
    pub timestamp: DateTime<Utc>,
    pub idle_seconds: f64,
    pub status: WorkerHealthStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerHealthStatus {
    Healthy,
    Idle,
}

impl WorkerHealth {
    pub fn new(worker_id: impl Into<String>, idle_seconds: f64, idle_threshold: f64) -> Self {
        let status = if idle_seconds < idle_threshold {
            WorkerHealthStatus::Healthy
        } else {
            WorkerHealthStatus::Idle
        };
        Self {
            worker_id: worker_id.into(),
            timestamp: Utc::now(),
            idle_seconds,
            status,
        }
    }

    /// Render as the 4-line plain-text format in §6.
    pub fn to_plain_text(&self) -> String {
        format!(
            "worker_id: {}\ntimestamp: {}\nidle_seconds: {}\nstatus: {}\n",
            self.worker_id,
            self.timestamp.timestamp(),
            self.idle_seconds,
            match self.status {
                WorkerHealthStatus::Healthy => "healthy",
                WorkerHealthStatus::Idle => "idle",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_monotonicity() {
        use TaskStatusKind::*;
        assert!(Pending.can_advance_to(Processing));
        assert!(Processing.can_advance_to(Completed));
        assert!(Processing.can_advance_to(Failed));
        assert!(!Completed.can_advance_to(Processing));
        assert!(!Failed.can_advance_to(Completed));
        assert!(!Processing.can_advance_to(Pending));
    }

    #[test]
    fn result_channel_naming() {
        assert_eq!(Task::result_channel_for("abc"), "results/abc");
    }

    #[test]
    fn health_status_threshold() {
        let healthy = WorkerHealth::new("0", 10.0, 300.0);
        assert_eq!(healthy.status, WorkerHealthStatus::Healthy);
        let idle = WorkerHealth::new("0", 301.0, 300.0);
        assert_eq!(idle.status, WorkerHealthStatus::Idle);
    }
}
