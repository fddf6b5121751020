//! HTTP request handlers for the ingest API (§4.5).

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use super::error::ApiError;
use super::state::{AppState, ALLOWED_EXTENSIONS, MAX_FILE_SIZE};

#[derive(Serialize)]
pub struct ClassifyResponse {
    task_id: String,
    filename: String,
    status: &'static str,
}

fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// `POST /classify_file`: validate, stage, and enqueue an upload
/// (§4.5's upload pipeline).
pub async fn classify_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let field = loop {
        let next = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?;
        match next {
            Some(field) if field.name() == Some("file") || field.file_name().is_some() => {
                break field
            }
            Some(_) => continue,
            None => {
                return Err(ApiError::validation("No file provided in request"));
            }
        }
    };

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::validation("No filename provided"))?;

    let ext = extension_of(&filename)
        .ok_or_else(|| ApiError::unsupported_media_type(unsupported_message()))?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::unsupported_media_type(unsupported_message()));
    }

    let content = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;

    if content.len() as u64 > state.max_upload_bytes.min(MAX_FILE_SIZE) {
        return Err(ApiError::payload_too_large(format!(
            "File too large. Maximum size: {} MB",
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }

    tokio::fs::create_dir_all(&state.shared_tmp_dir)
        .await
        .map_err(|e| ApiError::internal(format!("failed to create staging directory: {e}")))?;

    let staged_name = format!("{}_{filename}", Uuid::new_v4());
    let staged_path = state.shared_tmp_dir.join(&staged_name);

    tokio::fs::write(&staged_path, &content)
        .await
        .map_err(|e| ApiError::internal(format!("failed to stage upload: {e}")))?;

    info!(path = %staged_path.display(), "staged upload");

    let submit_result = state
        .broker
        .submit(staged_path.to_string_lossy().as_ref(), &filename)
        .await;

    let (task_id, _) = match submit_result {
        Ok(ok) => ok,
        Err(e) => {
            let _ = tokio::fs::remove_file(&staged_path).await;
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(ClassifyResponse {
            task_id,
            filename,
            status: "pending",
        }),
    ))
}

fn unsupported_message() -> String {
    format!(
        "Unsupported file type. Allowed types: {}",
        ALLOWED_EXTENSIONS
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

/// `GET /classification/{task_id}`.
pub async fn get_classification_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if task_id.len() < 10 {
        return Err(ApiError::bad_request("Invalid task ID format"));
    }

    let status = state.broker.get_status(&task_id).await?;
    match status {
        Some(status) => Ok(Json(status)),
        None => Err(ApiError::not_found(format!(
            "Task with ID {task_id} not found or has expired"
        ))),
    }
}

#[derive(Serialize)]
struct WorkerComponent {
    status: &'static str,
    count: u32,
}

#[derive(Serialize)]
struct Components {
    api: &'static str,
    redis: &'static str,
    workers: WorkerComponent,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    components: Components,
}

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.broker.ping_store().await {
        Ok(()) => {
            let worker_count = state.scaling.current_worker_count();
            let overall = if worker_count > 0 { "healthy" } else { "degraded" };
            (
                StatusCode::OK,
                Json(HealthResponse {
                    status: overall,
                    components: Components {
                        api: "up",
                        redis: "up",
                        workers: WorkerComponent {
                            status: if worker_count > 0 { "up" } else { "down" },
                            count: worker_count,
                        },
                    },
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "health check: broker unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    components: Components {
                        api: "up",
                        redis: "down",
                        workers: WorkerComponent {
                            status: "unknown",
                            count: 0,
                        },
                    },
                }),
            )
        }
    }
}

/// `GET /scaling/status`.
pub async fn scaling_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.scaling.metrics_snapshot().await)
}

#[derive(Serialize)]
struct ScalingWorkersResponse {
    status: &'static str,
    message: String,
}

/// `POST /scaling/workers/{n}`.
pub async fn set_worker_count(
    State(state): State<AppState>,
    Path(n): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !(1..=20).contains(&n) {
        return Err(ApiError::validation("count must be between 1 and 20"));
    }

    state
        .scaling
        .set_worker_count(n as u32)
        .await
        .map_err(|e| ApiError::internal(format!("Error setting worker count: {e}")))?;

    Ok(Json(ScalingWorkersResponse {
        status: "success",
        message: format!("Worker count set to {n}"),
    }))
}
