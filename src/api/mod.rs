//! Ingest API (C5, §4.5): the HTTP surface accepting uploads and
//! reporting task/scaling status.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::broker::{FakeStore, KvStore, TaskBroker};
    use crate::scaling::{LoggingOrchestrator, ScalingConfig, ScalingController};

    fn app() -> (Router, Arc<TaskBroker>, tempfile::TempDir) {
        let store: Arc<dyn KvStore> = Arc::new(FakeStore::new());
        let broker = Arc::new(TaskBroker::new(store.clone(), 86_400));
        let scaling = Arc::new(ScalingController::new(
            store,
            Arc::new(LoggingOrchestrator),
            ScalingConfig {
                min_workers: 2,
                max_workers: 10,
                worker_replicas: 3,
                queue_high_threshold: 20,
                queue_low_threshold: 5,
                scaling_interval: Duration::from_secs(30),
                cooldown: Duration::from_secs(60),
            },
        ));
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            broker: broker.clone(),
            scaling,
            shared_tmp_dir: dir.path().to_path_buf(),
            max_upload_bytes: 50 * 1024 * 1024,
        };
        (build_router(state), broker, dir)
    }

    fn multipart_body(boundary: &str, filename: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "docsort-test-boundary";
        let body = multipart_body(boundary, filename, content);
        Request::builder()
            .method("POST")
            .uri("/classify_file")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn s2_disallowed_extension_rejected_without_touching_broker() {
        let (app, broker, _dir) = app();
        let response = app
            .oneshot(upload_request("x.xyz", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["detail"]
            .as_str()
            .unwrap()
            .contains("Unsupported file type"));

        let queue_len = broker.ping_store().await;
        assert!(queue_len.is_ok());
    }

    #[tokio::test]
    async fn s3_oversize_upload_rejected() {
        let (app, _broker, _dir) = app();
        let huge = vec![0u8; 51 * 1024 * 1024];
        let response = app.oneshot(upload_request("doc.txt", &huge)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn s4_unknown_task_id_is_404() {
        let (app, _broker, _dir) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/classification/00000000-0000-0000-0000-000000000000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn s5_invalid_task_id_format_is_400() {
        let (app, _broker, _dir) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/classification/short")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn happy_path_upload_returns_pending_task() {
        let (app, broker, _dir) = app();
        let response = app
            .oneshot(upload_request("bank_statement_1.txt", b"account balance statement"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let task_id = json["task_id"].as_str().unwrap().to_string();
        assert_eq!(json["status"], "pending");

        let status = broker.get_status(&task_id).await.unwrap().unwrap();
        assert_eq!(status.status, crate::task::TaskStatusKind::Pending);
    }

    #[tokio::test]
    async fn s1_happy_path_reaches_completed_status() {
        use crate::classifier::{Classifier, HybridClassifier};
        use crate::worker::{Worker, WorkerConfig};

        let (app, broker, dir) = app();

        let upload_response = app
            .clone()
            .oneshot(upload_request(
                "bank_statement_1.txt",
                b"account balance statement checking savings deposit withdraw",
            ))
            .await
            .unwrap();
        assert_eq!(upload_response.status(), StatusCode::ACCEPTED);
        let body = axum::body::to_bytes(upload_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let task_id = json["task_id"].as_str().unwrap().to_string();

        let classifier: Arc<dyn Classifier> = Arc::new(HybridClassifier::keyword_only());
        let worker = Worker::new(
            broker.clone(),
            classifier,
            WorkerConfig {
                worker_id: "0".to_string(),
                health_check_path: dir.path().join("health.txt"),
                health_check_interval: Duration::from_secs(10),
                idle_threshold: Duration::from_secs(300),
            },
        );
        let task = broker
            .claim_next(Duration::from_millis(100))
            .await
            .unwrap()
            .expect("the uploaded task should be queued");
        worker.process_task(&task).await;

        let status_response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/classification/{task_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(status_response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(status_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["predicted_type"], "bank_statement");
    }

    #[tokio::test]
    async fn health_reports_degraded_with_no_workers() {
        let (app, _broker, _dir) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "degraded");
    }
}
