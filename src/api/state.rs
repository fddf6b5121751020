//! Shared state for the ingest API router (§4.5).

use std::path::PathBuf;
use std::sync::Arc;

use crate::broker::TaskBroker;
use crate::scaling::ScalingController;

pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "xlsx", "jpg", "jpeg", "png", "txt"];

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<TaskBroker>,
    pub scaling: Arc<ScalingController>,
    pub shared_tmp_dir: PathBuf,
    pub max_upload_bytes: u64,
}
