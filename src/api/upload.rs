//! Upload Handlers
//!
//! Bookkeeping for client file uploads: prepare a record, mark it completed,
//! read it back. The file bytes never pass through this service.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use super::extract::{ApiForm, ApiJson};
use super::handlers::AppState;
use crate::error::{AppError, Result};
use crate::models::records::{generate_job_id, upload_key, UPLOAD_TTL};
use crate::models::{
    CompleteUploadForm, JobStatusResponse, PrepareUploadRequest, PrepareUploadResponse,
    UploadRecord, UploadStatus,
};

const UPLOAD_NOT_FOUND: &str = "Upload job not found";

/// Handler for POST /api/v1/upload/prepare
///
/// Mints a job ID and stores a "prepared" record that expires after 24h.
pub async fn prepare_upload(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PrepareUploadRequest>,
) -> Result<Json<PrepareUploadResponse>> {
    let job_id = generate_job_id();
    let record = UploadRecord::prepared(req.filename, req.filesize, req.filetype);
    let expires_at = record.created + UPLOAD_TTL.as_secs() as i64;

    let data = serde_json::to_string(&record)?;
    state.store.set(&upload_key(&job_id), data, UPLOAD_TTL).await?;

    info!(job_id = %job_id, filename = %record.filename, "Upload prepared");
    Ok(Json(PrepareUploadResponse::new(job_id, expires_at)))
}

/// Handler for POST /api/v1/upload/complete
///
/// Marks the upload completed. Takes `job_id` from a URL-encoded or multipart
/// form. The record keeps its original expiry.
pub async fn complete_upload(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CompleteUploadForm>,
) -> Result<Json<JobStatusResponse>> {
    let job_id = form.job_id.trim().to_string();
    if job_id.is_empty() {
        return Err(AppError::InvalidRequest("job_id required".to_string()));
    }

    let key = upload_key(&job_id);
    if !state.store.exists(&key).await? {
        return Err(AppError::NotFound(UPLOAD_NOT_FOUND.to_string()));
    }

    let completed = UploadStatus::Completed;
    let fields = [
        ("status", Value::from(completed.as_str())),
        ("completed_at", Value::from(Utc::now().timestamp())),
    ];
    // The record may expire between the two calls
    if !state.store.hset(&key, &fields).await? {
        return Err(AppError::NotFound(UPLOAD_NOT_FOUND.to_string()));
    }

    info!(job_id = %job_id, "Upload completed");
    Ok(Json(JobStatusResponse::new(job_id, completed.as_str())))
}

/// Handler for GET /api/v1/upload/status/:jobId
pub async fn upload_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<UploadRecord>> {
    let data = state
        .store
        .get(&upload_key(&job_id))
        .await?
        .ok_or_else(|| AppError::NotFound(UPLOAD_NOT_FOUND.to_string()))?;

    debug!(job_id = %job_id, "Upload status read");
    Ok(Json(serde_json::from_str(&data)?))
}
