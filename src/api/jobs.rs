//! Job Handlers
//!
//! Create, inspect and cancel processing jobs. Created job IDs are pushed
//! onto the processing queue; this service never consumes it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use super::extract::ApiJson;
use super::handlers::AppState;
use crate::error::{AppError, Result};
use crate::models::records::{generate_job_id, job_key, JOB_TTL, PROCESSING_QUEUE};
use crate::models::{CreateJobRequest, JobRecord, JobStatus, JobStatusResponse};

const JOB_NOT_FOUND: &str = "Job not found";

/// Handler for POST /api/v1/jobs/create
///
/// Stores a "queued" job for 48h and enqueues its ID.
pub async fn create_job(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobStatusResponse>)> {
    let job_id = generate_job_id();
    let record = JobRecord::queued(
        job_id.clone(),
        req.job_type,
        req.parameters.unwrap_or_default(),
    );

    let data = serde_json::to_string(&record)?;
    state.store.set(&job_key(&job_id), data, JOB_TTL).await?;
    let depth = state.store.lpush(PROCESSING_QUEUE, &job_id).await?;

    info!(
        job_id = %job_id,
        job_type = %record.job_type,
        parameters = record.parameters.len(),
        queue_depth = depth,
        "Job queued"
    );
    Ok((
        StatusCode::CREATED,
        Json(JobStatusResponse::new(job_id, record.status.as_str())),
    ))
}

/// Handler for GET /api/v1/jobs/:jobId
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobRecord>> {
    let data = state
        .store
        .get(&job_key(&job_id))
        .await?
        .ok_or_else(|| AppError::NotFound(JOB_NOT_FOUND.to_string()))?;

    debug!(job_id = %job_id, "Job status read");
    Ok(Json(serde_json::from_str(&data)?))
}

/// Handler for DELETE /api/v1/jobs/:jobId
///
/// Marks the job cancelled. Cancelling twice is harmless.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>> {
    let key = job_key(&job_id);
    if !state.store.exists(&key).await? {
        return Err(AppError::NotFound(JOB_NOT_FOUND.to_string()));
    }

    let cancelled = JobStatus::Cancelled;
    let fields = [
        ("status", Value::from(cancelled.as_str())),
        ("cancelled_at", Value::from(Utc::now().timestamp())),
    ];
    if !state.store.hset(&key, &fields).await? {
        return Err(AppError::NotFound(JOB_NOT_FOUND.to_string()));
    }

    info!(job_id = %job_id, "Job cancelled");
    Ok(Json(JobStatusResponse::new(job_id, cancelled.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::HttpMetrics;
    use crate::models::JobParameters;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn test_state() -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), Arc::new(HttpMetrics::new().unwrap()));
        (state, store)
    }

    async fn create(state: &AppState, parameters: Option<JobParameters>) -> String {
        let req = CreateJobRequest {
            job_type: "transcode".to_string(),
            parameters,
        };
        let (code, Json(resp)) = create_job(State(state.clone()), ApiJson(req)).await.unwrap();
        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(resp.status, "queued");
        resp.job_id
    }

    #[tokio::test]
    async fn test_create_job_stores_and_enqueues() {
        let (state, store) = test_state();
        let params: JobParameters =
            serde_json::from_value(json!({"codec": "h264", "bitrate": 800})).unwrap();

        let job_id = create(&state, Some(params)).await;

        let Json(record) = job_status(State(state), Path(job_id.clone())).await.unwrap();
        assert_eq!(record.job_id, job_id);
        assert_eq!(record.job_type, "transcode");
        assert_eq!(record.status, JobStatus::Queued);
        assert_eq!(record.parameters.0.get("codec"), Some(&json!("h264")));

        assert_eq!(store.list(PROCESSING_QUEUE).await.unwrap(), vec![job_id.clone()]);
        let ttl = store.ttl_ms(&job_key(&job_id)).await.unwrap();
        assert!(ttl > 172_000_000 && ttl <= 172_800_000);
    }

    #[tokio::test]
    async fn test_create_job_without_parameters() {
        let (state, _) = test_state();

        let job_id = create(&state, None).await;

        let Json(record) = job_status(State(state), Path(job_id)).await.unwrap();
        assert!(record.parameters.is_empty());
    }

    #[tokio::test]
    async fn test_job_stays_queued() {
        let (state, _) = test_state();
        let job_id = create(&state, None).await;

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let Json(record) = job_status(State(state), Path(job_id)).await.unwrap();
        assert_eq!(record.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_cancel_job_is_idempotent() {
        let (state, _) = test_state();
        let job_id = create(&state, None).await;

        for _ in 0..2 {
            let Json(resp) = cancel_job(State(state.clone()), Path(job_id.clone()))
                .await
                .unwrap();
            assert_eq!(resp.status, "cancelled");
        }

        let Json(record) = job_status(State(state), Path(job_id)).await.unwrap();
        assert_eq!(record.status, JobStatus::Cancelled);
        assert!(record.cancelled_at.is_some());
        assert_eq!(record.job_type, "transcode");
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let (state, _) = test_state();

        let result = cancel_job(State(state), Path("job_0_0".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_status_unknown_job() {
        let (state, _) = test_state();

        let result = job_status(State(state), Path("job_0_0".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
