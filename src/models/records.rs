//! Store-resident records
//!
//! Upload and job records are persisted as JSON documents under prefixed
//! keys; the helpers here own the key layout, lifetimes and ID format.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upload records live for a day, whatever their status.
pub const UPLOAD_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Job records live for two days.
pub const JOB_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// List receiving the ID of every created job.
pub const PROCESSING_QUEUE: &str = "processing_queue";

/// Builds a job ID of the form `job_<unixSeconds>_<nanoseconds>`.
///
/// Uniqueness relies on the sub-second component; there is no collision check.
pub fn generate_job_id() -> String {
    job_id_at(Utc::now())
}

fn job_id_at(now: DateTime<Utc>) -> String {
    format!("job_{}_{}", now.timestamp(), now.timestamp_subsec_nanos())
}

/// Store key of an upload record.
pub fn upload_key(job_id: &str) -> String {
    format!("upload:{}", job_id)
}

/// Store key of a job record.
pub fn job_key(job_id: &str) -> String {
    format!("job:{}", job_id)
}

// == Upload Record ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Prepared,
    Completed,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStatus::Prepared => "prepared",
            UploadStatus::Completed => "completed",
        }
    }
}

/// Bookkeeping for a file upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub filename: String,
    pub filesize: i64,
    pub filetype: String,
    pub status: UploadStatus,
    /// Unix seconds
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl UploadRecord {
    /// A freshly prepared upload.
    pub fn prepared(filename: String, filesize: i64, filetype: String) -> Self {
        Self {
            filename,
            filesize,
            filetype,
            status: UploadStatus::Prepared,
            created: Utc::now().timestamp(),
            completed_at: None,
        }
    }
}

// == Job Record ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// Free-form job parameters. Any JSON object is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobParameters(pub Map<String, Value>);

impl JobParameters {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A processing job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub job_type: String,
    #[serde(default)]
    pub parameters: JobParameters,
    pub status: JobStatus,
    /// Unix seconds
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
}

impl JobRecord {
    /// A freshly queued job.
    pub fn queued(job_id: String, job_type: String, parameters: JobParameters) -> Self {
        Self {
            job_id,
            job_type,
            parameters,
            status: JobStatus::Queued,
            created: Utc::now().timestamp(),
            cancelled_at: None,
        }
    }
}
