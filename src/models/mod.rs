//! Records and request/response models for the gateway API
//!
//! `records` holds the store-resident documents; `requests` and `responses`
//! are the DTOs used for serializing/deserializing HTTP bodies.

pub mod records;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use records::{JobParameters, JobRecord, JobStatus, UploadRecord, UploadStatus};
pub use requests::{CompleteUploadForm, CreateJobRequest, PrepareUploadRequest, SetCacheRequest};
pub use responses::{
    CacheStatusResponse, CacheValueResponse, ErrorResponse, HealthResponse, JobStatusResponse,
    PlaceholderResponse, PrepareUploadResponse,
};
