//! Utility Placeholders
//!
//! Compression, image resize and format conversion are reserved routes. They
//! accept any body and answer 200 with a fixed "not_implemented" marker.

use axum::Json;

use crate::models::PlaceholderResponse;

/// Handler for POST /api/v1/compress
pub async fn compress_data() -> Json<PlaceholderResponse> {
    Json(PlaceholderResponse::new(
        "Compression endpoint - implementation needed",
    ))
}

/// Handler for POST /api/v1/resize-image
pub async fn resize_image() -> Json<PlaceholderResponse> {
    Json(PlaceholderResponse::new(
        "Image resize endpoint - implementation needed",
    ))
}

/// Handler for POST /api/v1/convert-format
pub async fn convert_format() -> Json<PlaceholderResponse> {
    Json(PlaceholderResponse::new(
        "Format conversion endpoint - implementation needed",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholders_report_not_implemented() {
        for Json(resp) in [compress_data().await, resize_image().await, convert_format().await] {
            assert_eq!(resp.status, "not_implemented");
            assert!(resp.message.ends_with("implementation needed"));
        }
    }
}
