//! Cache Handlers
//!
//! Generic get/set/delete over client-chosen keys. Values are written as
//! their JSON text and read back as the raw stored string.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::extract::ApiJson;
use super::handlers::AppState;
use crate::error::{AppError, Result};
use crate::models::{CacheStatusResponse, CacheValueResponse, SetCacheRequest};

const KEY_NOT_FOUND: &str = "Key not found";

/// Handler for GET /api/v1/cache/:key
pub async fn get_cache_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CacheValueResponse>> {
    let value = state
        .store
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(KEY_NOT_FOUND.to_string()))?;

    Ok(Json(CacheValueResponse::new(key, value)))
}

/// Handler for POST /api/v1/cache/:key
///
/// Stores the JSON text of `value` for `ttl` seconds (one hour by default).
pub async fn set_cache_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<SetCacheRequest>,
) -> Result<Json<CacheStatusResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let ttl = req.effective_ttl();
    state
        .store
        .set(&key, req.value.to_string(), Duration::from_secs(ttl))
        .await?;

    debug!(key = %key, ttl, "Cache value set");
    Ok(Json(CacheStatusResponse::set(key)))
}

/// Handler for DELETE /api/v1/cache/:key
pub async fn delete_cache_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CacheStatusResponse>> {
    if state.store.del(&key).await? == 0 {
        return Err(AppError::NotFound(KEY_NOT_FOUND.to_string()));
    }

    debug!(key = %key, "Cache value deleted");
    Ok(Json(CacheStatusResponse::deleted(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::HttpMetrics;
    use crate::store::{MemoryStore, Store};
    use serde_json::json;
    use std::sync::Arc;

    fn test_state() -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), Arc::new(HttpMetrics::new().unwrap()));
        (state, store)
    }

    fn set_request(value: serde_json::Value, ttl: Option<f64>) -> ApiJson<SetCacheRequest> {
        ApiJson(SetCacheRequest { value, ttl })
    }

    #[tokio::test]
    async fn test_set_and_get_value() {
        let (state, _) = test_state();

        let Json(set) = set_cache_value(
            State(state.clone()),
            Path("greeting".to_string()),
            set_request(json!("hello"), None),
        )
        .await
        .unwrap();
        assert_eq!(set.status, "set");

        let Json(got) = get_cache_value(State(state), Path("greeting".to_string()))
            .await
            .unwrap();
        assert_eq!(got.key, "greeting");
        // Stored as JSON text, returned raw
        assert_eq!(got.value, "\"hello\"");
    }

    #[tokio::test]
    async fn test_set_structured_value_returns_json_text() {
        let (state, _) = test_state();

        set_cache_value(
            State(state.clone()),
            Path("user:1".to_string()),
            set_request(json!({"name": "ada"}), Some(60.0)),
        )
        .await
        .unwrap();

        let Json(got) = get_cache_value(State(state), Path("user:1".to_string()))
            .await
            .unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&got.value).unwrap();
        assert_eq!(decoded, json!({"name": "ada"}));
    }

    #[tokio::test]
    async fn test_default_and_custom_ttl() {
        let (state, store) = test_state();

        set_cache_value(State(state.clone()), Path("a".into()), set_request(json!(1), None))
            .await
            .unwrap();
        set_cache_value(State(state), Path("b".into()), set_request(json!(1), Some(10.0)))
            .await
            .unwrap();

        let default_ttl = store.ttl_ms("a").await.unwrap();
        assert!(default_ttl > 3_590_000 && default_ttl <= 3_600_000);
        assert!(store.ttl_ms("b").await.unwrap() <= 10_000);
    }

    #[tokio::test]
    async fn test_set_rejects_zero_ttl() {
        let (state, _) = test_state();

        let result = set_cache_value(State(state), Path("a".into()), set_request(json!(1), Some(0.0))).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_set_rejects_oversized_ttl() {
        let (state, store) = test_state();

        let result = set_cache_value(
            State(state),
            Path("forever".into()),
            set_request(json!(1), Some(u64::MAX as f64)),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(!store.exists("forever").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_accepts_fractional_ttl() {
        let (state, store) = test_state();

        set_cache_value(State(state), Path("f".into()), set_request(json!(1), Some(60.0)))
            .await
            .unwrap();

        let ttl = store.ttl_ms("f").await.unwrap();
        assert!(ttl > 59_000 && ttl <= 60_000);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (state, _) = test_state();

        let result = get_cache_value(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (state, _) = test_state();
        set_cache_value(State(state.clone()), Path("gone".into()), set_request(json!(true), None))
            .await
            .unwrap();

        let Json(deleted) = delete_cache_value(State(state.clone()), Path("gone".into()))
            .await
            .unwrap();
        assert_eq!(deleted.status, "deleted");

        let result = get_cache_value(State(state.clone()), Path("gone".into())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = delete_cache_value(State(state), Path("gone".into())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
