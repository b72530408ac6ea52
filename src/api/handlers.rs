//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, HealthResponse, InvalidateRequest, InvalidateResourceRequest,
    InvalidateResponse, ResourceTtlRequest, ResourceTtlResponse, SettingsRequest,
    SettingsResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cache manager, shared with the resource-serving layer
    pub manager: Arc<CacheManager>,
}

impl AppState {
    /// Creates a new AppState around an existing manager.
    pub fn new(manager: CacheManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheManager::new(config))
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
///
/// Returns the active strategy's performance counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.manager.stats().await;
    Json(StatsResponse::from_stats(&stats))
}

/// Handler for DELETE /entries
///
/// Empties the cache; permitted even while caching is disabled.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.manager.clear().await;
    Json(ClearResponse::new())
}

/// Handler for DELETE /entries/:key
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.manager.delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for POST /invalidate
///
/// Removes every entry whose key matches the given pattern. A malformed
/// pattern surfaces as a 400, never as "no matches".
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidated = state.manager.invalidate(&req.pattern).await?;
    Ok(Json(InvalidateResponse::new(invalidated)))
}

/// Handler for POST /invalidate/resource
///
/// Invalidates a resource family, or one resource instance when an id is
/// given.
pub async fn invalidate_resource_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateResourceRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidated = match &req.id {
        Some(id) => {
            state
                .manager
                .invalidate_resource_by_id(&req.resource, id)
                .await?
        }
        None => state.manager.invalidate_resource(&req.resource).await?,
    };
    Ok(Json(InvalidateResponse::new(invalidated)))
}

/// Handler for GET /settings
pub async fn get_settings_handler(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        enabled: state.manager.is_enabled(),
        default_ttl: state.manager.default_ttl(),
        strategy: state.manager.strategy_kind(),
    })
}

/// Handler for PUT /settings
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<SettingsResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    if let Some(enabled) = req.enabled {
        state.manager.set_enabled(enabled);
    }
    if let Some(default_ttl) = req.default_ttl {
        state.manager.set_default_ttl(default_ttl);
    }

    Ok(Json(SettingsResponse {
        enabled: state.manager.is_enabled(),
        default_ttl: state.manager.default_ttl(),
        strategy: state.manager.strategy_kind(),
    }))
}

/// Handler for PUT /resource-ttl
pub async fn resource_ttl_handler(
    State(state): State<AppState>,
    Json(req): Json<ResourceTtlRequest>,
) -> Result<Json<ResourceTtlResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.manager.set_resource_ttl(&req.resource, req.ttl).await;
    Ok(Json(ResourceTtlResponse {
        resource: req.resource,
        ttl: req.ttl,
    }))
}
