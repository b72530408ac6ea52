//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for pattern invalidation (POST /invalidate)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Pattern matched against whole cache keys
    pub pattern: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}

/// Request body for resource-family invalidation (POST /invalidate/resource)
///
/// With an `id`, only keys naming that resource instance are removed;
/// without one, the whole family goes.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateResourceRequest {
    /// Resource family name, e.g. `machine`
    pub resource: String,
    /// Optional resource identifier
    #[serde(default)]
    pub id: Option<String>,
}

impl InvalidateResourceRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        if self.resource.is_empty() {
            return Some("Resource name cannot be empty".to_string());
        }
        if let Some(id) = &self.id {
            if id.is_empty() {
                return Some("Resource id cannot be empty".to_string());
            }
        }
        None
    }
}

/// Request body for cache settings updates (PUT /settings)
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsRequest {
    /// New global enabled flag
    #[serde(default)]
    pub enabled: Option<bool>,
    /// New default TTL in seconds
    #[serde(default)]
    pub default_ttl: Option<u64>,
}

impl SettingsRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        if self.enabled.is_none() && self.default_ttl.is_none() {
            return Some("At least one of 'enabled' or 'default_ttl' is required".to_string());
        }
        if self.default_ttl == Some(0) {
            return Some("default_ttl must be greater than zero".to_string());
        }
        None
    }
}

/// Request body for per-resource TTL updates (PUT /resource-ttl)
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceTtlRequest {
    /// Resource family name
    pub resource: String,
    /// TTL in seconds for that family
    pub ttl: u64,
}

impl ResourceTtlRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        if self.resource.is_empty() {
            return Some("Resource name cannot be empty".to_string());
        }
        if self.ttl == 0 {
            return Some("ttl must be greater than zero".to_string());
        }
        None
    }
}
