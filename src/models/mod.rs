//! API Data Transfer Objects
//!
//! Request and response body types for the cache admin API.

mod requests;
mod responses;

pub use requests::{
    InvalidateRequest, InvalidateResourceRequest, ResourceTtlRequest, SettingsRequest,
};
pub use responses::{
    ClearResponse, DeleteResponse, HealthResponse, InvalidateResponse, ResourceTtlResponse,
    SettingsResponse, StatsResponse,
};
