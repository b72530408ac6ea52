//! API Module
//!
//! HTTP admin surface for the cache: routes and handlers.

mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::create_router;
