//! Background Tasks Module
//!
//! Long-lived, cancellable jobs owned by the service lifecycle.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
