//! HTTP API layer for votehall.
//!
//! This crate provides the admin control plane and the real-time session
//! gateway:
//!
//! - **Endpoints**: thin admin routes over the core services
//! - **Gateway**: voter and display WebSocket channels per event link
//! - **Registry**: live connection pools with caps and timed broadcast
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod gateway;
pub mod middleware;
pub mod registry;
pub mod response;

pub use endpoints::router;
pub use gateway::{display_ws_handler, vote_ws_handler};
pub use registry::{ConnectionRegistry, PoolKind, RegistryLimits};
