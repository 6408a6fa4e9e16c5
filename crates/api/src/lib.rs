//! HTTP API layer for pulso.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: subscriber registration, dispatch, click tracking,
//!   admin and super admin management
//! - **Extractors**: admin and super admin authentication
//! - **Middleware**: bearer token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{router, track_router};
