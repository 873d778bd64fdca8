//! HTTP JSON API.
//!
//! Every dashboard operation is exposed under `/api/`. Public routes
//! attach a session when one is presented; protected routes require it
//! and check the caller's role per action.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server_on, ApiServer, ServerInfo};
pub use types::ApiContext;
