//! # Checkpool Server (`server`)
//!
//! HTTP REST adapter exposing the matcher pool. The server owns the
//! transport concerns only — authentication, rate limiting, JSON shapes,
//! status-code mapping — and delegates every check to
//! [`pool::MatcherPool`].
//!
//! Endpoints:
//!
//! - `POST /api/v1/check` — run one check; body and response use the
//!   camelCase wire shapes in [`routes::check`].
//! - `GET /api/v1/categories` — the categories currently covered.
//! - `GET /health`, `GET /ready`, `GET /` — liveness, readiness, info.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use crate::config::ServerConfig;
pub use crate::error::{ServerError, ServerResult};
pub use crate::server::{build_router, serve, start_server};
pub use crate::state::ServerState;
