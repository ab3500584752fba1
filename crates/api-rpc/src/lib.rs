//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 server exposing the application lifecycle, job publishing and
//! subscription operations under versioned method names (`application.submit.v1`).
//! Callers identify themselves with `actor_id`, supplied by the trusted identity
//! provider in front of this server.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::{RpcHandler, RpcServices};
pub use rate_limiter::RateLimiter;
pub use server::{RpcServer, RpcServerConfig, ServerError};
