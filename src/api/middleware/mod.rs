//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Rate limiter: reject early
//! 2. Session: require (protected routes) or attach if present (public routes)
//! 3. Audit logger: runs after the session is known, so it can name the actor

pub mod audit;
pub mod auth;
pub mod rate;
