//! Per-client rate limiting middleware.
//!
//! A request carrying the token of a live session is keyed by its user.
//! Everything else is keyed by the peer address the listener accepted,
//! so unknown tokens and forwarding headers never open a fresh bucket.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{bearer_token, ApiContext};
use crate::session::SessionStore;

/// Extract a rate-limit key from the request.
fn rate_key(req: &Request<axum::body::Body>, sessions: &SessionStore) -> String {
    if let Some(token) = bearer_token(req.headers()) {
        match sessions.peek(token) {
            Ok(Some(session)) => return format!("user:{}", session.username),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Session lookup failed in rate limiter"),
        }
    }
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        // Only reachable when the router is driven in-process.
        None => "ip:unknown".to_string(),
    }
}

/// Returns 429 once a client exceeds its window.
/// Accesses `ApiContext` from request extensions.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&req, &ctx.core.sessions);

    // MutexGuard is !Send, must drop before .await via block scope
    {
        let mut limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter.check(&key).map_err(|retry_after| {
            tracing::warn!(key = %key, retry_after, "Rate limit exceeded");
            ApiError::RateLimited { retry_after }
        })?;
    }

    Ok(next.run(req).await)
}
