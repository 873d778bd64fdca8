//! Bearer-token session middleware.
//!
//! `require_session` guards the protected routes; `attach_session` runs on
//! public routes so role-aware responses (the menu) and the audit log can
//! see who is calling without demanding a login.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{bearer_token, ApiContext, BearerToken};

/// Require a live session.
///
/// On success: injects `Session` and `BearerToken`, adds `Cache-Control: no-store`.
pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(req.headers())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let session = ctx
        .core
        .sessions
        .validate(&token)?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(BearerToken(token));

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Inject `Session` when a valid token is presented. Never rejects.
pub async fn attach_session(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let ctx = req.extensions().get::<ApiContext>().cloned();
    let token = bearer_token(req.headers()).map(str::to_string);

    if let (Some(ctx), Some(token)) = (ctx, token) {
        match ctx.core.sessions.validate(&token) {
            Ok(Some(session)) => {
                req.extensions_mut().insert(session);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Session lookup failed on public route"),
        }
    }

    next.run(req).await
}
