//! Login, logout and the role-aware menu.
//!
//! `POST /api/auth/login`  public: exchange credentials for a bearer token
//! `POST /api/auth/logout` session: revoke the presented token
//! `GET  /api/auth/me`     session: who am I, which menus do I get
//! `GET  /api/menu`        public: menus for the caller, anonymous or not

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, BearerToken};
use crate::models::Role;
use crate::navigation::{self, Menu};
use crate::session::Session;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: Session,
    pub menus: &'static [Menu],
}

#[derive(Serialize)]
pub struct MeResponse {
    pub session: Session,
    pub menus: &'static [Menu],
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub role: Option<Role>,
    pub menus: &'static [Menu],
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

/// `POST /api/auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = request.username.trim();
    let user = match ctx.core.users.authenticate(username, &request.password) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(username, error = %e, "Login rejected");
            return Err(e.into());
        }
    };

    let purged = ctx.core.sessions.purge_expired()?;
    if purged > 0 {
        tracing::debug!(purged, "Dropped idle sessions");
    }
    let (token, session) = ctx.core.sessions.create(user)?;
    tracing::info!(username = %session.username, role = %session.role, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        menus: navigation::menus_for(Some(session.role)),
        session,
    }))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let revoked = ctx.core.sessions.revoke(&token)?;
    tracing::info!(username = %session.username, "Logged out");
    Ok(Json(LogoutResponse { revoked }))
}

/// `GET /api/auth/me`
pub async fn me(Extension(session): Extension<Session>) -> Json<MeResponse> {
    Json(MeResponse {
        menus: navigation::menus_for(Some(session.role)),
        session,
    })
}

/// `GET /api/menu`
pub async fn menu(session: Option<Extension<Session>>) -> Json<MenuResponse> {
    let role = session.map(|Extension(s)| s.role);
    Json(MenuResponse {
        role,
        menus: navigation::menus_for(role),
    })
}
