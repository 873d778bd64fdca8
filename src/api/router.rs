//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Rate limiter → 2. Session (require / attach) → 3. Audit logger

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::content::MAX_BANNER_BYTES;
use crate::core_state::CoreState;

/// Room for multipart framing around the largest accepted banner.
const BANNER_BODY_LIMIT: usize = MAX_BANNER_BYTES + 64 * 1024;

/// Build the dashboard API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: a live session is required. Each handler then
    // checks its own action against the session's role.
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Rate limit → Session → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/me", get(endpoints::auth::me))
        .route(
            "/admin/announcement",
            get(endpoints::admin::announcement).put(endpoints::admin::update_announcement),
        )
        .route(
            "/admin/banner",
            post(endpoints::admin::upload_banner).layer(DefaultBodyLimit::max(BANNER_BODY_LIMIT)),
        )
        .route("/admin/diagnoses", get(endpoints::admin::diagnoses))
        .route(
            "/admin/diagnoses/export",
            get(endpoints::admin::diagnoses_export),
        )
        .route("/admin/patients", get(endpoints::admin::patients))
        .route(
            "/admin/patients/export",
            get(endpoints::admin::patients_export),
        )
        .route("/admin/users", get(endpoints::admin::users))
        .route("/admin/activity", get(endpoints::admin::activity))
        .route(
            "/nakes/patients",
            get(endpoints::nakes::patients).post(endpoints::nakes::record_patient),
        )
        .route(
            "/nakes/patients/export",
            get(endpoints::nakes::patients_export),
        )
        .route(
            "/nakes/reports",
            get(endpoints::nakes::reports).post(endpoints::nakes::create_report),
        )
        .route("/reports/:id/history", get(endpoints::reports::history))
        .route("/government/reports", get(endpoints::government::reports))
        .route(
            "/government/reports/:id/actions",
            post(endpoints::government::act),
        )
        .route("/company/reports", get(endpoints::company::queue))
        .route(
            "/company/reports/:id/actions",
            post(endpoints::company::act),
        )
        .route("/company/log", get(endpoints::company::log))
        .route(
            "/csr",
            get(endpoints::csr::view).post(endpoints::csr::add),
        )
        .route("/csr/export", get(endpoints::csr::export))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Public routes: a session is attached when presented, never required
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/menu", get(endpoints::auth::menu))
        .route("/public/dashboard", get(endpoints::public::dashboard))
        .route(
            "/public/comments",
            get(endpoints::public::comments).post(endpoints::public::post_comment),
        )
        .route(
            "/public/self-diagnosis",
            post(endpoints::public::self_diagnosis),
        )
        .route("/public/info", get(endpoints::public::info))
        .route("/public/banner", get(endpoints::public::banner))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::attach_session))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", public)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
}
