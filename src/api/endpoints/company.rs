//! Company dashboard: the forwarded-report queue, the company action and
//! the full company action log.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::lifecycle::{self, ActionRequest};
use crate::models::{ActionLogEntry, VillageReport};
use crate::navigation::{authorize, Action};
use crate::reporting::Listing;
use crate::session::Session;

/// `GET /api/company/reports`, reports currently forwarded to a company.
pub async fn queue(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<VillageReport>>, ApiError> {
    authorize(session.role, Action::CompanyTriage)?;
    Ok(Json(lifecycle::company_queue(&ctx.core.store)?.into()))
}

/// `POST /api/company/reports/:id/actions`
pub async fn act(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<VillageReport>, ApiError> {
    authorize(session.role, Action::CompanyTriage)?;
    let report = lifecycle::company_action(&ctx.core.store, id, request, &session.username)?;
    Ok(Json(report))
}

/// `GET /api/company/log`
pub async fn log(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<ActionLogEntry>>, ApiError> {
    authorize(session.role, Action::ViewCompanyLog)?;
    Ok(Json(lifecycle::company_log(&ctx.core.store)?.into()))
}
