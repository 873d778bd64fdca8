//! Government dashboard: every village report and the triage action.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::lifecycle::{self, ActionRequest};
use crate::models::VillageReport;
use crate::navigation::{authorize, Action};
use crate::reporting::Listing;
use crate::session::Session;

/// `GET /api/government/reports`
pub async fn reports(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<VillageReport>>, ApiError> {
    authorize(session.role, Action::GovernmentTriage)?;
    Ok(Json(lifecycle::list_reports(&ctx.core.store)?.into()))
}

/// `POST /api/government/reports/:id/actions`
pub async fn act(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<VillageReport>, ApiError> {
    authorize(session.role, Action::GovernmentTriage)?;
    let report = lifecycle::government_action(&ctx.core.store, id, request, &session.username)?;
    Ok(Json(report))
}
