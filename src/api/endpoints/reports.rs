//! Action history for a single village report.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::lifecycle::{self, ReportHistory};
use crate::models::VillageReport;
use crate::navigation::{authorize, Action};
use crate::session::Session;

#[derive(Serialize)]
pub struct ReportWithHistory {
    pub report: VillageReport,
    pub history: ReportHistory,
}

/// `GET /api/reports/:id/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportWithHistory>, ApiError> {
    authorize(session.role, Action::ViewReportHistory)?;
    let report = lifecycle::get_report(&ctx.core.store, id)?;
    let history = lifecycle::history(&ctx.core.store, id)?;
    Ok(Json(ReportWithHistory { report, history }))
}
