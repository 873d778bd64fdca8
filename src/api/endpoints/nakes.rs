//! Health-worker dashboard: patient records and village problem reports.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};

use crate::api::endpoints::download_response;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::intake::{self, PatientForm};
use crate::lifecycle::{self, NewReport};
use crate::models::{PatientRecord, VillageReport};
use crate::navigation::{authorize, Action};
use crate::reporting::{self, ExportQuery, Listing};
use crate::session::Session;

/// `GET /api/nakes/patients`
pub async fn patients(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<PatientRecord>>, ApiError> {
    authorize(session.role, Action::ListPatients)?;
    Ok(Json(intake::list_patients(&ctx.core.store)?.into()))
}

/// `POST /api/nakes/patients`
pub async fn record_patient(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Json(form): Json<PatientForm>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    authorize(session.role, Action::RecordPatient)?;
    let record = intake::record_patient(&ctx.core.store, form, &session.username)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/nakes/patients/export?format=csv|xlsx`
pub async fn patients_export(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    authorize(session.role, Action::ListPatients)?;
    let rows = intake::list_patients(&ctx.core.store)?;
    Ok(download_response(reporting::export("data_pasien", query.format, &rows)?))
}

/// `GET /api/nakes/reports`
pub async fn reports(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<VillageReport>>, ApiError> {
    authorize(session.role, Action::ListVillageReports)?;
    Ok(Json(lifecycle::list_reports(&ctx.core.store)?.into()))
}

/// `POST /api/nakes/reports`
pub async fn create_report(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Json(input): Json<NewReport>,
) -> Result<(StatusCode, Json<VillageReport>), ApiError> {
    authorize(session.role, Action::CreateVillageReport)?;
    let report = lifecycle::create_report(&ctx.core.store, input, &session.username)?;
    Ok((StatusCode::CREATED, Json(report)))
}
