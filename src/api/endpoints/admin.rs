//! Admin dashboard: announcement, banner, full data tables, users and
//! the activity log.

use axum::extract::{Multipart, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::endpoints::download_response;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::content::{self, BannerInfo};
use crate::core_state::ActivityEntry;
use crate::intake;
use crate::models::{PatientRecord, PublicDiagnosis, UserSummary};
use crate::navigation::{authorize, Action};
use crate::reporting::{self, ExportQuery, Listing};
use crate::session::Session;

/// Multipart field carrying the banner image.
const BANNER_FIELD: &str = "banner";

#[derive(Debug, Deserialize, Serialize)]
pub struct Announcement {
    pub text: String,
}

/// `GET /api/admin/announcement`
pub async fn announcement(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Announcement>, ApiError> {
    authorize(session.role, Action::EditAnnouncement)?;
    Ok(Json(Announcement {
        text: content::read_announcement(&ctx.core.store)?,
    }))
}

/// `PUT /api/admin/announcement`
pub async fn update_announcement(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Json(body): Json<Announcement>,
) -> Result<Json<Announcement>, ApiError> {
    authorize(session.role, Action::EditAnnouncement)?;
    Ok(Json(Announcement {
        text: content::write_announcement(&ctx.core.store, &body.text)?,
    }))
}

/// `POST /api/admin/banner` (multipart, field `banner`)
pub async fn upload_banner(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Json<BannerInfo>, ApiError> {
    authorize(session.role, Action::UploadBanner)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some(BANNER_FIELD) {
            let bytes = field.bytes().await.map_err(|e| {
                tracing::warn!("Failed to read banner bytes: {e}");
                ApiError::BadRequest(format!("Failed to read banner: {e}"))
            })?;
            upload = Some(bytes);
        }
    }
    let bytes = upload.ok_or_else(|| ApiError::BadRequest("No banner provided".into()))?;

    let core = ctx.core.clone();
    let info = tokio::task::spawn_blocking(move || content::save_banner(&core.store, &bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Banner task failed: {e}")))??;
    Ok(Json(info))
}

/// `GET /api/admin/diagnoses`
pub async fn diagnoses(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<PublicDiagnosis>>, ApiError> {
    authorize(session.role, Action::ViewPublicDiagnoses)?;
    Ok(Json(intake::list_public_diagnoses(&ctx.core.store)?.into()))
}

/// `GET /api/admin/diagnoses/export?format=csv|xlsx`
pub async fn diagnoses_export(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    authorize(session.role, Action::ViewPublicDiagnoses)?;
    let rows = intake::list_public_diagnoses(&ctx.core.store)?;
    Ok(download_response(reporting::export("diagnosa_publik", query.format, &rows)?))
}

/// `GET /api/admin/patients`
pub async fn patients(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<PatientRecord>>, ApiError> {
    authorize(session.role, Action::ViewAllPatients)?;
    Ok(Json(intake::list_patients(&ctx.core.store)?.into()))
}

/// `GET /api/admin/patients/export?format=csv|xlsx`
pub async fn patients_export(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    authorize(session.role, Action::ViewAllPatients)?;
    let rows = intake::list_patients(&ctx.core.store)?;
    Ok(download_response(reporting::export("data_pasien", query.format, &rows)?))
}

/// `GET /api/admin/users`
pub async fn users(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<UserSummary>>, ApiError> {
    authorize(session.role, Action::ListUsers)?;
    Ok(Json(ctx.core.users.summaries()?.into()))
}

/// `GET /api/admin/activity`, newest first.
pub async fn activity(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<Listing<ActivityEntry>>, ApiError> {
    authorize(session.role, Action::ViewActivityLog)?;
    Ok(Json(ctx.core.activity.entries().into()))
}
