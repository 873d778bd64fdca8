//! Public dashboard: aggregates, self-diagnosis, comments, announcement,
//! banner and the education catalog. No session required.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::content::{self, EducationCatalog};
use crate::intake::{self, CommentForm, SelfDiagnosisForm, SelfDiagnosisResult};
use crate::models::Comment;
use crate::reporting::{self, DashboardQuery, Listing, PublicDashboard};

#[derive(Serialize)]
pub struct PublicInfo {
    pub app_name: &'static str,
    pub announcement: String,
    pub education: EducationCatalog,
}

/// `GET /api/public/dashboard?year=&month=&age_group=`
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<PublicDashboard>, ApiError> {
    let today = chrono::Local::now().date_naive();
    Ok(Json(reporting::public_dashboard(
        &ctx.core.store,
        &query,
        today,
    )?))
}

/// `POST /api/public/self-diagnosis`
pub async fn self_diagnosis(
    State(ctx): State<ApiContext>,
    Json(form): Json<SelfDiagnosisForm>,
) -> Result<(StatusCode, Json<SelfDiagnosisResult>), ApiError> {
    let result = intake::submit_self_diagnosis(&ctx.core.store, form)?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /api/public/comments`
pub async fn comments(State(ctx): State<ApiContext>) -> Result<Json<Listing<Comment>>, ApiError> {
    Ok(Json(intake::list_comments(&ctx.core.store)?.into()))
}

/// `POST /api/public/comments`
pub async fn post_comment(
    State(ctx): State<ApiContext>,
    Json(form): Json<CommentForm>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = intake::post_comment(&ctx.core.store, form)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /api/public/info`
pub async fn info(State(ctx): State<ApiContext>) -> Result<Json<PublicInfo>, ApiError> {
    Ok(Json(PublicInfo {
        app_name: crate::config::APP_NAME,
        announcement: content::read_announcement(&ctx.core.store)?,
        education: content::education_catalog(),
    }))
}

/// `GET /api/public/banner`
pub async fn banner(State(ctx): State<ApiContext>) -> Result<Response, ApiError> {
    let bytes = content::read_banner(&ctx.core.store)?
        .ok_or_else(|| ApiError::NotFound("No banner uploaded".into()))?;
    let mime = mime_guess::from_path(crate::config::BANNER_FILE).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
