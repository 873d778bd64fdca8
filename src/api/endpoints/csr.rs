//! CSR tracker: filtered view with aggregates, new activities, export.
//!
//! List filters are comma-separated: `?companies=PT ABC,PT XYZ&from=2025-01-01`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::endpoints::download_response;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::csr::{self, CsrFilter, CsrView, NewActivity};
use crate::models::CsrActivity;
use crate::navigation::{authorize, Action};
use crate::reporting::{self, ExportQuery};
use crate::session::Session;

#[derive(Debug, Default, Deserialize)]
pub struct CsrQuery {
    pub companies: Option<String>,
    pub activity_types: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<CsrQuery> for CsrFilter {
    fn from(query: CsrQuery) -> Self {
        let split = |raw: Option<String>| -> Option<Vec<String>> {
            raw.map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect()
            })
        };
        CsrFilter {
            companies: split(query.companies),
            activity_types: split(query.activity_types),
            from: query.from,
            to: query.to,
        }
    }
}

/// `GET /api/csr`
pub async fn view(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Query(query): Query<CsrQuery>,
) -> Result<Json<CsrView>, ApiError> {
    authorize(session.role, Action::ManageCsr)?;
    Ok(Json(csr::view(&ctx.core.store, &query.into())?))
}

/// `POST /api/csr`. The company defaults to the caller's display name.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Json(input): Json<NewActivity>,
) -> Result<(StatusCode, Json<CsrActivity>), ApiError> {
    authorize(session.role, Action::ManageCsr)?;
    let activity = csr::add_activity(&ctx.core.store, input, &session.display_name)?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// `GET /api/csr/export`, the filtered activities only.
pub async fn export(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Query(query): Query<CsrQuery>,
    Query(download): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    authorize(session.role, Action::ManageCsr)?;
    let view = csr::view(&ctx.core.store, &query.into())?;
    Ok(download_response(reporting::export(
        "csr_log",
        download.format,
        &view.activities,
    )?))
}
