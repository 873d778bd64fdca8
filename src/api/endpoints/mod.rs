//! API endpoint handlers.
//!
//! One module per dashboard. Handlers stay thin: authorize the session's
//! role, call the domain module, wrap the result.

pub mod admin;
pub mod auth;
pub mod company;
pub mod csr;
pub mod government;
pub mod health;
pub mod nakes;
pub mod public;
pub mod reports;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::reporting::Export;

/// Serve an export as a file download.
pub(crate) fn download_response(export: Export) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    (
        [
            (header::CONTENT_TYPE, export.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response()
}
