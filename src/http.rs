//! HTTP surface: `GET /api/download-pdf`.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::error;
use serde::Deserialize;

use crate::error::ReportError;
use crate::report::{ReportGenerator, REPORT_FILE_NAME};

/// Path of the download endpoint.
pub const DOWNLOAD_PATH: &str = "/api/download-pdf";

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadParams {
    pub user_id: Option<String>,
}

/// Builds the application router around a shared generator.
pub fn router(generator: ReportGenerator) -> Router {
    Router::new()
        .route(DOWNLOAD_PATH, get(download_pdf))
        .with_state(generator)
}

async fn download_pdf(
    State(generator): State<ReportGenerator>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ReportError> {
    let pdf = generator.generate(params.user_id.as_deref()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename={REPORT_FILE_NAME}"),
            ),
        ],
        pdf.bytes,
    )
        .into_response())
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        error!("Report generation failed: {self}");

        let message = if self.is_data_format() {
            "Stored exercise data could not be read"
        } else {
            "Failed to generate the exercise report"
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
