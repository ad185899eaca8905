//! Error taxonomy shared by the collection, rendering and HTTP layers.

use thiserror::Error;

/// Failures that abort report generation.
///
/// Every variant aborts the whole request. No partially rendered document is ever returned.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A query could not be executed or its rows could not be decoded.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be converted: a series token, a NULL field or a row column.
    #[error("malformed data in {context}: {message}")]
    DataFormat { context: String, message: String },

    /// The font family required by the PDF renderer is unavailable.
    #[error("failed to load fonts: {0}")]
    FontLoad(#[source] genpdf::error::Error),

    /// Layout or serialization of the PDF document failed.
    #[error("failed to render PDF: {0}")]
    Pdf(#[source] genpdf::error::Error),

    /// A chart could not be drawn or rasterised.
    #[error("failed to draw chart: {0}")]
    Chart(String),

    /// Rewriting the rendered PDF (outline or metadata) failed.
    #[error("failed to post-process PDF: {0}")]
    PostProcess(String),

    /// The blocking render task did not complete.
    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ReportError {
    pub(crate) fn data_format(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataFormat {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Separates undecodable column values from infrastructure failures.
    pub(crate) fn from_query(err: sqlx::Error, context: &str) -> Self {
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                Self::data_format(context, format!("column {index}: {source}"))
            }
            other => Self::Database(other),
        }
    }

    /// Returns `true` when the error stems from unparseable stored data rather than
    /// infrastructure.
    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat { .. })
    }
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        Self::PostProcess(err.to_string())
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
