//! Exercise-log PDF reports served over HTTP.
//!
//! The [`report::ReportGenerator`] reads exercise rows from an [`store::ExerciseStore`],
//! composes a [`model::ReportDocument`] and renders it with `genpdf`, embedding one `plotters`
//! chart per exercise. [`http::router`] exposes the generator as `GET /api/download-pdf`.

pub mod bookmarks;
pub mod builder;
pub mod chart;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod http;
pub mod metadata;
pub mod model;
pub mod report;
pub mod richtext;
pub mod store;

pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use report::ReportGenerator;
pub use store::ExerciseStore;
