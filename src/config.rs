//! Settings consumed by the report generator.

use std::path::PathBuf;

use crate::chart::ChartOptions;
use crate::metadata::DocumentInfo;

/// Rendering settings shared by every request.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    /// Directory containing the Roboto font family. Falls back to the default search path.
    pub fonts_dir: Option<PathBuf>,
    pub chart: ChartOptions,
    /// Page margins applied on every side.
    pub margins_mm: f64,
    /// Base font size in points.
    pub base_font_size: u8,
    pub document_info: DocumentInfo,
    /// Adds an outline entry for each exercise chart page.
    pub bookmarks: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fonts_dir: None,
            chart: ChartOptions::default(),
            margins_mm: 20.0,
            base_font_size: 11,
            document_info: DocumentInfo::default(),
            bookmarks: true,
        }
    }
}

impl ReportConfig {
    /// Sets the font directory and returns the updated configuration.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }
}
