//! Renders a [`ReportDocument`] into PDF bytes with `genpdf`.
//!
//! The builder owns every intermediate resource (font data, decoded images, the `genpdf`
//! document and the output buffer), so all of it is released when [`PdfBuilder::render`]
//! returns, whether it succeeds or not.

use genpdf::elements::{FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::{Alignment, Element, Margins, PaperSize, SimplePageDecorator};
use log::debug;

use crate::bookmarks;
use crate::chart;
use crate::config::ReportConfig;
use crate::elements::FittedImage;
use crate::error::{ReportError, Result};
use crate::fonts;
use crate::metadata;
use crate::model::{
    Block, ChartBlock, HorizontalAlignment, ReportDocument, RichParagraph, TableBlock,
};

/// Space below every paragraph, in millimetres.
const PARAGRAPH_SPACING_MM: f64 = 4.0;
/// Inner padding of table cells, in millimetres.
const CELL_PADDING_MM: f64 = 1.0;

/// A finished PDF.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Turns a [`ReportDocument`] into a [`RenderedPdf`].
pub struct PdfBuilder {
    document: ReportDocument,
    config: ReportConfig,
}

impl PdfBuilder {
    /// Creates a builder with the default configuration.
    pub fn new(document: ReportDocument) -> Self {
        Self {
            document,
            config: ReportConfig::default(),
        }
    }

    /// Replaces the rendering configuration.
    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    /// Lays out every block, serializes the PDF and applies metadata and chart bookmarks.
    pub fn render(self) -> Result<RenderedPdf> {
        let Self { document, config } = self;
        let fonts_dir = config.fonts_dir.as_deref();

        let font_family = fonts::default_font_family(fonts_dir).map_err(ReportError::FontLoad)?;
        let chart_titles = document.chart_titles();
        if !chart_titles.is_empty() {
            chart::ensure_chart_font(fonts_dir)?;
        }

        let mut pdf = genpdf::Document::new(font_family);
        pdf.set_title(document.title());
        pdf.set_minimal_conformance();
        pdf.set_paper_size(PaperSize::A4);
        pdf.set_font_size(config.base_font_size);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::all(config.margins_mm));
        pdf.set_page_decorator(decorator);

        for block in document.into_blocks() {
            push_block(&mut pdf, block, &config)?;
        }

        let mut buffer = Vec::new();
        pdf.render(&mut buffer).map_err(ReportError::Pdf)?;
        debug!("genpdf produced {} bytes", buffer.len());

        finalize(&buffer, &config, &chart_titles)
    }
}

fn push_block(pdf: &mut genpdf::Document, block: Block, config: &ReportConfig) -> Result<()> {
    match block {
        Block::Paragraph(paragraph) => {
            let spacing = Margins::trbl(0.0, 0.0, PARAGRAPH_SPACING_MM, 0.0);
            pdf.push(paragraph_element(&paragraph).padded(spacing));
        }
        Block::Table(table) => pdf.push(table_element(&table)?),
        Block::Chart(chart) => push_chart(pdf, &chart, config)?,
        Block::PageBreak => pdf.push(PageBreak::new()),
    }
    Ok(())
}

fn alignment(value: HorizontalAlignment) -> Alignment {
    match value {
        HorizontalAlignment::Left => Alignment::Left,
        HorizontalAlignment::Center => Alignment::Center,
    }
}

fn paragraph_element(paragraph: &RichParagraph) -> Paragraph {
    let mut element = Paragraph::default();
    for span in paragraph.spans() {
        element.push(span.to_styled_string());
    }
    element.set_alignment(alignment(paragraph.alignment()));
    element
}

fn table_element(table: &TableBlock) -> Result<TableLayout> {
    let mut layout = TableLayout::new(table.column_weights().to_vec());
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header = layout.row();
    for cell in table.headers() {
        let title = Paragraph::new(cell.to_styled_string()).padded(CELL_PADDING_MM);
        header.push_element(title);
    }
    header.push().map_err(ReportError::Pdf)?;

    for cells in table.rows() {
        let mut row = layout.row();
        for cell in cells {
            row.push_element(Paragraph::new(cell.as_str()).padded(CELL_PADDING_MM));
        }
        row.push().map_err(ReportError::Pdf)?;
    }

    Ok(layout)
}

/// Rasterises the chart and scales it to the space left on the current page.
fn push_chart(pdf: &mut genpdf::Document, block: &ChartBlock, config: &ReportConfig) -> Result<()> {
    let image = chart::render_series_chart(block.series(), &config.chart)?;
    let element = FittedImage::from_dynamic_image(image)
        .map_err(ReportError::Pdf)?
        .with_alignment(alignment(block.alignment()));
    pdf.push(element);
    Ok(())
}

/// Reopens the rendered bytes to patch the info dictionary and add chart bookmarks.
fn finalize(bytes: &[u8], config: &ReportConfig, chart_titles: &[String]) -> Result<RenderedPdf> {
    let mut document = lopdf::Document::load_mem(bytes)?;

    metadata::apply_document_info(&mut document, &config.document_info)?;
    if config.bookmarks {
        bookmarks::apply_chart_bookmarks(&mut document, chart_titles)?;
    }

    let page_count = document.get_pages().len();
    let mut output = Vec::with_capacity(bytes.len());
    document.save_to(&mut output).map_err(lopdf::Error::from)?;

    Ok(RenderedPdf {
        bytes: output,
        page_count,
    })
}
