//! The report generator: collects rows, composes the document and renders it.

use log::{debug, info};

use crate::builder::{PdfBuilder, RenderedPdf};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::model::{
    Block, ChartBlock, ExerciseSeries, HorizontalAlignment, ReportData, ReportDocument,
    RichParagraph, TableBlock,
};
use crate::richtext::Span;
use crate::store::ExerciseStore;

/// File name announced in the `Content-Disposition` header.
pub const REPORT_FILE_NAME: &str = "ExerciseData.pdf";

const TITLE: &str = "Exercise Data";
const TITLE_FONT_SIZE: u8 = 18;
const CHART_TITLE_FONT_SIZE: u8 = 14;
const INTRO: &str = "This PDF file contains your exercise history. Hope it helps!";
const TABLE_HEADERS: [&str; 4] = ["ID", "Exercise Name", "Weight (kg)", "Date"];
const TABLE_COLUMN_WEIGHTS: [usize; 4] = [1, 3, 2, 2];

/// Builds exercise reports from the injected store.
///
/// The generator is cheap to clone and holds no per-request state.
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    store: ExerciseStore,
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(store: ExerciseStore, config: ReportConfig) -> Self {
        Self { store, config }
    }

    /// Runs the three read queries and parses the concatenated series.
    ///
    /// Rows and series follow `user_id`; the workout span is computed over every user.
    pub async fn collect(&self, user_id: Option<&str>) -> Result<ReportData> {
        let records = self.store.exercises(user_id).await?;
        let span = self.store.workout_span().await?;
        let series = self
            .store
            .series(user_id)
            .await?
            .into_iter()
            .map(ExerciseSeries::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Collected {} rows and {} series (span present: {})",
            records.len(),
            series.len(),
            span.is_some()
        );

        Ok(ReportData {
            records,
            span,
            series,
        })
    }

    /// Rasterises the charts and renders the PDF on the blocking thread pool.
    pub async fn render(&self, document: ReportDocument) -> Result<RenderedPdf> {
        let builder = PdfBuilder::new(document).with_config(self.config.clone());
        tokio::task::spawn_blocking(move || builder.render()).await?
    }

    /// Produces the complete report for `user_id`, or for every user when it is `None`.
    pub async fn generate(&self, user_id: Option<&str>) -> Result<RenderedPdf> {
        let data = self.collect(user_id).await?;
        let document = compose(&data);
        let pdf = self.render(document).await?;

        info!(
            "Generated exercise report: {} rows, {} charts, {} pages, {} bytes",
            data.records.len(),
            data.series.len(),
            pdf.page_count,
            pdf.bytes.len()
        );
        Ok(pdf)
    }
}

/// Summary sentence shown under the title.
pub fn summary_paragraph(data: &ReportData) -> RichParagraph {
    let mut spans = vec![Span::new(INTRO)];
    if let Some(span) = &data.span {
        spans.push(Span::new(format!(
            " The first day of your workout was {}. The last day of your workout was {}.",
            span.first_day, span.last_day
        )));
    }
    RichParagraph::new(spans)
}

fn exercise_table(data: &ReportData) -> TableBlock {
    let headers: Vec<Span> = TABLE_HEADERS
        .iter()
        .map(|title| Span::new(*title).bold())
        .collect();
    let mut table = TableBlock::new(headers).with_column_weights(TABLE_COLUMN_WEIGHTS.to_vec());
    for record in &data.records {
        table.push_row(record.cells());
    }
    table
}

fn chart_blocks(series: &ExerciseSeries) -> [Block; 3] {
    let heading = Span::new(series.exercise_name())
        .bold()
        .sized(CHART_TITLE_FONT_SIZE);
    let title = RichParagraph::new(vec![heading]).with_alignment(HorizontalAlignment::Center);
    let chart = ChartBlock::new(series.clone()).with_alignment(HorizontalAlignment::Center);

    [Block::PageBreak, Block::Paragraph(title), Block::Chart(chart)]
}

/// Lays out the report: title, summary, table, then one page per exercise chart.
pub fn compose(data: &ReportData) -> ReportDocument {
    let title = Span::new(TITLE).bold().sized(TITLE_FONT_SIZE);
    let mut document = ReportDocument::new(TITLE)
        .with_block(Block::paragraph(vec![title]))
        .with_block(Block::Paragraph(summary_paragraph(data)))
        .with_block(Block::Table(exercise_table(data)));

    for series in &data.series {
        for block in chart_blocks(series) {
            document.push(block);
        }
    }

    document
}
