//! Typed request-scoped entities and the logical content of the report document.
//!
//! Rows are decoded once at the query boundary into [`ExerciseRecord`], [`WorkoutSpan`] and
//! [`SeriesRow`]. The latter is parsed into an [`ExerciseSeries`] with explicit failures for
//! malformed tokens. The document half of the module ([`ReportDocument`], [`Block`]) mirrors
//! the building blocks expected by `genpdf` without referencing the rendering crate, so the
//! layout can be inspected in tests before any font is loaded.

use chrono::NaiveDate;

use crate::error::{ReportError, Result};
use crate::richtext::{self, Span};

/// Separator used by the grouping query when concatenating weights and dates.
pub const SERIES_SEPARATOR: char = ',';

/// Date format of stored exercise dates and of the concatenated date tokens.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One logged workout entry as returned by the row query.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct ExerciseRecord {
    #[sqlx(rename = "exercise_id")]
    pub id: i64,
    #[sqlx(rename = "exercise_name")]
    pub name: String,
    pub weight: f64,
    pub date: NaiveDate,
}

impl ExerciseRecord {
    /// Display text for each table column, in column order.
    pub fn cells(&self) -> [String; 4] {
        [
            self.id.to_string(),
            self.name.clone(),
            format_weight(self.weight),
            self.date.to_string(),
        ]
    }
}

/// Table text of a weight. Whole numbers keep their decimal point (`100.0`).
fn format_weight(weight: f64) -> String {
    format!("{weight:?}")
}

/// The earliest and latest workout dates across the whole store, exactly as stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkoutSpan {
    pub first_day: String,
    pub last_day: String,
}

/// Raw output of the grouping query before the concatenated fields are split.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct SeriesRow {
    pub exercise_name: String,
    pub weights: Option<String>,
    pub dates: Option<String>,
}

/// Weight progression for a single exercise, co-ordered by date.
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseSeries {
    exercise_name: String,
    weights: Vec<f64>,
    dates: Vec<NaiveDate>,
}

impl ExerciseSeries {
    /// Creates a series from parallel weight and date vectors.
    ///
    /// Fails with [`ReportError::DataFormat`] when the vectors differ in length.
    pub fn new(
        exercise_name: impl Into<String>,
        weights: Vec<f64>,
        dates: Vec<NaiveDate>,
    ) -> Result<Self> {
        let exercise_name = exercise_name.into();
        if weights.len() != dates.len() {
            return Err(ReportError::data_format(
                series_context(&exercise_name),
                format!(
                    "{} weight values but {} dates",
                    weights.len(),
                    dates.len()
                ),
            ));
        }

        Ok(Self {
            exercise_name,
            weights,
            dates,
        })
    }

    pub fn exercise_name(&self) -> &str {
        &self.exercise_name
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Chart coordinates for the series.
    ///
    /// The X coordinate is the position of the point in date order, not the date itself.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.weights
            .iter()
            .enumerate()
            .map(|(index, weight)| (index as f64, *weight))
            .collect()
    }
}

impl TryFrom<SeriesRow> for ExerciseSeries {
    type Error = ReportError;

    fn try_from(row: SeriesRow) -> Result<Self> {
        let name = row.exercise_name;

        let weights = required_field(&name, "weights", row.weights.as_deref())?
            .split(SERIES_SEPARATOR)
            .map(|token| parse_weight(&name, token))
            .collect::<Result<Vec<_>>>()?;

        let dates = required_field(&name, "dates", row.dates.as_deref())?
            .split(SERIES_SEPARATOR)
            .map(|token| parse_date(&name, token))
            .collect::<Result<Vec<_>>>()?;

        Self::new(name, weights, dates)
    }
}

fn series_context(exercise: &str) -> String {
    format!("series for exercise '{exercise}'")
}

fn required_field<'a>(exercise: &str, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| {
        ReportError::data_format(series_context(exercise), format!("missing {field}"))
    })
}

fn parse_weight(exercise: &str, token: &str) -> Result<f64> {
    let trimmed = token.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            ReportError::data_format(
                series_context(exercise),
                format!("invalid weight token '{trimmed}'"),
            )
        })
}

fn parse_date(exercise: &str, token: &str) -> Result<NaiveDate> {
    let trimmed = token.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|err| {
        ReportError::data_format(
            series_context(exercise),
            format!("invalid date token '{trimmed}': {err}"),
        )
    })
}

/// Everything the collection phase gathered for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportData {
    pub records: Vec<ExerciseRecord>,
    pub span: Option<WorkoutSpan>,
    pub series: Vec<ExerciseSeries>,
}

/// Horizontal alignment of paragraphs and charts.
///
/// The variants map directly to [`genpdf::Alignment`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
}

/// Paragraph made of styled spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Creates a left-aligned paragraph from the provided spans.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Concatenated text of all spans.
    pub fn text(&self) -> String {
        richtext::plain_text(&self.spans)
    }

    /// Sets the alignment and returns the updated paragraph.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// A grid of text cells with a single header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableBlock {
    headers: Vec<Span>,
    column_weights: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Creates an empty table with the given header cells.
    ///
    /// Every column gets an equal width until [`TableBlock::with_column_weights`] says otherwise.
    pub fn new(headers: impl Into<Vec<Span>>) -> Self {
        let headers = headers.into();
        let column_weights = vec![1; headers.len()];
        Self {
            headers,
            column_weights,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[Span] {
        &self.headers
    }

    pub fn column_weights(&self) -> &[usize] {
        &self.column_weights
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Sets relative column widths. Ignored unless one weight per column is given.
    pub fn with_column_weights(mut self, weights: impl Into<Vec<usize>>) -> Self {
        let weights = weights.into();
        if weights.len() == self.headers.len() {
            self.column_weights = weights;
        }
        self
    }

    /// Appends a data row. Short rows are padded with empty cells and long rows truncated.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.column_count())
            .map(Into::into)
            .collect();
        row.resize(self.column_count(), String::new());
        self.rows.push(row);
    }
}

/// A series rasterised into a chart at render time and scaled to the rest of its page.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartBlock {
    series: ExerciseSeries,
    alignment: HorizontalAlignment,
}

impl ChartBlock {
    pub fn new(series: ExerciseSeries) -> Self {
        Self {
            series,
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn series(&self) -> &ExerciseSeries {
        &self.series
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Individual content blocks of a report, rendered in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(RichParagraph),
    Table(TableBlock),
    Chart(ChartBlock),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    /// Convenience helper for building a left-aligned paragraph block.
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }
}

/// The assembled report: a title for the PDF metadata plus its ordered content.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportDocument {
    title: String,
    blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Appends a block and returns the updated document.
    pub fn with_block(mut self, block: Block) -> Self {
        self.push(block);
        self
    }

    /// Exercise names of the charts, in document order.
    pub fn chart_titles(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Chart(chart) => Some(chart.series().exercise_name().to_owned()),
                _ => None,
            })
            .collect()
    }
}
