//! Styled text fragments used by the report's paragraphs and table headers.
//!
//! A [`Span`] carries the inline styling the report needs: bold weight and an explicit font
//! size. Spans stay independent of the rendering crate until [`Span::to_styled_string`] maps
//! them onto [`genpdf::style::StyledString`].

use genpdf::style::{Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    font_size: Option<u8>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns the explicit font size in points, if one overrides the document default.
    pub fn font_size(&self) -> Option<u8> {
        self.font_size
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Overrides the font size (in points) for this span.
    pub fn sized(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        if let Some(size) = self.font_size {
            style.set_font_size(size);
        }
        style
    }

    /// Converts the span into a [`StyledString`] understood by `genpdf` elements.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

/// Concatenates the raw text of a sequence of spans.
pub fn plain_text<'a, I>(spans: I) -> String
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(Span::text).collect()
}
