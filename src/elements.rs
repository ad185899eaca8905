//! Element implementations built on top of `genpdf` primitives.
//!
//! [`FittedImage`] scales an image uniformly so it fills the space left on the current page,
//! which is how chart pages are laid out.

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, RenderResult, Scale, Size};

/// Resolution `genpdf` assumes for images without an explicit DPI.
const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
/// Fraction of the available area a fitted image may occupy, absorbing rounding in the layout.
const FIT_FILL_RATIO: f64 = 0.98;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Largest uniform scale factor at which `natural` still fits into `available`.
///
/// Returns `None` when the natural size is degenerate.
pub(crate) fn fit_scale(natural: (f64, f64), available: (f64, f64)) -> Option<f64> {
    let (natural_width, natural_height) = natural;
    let (available_width, available_height) = available;
    if natural_width <= f64::EPSILON || natural_height <= f64::EPSILON {
        return None;
    }

    let scale = (available_width / natural_width).min(available_height / natural_height);
    (scale > 0.0).then_some(scale * FIT_FILL_RATIO)
}

/// An image scaled to the width and remaining height of the area it is rendered into.
///
/// The aspect ratio is always preserved. When the area is already exhausted the element
/// requests a new page instead of shrinking to nothing.
pub struct FittedImage {
    image: Image,
    natural_size: Size,
    alignment: Alignment,
}

impl FittedImage {
    /// Wraps an already decoded image.
    ///
    /// `genpdf` rejects images with an alpha channel, so the pixels are flattened to RGB first.
    pub fn from_dynamic_image(image: image::DynamicImage) -> Result<Self, Error> {
        let image = image::DynamicImage::ImageRgb8(image.to_rgb8());
        let natural_size = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
        Ok(Self {
            image: Image::from_dynamic_image(image)?,
            natural_size,
            alignment: Alignment::Left,
        })
    }

    /// Sets the horizontal alignment and returns the updated element.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Element for FittedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let natural = (
            mm_to_f64(self.natural_size.width),
            mm_to_f64(self.natural_size.height),
        );
        let size = area.size();
        let available = (mm_to_f64(size.width), mm_to_f64(size.height));

        let Some(scale) = fit_scale(natural, available) else {
            let mut result = RenderResult::default();
            result.has_more = true;
            return Ok(result);
        };

        self.image.set_alignment(self.alignment);
        self.image.set_scale(Scale::new(scale, scale));
        self.image.render(context, area, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_scale_is_limited_by_width() {
        let scale = fit_scale((100.0, 50.0), (190.0, 250.0)).unwrap();
        assert!((scale - 1.9 * FIT_FILL_RATIO).abs() < 1e-9);
    }

    #[test]
    fn fit_scale_is_limited_by_height() {
        let scale = fit_scale((100.0, 75.0), (190.0, 120.0)).unwrap();
        assert!((scale - 1.6 * FIT_FILL_RATIO).abs() < 1e-9);
    }

    #[test]
    fn fit_scale_rejects_degenerate_sizes() {
        assert_eq!(fit_scale((0.0, 10.0), (100.0, 100.0)), None);
        assert_eq!(fit_scale((10.0, 10.0), (0.0, 100.0)), None);
    }

    #[test]
    fn estimated_size_uses_dpi() {
        let image = image::DynamicImage::new_rgb8(300, 600);
        let size = estimated_image_size(&image, 300.0);
        assert!((mm_to_f64(size.width) - 25.4).abs() < 1e-9);
        assert!((mm_to_f64(size.height) - 50.8).abs() < 1e-9);
    }
}
