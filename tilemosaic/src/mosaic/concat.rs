//! Raster concatenation.

use image::RgbaImage;

/// Direction images are stacked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Top to bottom
    Vertical,
    /// Left to right
    Horizontal,
}

/// Stacks images along `axis`, in slice order.
///
/// The cross-axis extent of the result is the largest input extent; narrower
/// inputs leave transparent pixels. Callers that need a gapless result check
/// sizes first.
pub fn concat(images: &[RgbaImage], axis: Axis) -> RgbaImage {
    let (width, height) = match axis {
        Axis::Vertical => (
            images.iter().map(|i| i.width()).max().unwrap_or(0),
            images.iter().map(|i| i.height()).sum(),
        ),
        Axis::Horizontal => (
            images.iter().map(|i| i.width()).sum(),
            images.iter().map(|i| i.height()).max().unwrap_or(0),
        ),
    };

    let mut canvas = RgbaImage::new(width, height);
    let mut offset: i64 = 0;
    for image in images {
        match axis {
            Axis::Vertical => {
                image::imageops::replace(&mut canvas, image, 0, offset);
                offset += i64::from(image.height());
            }
            Axis::Horizontal => {
                image::imageops::replace(&mut canvas, image, offset, 0);
                offset += i64::from(image.width());
            }
        }
    }
    canvas
}
