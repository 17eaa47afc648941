//! Section compositor: blurred overlay with a sharp mask window.
//!
//! The overlay is the section image scaled to the output size, blurred, with
//! the mask region made fully transparent. Laid over an unblurred copy of the
//! same image it shows the sharp source inside the mask and blur elsewhere.
//! The exported playback script performs the same steps on a canvas.

use image::imageops::{self, FilterType};
use scrollitelli_common::{ScrolliError, ScrolliResult};
use scrollitelli_story_model::{CanvasSize, SectionModel, ShapeMask};

use crate::blur::{gaussian_blur_premul, premultiply_in_place, unpremultiply_in_place};
use crate::decode::DecodedImage;

/// Premultiplied RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    /// Premultiplied bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.pixel(x, y).map(|p| p[3])
    }

    /// Number of fully transparent pixels.
    pub fn transparent_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] == 0).count()
    }

    /// Straight-alpha copy for encoding to image files.
    pub fn to_rgba_image(&self) -> ScrolliResult<image::RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_in_place(&mut data);
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ScrolliError::render("pixel buffer does not match its dimensions"))
    }
}

/// Draw `image` stretched to `output`, without any filter.
pub fn scale_image(image: &DecodedImage, output: CanvasSize) -> ScrolliResult<PixelBuffer> {
    if output.is_empty() {
        return Err(ScrolliError::render(format!(
            "cannot render into a {}x{} buffer",
            output.width, output.height
        )));
    }
    let mut data = if image.natural_size() == output {
        image.pixels().as_raw().clone()
    } else {
        imageops::resize(image.pixels(), output.width, output.height, FilterType::Triangle)
            .into_raw()
    };
    premultiply_in_place(&mut data);
    Ok(PixelBuffer {
        width: output.width,
        height: output.height,
        data,
    })
}

/// Render the blurred, mask-punched overlay for one image.
///
/// * `blur_amount` is the blur standard deviation in output pixels; it is not
///   rescaled with the image. `0` draws the image with no filter.
/// * `shape` is in `authored` canvas space and is mapped onto `output`; a
///   missing shape leaves the whole frame blurred.
pub fn render_overlay(
    image: &DecodedImage,
    blur_amount: f64,
    shape: Option<&ShapeMask>,
    output: CanvasSize,
    authored: CanvasSize,
) -> ScrolliResult<PixelBuffer> {
    let scaled = scale_image(image, output)?;
    let mut data = if blur_amount > 0.0 {
        gaussian_blur_premul(&scaled.data, output.width, output.height, blur_amount)?
    } else {
        scaled.data
    };

    if let Some(shape) = shape {
        let window = shape.rescaled(authored, output);
        punch_out(&mut data, output, &window);
    }

    Ok(PixelBuffer {
        width: output.width,
        height: output.height,
        data,
    })
}

/// Clear every pixel whose center lies inside `window`.
fn punch_out(data: &mut [u8], size: CanvasSize, window: &ShapeMask) {
    let (x0, y0, x1, y1) = window.bounds();
    let col_start = x0.floor().max(0.0) as u32;
    let row_start = y0.floor().max(0.0) as u32;
    let col_end = (x1.ceil().max(0.0) as u32).min(size.width);
    let row_end = (y1.ceil().max(0.0) as u32).min(size.height);

    for row in row_start..row_end {
        for col in col_start..col_end {
            if window.covers_pixel(col, row) {
                let i = ((row as usize) * (size.width as usize) + col as usize) * 4;
                data[i..i + 4].fill(0);
            }
        }
    }
}

/// Render a section's overlay at `output` resolution.
pub fn render_section(
    section: &SectionModel,
    image: &DecodedImage,
    output: CanvasSize,
) -> ScrolliResult<PixelBuffer> {
    tracing::trace!(
        width = output.width,
        height = output.height,
        blur = section.blur_amount,
        masked = section.shape.is_some(),
        "Rendering section overlay"
    );
    render_overlay(
        image,
        section.blur_amount,
        section.shape.as_ref(),
        output,
        section.authored_size(),
    )
}

/// Render what the editor canvas shows: the overlay at the authored size.
///
/// Sections that were never laid out fall back to the image's natural size.
pub fn preview_section(section: &SectionModel, image: &DecodedImage) -> ScrolliResult<PixelBuffer> {
    let authored = section.authored_size();
    let output = if authored.is_empty() {
        image.natural_size()
    } else {
        authored
    };
    render_section(section, image, output)
}

/// Source-over `overlay` onto `base`; both must share a size.
pub fn composite_over(base: &PixelBuffer, overlay: &PixelBuffer) -> ScrolliResult<PixelBuffer> {
    if base.size() != overlay.size() {
        return Err(ScrolliError::render(
            "composite_over expects equally sized buffers",
        ));
    }
    let mut data = base.data.clone();
    for (d, s) in data.chunks_exact_mut(4).zip(overlay.data.chunks_exact(4)) {
        let inv = 255 - u16::from(s[3]);
        for c in 0..4 {
            d[c] = s[c].saturating_add(mul_div255(u16::from(d[c]), inv));
        }
    }
    Ok(PixelBuffer {
        width: base.width,
        height: base.height,
        data,
    })
}

/// Final frame: sharp base with the section overlay on top.
pub fn compose_frame(
    section: &SectionModel,
    image: &DecodedImage,
    output: CanvasSize,
) -> ScrolliResult<PixelBuffer> {
    let base = scale_image(image, output)?;
    let overlay = render_section(section, image, output)?;
    composite_over(&base, &overlay)
}

fn mul_div255(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}
