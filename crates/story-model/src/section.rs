//! Section data: one image + text unit of a story.

use serde::{Deserialize, Serialize};

use crate::payload::ImagePayload;
use crate::shape::{CanvasSize, ShapeMask};

/// Blur strength given to a freshly added section.
pub const DEFAULT_BLUR: f64 = 2.0;

/// Upper bound of the blur control.
pub const MAX_BLUR: f64 = 20.0;

/// Granularity of the blur control.
pub const BLUR_STEP: f64 = 0.5;

/// The full editable state of one section.
///
/// Serialized with camelCase keys; this is the record embedded in exported
/// presentations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionModel {
    /// Image shown for this section. `None` makes a text-only section.
    pub image: Option<ImagePayload>,

    /// Sharp window. `None` blurs the whole image.
    pub shape: Option<ShapeMask>,

    /// Text revealed next to the image.
    #[serde(default)]
    pub text: String,

    /// Blur radius in output pixels, within `[0, MAX_BLUR]`.
    pub blur_amount: f64,

    /// Canvas width the mask was authored on.
    #[serde(default)]
    pub canvas_width: u32,

    /// Canvas height the mask was authored on.
    #[serde(default)]
    pub canvas_height: u32,
}

impl SectionModel {
    /// A fresh section: no mask, no text, default blur.
    pub fn new(image: Option<ImagePayload>) -> Self {
        Self {
            image,
            shape: None,
            text: String::new(),
            blur_amount: DEFAULT_BLUR,
            canvas_width: 0,
            canvas_height: 0,
        }
    }

    /// Replace any existing mask.
    pub fn set_shape(&mut self, shape: ShapeMask) {
        self.shape = Some(shape);
    }

    pub fn clear_shape(&mut self) {
        self.shape = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Clamp `blur_amount` into `[0, MAX_BLUR]` on `BLUR_STEP` increments.
    /// Returns whether the stored value changed.
    pub fn normalize_blur(&mut self) -> bool {
        let snapped = snap_blur(self.blur_amount, MAX_BLUR, BLUR_STEP);
        // NaN never compares equal, so it always counts as changed.
        let changed = snapped != self.blur_amount;
        self.blur_amount = snapped;
        changed
    }

    /// The canvas the mask coordinates refer to.
    pub fn authored_size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}

/// Clamp a requested blur strength into `[0, max]` and snap it to `step`.
pub fn snap_blur(value: f64, max: f64, step: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let clamped = value.clamp(0.0, max);
    if step <= 0.0 {
        return clamped;
    }
    ((clamped / step).round() * step).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_section_defaults() {
        let section = SectionModel::new(None);
        assert!(section.shape.is_none());
        assert!(section.text.is_empty());
        assert_eq!(section.blur_amount, DEFAULT_BLUR);
        assert!(!section.has_image());
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let mut section = SectionModel::new(None);
        section.canvas_width = 640;
        section.canvas_height = 480;
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["blurAmount"], 2.0);
        assert_eq!(json["canvasWidth"], 640);
        assert_eq!(json["canvasHeight"], 480);
        assert!(json["image"].is_null());
        assert!(json["shape"].is_null());
    }

    #[test]
    fn test_set_shape_replaces_previous() {
        let mut section = SectionModel::new(None);
        section.set_shape(ShapeMask::Circle {
            x: 1.0,
            y: 1.0,
            radius: 1.0,
        });
        let rect = ShapeMask::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
        };
        section.set_shape(rect);
        assert_eq!(section.shape, Some(rect));
        section.clear_shape();
        assert!(section.shape.is_none());
    }

    #[test]
    fn test_snap_blur() {
        assert_eq!(snap_blur(3.3, MAX_BLUR, BLUR_STEP), 3.5);
        assert_eq!(snap_blur(3.2, MAX_BLUR, BLUR_STEP), 3.0);
        assert_eq!(snap_blur(-1.0, MAX_BLUR, BLUR_STEP), 0.0);
        assert_eq!(snap_blur(42.0, MAX_BLUR, BLUR_STEP), 20.0);
        assert_eq!(snap_blur(f64::NAN, MAX_BLUR, BLUR_STEP), 0.0);
    }
}
