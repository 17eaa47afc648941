//! Mask shapes and the pixel-space geometry they live in.
//!
//! Coordinates are in the pixel space of the canvas the mask was drawn on.

use serde::{Deserialize, Serialize};

/// A point in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Pixel dimensions of a canvas or rendered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (nothing can be rendered).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Per-axis factors mapping `authored` space onto `self`.
    ///
    /// An authored dimension of zero means the canvas was never laid out;
    /// that axis is left unscaled.
    pub fn scale_from(&self, authored: CanvasSize) -> (f64, f64) {
        let sx = if authored.width == 0 {
            1.0
        } else {
            self.width as f64 / authored.width as f64
        };
        let sy = if authored.height == 0 {
            1.0
        } else {
            self.height as f64 / authored.height as f64
        };
        (sx, sy)
    }
}

/// Which kind of shape the editor draws next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
}

/// The region of an image that stays sharp while the rest is blurred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeMask {
    /// Center and radius.
    Circle { x: f64, y: f64, radius: f64 },

    /// Anchor corner and signed extents. Negative extents grow left/up
    /// from the anchor and are kept as drawn.
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl ShapeMask {
    /// Build the shape spanned by a pointer drag from `start` to `end`.
    ///
    /// Circles are centered on `start` and reach `end`; rectangles keep the
    /// signed extents of the drag.
    pub fn from_drag(kind: ShapeKind, start: Point, end: Point) -> Self {
        match kind {
            ShapeKind::Circle => ShapeMask::Circle {
                x: start.x,
                y: start.y,
                radius: start.distance_to(&end),
            },
            ShapeKind::Rectangle => ShapeMask::Rectangle {
                x: start.x,
                y: start.y,
                width: end.x - start.x,
                height: end.y - start.y,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeMask::Circle { .. } => ShapeKind::Circle,
            ShapeMask::Rectangle { .. } => ShapeKind::Rectangle,
        }
    }

    /// Scale by per-axis factors.
    ///
    /// Circle radii follow the horizontal factor only, so a circle authored
    /// on one aspect ratio and rendered on another keeps a round window whose
    /// size tracks the width.
    pub fn scaled(&self, sx: f64, sy: f64) -> ShapeMask {
        match *self {
            ShapeMask::Circle { x, y, radius } => ShapeMask::Circle {
                x: x * sx,
                y: y * sy,
                radius: radius * sx,
            },
            ShapeMask::Rectangle {
                x,
                y,
                width,
                height,
            } => ShapeMask::Rectangle {
                x: x * sx,
                y: y * sy,
                width: width * sx,
                height: height * sy,
            },
        }
    }

    /// Map a mask from the canvas it was authored on to an output canvas.
    pub fn rescaled(&self, authored: CanvasSize, output: CanvasSize) -> ShapeMask {
        let (sx, sy) = output.scale_from(authored);
        self.scaled(sx, sy)
    }

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        match *self {
            ShapeMask::Circle { x, y, radius } => {
                let r = radius.abs();
                (x - r, y - r, x + r, y + r)
            }
            ShapeMask::Rectangle {
                x,
                y,
                width,
                height,
            } => (
                x.min(x + width),
                y.min(y + height),
                x.max(x + width),
                y.max(y + height),
            ),
        }
    }

    /// Whether a continuous point lies inside the mask.
    ///
    /// Rectangles are half-open on their far edges so an integer-aligned
    /// `w x h` rectangle covers exactly `w * h` pixel centers.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match *self {
            ShapeMask::Circle { x, y, radius } => {
                let dx = px - x;
                let dy = py - y;
                dx * dx + dy * dy <= radius * radius
            }
            ShapeMask::Rectangle { .. } => {
                let (x0, y0, x1, y1) = self.bounds();
                px >= x0 && px < x1 && py >= y0 && py < y1
            }
        }
    }

    /// Whether the pixel at integer coordinates is covered, sampled at its center.
    pub fn covers_pixel(&self, col: u32, row: u32) -> bool {
        self.contains(col as f64 + 0.5, row as f64 + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let shape = ShapeMask::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 30.0,
        };
        let json = serde_json::to_value(shape).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["width"], 50.0);

        let circle: ShapeMask =
            serde_json::from_str(r#"{"type":"circle","x":1,"y":2,"radius":3}"#).unwrap();
        assert_eq!(
            circle,
            ShapeMask::Circle {
                x: 1.0,
                y: 2.0,
                radius: 3.0
            }
        );
    }

    #[test]
    fn test_circle_from_drag_uses_distance() {
        let shape = ShapeMask::from_drag(
            ShapeKind::Circle,
            Point::new(10.0, 10.0),
            Point::new(13.0, 14.0),
        );
        assert_eq!(
            shape,
            ShapeMask::Circle {
                x: 10.0,
                y: 10.0,
                radius: 5.0
            }
        );
    }

    #[test]
    fn test_rectangle_from_drag_keeps_negative_extents() {
        let shape = ShapeMask::from_drag(
            ShapeKind::Rectangle,
            Point::new(40.0, 30.0),
            Point::new(10.0, 20.0),
        );
        assert_eq!(
            shape,
            ShapeMask::Rectangle {
                x: 40.0,
                y: 30.0,
                width: -30.0,
                height: -10.0
            }
        );
        assert!(shape.contains(25.0, 25.0));
        assert!(!shape.contains(45.0, 25.0));
    }

    #[test]
    fn test_rectangle_covers_exact_pixel_count() {
        let shape = ShapeMask::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 30.0,
        };
        let mut covered = 0;
        for row in 0..100 {
            for col in 0..100 {
                if shape.covers_pixel(col, row) {
                    covered += 1;
                }
            }
        }
        assert_eq!(covered, 50 * 30);
    }

    #[test]
    fn test_zero_authored_size_leaves_axis_unscaled() {
        let (sx, sy) = CanvasSize::new(200, 100).scale_from(CanvasSize::new(0, 50));
        assert_eq!(sx, 1.0);
        assert_eq!(sy, 2.0);
    }

    #[test]
    fn test_circle_radius_follows_horizontal_scale() {
        let shape = ShapeMask::Circle {
            x: 50.0,
            y: 40.0,
            radius: 10.0,
        };
        let scaled = shape.rescaled(CanvasSize::new(100, 100), CanvasSize::new(300, 100));
        assert_eq!(
            scaled,
            ShapeMask::Circle {
                x: 150.0,
                y: 40.0,
                radius: 30.0
            }
        );
    }

    proptest! {
        #[test]
        fn prop_uniform_scale_circle(
            x in 0.0f64..500.0,
            y in 0.0f64..500.0,
            r in 0.0f64..200.0,
            k in 0.1f64..8.0,
        ) {
            let scaled = ShapeMask::Circle { x, y, radius: r }.scaled(k, k);
            let ShapeMask::Circle { x: cx, y: cy, radius } = scaled else {
                panic!("circle must stay a circle");
            };
            prop_assert!((cx - x * k).abs() < 1e-9);
            prop_assert!((cy - y * k).abs() < 1e-9);
            prop_assert!((radius - r * k).abs() < 1e-9);
        }

        #[test]
        fn prop_non_uniform_circle_radius_uses_scale_x(
            r in 0.0f64..200.0,
            sx in 0.1f64..8.0,
            sy in 0.1f64..8.0,
        ) {
            let scaled = ShapeMask::Circle { x: 0.0, y: 0.0, radius: r }.scaled(sx, sy);
            let ShapeMask::Circle { radius, .. } = scaled else {
                panic!("circle must stay a circle");
            };
            prop_assert!((radius - r * sx).abs() < 1e-9);
        }

        #[test]
        fn prop_rectangle_scales_axes_independently(
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
            w in -100.0f64..100.0,
            h in -100.0f64..100.0,
            sx in 0.1f64..8.0,
            sy in 0.1f64..8.0,
        ) {
            let scaled = ShapeMask::Rectangle { x, y, width: w, height: h }.scaled(sx, sy);
            prop_assert_eq!(
                scaled,
                ShapeMask::Rectangle { x: x * sx, y: y * sy, width: w * sx, height: h * sy }
            );
        }
    }
}
