//! Interactive state of one section while it is being edited.
//!
//! The editor owns a draft of the section. Every control goes through an
//! explicit transition; `snapshot()` produces the wholesale update that the
//! host pushes into the document after each change.
//!
//! Mask drawing follows a small state machine:
//!
//! ```text
//!   Idle ──pointer_down (mode selected)──▶ Drawing { start }
//!     ▲                                        │
//!     └──────pointer_up: commit shape──────────┘
//!     └──────cancel_drag: keep old shape───────┘
//! ```

use crate::payload::ImagePayload;
use crate::section::{snap_blur, SectionModel, BLUR_STEP, DEFAULT_BLUR, MAX_BLUR};
use crate::shape::{CanvasSize, Point, ShapeKind, ShapeMask};

/// Range and default of the blur control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurControl {
    pub default: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for BlurControl {
    fn default() -> Self {
        Self {
            default: DEFAULT_BLUR,
            max: MAX_BLUR,
            step: BLUR_STEP,
        }
    }
}

/// Pointer drag progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Drawing {
        start: Point,
    },
}

/// On-screen rectangle the canvas is displayed in, in client units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert a client-space pointer position into canvas pixels.
    pub fn to_canvas(&self, client_x: f64, client_y: f64, canvas: CanvasSize) -> Point {
        let sx = if self.width > 0.0 {
            canvas.width as f64 / self.width
        } else {
            1.0
        };
        let sy = if self.height > 0.0 {
            canvas.height as f64 / self.height
        } else {
            1.0
        };
        Point::new((client_x - self.left) * sx, (client_y - self.top) * sy)
    }
}

/// Draft state of a single section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionEditor {
    image: Option<ImagePayload>,
    shape: Option<ShapeMask>,
    mode: Option<ShapeKind>,
    drag: DragState,
    text: String,
    blur: f64,
    canvas: CanvasSize,
    control: BlurControl,
}

impl SectionEditor {
    /// A fresh editor for a newly created section.
    pub fn new(initial_image: Option<ImagePayload>) -> Self {
        Self::with_control(initial_image, BlurControl::default())
    }

    pub fn with_control(initial_image: Option<ImagePayload>, control: BlurControl) -> Self {
        Self {
            image: initial_image,
            shape: None,
            mode: None,
            drag: DragState::Idle,
            text: String::new(),
            blur: snap_blur(control.default, control.max, control.step),
            canvas: CanvasSize::default(),
            control,
        }
    }

    /// Reopen an editor on an existing snapshot.
    pub fn from_model(model: &SectionModel, control: BlurControl) -> Self {
        Self {
            image: model.image.clone(),
            shape: model.shape,
            mode: None,
            drag: DragState::Idle,
            text: model.text.clone(),
            blur: snap_blur(model.blur_amount, control.max, control.step),
            canvas: model.authored_size(),
            control,
        }
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn shape(&self) -> Option<&ShapeMask> {
        self.shape.as_ref()
    }

    pub fn draw_mode(&self) -> Option<ShapeKind> {
        self.mode
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.drag, DragState::Drawing { .. })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blur(&self) -> f64 {
        self.blur
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Choose the shape drawn by the next drag.
    pub fn select_mode(&mut self, kind: ShapeKind) {
        self.mode = Some(kind);
    }

    /// Start a drag. Ignored when no draw mode is selected.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        if self.mode.is_none() {
            return false;
        }
        self.drag = DragState::Drawing { start: at };
        true
    }

    /// Outline to preview while dragging. The committed shape is untouched.
    pub fn pointer_move(&self, at: Point) -> Option<ShapeMask> {
        match (self.drag, self.mode) {
            (DragState::Drawing { start }, Some(kind)) => Some(ShapeMask::from_drag(kind, start, at)),
            _ => None,
        }
    }

    /// Finish a drag, replacing any previous shape.
    ///
    /// Returns the committed shape, or `None` when no drag was in progress.
    pub fn pointer_up(&mut self, at: Point) -> Option<ShapeMask> {
        let DragState::Drawing { start } = self.drag else {
            return None;
        };
        self.drag = DragState::Idle;
        let kind = self.mode?;
        let shape = ShapeMask::from_drag(kind, start, at);
        self.shape = Some(shape);
        tracing::debug!(kind = ?kind, "Committed mask");
        Some(shape)
    }

    /// Abandon a drag in progress; the previous shape stays.
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Remove the mask and leave draw mode.
    pub fn clear_shape(&mut self) {
        self.shape = None;
        self.mode = None;
        self.drag = DragState::Idle;
    }

    /// Set the blur strength, clamped and snapped to the control's step.
    pub fn set_blur(&mut self, value: f64) -> f64 {
        self.blur = snap_blur(value, self.control.max, self.control.step);
        self.blur
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Swap in a new image. The mask is kept.
    pub fn replace_image(&mut self, image: ImagePayload) {
        self.image = Some(image);
    }

    /// Turn the section into a text-only one; the mask goes with the image.
    pub fn remove_image(&mut self) {
        self.image = None;
        self.shape = None;
        self.drag = DragState::Idle;
    }

    /// Record the canvas size once the image has been laid out.
    pub fn layout_canvas(&mut self, size: CanvasSize) {
        self.canvas = size;
    }

    /// The wholesale update for the document.
    pub fn snapshot(&self) -> SectionModel {
        SectionModel {
            image: self.image.clone(),
            shape: self.shape,
            text: self.text.clone(),
            blur_amount: self.blur,
            canvas_width: self.canvas.width,
            canvas_height: self.canvas.height,
        }
    }
}
