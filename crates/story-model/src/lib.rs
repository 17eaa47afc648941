//! ScrolliTelli Story Model
//!
//! Defines the core data contracts for ScrolliTelli stories:
//! - **Shape:** The circle/rectangle mask that punches a sharp window through the blur
//! - **Section:** One image + text unit with its blur strength and authored canvas size
//! - **Document:** The ordered, never-empty list of sections
//! - **Editor:** Per-section interactive state for drawing masks and tuning blur
//! - **Manifest:** The story file consumed by the command-line host
//!
//! Mask coordinates are always expressed in the pixel space of the canvas the
//! mask was authored on (`canvasWidth` x `canvasHeight`), never in display units.

pub mod document;
pub mod editor;
pub mod manifest;
pub mod payload;
pub mod section;
pub mod shape;

pub use document::*;
pub use editor::*;
pub use manifest::*;
pub use payload::*;
pub use section::*;
pub use shape::*;
