//! ScrolliTelli Render Engine
//!
//! Composites section images (blur + sharp mask window) and exports a story
//! as one self-contained, scroll-driven HTML presentation whose embedded
//! script repeats the same compositing in the browser.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ImagePayload ──decode──▶ DecodedImage ──┐
//!                                         ├── scale to output size
//! SectionModel (blur, mask, authored) ────┘         │
//!                                                   ├── Gaussian blur (σ = blurAmount)
//!                                                   │
//!                                                   ├── punch mask (destination-out)
//!                                                   ▼
//!                                            overlay PixelBuffer ──over sharp base──▶ frame
//!
//! StoryDocument ──populated sections──▶ ExportGenerator ──▶ <slug>.html
//!                                          (layout + inline JSON + playback script)
//! ```

pub mod blur;
pub mod compositor;
pub mod decode;
pub mod export;
pub mod playback;

pub use compositor::*;
pub use decode::*;
pub use export::*;
pub use playback::*;
