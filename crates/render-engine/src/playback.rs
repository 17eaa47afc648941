//! Scroll-driven playback, mirrored from the exported script.
//!
//! The exported presentation keeps one overlay canvas per image section and
//! activates sections as transition spacers scroll past the middle of the
//! fixed image viewport. [`Playback`] follows the same rules so presentations
//! can be checked without a browser.

use scrollitelli_common::ExportDefaults;
use scrollitelli_story_model::SectionModel;
use tokio::task::JoinSet;

use crate::compositor::{render_section, PixelBuffer};
use crate::decode::{decode, DecodedImage};

/// Vertical extent of one transition spacer, relative to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacerRect {
    pub top: f64,
    pub height: f64,
}

impl SpacerRect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Widest window, in CSS pixels, that gets the stacked layout.
pub const NARROW_MAX_WIDTH: f64 = 1024.0;

/// Pixel geometry of the exported layout for a given window height.
///
/// Text blocks and spacers alternate in one column. In the wide layout the
/// fixed image viewport spans the full window height and the column starts
/// at the top of the page. In the narrow layout the viewport takes the top
/// half of the window and the column starts below it. Text blocks are
/// assumed to sit at their minimum height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackLayout {
    pub viewport_height: f64,
    pub image_height: f64,
    pub column_offset: f64,
    pub text_section_height: f64,
    pub spacer_height: f64,
}

impl PlaybackLayout {
    /// Wide (side-by-side) layout.
    pub fn from_defaults(defaults: &ExportDefaults, viewport_height: f64) -> Self {
        Self {
            viewport_height,
            image_height: viewport_height,
            column_offset: 0.0,
            text_section_height: viewport_height * f64::from(defaults.text_section_min_vh) / 100.0,
            spacer_height: viewport_height * f64::from(defaults.spacer_height_vh) / 100.0,
        }
    }

    /// Narrow (stacked) layout: image over the top half, text below.
    pub fn narrow(defaults: &ExportDefaults, viewport_height: f64) -> Self {
        Self {
            image_height: viewport_height / 2.0,
            column_offset: viewport_height / 2.0,
            ..Self::from_defaults(defaults, viewport_height)
        }
    }

    /// The layout the stylesheet picks for a `width` x `height` window.
    pub fn for_window(defaults: &ExportDefaults, width: f64, height: f64) -> Self {
        if width <= NARROW_MAX_WIDTH {
            Self::narrow(defaults, height)
        } else {
            Self::from_defaults(defaults, height)
        }
    }

    /// Vertical midpoint of the fixed image viewport.
    pub fn viewport_mid(&self) -> f64 {
        self.image_height / 2.0
    }

    fn stride(&self) -> f64 {
        self.text_section_height + self.spacer_height
    }

    /// Spacer positions for a story of `section_count` sections at `scroll_y`.
    pub fn spacers(&self, section_count: usize, scroll_y: f64) -> Vec<SpacerRect> {
        (0..section_count.saturating_sub(1))
            .map(|i| SpacerRect {
                top: self.column_offset + i as f64 * self.stride() + self.text_section_height
                    - scroll_y,
                height: self.spacer_height,
            })
            .collect()
    }

    /// Smallest scroll offset at which `index` becomes the active section.
    pub fn scroll_to_activate(&self, index: usize) -> f64 {
        if index == 0 {
            return 0.0;
        }
        // Spacer `index - 1` ends at `column_offset + index * stride - scroll_y`.
        (self.column_offset + index as f64 * self.stride() - self.viewport_mid()).max(0.0) + 1.0
    }
}

/// Number of spacers whose bottom edge is above `viewport_mid`, capped to
/// the last section.
pub fn active_section(spacers: &[SpacerRect], viewport_mid: f64, section_count: usize) -> usize {
    let passed = spacers
        .iter()
        .filter(|spacer| spacer.bottom() < viewport_mid)
        .count();
    passed.min(section_count.saturating_sub(1))
}

/// What the page shows after an activation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    /// Newly active section.
    pub index: usize,

    /// Section whose image is the sharp base, or `None` to hide it.
    pub base_image: Option<usize>,

    /// Overlay faded in; every other overlay is hidden.
    pub visible_overlay: Option<usize>,
}

/// Runtime state of one presentation.
#[derive(Debug)]
pub struct Playback {
    sections: Vec<SectionModel>,
    images: Vec<Option<DecodedImage>>,
    overlays: Vec<Option<PixelBuffer>>,
    active: usize,
    subscribed: bool,
}

impl Playback {
    /// Initialize with section 0 active, before any scroll event.
    pub fn new(sections: Vec<SectionModel>) -> Self {
        let n = sections.len();
        Self {
            sections,
            images: vec![None; n],
            overlays: vec![None; n],
            active: 0,
            subscribed: true,
        }
    }

    pub fn sections(&self) -> &[SectionModel] {
        &self.sections
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn overlay(&self, index: usize) -> Option<&PixelBuffer> {
        self.overlays.get(index).and_then(Option::as_ref)
    }

    /// Current display state.
    pub fn activation(&self) -> Activation {
        let index = self.active;
        let has_image = self
            .sections
            .get(index)
            .map(SectionModel::has_image)
            .unwrap_or(false);
        Activation {
            index,
            base_image: has_image.then_some(index),
            visible_overlay: has_image.then_some(index),
        }
    }

    /// Decode every section image concurrently; each completion renders its
    /// overlay as soon as it arrives.
    pub async fn load_images(&mut self) {
        let mut tasks = JoinSet::new();
        for (index, section) in self.sections.iter().enumerate() {
            if let Some(payload) = section.image.clone() {
                tasks.spawn(async move { (index, decode(payload).await) });
            }
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(image))) => self.on_image_decoded(index, image),
                Ok((index, None)) => tracing::debug!(index, "Section image did not decode"),
                Err(e) => tracing::warn!(error = %e, "Image decode task panicked"),
            }
        }
    }

    /// Image decode completion for `index`: render its overlay at the
    /// image's natural resolution.
    pub fn on_image_decoded(&mut self, index: usize, image: DecodedImage) {
        if !self.subscribed || index >= self.sections.len() {
            return;
        }
        self.images[index] = Some(image);
        self.render(index);
    }

    fn render(&mut self, index: usize) {
        let (Some(section), Some(Some(image))) = (self.sections.get(index), self.images.get(index))
        else {
            return;
        };
        if !section.has_image() {
            return;
        }
        match render_section(section, image, image.natural_size()) {
            Ok(buffer) => self.overlays[index] = Some(buffer),
            Err(e) => tracing::debug!(index, error = %e, "Overlay render skipped"),
        }
    }

    /// Scroll event. Returns the new activation when the active section changed.
    pub fn on_scroll(&mut self, spacers: &[SpacerRect], viewport_mid: f64) -> Option<Activation> {
        if !self.subscribed {
            return None;
        }
        let next = active_section(spacers, viewport_mid, self.sections.len());
        if next == self.active {
            return None;
        }
        self.active = next;
        tracing::trace!(active = next, "Active section changed");
        Some(self.activation())
    }

    /// Resize event: re-render every decoded overlay, then re-evaluate scroll.
    pub fn on_resize(&mut self, spacers: &[SpacerRect], viewport_mid: f64) -> Option<Activation> {
        if !self.subscribed {
            return None;
        }
        for index in 0..self.sections.len() {
            self.render(index);
        }
        self.on_scroll(spacers, viewport_mid)
    }

    /// Release the scroll/resize subscriptions; later events are ignored.
    pub fn teardown(&mut self) {
        self.subscribed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use proptest::prelude::*;
    use scrollitelli_story_model::ShapeMask;

    fn layout() -> PlaybackLayout {
        PlaybackLayout::from_defaults(&ExportDefaults::default(), 1000.0)
    }

    fn image_section() -> SectionModel {
        let mut s = SectionModel::new(Some(
            scrollitelli_story_model::ImagePayload::from_bytes_with_mime(b"x", "image/png"),
        ));
        s.canvas_width = 8;
        s.canvas_height = 8;
        s
    }

    fn solid(width: u32, height: u32) -> DecodedImage {
        DecodedImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([90, 60, 30, 255])))
    }

    #[test]
    fn test_layout_units() {
        let l = layout();
        assert_eq!(l.text_section_height, 800.0);
        assert_eq!(l.spacer_height, 600.0);
        assert_eq!(l.viewport_mid(), 500.0);
    }

    #[test]
    fn test_narrow_window_stacks_image_over_text() {
        let defaults = ExportDefaults::default();
        let wide = PlaybackLayout::for_window(&defaults, 1440.0, 1000.0);
        let narrow = PlaybackLayout::for_window(&defaults, 800.0, 1000.0);
        assert_eq!(wide, layout());
        assert_eq!(narrow.viewport_mid(), 250.0);
        assert_eq!(narrow.spacers(2, 0.0)[0].top, 1300.0);

        // A scroll that switches the wide layout is not enough when stacked.
        let scroll = wide.scroll_to_activate(1);
        assert_eq!(active_section(&narrow.spacers(2, scroll), narrow.viewport_mid(), 2), 0);
        let scroll = narrow.scroll_to_activate(1);
        assert_eq!(active_section(&narrow.spacers(2, scroll), narrow.viewport_mid(), 2), 1);
        assert_eq!(
            active_section(&narrow.spacers(2, scroll - 2.0), narrow.viewport_mid(), 2),
            0
        );
    }

    #[test]
    fn test_no_spacers_for_single_section() {
        assert!(layout().spacers(1, 0.0).is_empty());
    }

    #[test]
    fn test_active_index_counts_passed_spacers() {
        let l = layout();
        assert_eq!(active_section(&l.spacers(3, 0.0), l.viewport_mid(), 3), 0);
        for index in 0..3 {
            let scroll = l.scroll_to_activate(index);
            assert_eq!(
                active_section(&l.spacers(3, scroll), l.viewport_mid(), 3),
                index
            );
            if index > 0 {
                assert_eq!(
                    active_section(&l.spacers(3, scroll - 2.0), l.viewport_mid(), 3),
                    index - 1
                );
            }
        }
    }

    #[test]
    fn test_active_index_is_monotonic_in_scroll() {
        let l = layout();
        let mut last = 0;
        for step in 0..200 {
            let scroll = step as f64 * 25.0;
            let active = active_section(&l.spacers(4, scroll), l.viewport_mid(), 4);
            assert!(active >= last);
            last = active;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_starts_on_first_section() {
        let playback = Playback::new(vec![image_section(), SectionModel::new(None)]);
        assert_eq!(
            playback.activation(),
            Activation {
                index: 0,
                base_image: Some(0),
                visible_overlay: Some(0)
            }
        );
    }

    #[test]
    fn test_text_only_section_hides_base_image() {
        let l = layout();
        let mut playback = Playback::new(vec![image_section(), SectionModel::new(None)]);
        let change = playback
            .on_scroll(&l.spacers(2, l.scroll_to_activate(1)), l.viewport_mid())
            .unwrap();
        assert_eq!(change.index, 1);
        assert_eq!(change.base_image, None);
        assert_eq!(change.visible_overlay, None);
    }

    #[test]
    fn test_scroll_without_change_reports_nothing() {
        let l = layout();
        let mut playback = Playback::new(vec![image_section(), image_section()]);
        assert!(playback.on_scroll(&l.spacers(2, 10.0), l.viewport_mid()).is_none());
    }

    #[test]
    fn test_decode_renders_at_natural_size() {
        let mut section = image_section();
        section.set_shape(ShapeMask::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
        });
        let mut playback = Playback::new(vec![section]);
        assert!(playback.overlay(0).is_none());

        playback.on_image_decoded(0, solid(16, 16));
        let overlay = playback.overlay(0).unwrap();
        assert_eq!(overlay.size().width, 16);
        // Authored 8x8 -> natural 16x16 doubles the window.
        assert_eq!(overlay.transparent_count(), 64);
    }

    #[test]
    fn test_teardown_ignores_events() {
        let l = layout();
        let mut playback = Playback::new(vec![image_section(), image_section()]);
        playback.teardown();
        assert!(!playback.is_subscribed());
        assert!(playback
            .on_scroll(&l.spacers(2, l.scroll_to_activate(1)), l.viewport_mid())
            .is_none());
        playback.on_image_decoded(0, solid(4, 4));
        assert!(playback.overlay(0).is_none());
    }

    proptest! {
        #[test]
        fn prop_active_index_is_monotonic_for_any_layout(
            viewport in 200.0..2000.0f64,
            spacer_vh in 10u32..150,
            text_vh in 10u32..150,
            count in 1usize..12,
            stacked in any::<bool>(),
            steps in proptest::collection::vec(0.0..400.0f64, 1..60),
        ) {
            let defaults = ExportDefaults {
                spacer_height_vh: spacer_vh,
                text_section_min_vh: text_vh,
                ..ExportDefaults::default()
            };
            let l = if stacked {
                PlaybackLayout::narrow(&defaults, viewport)
            } else {
                PlaybackLayout::from_defaults(&defaults, viewport)
            };
            let mut scroll = 0.0;
            let mut last = active_section(&l.spacers(count, scroll), l.viewport_mid(), count);
            for step in steps {
                scroll += step;
                let active = active_section(&l.spacers(count, scroll), l.viewport_mid(), count);
                prop_assert!(active >= last);
                prop_assert!(active < count);
                last = active;
            }
        }
    }
}
