//! The ordered list of sections that makes up a story.

use std::path::PathBuf;

use crate::payload::ImagePayload;
use crate::section::SectionModel;

/// Largest section count accepted when starting a story.
pub const MAX_SECTIONS: i64 = u16::MAX as i64;

/// Identity of a section for list rendering. Not used for addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub u64);

/// One slot in the story.
///
/// `original_image` is the image the slot was created with; `data` is the
/// latest snapshot pushed by the section editor, absent until the first edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: SectionId,
    original_image: Option<ImagePayload>,
    data: Option<SectionModel>,
}

impl Section {
    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn original_image(&self) -> Option<&ImagePayload> {
        self.original_image.as_ref()
    }

    pub fn data(&self) -> Option<&SectionModel> {
        self.data.as_ref()
    }

    /// Whether the editor has pushed content into this slot.
    pub fn is_populated(&self) -> bool {
        self.data.is_some()
    }

    /// The edited image if there is one, else the original.
    pub fn current_image(&self) -> Option<&ImagePayload> {
        self.data
            .as_ref()
            .and_then(|d| d.image.as_ref())
            .or(self.original_image.as_ref())
    }

    /// The section as the editor should open it.
    pub fn model(&self) -> SectionModel {
        self.data
            .clone()
            .unwrap_or_else(|| SectionModel::new(self.original_image.clone()))
    }
}

/// Ordered, never-empty collection of sections.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryDocument {
    sections: Vec<Section>,
    next_id: u64,
}

impl StoryDocument {
    /// A single-section story.
    pub fn new(image: Option<ImagePayload>) -> Self {
        let mut doc = Self {
            sections: Vec::new(),
            next_id: 0,
        };
        let section = doc.make_section(image, None);
        doc.sections.push(section);
        doc
    }

    /// Start a story from one uploaded image repeated over `count` sections.
    ///
    /// `count` must lie in `1..=MAX_SECTIONS`.
    pub fn from_upload(image: Option<ImagePayload>, count: i64) -> Result<Self, StoryError> {
        let image = image.ok_or(StoryError::NoImage)?;
        if !(1..=MAX_SECTIONS).contains(&count) {
            return Err(StoryError::InvalidSectionCount { count });
        }

        let mut doc = Self {
            sections: Vec::new(),
            next_id: 0,
        };
        for _ in 0..count {
            let section = doc.make_section(Some(image.clone()), None);
            doc.sections.push(section);
        }
        tracing::info!(sections = count, "Created story from upload");
        Ok(doc)
    }

    /// Rebuild a story whose sections are all already populated.
    ///
    /// Blur strengths are brought back into the editor's domain.
    pub fn from_models(models: Vec<SectionModel>) -> Result<Self, StoryError> {
        if models.is_empty() {
            return Err(StoryError::InvalidSectionCount { count: 0 });
        }
        let mut doc = Self {
            sections: Vec::with_capacity(models.len()),
            next_id: 0,
        };
        for mut model in models {
            model.normalize_blur();
            let section = doc.make_section(model.image.clone(), Some(model));
            doc.sections.push(section);
        }
        Ok(doc)
    }

    fn make_section(
        &mut self,
        original_image: Option<ImagePayload>,
        data: Option<SectionModel>,
    ) -> Section {
        let id = SectionId(self.next_id);
        self.next_id += 1;
        Section {
            id,
            original_image,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Whether `delete_at` would be accepted.
    pub fn can_delete(&self) -> bool {
        self.sections.len() > 1
    }

    /// Insert a fresh section right after `index`, reusing its current image.
    ///
    /// The new section starts with no text, no mask and default blur.
    /// Returns the index of the inserted section.
    pub fn insert_after(&mut self, index: usize) -> Result<usize, StoryError> {
        let source = self.check_index(index)?;
        let image = source.current_image().cloned();
        let section = self.make_section(image, None);
        let id = section.id;
        self.sections.insert(index + 1, section);
        tracing::debug!(after = index, id = id.0, len = self.len(), "Inserted section");
        Ok(index + 1)
    }

    /// Remove the section at `index`. The last remaining section cannot be removed.
    pub fn delete_at(&mut self, index: usize) -> Result<Section, StoryError> {
        self.check_index(index)?;
        if !self.can_delete() {
            tracing::warn!(index, "Refused to delete the last section");
            return Err(StoryError::LastSection);
        }
        let removed = self.sections.remove(index);
        tracing::debug!(index, id = removed.id.0, len = self.len(), "Deleted section");
        Ok(removed)
    }

    /// Replace the section's content wholesale with the latest editor snapshot.
    ///
    /// An out-of-range blur strength is snapped into `[0, MAX_BLUR]`.
    pub fn update_at(&mut self, index: usize, mut model: SectionModel) -> Result<(), StoryError> {
        self.check_index(index)?;
        model.normalize_blur();
        self.sections[index].data = Some(model);
        tracing::trace!(index, "Updated section");
        Ok(())
    }

    /// Snapshots of every populated section, in story order.
    pub fn populated(&self) -> Vec<&SectionModel> {
        self.sections.iter().filter_map(|s| s.data.as_ref()).collect()
    }

    fn check_index(&self, index: usize) -> Result<&Section, StoryError> {
        self.sections.get(index).ok_or(StoryError::IndexOutOfRange {
            index,
            len: self.sections.len(),
        })
    }
}

/// Errors raised by story operations. None of them change the document.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Cannot delete the last remaining section. At least one section must remain.")]
    LastSection,

    #[error("Section {index} does not exist (story has {len} sections)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No image has been uploaded")]
    NoImage,

    #[error("Invalid number of sections: {count}")]
    InvalidSectionCount { count: i64 },

    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
