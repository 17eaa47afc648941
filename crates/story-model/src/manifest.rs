//! Story manifest file used by the command-line host.
//!
//! A manifest is the same section array the exported presentation embeds,
//! plus a title and creation time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{StoryDocument, StoryError};
use crate::section::SectionModel;

/// On-disk story description (`story.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryFile {
    /// Schema version.
    pub version: String,

    /// Presentation title, if one was chosen.
    #[serde(default)]
    pub title: Option<String>,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Sections in presentation order.
    pub sections: Vec<SectionModel>,
}

impl StoryFile {
    /// Capture every section of a document; unopened sections get defaults.
    pub fn from_document(document: &StoryDocument, title: Option<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            title,
            created_at: chrono::Utc::now().to_rfc3339(),
            sections: document.iter().map(|s| s.model()).collect(),
        }
    }

    /// Read a manifest. Blur strengths outside `[0, MAX_BLUR]` are snapped
    /// back into range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| StoryError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut file: Self = serde_json::from_str(&json).map_err(|e| StoryError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        for (index, section) in file.sections.iter_mut().enumerate() {
            let requested = section.blur_amount;
            if section.normalize_blur() {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    requested,
                    blur = section.blur_amount,
                    "Blur strength out of range; snapped"
                );
            }
        }
        Ok(file)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoryError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| StoryError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| StoryError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Rebuild the editable document; every section comes back populated.
    pub fn into_document(self) -> Result<StoryDocument, StoryError> {
        StoryDocument::from_models(self.sections)
    }
}
