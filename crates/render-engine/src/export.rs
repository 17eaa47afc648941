//! Standalone presentation export.
//!
//! The generated file has no external dependencies: layout and styles,
//! the populated sections as inline JSON (images as `data:` URIs), and a
//! plain script that re-runs the compositor on canvases and drives the
//! active section from the scroll position.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use scrollitelli_common::{ExportDefaults, ScrolliError, ScrolliResult};
use scrollitelli_story_model::{SectionModel, StoryDocument};

const STYLESHEET: &str = include_str!("../assets/presentation.css");
const PLAYBACK_SCRIPT: &str = include_str!("../assets/playback.js");

const NOTHING_TO_EXPORT: &str =
    "Cannot export: no sections with data. Please add content to at least one section.";

/// A generated presentation, ready to be written out.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Resolved presentation title.
    pub title: String,

    /// `<slug>.html`.
    pub filename: String,

    /// Complete document.
    pub html: String,

    /// Number of sections embedded.
    pub section_count: usize,

    /// When the document was generated.
    pub generated_at: DateTime<Utc>,
}

impl ExportArtifact {
    pub fn bytes(&self) -> &[u8] {
        self.html.as_bytes()
    }
}

/// Serializes stories into standalone scroll-driven HTML documents.
#[derive(Debug, Clone, Default)]
pub struct ExportGenerator {
    defaults: ExportDefaults,
}

impl ExportGenerator {
    pub fn new(defaults: ExportDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ExportDefaults {
        &self.defaults
    }

    /// Generate the presentation for every populated section of `document`.
    ///
    /// Fails without producing anything when no section has been populated.
    pub fn generate(
        &self,
        document: &StoryDocument,
        title: Option<&str>,
    ) -> ScrolliResult<ExportArtifact> {
        self.generate_sections(&document.populated(), title)
    }

    pub fn generate_sections(
        &self,
        sections: &[&SectionModel],
        title: Option<&str>,
    ) -> ScrolliResult<ExportArtifact> {
        if sections.is_empty() {
            tracing::warn!("Export refused: no populated sections");
            return Err(ScrolliError::export(NOTHING_TO_EXPORT));
        }

        let title = resolve_title(title, &self.defaults.fallback_title);
        let filename = format!("{}.html", slugify(&title, &self.defaults.fallback_filename));
        let generated_at = Utc::now();
        let html = self.render_document(&title, sections, generated_at)?;

        tracing::info!(
            title = %title,
            filename = %filename,
            sections = sections.len(),
            bytes = html.len(),
            "Generated presentation"
        );

        Ok(ExportArtifact {
            title,
            filename,
            html,
            section_count: sections.len(),
            generated_at,
        })
    }

    fn render_document(
        &self,
        title: &str,
        sections: &[&SectionModel],
        generated_at: DateTime<Utc>,
    ) -> ScrolliResult<String> {
        let data = embed_json(sections)?;
        let first_image = sections
            .first()
            .and_then(|s| s.image.as_ref())
            .map(|p| p.as_str())
            .unwrap_or("");
        let payload_bytes: usize = sections
            .iter()
            .filter_map(|s| s.image.as_ref())
            .map(|p| p.encoded_len())
            .sum();

        let mut html = String::with_capacity(payload_bytes * 2 + data.len() + 8 * 1024);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("  <meta name=\"generator\" content=\"ScrolliTelli\">\n");
        html.push_str(&format!(
            "  <meta name=\"scrollitelli:generated-at\" content=\"{}\">\n",
            generated_at.to_rfc3339()
        ));
        html.push_str(&format!("  <title>{}</title>\n", escape_html(title)));
        html.push_str("  <style>\n");
        html.push_str(&format!(
            "    :root {{ --spacer-height: {}vh; --text-min-height: {}vh; --fade-ms: {}ms; }}\n",
            self.defaults.spacer_height_vh,
            self.defaults.text_section_min_vh,
            self.defaults.fade_ms
        ));
        html.push_str(STYLESHEET);
        html.push_str("  </style>\n</head>\n<body>\n");

        html.push_str("  <div class=\"scroll-container\">\n");
        html.push_str("    <div class=\"image-container\">\n");
        html.push_str("      <div class=\"image-wrapper\">\n");
        html.push_str(&format!(
            "        <img src=\"{}\" alt=\"Story image\" id=\"base-image\">\n",
            escape_html(first_image)
        ));
        for (index, section) in sections.iter().enumerate() {
            if section.has_image() {
                html.push_str(&format!(
                    "        <canvas id=\"canvas-{index}\" class=\"blur-canvas\"></canvas>\n"
                ));
            }
        }
        html.push_str("      </div>\n    </div>\n");

        html.push_str("    <div class=\"text-sections\">\n");
        for (index, section) in sections.iter().enumerate() {
            html.push_str(&format!(
                "      <div class=\"text-section\" data-section=\"{index}\">\n        <div class=\"text-content\">{}</div>\n      </div>\n",
                escape_html(&section.text)
            ));
            if index + 1 < sections.len() {
                html.push_str(&format!(
                    "      <div class=\"transition-spacer\" data-transition=\"{index}\"></div>\n"
                ));
            }
        }
        html.push_str("    </div>\n  </div>\n");

        html.push_str("  <script id=\"story-data\" type=\"application/json\">");
        html.push_str(&data);
        html.push_str("</script>\n  <script>\n");
        html.push_str(PLAYBACK_SCRIPT);
        html.push_str("  </script>\n</body>\n</html>\n");

        Ok(html)
    }
}

/// Generate and write a presentation into `output_dir`.
pub async fn export_story(
    document: &StoryDocument,
    title: Option<&str>,
    output_dir: impl AsRef<Path>,
    defaults: ExportDefaults,
) -> ScrolliResult<PathBuf> {
    let artifact = ExportGenerator::new(defaults).generate(document, title)?;

    let output_dir = output_dir.as_ref();
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(&artifact.filename);
    tokio::fs::write(&path, artifact.bytes()).await?;

    tracing::info!(output = %path.display(), "Wrote presentation");
    Ok(path)
}

/// Inline JSON for the section list. `<` is escaped so section text can
/// never close the surrounding script element.
pub fn embed_json(sections: &[&SectionModel]) -> ScrolliResult<String> {
    let json = serde_json::to_string(sections)?;
    Ok(json.replace('<', "\\u003c"))
}

/// The user's title, trimmed, or `fallback` when nothing is left.
pub fn resolve_title(input: Option<&str>, fallback: &str) -> String {
    match input.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => fallback.to_string(),
    }
}

/// Lowercase the title and collapse every run of characters outside
/// `[a-z0-9]` into a single `-`, trimming separators at both ends.
pub fn slugify(title: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
