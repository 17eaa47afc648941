//! Start a new story from one uploaded image.

use std::path::PathBuf;

use scrollitelli_common::AppConfig;
use scrollitelli_render_engine::decode;
use scrollitelli_story_model::{BlurControl, ImagePayload, SectionEditor, StoryDocument, StoryFile};

pub async fn run(
    image: PathBuf,
    sections: i64,
    output: PathBuf,
    config: &AppConfig,
) -> anyhow::Result<()> {
    println!("Creating story from: {}", image.display());

    let payload = ImagePayload::load(&image).await;
    let mut document = StoryDocument::from_upload(payload.clone(), sections)
        .map_err(|e| anyhow::anyhow!("Error: {e}"))?;

    // Canvases are laid out at the image's natural size.
    let canvas = match payload {
        Some(payload) => decode(payload).await.map(|img| img.natural_size()),
        None => None,
    };
    if canvas.is_none() {
        tracing::warn!(path = %image.display(), "Image could not be decoded; sections will render nothing");
    }

    let control = BlurControl {
        default: config.editor.default_blur,
        max: config.editor.max_blur,
        step: config.editor.blur_step,
    };
    for index in 0..document.len() {
        let initial = document.get(index).and_then(|s| s.current_image().cloned());
        let mut editor = SectionEditor::with_control(initial, control);
        if let Some(size) = canvas {
            editor.layout_canvas(size);
        }
        document.update_at(index, editor.snapshot())?;
    }

    let file = StoryFile::from_document(&document, Some(config.export.suggested_title.clone()));
    file.save(&output)?;

    println!("Story created:");
    println!("  Manifest: {}", output.display());
    println!("  Sections: {}", document.len());
    if let Some(size) = canvas {
        println!("  Canvas: {}x{}", size.width, size.height);
    }

    Ok(())
}
