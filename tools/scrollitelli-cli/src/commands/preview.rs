//! Render one section of a story to a PNG file.

use std::path::PathBuf;

use scrollitelli_render_engine::{compose_frame, decode};
use scrollitelli_story_model::{CanvasSize, StoryFile};

pub async fn run(
    story: PathBuf,
    section: usize,
    output: PathBuf,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<()> {
    let file = StoryFile::load(&story)?;
    let model = file.sections.get(section).ok_or_else(|| {
        anyhow::anyhow!(
            "Section {section} does not exist (story has {} sections)",
            file.sections.len()
        )
    })?;

    let Some(payload) = model.image.clone() else {
        println!("Section {section} is text-only; nothing to render.");
        return Ok(());
    };
    let Some(image) = decode(payload).await else {
        println!("Section {section} image could not be decoded; nothing to render.");
        return Ok(());
    };

    let natural = image.natural_size();
    let size = CanvasSize::new(
        width.unwrap_or(natural.width),
        height.unwrap_or(natural.height),
    );
    let frame = compose_frame(model, &image, size)?;
    frame.to_rgba_image()?.save(&output)?;

    println!("Rendered section {section}:");
    println!("  Output: {}", output.display());
    println!("  Resolution: {}x{}", size.width, size.height);
    println!("  Blur: {}", model.blur_amount);
    println!(
        "  Mask: {}",
        model
            .shape
            .map(|s| format!("{:?}", s.kind()).to_lowercase())
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(())
}
