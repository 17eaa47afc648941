//! Export a story as a standalone HTML presentation.

use std::path::PathBuf;

use scrollitelli_common::AppConfig;
use scrollitelli_render_engine::export_story;
use scrollitelli_story_model::StoryFile;

pub async fn run(
    story: PathBuf,
    title: Option<String>,
    output: PathBuf,
    config: &AppConfig,
) -> anyhow::Result<()> {
    println!("Exporting story at: {}", story.display());

    let file = StoryFile::load(&story)?;
    let title = title.or_else(|| file.title.clone());
    let document = file.into_document()?;

    match export_story(&document, title.as_deref(), &output, config.export.clone()).await {
        Ok(path) => {
            println!("Export complete: {}", path.display());
            Ok(())
        }
        Err(e) if e.is_user_facing() => {
            println!("{e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
