//! ScrolliTelli CLI: build scroll-driven image stories and export them.
//!
//! Usage:
//!   scrollitelli new <IMAGE> --sections N     Start a story from one image
//!   scrollitelli preview <STORY> --section I  Render one section to PNG
//!   scrollitelli export <STORY>               Export a standalone HTML presentation

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scrollitelli_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "scrollitelli",
    about = "Compose blurred, masked image stories and export them as scroll-driven HTML",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a story manifest from one uploaded image
    New {
        /// Image used for every initial section
        image: PathBuf,

        /// Number of sections to start with
        #[arg(short, long)]
        sections: i64,

        /// Manifest output path
        #[arg(short, long, default_value = "story.json")]
        output: PathBuf,
    },

    /// Render one section (sharp window over blur) to a PNG file
    Preview {
        /// Path to the story manifest
        story: PathBuf,

        /// Zero-based section index
        #[arg(short, long, default_value = "0")]
        section: usize,

        /// Output PNG path
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,

        /// Output width (defaults to the image's natural width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (defaults to the image's natural height)
        #[arg(long)]
        height: Option<u32>,
    },

    /// Export the story as a standalone HTML presentation
    Export {
        /// Path to the story manifest
        story: PathBuf,

        /// Presentation title (defaults to the manifest title)
        #[arg(short, long)]
        title: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    scrollitelli_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::New {
            image,
            sections,
            output,
        } => commands::new::run(image, sections, output, &config).await,
        Commands::Preview {
            story,
            section,
            output,
            width,
            height,
        } => commands::preview::run(story, section, output, width, height).await,
        Commands::Export {
            story,
            title,
            output,
        } => commands::export::run(story, title, output, &config).await,
    }
}
