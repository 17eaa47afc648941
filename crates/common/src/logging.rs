//! Logging and tracing initialization.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Crates whose events `LoggingConfig::level` applies to.
const CRATE_TARGETS: &[&str] = &[
    "scrollitelli",
    "scrollitelli_common",
    "scrollitelli_story_model",
    "scrollitelli_render_engine",
];

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured filter. When `config.file` is set,
/// events are appended to that file without ANSI colours; if it cannot be
/// opened, logging falls back to stdout.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    let file = config.file.as_deref().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not open log file {}: {e}", path.display());
            None
        }
    });

    match file {
        Some(file) => install(config.json, filter, Mutex::new(file), false),
        None => install(config.json, filter, std::io::stdout, true),
    }
}

/// Initialize logging with defaults (tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

/// Expand a bare level into per-crate directives, leaving dependencies at
/// `warn`. Anything that already looks like a directive is used verbatim.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return filter_directives("info");
    }
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let mut directives = String::from("warn");
    for target in CRATE_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn install<W>(json: bool, filter: EnvFilter, writer: W, ansi: bool)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_to_own_crates() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("scrollitelli_render_engine=debug"));
        assert!(directives.contains("scrollitelli=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_explicit_directives_pass_through() {
        assert_eq!(
            filter_directives("info,scrollitelli_story_model=trace"),
            "info,scrollitelli_story_model=trace"
        );
        assert_eq!(filter_directives("  "), filter_directives("info"));
    }

    #[test]
    fn test_log_file_parent_is_created() {
        let dir = std::env::temp_dir().join("scrollitelli_test_logging");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("run.log");
        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
