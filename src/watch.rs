//! Watch mode: build once, then rebuild the whole site whenever a Markdown
//! file under the posts directory changes. Rebuilds are synchronous and run
//! one at a time on the calling thread.

use std::path::Path;
use std::sync::mpsc;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::build::build_site;
use crate::config::Config;

/// Runs the initial build, then blocks forever rebuilding on changes. Only
/// the initial build's errors are returned; later failures are logged and
/// the loop keeps going.
pub fn watch(config: &Config) -> Result<()> {
    let directory = &config.posts_source_directory;
    build_site(config).context("initial build")?;

    let (tx, rx) = mpsc::channel();
    let mut watcher =
        RecommendedWatcher::new(tx, notify::Config::default()).context("initializing watcher")?;
    watcher
        .watch(directory, RecursiveMode::Recursive)
        .with_context(|| format!("watching `{}`", directory.display()))?;
    tracing::info!(directory = %directory.display(), "watching for changes");

    for result in rx {
        match result {
            Ok(event) if triggers_rebuild(&event) => {
                tracing::debug!(paths = ?event.paths, kind = ?event.kind, "change detected");
                rebuild(config);
            }
            Ok(_) => {}
            Err(err) => tracing::error!("watcher error: {}", err),
        }
    }
    Ok(())
}

fn rebuild(config: &Config) {
    if let Err(err) = build_site(config) {
        tracing::error!("rebuild failed: {:#}", anyhow::Error::from(err));
    }
}

/// Whether `event` should trigger a rebuild: it must name at least one `.md`
/// file and not be a mere access (the build itself reads every post, which
/// would otherwise retrigger it).
fn triggers_rebuild(event: &Event) -> bool {
    !matches!(event.kind, EventKind::Access(_)) && event.paths.iter().any(|p| is_markdown(p))
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}
