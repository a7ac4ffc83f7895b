//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEvent};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::generator::Generator;
use crate::Site;

/// Collect the writings and generate the site
pub async fn run(site: &Site) -> Result<()> {
    let start = Instant::now();

    let entries = site.collect_posts().await?;

    let generator = Generator::new(site)?;
    generator.generate(&entries)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Paths whose changes should trigger a rebuild
pub fn watched_paths(site: &Site) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths = Vec::new();

    for dir in [&site.posts_dir, &site.static_dir] {
        if dir.exists() {
            paths.push((dir.clone(), RecursiveMode::Recursive));
        }
    }

    let config_path = site.base_dir.join("_config.yml");
    if config_path.exists() {
        paths.push((config_path, RecursiveMode::NonRecursive));
    }

    paths
}

/// Filter out editor and VCS noise
pub fn relevant_events(events: &[DebouncedEvent]) -> Vec<&DebouncedEvent> {
    events
        .iter()
        .filter(|e| {
            let path_str = e.path.to_string_lossy();
            !path_str.contains(".git")
                && !path_str.contains(".DS_Store")
                && !path_str.ends_with('~')
                && !path_str.ends_with(".swp")
        })
        .collect()
}

/// Watch for file changes and regenerate
pub async fn watch(site: &Site) -> Result<()> {
    watch_then(site, || {}).await
}

/// Watch for file changes, regenerate, and call `after` on every successful rebuild
pub async fn watch_then<F>(site: &Site, after: F) -> Result<()>
where
    F: Fn() + Send,
{
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Debounce: one rebuild per burst of changes
    let mut debouncer = new_debouncer(Duration::from_millis(500), move |res: DebounceEventResult| {
        let _ = tx.send(res);
    })?;

    for (path, mode) in watched_paths(site) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                let changed = relevant_events(&events);
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }
                match run(site).await {
                    Ok(()) => after(),
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            }
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
            }
        }
    }

    Ok(())
}
