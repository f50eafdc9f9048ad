use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::catalog::{normalize_path, SourceCatalog};
use super::compile::ScriptCompiler;
use super::registry::ScriptRegistry;

/// Watches the script directory and reconciles the registry on every change,
/// entirely off the tick path. Dropping the watcher stops the thread.
pub struct ScriptWatcher {
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
}

impl ScriptWatcher {
    /// Attaches to the catalog's directory and spawns the reconcile thread.
    /// Fails when the notification backend cannot observe the directory.
    pub fn spawn(
        catalog: SourceCatalog,
        compiler: Arc<ScriptCompiler>,
        registry: ScriptRegistry,
    ) -> Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = tx.send(event);
        })
        .context("creating script watcher")?;
        watcher
            .watch(catalog.root(), RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {}", catalog.root().display()))?;
        let thread = thread::Builder::new()
            .name("script-watch".into())
            .spawn(move || watch_loop(rx, catalog, compiler, registry))
            .context("spawning script watch thread")?;
        Ok(Self { watcher: Some(watcher), thread: Some(thread) })
    }
}

impl Drop for ScriptWatcher {
    fn drop(&mut self) {
        // Dropping the backend closes the event channel, which ends the loop.
        self.watcher.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn watch_loop(
    rx: Receiver<notify::Result<Event>>,
    catalog: SourceCatalog,
    compiler: Arc<ScriptCompiler>,
    registry: ScriptRegistry,
) {
    while let Ok(first) = rx.recv() {
        let mut pending: Vec<PathBuf> = Vec::new();
        collect_paths(first, &mut pending);
        // Drain the burst before acting so a storm of events for one path
        // costs a single reconcile.
        while let Ok(event) = rx.try_recv() {
            collect_paths(event, &mut pending);
        }
        for path in pending {
            super::sync_script(&catalog, &compiler, &registry, &path);
        }
    }
}

fn collect_paths(event: notify::Result<Event>, pending: &mut Vec<PathBuf>) {
    match event {
        Ok(event) if is_relevant(&event.kind) => {
            for path in event.paths {
                let path = normalize_path(&path);
                if SourceCatalog::matches(&path) && !pending.contains(&path) {
                    pending.push(path);
                }
            }
        }
        Ok(_) => {}
        Err(err) => eprintln!("[scripts] watch error: {err}"),
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Create(_)
            | EventKind::Remove(_)
    )
}
