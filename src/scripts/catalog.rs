use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Reserved filename suffix for script sources.
pub const SCRIPT_SUFFIX: &str = ".rhai";

/// One script file as read from disk. Ephemeral: produced fresh for every
/// compile attempt and never cached.
#[derive(Debug, Clone)]
pub struct ScriptSource {
    pub path: PathBuf,
    pub text: String,
}

/// Enumerates script sources under a single directory, non-recursively.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    root: PathBuf,
}

impl SourceCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matches(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.ends_with(SCRIPT_SUFFIX))
    }

    /// Lists every script currently in the directory. A missing directory is
    /// an empty listing, not an error; a single unreadable file is logged and
    /// skipped so it cannot hide the rest.
    pub fn discover(&self) -> Vec<ScriptSource> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };
        let mut sources = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !Self::matches(&path) {
                continue;
            }
            match self.read(&path) {
                Ok(source) => sources.push(source),
                Err(err) => eprintln!("[scripts] skipping {}: {err:#}", path.display()),
            }
        }
        sources.sort_by(|a, b| a.path.cmp(&b.path));
        sources
    }

    /// Reads one script fresh from disk, with its canonical path.
    pub fn read(&self, path: &Path) -> Result<ScriptSource> {
        let path = normalize_path(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Ok(ScriptSource { path, text })
    }
}

/// Canonical form used as the registry key, so watcher events and catalog
/// listings agree on a file's identity. Falls back to canonicalizing the
/// parent when the file itself is gone (deletion events).
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else if let Ok(cwd) = env::current_dir() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };
    match fs::canonicalize(&absolute) {
        Ok(canonical) => canonical,
        Err(_) => {
            if let Some(parent) = absolute.parent() {
                if let Ok(parent_canonical) = fs::canonicalize(parent) {
                    if let Some(name) = absolute.file_name() {
                        return parent_canonical.join(name);
                    }
                    return parent_canonical;
                }
            }
            absolute
        }
    }
}
