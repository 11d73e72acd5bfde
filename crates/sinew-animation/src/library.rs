//! Clip registry shared by state graph construction

use crate::clip::AnimationClip;
use crate::loader::load_clip_from_file;
use sinew_core::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Clip registry: holds all loaded clips by name.
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: HashMap<String, Arc<AnimationClip>>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip. Overwrites any existing clip with the same name.
    pub fn insert(&mut self, clip: Arc<AnimationClip>) {
        if self.clips.insert(clip.name().to_string(), clip.clone()).is_some() {
            log::warn!("Clip '{}' replaced in library", clip.name());
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clip names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Load every `*.clip.toml` file in `dir` (not recursive).
    ///
    /// Returns the number of clips loaded. A file that fails to parse aborts
    /// the whole load.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".clip.toml"))
            })
            .collect();
        paths.sort();

        for path in &paths {
            let clip = load_clip_from_file(path)?;
            log::debug!("Loaded clip '{}' from {}", clip.name(), path.display());
            self.insert(Arc::new(clip));
        }

        log::info!("Loaded {} clips from {}", paths.len(), dir.display());
        Ok(paths.len())
    }
}
