//! CLI command implementations

pub mod inspect;
pub mod simulate;

use anyhow::{Context, Result};
use sinew_animation::ClipLibrary;
use std::path::Path;

/// Load every clip in `dir`, failing if there are none
fn load_clips(dir: &str) -> Result<ClipLibrary> {
    let mut clips = ClipLibrary::new();
    let count = clips
        .load_directory(Path::new(dir))
        .with_context(|| format!("Failed to load clips from {}", dir))?;
    if count == 0 {
        anyhow::bail!("No .clip.toml files found in {}", dir);
    }
    Ok(clips)
}
