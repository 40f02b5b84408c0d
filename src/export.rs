//! Persist a note as pretty-printed JSON.
//!
//! The path is either given explicitly (`--out`) or derived from the note
//! title: `<output.dir>/<slug>.json`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::Note;

const MAX_SLUG_CHARS: usize = 80;

/// Lower-case ASCII alphanumerics joined by single dashes; `note` when empty.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for word in title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let extra = word.len() + usize::from(!out.is_empty());
        if out.len() + extra > MAX_SLUG_CHARS {
            if out.is_empty() {
                out.push_str(&word[..MAX_SLUG_CHARS].to_ascii_lowercase());
            }
            break;
        }
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(&word.to_ascii_lowercase());
    }
    if out.is_empty() {
        "note".to_string()
    } else {
        out
    }
}

/// `explicit` when given, otherwise `<dir>/<slug(title)>.json`.
pub fn output_path(explicit: Option<&Path>, dir: &Path, title: &str) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => dir.join(format!("{}.json", slug(title))),
    }
}

/// Write the note to `path`, creating parent directories.
pub fn write_note(path: &Path, note: &Note) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(note)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write note: {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved note");
    Ok(())
}
