//! Workspace artifact probing.
//!
//! The filesystem is the pipeline's only state store: whether an item's
//! video has been downloaded and whether its frames have been extracted is
//! re-derived each run by looking at the item's workspace directory. This
//! module provides [`probe`], which computes an immutable
//! [`ArtifactStatus`] snapshot. The pipeline recomputes it per item per
//! run and never caches it across the item loop.

use std::path::{Path, PathBuf};

use crate::error::VdeError;

/// File extensions recognised as downloaded-video artifacts - the two
/// container formats the platform fetcher may materialize.
pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "webm"];

/// Name of the frames subdirectory inside an item workspace.
pub const FRAMES_DIR_NAME: &str = "images";

/// Name of the optional trimmed video copy inside an item workspace.
pub const TRIMMED_CLIP_NAME: &str = "cut.mp4";

/// A snapshot of which artifacts an item workspace already holds.
///
/// Computed fresh by [`probe`]; never persisted.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStatus {
    /// The authoritative video file, if any. When the workspace holds
    /// several candidate videos, this is the first one the directory
    /// listing produced - the tie-break order is not defined.
    pub video: Option<PathBuf>,
    /// The frames directory, if it exists. Existence alone is the
    /// signal: an empty directory left by an interrupted extraction
    /// counts as present until `force` clears it.
    pub frames: Option<PathBuf>,
}

impl ArtifactStatus {
    /// Whether a downloaded-video artifact is present.
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /// Whether a frames artifact is present.
    pub fn has_frames(&self) -> bool {
        self.frames.is_some()
    }
}

/// Probe an item workspace for existing artifacts.
///
/// A workspace directory that does not exist yet probes as fully absent;
/// that is a normal state for an item that has never been processed, not
/// an error.
///
/// # Errors
///
/// Returns [`VdeError::Io`] only if the directory exists but cannot be
/// listed.
pub fn probe(workspace: &Path) -> Result<ArtifactStatus, VdeError> {
    if !workspace.is_dir() {
        return Ok(ArtifactStatus::default());
    }

    let mut video = None;
    for entry in workspace.read_dir()? {
        let path = entry?.path();
        if path.is_file() && has_video_extension(&path) {
            video = Some(path);
            break;
        }
    }

    let frames_dir = workspace.join(FRAMES_DIR_NAME);
    let frames = frames_dir.is_dir().then_some(frames_dir);

    Ok(ArtifactStatus { video, frames })
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::has_video_extension;

    #[test]
    fn recognises_container_extensions() {
        assert!(has_video_extension(Path::new("clip.mp4")));
        assert!(has_video_extension(Path::new("clip.WEBM")));
        assert!(!has_video_extension(Path::new("clip.mkv")));
        assert!(!has_video_extension(Path::new("notes.txt")));
        assert!(!has_video_extension(Path::new("mp4")));
    }
}
