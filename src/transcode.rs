//! Frame extraction via an external decode tool.
//!
//! [`Transcoder`] is the capability the pipeline invokes to turn a video
//! file plus a time range into a directory of sequentially numbered frame
//! images, and optionally a trimmed stream-copy of the same range.
//! [`FfmpegTranscoder`] is the real implementation, shelling out to the
//! `ffmpeg` binary; tests substitute a mock that records calls and writes
//! stub files, so the pipeline's state machine is testable without any
//! external process.
//!
//! The frames directory is always deleted and recreated before frames are
//! written: a regenerated frame set fully replaces the previous one, so a
//! shorter re-extraction can never leave stale frames from a longer run
//! behind.

use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
};

use crate::error::VdeError;
use crate::manifest::TimeSpec;

/// Printf-style pattern for frame file names: four digits, counting
/// from 1.
const FRAME_PATTERN: &str = "%04d.png";

/// Capability for sampling frames (and optionally a trimmed clip) out of
/// a video file.
pub trait Transcoder {
    /// Extract one frame image per sampled frame between `start` and
    /// `end` into `frames_dir`, replacing any prior contents entirely.
    ///
    /// Frame files are named by a fixed-width counter starting at
    /// `0001`. When `verbose` is false the tool's console output is
    /// suppressed down to errors.
    ///
    /// # Errors
    ///
    /// Returns [`VdeError::Transcode`] if the underlying tool exits
    /// non-zero or cannot be started. The pipeline logs the failure and
    /// continues with the next item.
    fn extract_frames(
        &self,
        video: &Path,
        start: &TimeSpec,
        end: &TimeSpec,
        frames_dir: &Path,
        verbose: bool,
    ) -> Result<(), VdeError>;

    /// Stream-copy the same time range to a single video file, without
    /// re-encoding. Invoked only when the caller asked to retain a
    /// trimmed copy alongside the frames.
    ///
    /// # Errors
    ///
    /// Same as [`extract_frames`](Transcoder::extract_frames).
    fn extract_clip(
        &self,
        video: &Path,
        start: &TimeSpec,
        end: &TimeSpec,
        destination: &Path,
        verbose: bool,
    ) -> Result<(), VdeError>;
}

/// [`Transcoder`] implementation backed by the `ffmpeg` binary.
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    /// Create a transcoder that invokes `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Create a transcoder that invokes a specific decode binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Start a command with the global flags in front; output-suppression
    /// options are ignored by the tool when they trail the output file.
    fn command(&self, verbose: bool) -> Command {
        let mut command = Command::new(&self.program);
        if !verbose {
            command.args(["-hide_banner", "-loglevel", "error"]);
            command.stdout(Stdio::null());
        }
        command
    }

    fn run(&self, command: &mut Command) -> Result<(), VdeError> {
        log::debug!("running {command:?}");
        let status = command
            .status()
            .map_err(|error| VdeError::Transcode(format!("failed to run {}: {error}", self.program)))?;

        if !status.success() {
            return Err(VdeError::Transcode(format!(
                "{} exited with {status}",
                self.program,
            )));
        }
        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder for FfmpegTranscoder {
    fn extract_frames(
        &self,
        video: &Path,
        start: &TimeSpec,
        end: &TimeSpec,
        frames_dir: &Path,
        verbose: bool,
    ) -> Result<(), VdeError> {
        if frames_dir.exists() {
            log::debug!("removing existing frames directory {}", frames_dir.display());
            fs::remove_dir_all(frames_dir)?;
        }
        fs::create_dir_all(frames_dir)?;

        log::info!(
            "extracting frames from {} ({start} to {end})",
            video.display(),
        );

        let mut command = self.command(verbose);
        command
            .arg("-i")
            .arg(video)
            .args(["-ss", &start.to_string()])
            .args(["-to", &end.to_string()])
            .arg(frames_dir.join(FRAME_PATTERN));
        self.run(&mut command)
    }

    fn extract_clip(
        &self,
        video: &Path,
        start: &TimeSpec,
        end: &TimeSpec,
        destination: &Path,
        verbose: bool,
    ) -> Result<(), VdeError> {
        log::info!(
            "stream-copying {} ({start} to {end}) -> {}",
            video.display(),
            destination.display(),
        );

        let mut command = self.command(verbose);
        command
            .arg("-y")
            .arg("-i")
            .arg(video)
            .args(["-ss", &start.to_string()])
            .args(["-to", &end.to_string()])
            .args(["-c:v", "copy", "-c:a", "copy"])
            .arg(destination);
        self.run(&mut command)
    }
}
