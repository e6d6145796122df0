//! # vde
//!
//! Batch video download and frame extraction - turn a manifest of video
//! clips into image datasets.
//!
//! `vde` reads a JSON manifest of clip records (source URL, source kind,
//! time range), fetches each video into its own workspace directory, and
//! samples the requested time range into a directory of numbered frame
//! images. The pipeline is idempotent and resumable: artifact presence on
//! disk is the state store, so re-running after an interruption picks up
//! exactly where the previous run stopped, and nothing already done is
//! redone unless `force` is explicit.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use vde::{
//!     Fetchers, FfmpegTranscoder, PipelineRunner, RunOptions, TargetSet, load_manifest,
//! };
//!
//! let items = load_manifest(Path::new("list.json"))?;
//! let targets = TargetSet::parse("all")?;
//!
//! let fetchers = Fetchers::default();
//! let transcoder = FfmpegTranscoder::new();
//! let runner = PipelineRunner::new(&fetchers, &transcoder, RunOptions::default());
//!
//! let summary = runner.run(&items, &targets, Path::new("data"))?;
//! println!("fetched {}, extracted {}", summary.fetched, summary.extracted);
//! # Ok::<(), vde::VdeError>(())
//! ```
//!
//! ## Layout per item
//!
//! ```text
//! data/<id>/                  item workspace
//! data/<id>/<video file>      downloaded video (mp4 or webm)
//! data/<id>/images/0001.png   extracted frames, four-digit counter
//! data/<id>/cut.mp4           optional trimmed stream-copy (-s flag)
//! ```
//!
//! ## Requirements
//!
//! The `ffmpeg` binary must be on `PATH` for frame extraction, and
//! `yt-dlp` for platform-stream downloads. Direct URL downloads need
//! neither.
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log)
//! facade; the bundled CLI installs `env_logger`, so `RUST_LOG=debug`
//! shows the exact external commands being run.

pub mod error;
pub mod fetch;
pub mod manifest;
pub mod pipeline;
pub mod probe;
pub mod target;
pub mod transcode;

pub use error::VdeError;
pub use fetch::{DirectUrlFetcher, Fetcher, Fetchers, PlatformStreamFetcher};
pub use manifest::{Item, SourceKind, TimeSpec, load_manifest};
pub use pipeline::{
    PipelineRunner, RunDecision, RunObserver, RunOptions, RunSummary, Stage, StageEvent,
};
pub use probe::{ArtifactStatus, FRAMES_DIR_NAME, TRIMMED_CLIP_NAME, VIDEO_EXTENSIONS, probe};
pub use target::TargetSet;
pub use transcode::{FfmpegTranscoder, Transcoder};
