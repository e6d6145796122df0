//! The per-item processing pipeline.
//!
//! [`PipelineRunner`] iterates the manifest and advances each targeted
//! item through two independent stages - download, then extract - deciding
//! per stage whether to act or skip. The filesystem is the only state
//! store: [`probe`](crate::probe::probe) re-derives each item's state at
//! the start of its turn, so an interrupted run simply resumes from
//! whatever artifacts the previous run left behind.
//!
//! The central contract is idempotent resumability: work already present
//! on disk is never redone unless `force` is explicit, and a missing
//! prerequisite degrades to a reported skip instead of a crash. Fetch and
//! transcode failures abort only the current item's remaining stages; the
//! loop always continues to the next item.
//!
//! Per-stage outcomes are reported through [`RunObserver`], a callback
//! trait the binary implements with colored terminal output. Observers
//! are infallible - they watch, they cannot halt the run.

use std::{fs, path::Path};

use crate::error::VdeError;
use crate::fetch::Fetchers;
use crate::manifest::Item;
use crate::probe::{FRAMES_DIR_NAME, TRIMMED_CLIP_NAME, probe};
use crate::target::TargetSet;
use crate::transcode::Transcoder;

/// The two per-item stages, each independently tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetch the video into the item workspace.
    Download,
    /// Sample frames out of the video.
    Extract,
}

/// What the pipeline decided to do for one item at one stage.
///
/// Computed fresh each run from the probe snapshot and the run options;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDecision {
    /// The stage's artifact already exists and `force` is not set.
    SkipAlreadyPresent,
    /// The item id is outside the target set; the item is untouched.
    SkipNotTargeted,
    /// The extract stage has no video to work from. Reported as a soft
    /// failure, not raised as an error.
    SkipMissingPrerequisite,
    /// Invoke the stage's external collaborator.
    Perform,
}

/// A per-stage notification delivered to a [`RunObserver`].
#[derive(Debug)]
pub enum StageEvent<'run> {
    /// The stage was skipped; the decision says why.
    Skipped(RunDecision),
    /// The stage is about to invoke its external collaborator on the
    /// described source.
    Performing {
        /// The source URL (download) or video path (extract).
        detail: String,
    },
    /// The stage produced (or fully replaced) an artifact.
    Completed {
        /// Path of the artifact that now exists.
        artifact: &'run Path,
    },
    /// The collaborator failed; the item's remaining work is skipped for
    /// this run only.
    Failed(&'run VdeError),
}

/// Trait for receiving per-item, per-stage outcome reports.
///
/// The default for every method is a no-op, so observers implement only
/// what they care about.
pub trait RunObserver {
    /// Called once when a targeted item's turn begins.
    fn on_item(&self, _id: &str) {}

    /// Called for every stage decision and result.
    fn on_stage(&self, _id: &str, _stage: Stage, _event: &StageEvent<'_>) {}
}

/// The default observer: discards all notifications.
struct NoOpObserver;

impl RunObserver for NoOpObserver {}

static NO_OP_OBSERVER: NoOpObserver = NoOpObserver;

/// Which stages run, and under what policy.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Run the download stage. `false` for `--extract_only` runs.
    pub download: bool,
    /// Run the extract stage. `false` for `--download_only` runs.
    pub extract: bool,
    /// Redo work whose artifacts already exist.
    pub force: bool,
    /// Also keep a trimmed stream-copy of each extracted range.
    pub save_video: bool,
    /// Pass through the external tools' console output.
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            download: true,
            extract: true,
            force: false,
            save_video: false,
            verbose: false,
        }
    }
}

/// Aggregate counts for a completed run.
///
/// Informational only: individual failures are reported as they happen
/// and never escalate to the process exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items that passed targeting and took a turn.
    pub visited: usize,
    /// Items excluded by the target set.
    pub not_targeted: usize,
    /// Download stages that fetched a video.
    pub fetched: usize,
    /// Extract stages that produced a frame set.
    pub extracted: usize,
    /// Stages skipped because their artifact was already present.
    pub already_present: usize,
    /// Extract stages skipped for want of a video.
    pub missing_prerequisite: usize,
    /// Fetch, transcode, or workspace I/O failures.
    pub failures: usize,
}

/// Orchestrates the item loop.
///
/// Holds borrowed collaborators for the duration of one run; items are
/// processed strictly sequentially, and each external invocation blocks
/// until it completes or fails.
pub struct PipelineRunner<'run> {
    fetchers: &'run Fetchers,
    transcoder: &'run dyn Transcoder,
    observer: &'run dyn RunObserver,
    options: RunOptions,
}

impl<'run> PipelineRunner<'run> {
    /// Create a runner with the given collaborators and a no-op observer.
    pub fn new(
        fetchers: &'run Fetchers,
        transcoder: &'run dyn Transcoder,
        options: RunOptions,
    ) -> Self {
        Self {
            fetchers,
            transcoder,
            observer: &NO_OP_OBSERVER,
            options,
        }
    }

    /// Install an observer for per-stage reporting.
    pub fn with_observer(mut self, observer: &'run dyn RunObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Process every item in the manifest.
    ///
    /// The output root is created (idempotently) before the loop. An
    /// item excluded by `targets` is untouched: its workspace directory
    /// is not even created.
    ///
    /// # Errors
    ///
    /// Returns [`VdeError::Io`] only if the output root itself cannot be
    /// created. All per-item failures are counted in the summary and the
    /// loop continues.
    pub fn run(
        &self,
        items: &[Item],
        targets: &TargetSet,
        output_root: &Path,
    ) -> Result<RunSummary, VdeError> {
        fs::create_dir_all(output_root)?;

        let mut summary = RunSummary::default();
        for item in items {
            if !targets.contains(&item.id) {
                let skip = StageEvent::Skipped(RunDecision::SkipNotTargeted);
                self.observer.on_stage(&item.id, Stage::Download, &skip);
                self.observer.on_stage(&item.id, Stage::Extract, &skip);
                summary.not_targeted += 1;
                continue;
            }

            summary.visited += 1;
            self.observer.on_item(&item.id);
            if let Err(error) = self.run_item(item, output_root, &mut summary) {
                // Workspace I/O trouble; fetch/transcode failures are
                // already accounted inside run_item.
                log::error!("item '{}': {error}", item.id);
                summary.failures += 1;
            }
        }

        log::info!(
            "run complete: {} visited, {} fetched, {} extracted, {} failure(s)",
            summary.visited,
            summary.fetched,
            summary.extracted,
            summary.failures,
        );
        Ok(summary)
    }

    fn run_item(
        &self,
        item: &Item,
        output_root: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), VdeError> {
        let workspace = output_root.join(&item.id);
        fs::create_dir_all(&workspace)?;

        let status = probe(&workspace)?;
        // Resolved once per item, not re-checked per call.
        let fetcher = self.fetchers.for_kind(item.kind);
        let mut video = status.video.clone();

        if self.options.download {
            match download_decision(status.has_video(), self.options.force) {
                RunDecision::Perform => {
                    if self.options.force
                        && let Some(stale) = video.take()
                    {
                        // Keep a single authoritative video: the fetcher
                        // may materialize a different file name.
                        fs::remove_file(&stale)?;
                    }

                    let performing = StageEvent::Performing {
                        detail: item.url.clone(),
                    };
                    self.observer.on_stage(&item.id, Stage::Download, &performing);

                    match fetcher.fetch(&item.url, &workspace) {
                        Ok(path) => {
                            self.observer.on_stage(
                                &item.id,
                                Stage::Download,
                                &StageEvent::Completed { artifact: &path },
                            );
                            summary.fetched += 1;
                            // The fetcher's return path is trusted for the
                            // rest of this item's turn; no re-probe.
                            video = Some(path);
                        }
                        Err(error) => {
                            self.observer.on_stage(
                                &item.id,
                                Stage::Download,
                                &StageEvent::Failed(&error),
                            );
                            summary.failures += 1;
                        }
                    }
                }
                decision => {
                    self.observer
                        .on_stage(&item.id, Stage::Download, &StageEvent::Skipped(decision));
                    summary.already_present += 1;
                }
            }
        }

        if self.options.extract {
            let decision =
                extract_decision(status.has_frames(), self.options.force, video.is_some());
            if decision != RunDecision::Perform {
                self.observer
                    .on_stage(&item.id, Stage::Extract, &StageEvent::Skipped(decision));
                if decision == RunDecision::SkipMissingPrerequisite {
                    summary.missing_prerequisite += 1;
                } else {
                    summary.already_present += 1;
                }
            } else if let Some(video_path) = video.as_deref() {
                self.extract_item(item, video_path, &workspace, summary);
            }
        }

        Ok(())
    }

    fn extract_item(
        &self,
        item: &Item,
        video_path: &Path,
        workspace: &Path,
        summary: &mut RunSummary,
    ) {
        let frames_dir = workspace.join(FRAMES_DIR_NAME);
        let performing = StageEvent::Performing {
            detail: video_path.display().to_string(),
        };
        self.observer.on_stage(&item.id, Stage::Extract, &performing);

        let extracted = self.transcoder.extract_frames(
            video_path,
            &item.start,
            &item.end,
            &frames_dir,
            self.options.verbose,
        );
        match extracted {
            Ok(()) => {
                self.observer.on_stage(
                    &item.id,
                    Stage::Extract,
                    &StageEvent::Completed {
                        artifact: &frames_dir,
                    },
                );
                summary.extracted += 1;
            }
            Err(error) => {
                self.observer
                    .on_stage(&item.id, Stage::Extract, &StageEvent::Failed(&error));
                summary.failures += 1;
                return;
            }
        }

        if self.options.save_video {
            let clip = workspace.join(TRIMMED_CLIP_NAME);
            let copied = self.transcoder.extract_clip(
                video_path,
                &item.start,
                &item.end,
                &clip,
                self.options.verbose,
            );
            match copied {
                Ok(()) => {
                    self.observer.on_stage(
                        &item.id,
                        Stage::Extract,
                        &StageEvent::Completed { artifact: &clip },
                    );
                }
                Err(error) => {
                    self.observer
                        .on_stage(&item.id, Stage::Extract, &StageEvent::Failed(&error));
                    summary.failures += 1;
                }
            }
        }
    }
}

/// Decide the download stage for one item.
fn download_decision(has_video: bool, force: bool) -> RunDecision {
    if has_video && !force {
        RunDecision::SkipAlreadyPresent
    } else {
        RunDecision::Perform
    }
}

/// Decide the extract stage for one item.
///
/// An already-present frame set wins over a missing video: a workspace
/// with frames but no video is a completed item, not a broken one.
fn extract_decision(has_frames: bool, force: bool, video_available: bool) -> RunDecision {
    if has_frames && !force {
        RunDecision::SkipAlreadyPresent
    } else if !video_available {
        RunDecision::SkipMissingPrerequisite
    } else {
        RunDecision::Perform
    }
}
