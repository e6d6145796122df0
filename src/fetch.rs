//! Video fetching.
//!
//! [`Fetcher`] is the capability the pipeline invokes to materialize a
//! video file inside an item workspace. Two implementations exist, one per
//! [`SourceKind`](crate::manifest::SourceKind):
//!
//! - [`PlatformStreamFetcher`] shells out to `yt-dlp` and picks the
//!   highest-available-resolution stream, compared numerically across all
//!   container formats the platform offers.
//! - [`DirectUrlFetcher`] streams the byte content over HTTP under the
//!   URL's base filename, presenting a standard browser user-agent so
//!   sources that block generic clients still serve the file.
//!
//! Both finish by renaming the downloaded file so its name carries no
//! whitespace - the decode tool invocation downstream must never depend
//! on quoting internal whitespace correctly.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    process::Command,
};

use crate::error::VdeError;
use crate::manifest::SourceKind;

/// User-agent presented for direct URL downloads. Some hosts refuse
/// requests that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36";

/// Capability for producing a video file from a source descriptor.
///
/// Implementations must place exactly one file under `destination` and
/// return its path with all whitespace removed from the file name. The
/// pipeline trusts the returned path for the remainder of the run without
/// re-probing the workspace.
pub trait Fetcher {
    /// Fetch the video at `url` into `destination` and return the
    /// resulting file path.
    ///
    /// # Errors
    ///
    /// Returns [`VdeError::Fetch`] on network or availability failure.
    /// The pipeline does not retry; the item's remaining stages are
    /// skipped for the current run.
    fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf, VdeError>;
}

/// The pair of fetchers a run dispatches between.
///
/// Resolution from [`SourceKind`] to a concrete fetcher happens once per
/// item, before its stages run.
pub struct Fetchers {
    /// Handles [`SourceKind::PlatformStream`] items.
    pub platform: Box<dyn Fetcher>,
    /// Handles [`SourceKind::DirectUrl`] items.
    pub direct: Box<dyn Fetcher>,
}

impl Fetchers {
    /// The fetcher responsible for the given source kind.
    pub fn for_kind(&self, kind: SourceKind) -> &dyn Fetcher {
        match kind {
            SourceKind::PlatformStream => self.platform.as_ref(),
            SourceKind::DirectUrl => self.direct.as_ref(),
        }
    }
}

impl Default for Fetchers {
    fn default() -> Self {
        Self {
            platform: Box::new(PlatformStreamFetcher::new()),
            direct: Box::new(DirectUrlFetcher::new()),
        }
    }
}

/// Fetches platform-hosted videos by shelling out to `yt-dlp`.
///
/// Stream selection is `-f b -S res`: the best pre-merged stream, sorted
/// by numeric resolution across every container the platform offers, so a
/// higher-resolution WebM beats a lower-resolution MP4.
pub struct PlatformStreamFetcher {
    program: String,
}

impl PlatformStreamFetcher {
    /// Create a fetcher that invokes `yt-dlp` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("yt-dlp")
    }

    /// Create a fetcher that invokes a specific downloader binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PlatformStreamFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for PlatformStreamFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf, VdeError> {
        let fetch_error = |reason: String| VdeError::Fetch {
            url: url.to_string(),
            reason,
        };

        let template = destination.join("%(title)s.%(ext)s");
        log::info!("fetching platform stream {url} into {}", destination.display());

        let output = Command::new(&self.program)
            .arg("--no-playlist")
            .args(["-f", "b"])
            .args(["-S", "res"])
            .arg("-o")
            .arg(&template)
            .args(["--no-simulate", "--print", "after_move:filepath"])
            .arg(url)
            .output()
            .map_err(|error| fetch_error(format!("failed to run {}: {error}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fetch_error(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim(),
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| {
                fetch_error(format!("{} did not report an output path", self.program))
            })?;

        normalize_whitespace(Path::new(reported))
    }
}

/// Fetches videos from direct URLs over HTTP.
pub struct DirectUrlFetcher;

impl DirectUrlFetcher {
    /// Create a direct URL fetcher.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectUrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for DirectUrlFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf, VdeError> {
        let fetch_error = |reason: String| VdeError::Fetch {
            url: url.to_string(),
            reason,
        };

        let file_name = url_base_name(url)
            .ok_or_else(|| fetch_error("URL has no file name component".to_string()))?;
        let target = destination.join(file_name);
        log::info!("fetching {url} -> {}", target.display());

        let client = reqwest::blocking::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|error| fetch_error(error.to_string()))?;

        let mut response = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|error| fetch_error(error.to_string()))?;

        let mut file = File::create(&target)?;
        response
            .copy_to(&mut file)
            .map_err(|error| fetch_error(error.to_string()))?;

        normalize_whitespace(&target)
    }
}

/// The base file name of a URL, with query and fragment stripped.
fn url_base_name(url: &str) -> Option<&str> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);
    let (_, base) = after_scheme.rsplit_once('/')?;
    (!base.is_empty()).then_some(base)
}

/// Rename `path` so its file name carries no whitespace.
///
/// Whitespace characters become `_`. If the name is already clean the
/// path is returned unchanged and no rename happens.
fn normalize_whitespace(path: &Path) -> Result<PathBuf, VdeError> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return Ok(path.to_path_buf());
    };

    if !name.chars().any(char::is_whitespace) {
        return Ok(path.to_path_buf());
    }

    let cleaned: String = name
        .chars()
        .map(|character| if character.is_whitespace() { '_' } else { character })
        .collect();
    let renamed = path.with_file_name(cleaned);

    log::debug!("renaming {} -> {}", path.display(), renamed.display());
    fs::rename(path, &renamed)?;
    Ok(renamed)
}
