//! Manifest loading.
//!
//! The manifest is a JSON array of clip records. Each record names a video
//! source and a time range to sample frames from:
//!
//! ```json
//! [
//!     { "id": "0", "url": "https://youtu.be/...", "type": "youtube", "start": 12, "end": 20 },
//!     { "id": 1, "url": "https://example.com/clip.mp4", "type": "url", "start": "0:05", "end": "0:09" }
//! ]
//! ```
//!
//! Items are immutable once loaded and held read-only for the run. Time
//! bounds are preserved verbatim ([`TimeSpec`]) so the decode tool sees
//! exactly what the manifest author wrote; they are only interpreted here
//! for the `end > start` sanity check.

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Deserializer};

use crate::error::VdeError;

/// How a video source should be fetched.
///
/// Selected once at item-load time; the pipeline resolves it to a concrete
/// [`Fetcher`](crate::fetch::Fetcher) before running the item's stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SourceKind {
    /// A streaming-platform page; the fetcher picks the
    /// highest-resolution stream across all offered containers.
    #[serde(rename = "youtube")]
    PlatformStream,
    /// A direct link to a video file; the fetcher streams the bytes
    /// under the URL's base filename.
    #[serde(rename = "url")]
    DirectUrl,
}

/// A time bound as written in the manifest.
///
/// Either plain seconds or a colon-separated timecode string. The raw
/// token is what gets passed to the decode tool; [`TimeSpec::as_seconds`]
/// exists only for load-time range validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    /// Numeric seconds, e.g. `12` or `7.5`.
    Seconds(f64),
    /// A timecode string, e.g. `"1:30"` or `"0:01:30.5"`.
    Timecode(String),
}

impl TimeSpec {
    /// Resolve this bound to seconds, when possible.
    ///
    /// Plain numbers resolve directly; timecodes of the form `m:ss` or
    /// `h:mm:ss` (fractional seconds allowed) are computed. Anything else
    /// returns `None` and is left for the decode tool to interpret.
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            TimeSpec::Seconds(seconds) => Some(*seconds),
            TimeSpec::Timecode(code) => parse_timecode(code),
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSpec::Seconds(seconds) => write!(formatter, "{seconds}"),
            TimeSpec::Timecode(code) => formatter.write_str(code),
        }
    }
}

fn parse_timecode(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return Some(seconds);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let (hours, minutes, seconds_str) = if parts.len() == 3 {
        (
            parts[0].parse::<u64>().ok()?,
            parts[1].parse::<u64>().ok()?,
            parts[2],
        )
    } else {
        (0_u64, parts[0].parse::<u64>().ok()?, parts[1])
    };

    let seconds = seconds_str.parse::<f64>().ok()?;
    Some((hours as f64) * 3600.0 + (minutes as f64) * 60.0 + seconds)
}

/// One manifest entry: a video source plus the time range to sample.
///
/// The `id` doubles as the workspace directory name under the output root
/// and as the key the `-t/--target` spec matches against.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    /// Unique key for targeting and directory naming. JSON integers are
    /// accepted and stringified.
    #[serde(deserialize_with = "string_or_integer")]
    pub id: String,
    /// Where the video comes from.
    pub url: String,
    /// Which fetch strategy applies to `url`.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Start of the sampled range.
    pub start: TimeSpec,
    /// End of the sampled range. Must be after `start` when both bounds
    /// are resolvable.
    pub end: TimeSpec,
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(number) => number.to_string(),
    })
}

/// Load and validate a manifest file.
///
/// # Errors
///
/// Returns [`VdeError::Manifest`] if the file cannot be read, is not a
/// JSON array of well-formed records, or contains an item whose resolvable
/// time range has `end <= start`. Manifest problems are fatal: no item is
/// processed from a manifest that fails to load.
pub fn load_manifest(path: &Path) -> Result<Vec<Item>, VdeError> {
    let manifest_error = |reason: String| VdeError::Manifest {
        path: path.to_path_buf(),
        reason,
    };

    let raw = fs::read_to_string(path).map_err(|error| manifest_error(error.to_string()))?;
    let items: Vec<Item> =
        serde_json::from_str(&raw).map_err(|error| manifest_error(error.to_string()))?;

    for item in &items {
        if let (Some(start), Some(end)) = (item.start.as_seconds(), item.end.as_seconds())
            && end <= start
        {
            return Err(manifest_error(format!(
                "item '{}': end ({}) must be after start ({})",
                item.id, item.end, item.start,
            )));
        }
    }

    log::debug!("loaded {} item(s) from {}", items.len(), path.display());
    Ok(items)
}
