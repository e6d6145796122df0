//! Manifest loading tests.

use std::fs;
use std::path::PathBuf;

use vde::{SourceKind, TimeSpec, VdeError, load_manifest};

fn write_manifest(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let scratch = tempfile::tempdir().expect("Failed to create temp dir");
    let path = scratch.path().join("list.json");
    fs::write(&path, contents).expect("Failed to write manifest");
    (scratch, path)
}

#[test]
fn loads_records_with_both_source_kinds() {
    let (_scratch, path) = write_manifest(
        r#"[
            { "id": "0", "url": "https://youtu.be/abc", "type": "youtube", "start": 1, "end": 3 },
            { "id": "1", "url": "https://example.com/clip.mp4", "type": "url", "start": 0.5, "end": 2.5 }
        ]"#,
    );

    let items = load_manifest(&path).expect("Failed to load manifest");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, SourceKind::PlatformStream);
    assert_eq!(items[1].kind, SourceKind::DirectUrl);
    assert_eq!(items[0].start, TimeSpec::Seconds(1.0));
}

#[test]
fn numeric_ids_are_stringified() {
    let (_scratch, path) = write_manifest(
        r#"[{ "id": 7, "url": "https://example.com/clip.mp4", "type": "url", "start": 1, "end": 3 }]"#,
    );

    let items = load_manifest(&path).expect("Failed to load manifest");
    assert_eq!(items[0].id, "7");
}

#[test]
fn time_strings_are_preserved_verbatim() {
    let (_scratch, path) = write_manifest(
        r#"[{ "id": "0", "url": "https://example.com/clip.mp4", "type": "url", "start": "0:05", "end": "0:01:30.5" }]"#,
    );

    let items = load_manifest(&path).expect("Failed to load manifest");
    assert_eq!(items[0].start, TimeSpec::Timecode("0:05".to_string()));
    assert_eq!(items[0].start.to_string(), "0:05");
    assert_eq!(items[0].end.to_string(), "0:01:30.5");
}

#[test]
fn inverted_range_is_rejected_at_load() {
    let (_scratch, path) = write_manifest(
        r#"[{ "id": "0", "url": "https://example.com/clip.mp4", "type": "url", "start": 5, "end": 2 }]"#,
    );

    let error = load_manifest(&path).unwrap_err();
    assert!(matches!(error, VdeError::Manifest { .. }));

    let message = error.to_string();
    assert!(
        message.contains("must be after"),
        "Error message should explain the bad range: {message}",
    );
}

#[test]
fn mixed_resolvable_bounds_are_compared() {
    // "0:04" resolves to 4 seconds, which precedes start=5.
    let (_scratch, path) = write_manifest(
        r#"[{ "id": "0", "url": "https://example.com/clip.mp4", "type": "url", "start": 5, "end": "0:04" }]"#,
    );

    assert!(load_manifest(&path).is_err());
}

#[test]
fn unknown_source_kind_is_rejected() {
    let (_scratch, path) = write_manifest(
        r#"[{ "id": "0", "url": "https://example.com/clip.mp4", "type": "vimeo", "start": 1, "end": 3 }]"#,
    );

    let error = load_manifest(&path).unwrap_err();
    assert!(matches!(error, VdeError::Manifest { .. }));
}

#[test]
fn missing_file_is_a_manifest_error() {
    let error = load_manifest(std::path::Path::new("does_not_exist.json")).unwrap_err();
    assert!(matches!(error, VdeError::Manifest { .. }));

    let message = error.to_string();
    assert!(
        message.contains("does_not_exist.json"),
        "Error message should carry the path: {message}",
    );
}

#[test]
fn invalid_json_is_a_manifest_error() {
    let (_scratch, path) = write_manifest("{ not json");
    assert!(matches!(
        load_manifest(&path).unwrap_err(),
        VdeError::Manifest { .. },
    ));
}
