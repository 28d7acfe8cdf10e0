use std::fs;
use std::path::Path;

use moda_lib::commands;
use moda_lib::container::{self, PlayMode, METADATA_FILE};
use moda_lib::settings::AppSettings;
use moda_lib::ModaError;

fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_encode_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "one.mp3", b"first track");
    let b = write(dir.path(), "two.ogg", &[0u8; 300]);
    let thumb = write(dir.path(), "art.jpg", b"\xff\xd8\xff");

    let mut bytes = Vec::new();
    container::encode_files(&[&a, &b], PlayMode::Parallel, Some(thumb.as_path()), &mut bytes).unwrap();

    let decoded = container::decode(&bytes).unwrap();
    assert_eq!(decoded.play_mode(), PlayMode::Parallel);
    assert_eq!(decoded.tracks.len(), 2);
    assert_eq!(decoded.tracks[0].name, "one.mp3");
    assert_eq!(decoded.tracks[0].bytes, b"first track");
    assert_eq!(decoded.tracks[1].bytes, vec![0u8; 300]);

    let thumbnail = decoded.thumbnail.unwrap();
    assert_eq!(thumbnail.name, "art.jpg");
    assert_eq!(thumbnail.bytes, b"\xff\xd8\xff");
    assert_eq!(decoded.metadata.thumbnail.as_deref(), Some("art.jpg"));
}

#[test]
fn test_missing_source_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "one.mp3", b"x");
    let missing = dir.path().join("missing.mp3");

    let mut bytes = Vec::new();
    let err = container::encode_files(&[&a, &missing], PlayMode::Sequential, None, &mut bytes).unwrap_err();
    match err {
        ModaError::SourceUnreadable { path, .. } => assert_eq!(path, missing),
        other => panic!("expected SourceUnreadable, got {:?}", other),
    }
    assert!(bytes.is_empty());
}

#[test]
fn test_compile_extract_and_inspect() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "b.wav", b"bbbb");
    write(src.path(), "a.flac", b"aa");
    write(src.path(), "readme.txt", b"ignored");
    let thumb = write(src.path(), "cover.png", b"png?");

    let saved = commands::compile(
        &AppSettings::default(),
        Vec::new(),
        Some(src.path()),
        &out.path().join("album"),
        PlayMode::Sequential,
        Some(thumb.as_path()),
    )
    .unwrap();
    assert_eq!(saved.extension().unwrap(), "moda");

    let report = commands::inspect(&saved).unwrap();
    let names: Vec<&str> = report.tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a.flac", "b.wav"]);
    assert_eq!(report.play_mode, PlayMode::Sequential);
    assert_eq!(report.thumbnail.as_ref().unwrap().name, "cover.png");

    let target = out.path().join("unpacked");
    let extracted = commands::extract(&saved, &target).unwrap();
    assert_eq!(extracted.tracks.len(), 2);
    assert_eq!(fs::read(target.join("a.flac")).unwrap(), b"aa");
    assert_eq!(fs::read(target.join("b.wav")).unwrap(), b"bbbb");
    assert_eq!(fs::read(target.join("cover.png")).unwrap(), b"png?");

    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(target.join(METADATA_FILE)).unwrap()).unwrap();
    assert_eq!(meta["play_mode"], "sequential");
    assert_eq!(meta["tracks"][1]["file"], "b.wav");
    assert_eq!(meta["tracks"][1]["order"], 2);
}

#[test]
fn test_compile_without_tracks_fails() {
    let src = tempfile::tempdir().unwrap();
    let result = commands::compile(
        &AppSettings::default(),
        Vec::new(),
        Some(src.path()),
        &src.path().join("empty.moda"),
        PlayMode::Sequential,
        None,
    );
    assert!(result.is_err());
    assert!(!src.path().join("empty.moda").exists());
}

#[test]
fn test_open_rejects_foreign_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "song.moda", b"ID3\x04\x00\x00\x00\x00\x00\x00");

    let err = commands::open_container(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ModaError>(),
        Some(ModaError::BadMagic { .. })
    ));
}

#[test]
fn test_compile_rejects_same_name_in_subfolder() {
    let src = tempfile::tempdir().unwrap();
    fs::create_dir(src.path().join("sub")).unwrap();
    write(src.path(), "song.mp3", b"top");
    write(&src.path().join("sub"), "song.mp3", b"nested");
    let output = src.path().join("clash.moda");

    let err = commands::compile(
        &AppSettings::default(),
        Vec::new(),
        Some(src.path()),
        &output,
        PlayMode::Sequential,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ModaError>(),
        Some(ModaError::Encoding(_))
    ));
    assert!(!output.exists());
}
