//! ---
//! otr_section: "02-bundle-content"
//! otr_subsection: "integration-tests"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Archive catalog and manifest loading against real zip files."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use otr_content::{
    load_headers, scan_archive, ContentError, ContentSource, EntryOrigin, ManifestSource,
    MavenCoordinate,
};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_jar(path: &Path, entries: &[(&str, Option<&str>)]) {
    let file = File::create(path).expect("create jar");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        match content {
            Some(content) => {
                zip.start_file(*name, options).expect("start entry");
                zip.write_all(content.as_bytes()).expect("write entry");
            }
            None => {
                zip.add_directory(*name, options).expect("add directory");
            }
        }
    }
    zip.finish().expect("finish jar");
}

fn sample_jar(dir: &Path) -> PathBuf {
    let jar = dir.join("moon-whale-service-1.0.0.jar");
    write_jar(
        &jar,
        &[
            ("META-INF/", None),
            (
                "META-INF/MANIFEST.MF",
                Some("Manifest-Version: 1.0\nBundle-SymbolicName: moon-whale-service\nBundle-Version: 1.0.0\n"),
            ),
            ("se/", None),
            ("se/natusoft/Whale.class", Some("cafebabe")),
            ("lib/nested.jar", Some("PK")),
        ],
    );
    jar
}

#[test]
fn archive_scan_skips_directories_and_prefixes_separator() {
    let dir = tempfile::tempdir().unwrap();
    let jar = sample_jar(dir.path());

    let entries = scan_archive(&jar).unwrap();
    let relative: Vec<&str> = entries.iter().map(|entry| entry.relative()).collect();
    assert_eq!(
        relative,
        [
            "/META-INF/MANIFEST.MF",
            "/se/natusoft/Whale.class",
            "/lib/nested.jar"
        ]
    );
    assert!(entries
        .iter()
        .all(|entry| entry.origin() == &EntryOrigin::Archive(jar.clone())));
    assert!(entries[0].is_manifest());
}

#[test]
fn manifest_is_read_from_archive_entry() {
    let dir = tempfile::tempdir().unwrap();
    let jar = sample_jar(dir.path());

    let entries = ContentSource::Archive(jar).entries().unwrap();
    let manifest = entries.iter().find(|entry| entry.is_manifest()).unwrap();
    let headers = load_headers(manifest.manifest_source()).unwrap();
    assert_eq!(headers["Bundle-SymbolicName"], "moon-whale-service");
    assert_eq!(headers["Bundle-Version"], "1.0.0");
}

#[test]
fn archive_without_manifest_is_a_metadata_error() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("bare.jar");
    write_jar(&jar, &[("readme.txt", Some("hello"))]);

    let err = load_headers(ManifestSource::Archive(jar)).unwrap_err();
    assert!(matches!(err, ContentError::Metadata { .. }));
}

#[test]
fn corrupt_archive_is_a_metadata_error() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("corrupt.jar");
    std::fs::write(&jar, b"this is not a zip file").unwrap();

    let err = scan_archive(&jar).unwrap_err();
    assert!(matches!(err, ContentError::Metadata { .. }));
}

#[test]
fn maven_coordinate_points_at_scannable_jar() {
    let repo = tempfile::tempdir().unwrap();
    let coordinate = MavenCoordinate::new("se.natusoft.osgi.aps", "moon-whale-service", "1.0.0");
    let jar = coordinate.resolve(repo.path());
    std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
    std::fs::copy(sample_jar(repo.path()), &jar).unwrap();

    let entries = scan_archive(&jar).unwrap();
    assert_eq!(entries.len(), 3);
}
