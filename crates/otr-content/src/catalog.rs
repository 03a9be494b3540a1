//! ---
//! otr_section: "02-bundle-content"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Content collaborators feeding simulated bundles."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fs::File;
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::entry::EntryPath;
use crate::{ContentError, Result};

/// Where the simulated content of a bundle comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Every file below a directory, recursively.
    Directory(PathBuf),
    /// Every non-directory entry of a jar/zip archive.
    Archive(PathBuf),
    /// An explicit list of root-relative paths.
    Paths(Vec<String>),
}

impl ContentSource {
    /// Enumerate the entry paths provided by this source.
    pub fn entries(&self) -> Result<Vec<EntryPath>> {
        match self {
            ContentSource::Directory(root) => scan_directory(root),
            ContentSource::Archive(archive) => scan_archive(archive),
            ContentSource::Paths(paths) => {
                Ok(paths.iter().map(|path| EntryPath::listed(path.as_str())).collect())
            }
        }
    }
}

/// Enumerate every file below `root`.
///
/// Each entry's relative path is its absolute path with the absolute root
/// prefix removed, so it begins with a path separator.
pub fn scan_directory(root: impl AsRef<Path>) -> Result<Vec<EntryPath>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ContentError::NotADirectory(root.to_path_buf()));
    }
    let absolute = root
        .absolutize()
        .map_err(|err| ContentError::metadata(root.display().to_string(), err))?;
    let root_len = absolute.to_string_lossy().len();

    let mut entries = Vec::new();
    for entry in WalkDir::new(&absolute)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|source| ContentError::Scan {
            root: absolute.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let full = entry.path().to_string_lossy().into_owned();
        let relative = full[root_len..].to_owned();
        entries.push(EntryPath::file(entry.into_path(), relative));
    }
    debug!(root = %absolute.display(), entries = entries.len(), "directory scanned");
    Ok(entries)
}

/// Enumerate the file entries of a jar/zip archive, skipping directories.
pub fn scan_archive(archive: impl AsRef<Path>) -> Result<Vec<EntryPath>> {
    let path = archive.as_ref();
    if !path.exists() {
        return Err(ContentError::MissingArchive(path.to_path_buf()));
    }
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|err| ContentError::metadata(&origin, err))?;
    let mut zip = ZipArchive::new(file).map_err(|err| ContentError::metadata(&origin, err))?;

    let mut entries = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let item = zip
            .by_index_raw(index)
            .map_err(|err| ContentError::metadata(&origin, err))?;
        let name = item.name().to_owned();
        if name.trim().ends_with('/') {
            continue;
        }
        if name.starts_with("lib/") && name.ends_with(".jar") {
            warn!(archive = %origin, entry = %name, "archive seems to embed another bundle");
        }
        entries.push(EntryPath::archive(path, format!("/{name}")));
    }
    debug!(archive = %origin, entries = entries.len(), "archive scanned");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;

    #[test]
    fn directory_scan_yields_root_relative_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("a/b.txt"), "b").unwrap();
        fs::write(dir.path().join("c.txt"), "c").unwrap();

        let entries = scan_directory(dir.path()).unwrap();
        let relative: BTreeSet<&str> = entries.iter().map(EntryPath::relative).collect();
        let sep = std::path::MAIN_SEPARATOR;
        let expected: BTreeSet<String> = [format!("{sep}a{sep}b.txt"), format!("{sep}c.txt")]
            .into_iter()
            .collect();
        assert_eq!(
            relative,
            expected.iter().map(String::as_str).collect::<BTreeSet<_>>()
        );

        let root_len = dir.path().absolutize().unwrap().to_string_lossy().len();
        for entry in &entries {
            let crate::EntryOrigin::File(full) = entry.origin() else {
                panic!("directory entries carry their full path");
            };
            assert_eq!(
                entry.relative().len(),
                full.to_string_lossy().len() - root_len
            );
        }
    }

    #[test]
    fn directory_scan_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = scan_directory(&file).unwrap_err();
        assert!(matches!(err, ContentError::NotADirectory(path) if path == file));
    }

    #[test]
    fn missing_archive_is_reported() {
        let err = scan_archive("/no/such/bundle.jar").unwrap_err();
        assert!(matches!(err, ContentError::MissingArchive(_)));
    }

    #[test]
    fn listed_paths_are_kept_verbatim() {
        let source = ContentSource::Paths(vec!["/x".into(), "/x".into(), "y".into()]);
        let entries = source.entries().unwrap();
        let relative: Vec<&str> = entries.iter().map(EntryPath::relative).collect();
        assert_eq!(relative, ["/x", "/x", "y"]);
    }
}
