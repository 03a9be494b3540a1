//! ---
//! otr_section: "02-bundle-content"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Content collaborators feeding simulated bundles."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::path::PathBuf;

use crate::manifest::{ManifestSource, MANIFEST_NAME};

/// Where an entry path was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// Supplied literally by the caller.
    Listed,
    /// Found on disk at the given absolute path.
    File(PathBuf),
    /// Found inside the given archive.
    Archive(PathBuf),
}

/// A root-relative bundle entry together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPath {
    relative: String,
    origin: EntryOrigin,
}

impl EntryPath {
    /// Entry supplied literally, without any backing content.
    pub fn listed(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
            origin: EntryOrigin::Listed,
        }
    }

    /// Entry backed by a file on disk.
    pub fn file(full_path: impl Into<PathBuf>, relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
            origin: EntryOrigin::File(full_path.into()),
        }
    }

    /// Entry found inside an archive.
    pub fn archive(archive: impl Into<PathBuf>, relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
            origin: EntryOrigin::Archive(archive.into()),
        }
    }

    /// Root-relative path, normally beginning with `/`.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Origin of this entry.
    pub fn origin(&self) -> &EntryOrigin {
        &self.origin
    }

    /// Whether this entry names a bundle manifest.
    pub fn is_manifest(&self) -> bool {
        self.relative.ends_with(MANIFEST_NAME)
    }

    /// Source to read headers from when this entry is a manifest.
    ///
    /// Listed entries have no backing content, so their path is read as a
    /// plain file path.
    pub fn manifest_source(&self) -> ManifestSource {
        match &self.origin {
            EntryOrigin::Listed => ManifestSource::File(PathBuf::from(&self.relative)),
            EntryOrigin::File(full) => ManifestSource::File(full.clone()),
            EntryOrigin::Archive(archive) => ManifestSource::Archive(archive.clone()),
        }
    }
}

impl From<&str> for EntryPath {
    fn from(relative: &str) -> Self {
        EntryPath::listed(relative)
    }
}

impl From<String> for EntryPath {
    fn from(relative: String) -> Self {
        EntryPath::listed(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_detection_uses_trailing_file_name() {
        assert!(EntryPath::listed("/META-INF/MANIFEST.MF").is_manifest());
        assert!(!EntryPath::listed("/META-INF/MANIFEST.MF.bak").is_manifest());
        assert!(!EntryPath::listed("/a/b.txt").is_manifest());
    }

    #[test]
    fn manifest_source_follows_origin() {
        let archived = EntryPath::archive("/tmp/x.jar", "/META-INF/MANIFEST.MF");
        assert!(matches!(
            archived.manifest_source(),
            ManifestSource::Archive(path) if path == PathBuf::from("/tmp/x.jar")
        ));
        let on_disk = EntryPath::file("/work/META-INF/MANIFEST.MF", "/META-INF/MANIFEST.MF");
        assert!(matches!(
            on_disk.manifest_source(),
            ManifestSource::File(path) if path == PathBuf::from("/work/META-INF/MANIFEST.MF")
        ));
    }
}
