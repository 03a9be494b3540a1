//! ---
//! otr_section: "02-bundle-content"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Content collaborators feeding simulated bundles."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Content collaborators for simulated bundles.
//!
//! Nothing in here loads code. Catalogs only enumerate the paths a real
//! bundle would carry, manifests only yield header maps, and the resource
//! loader only resolves names against directory roots.

use std::path::PathBuf;

pub mod catalog;
pub mod entry;
pub mod loader;
pub mod manifest;
pub mod maven;
pub mod project;

pub use catalog::{scan_archive, scan_directory, ContentSource};
pub use entry::{EntryOrigin, EntryPath};
pub use loader::{ClasspathLoader, LoadedClass, ResourceLoader};
pub use manifest::{load_headers, parse_manifest, Headers, ManifestSource, MANIFEST_NAME};
pub use maven::MavenCoordinate;
pub use project::find_project_root;

/// Boxed cause carried by [`ContentError::Metadata`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the content crate.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Error type for bundle content collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A directory scan was pointed at something that is not a directory.
    #[error("non directory path passed to directory scan: {0}")]
    NotADirectory(PathBuf),
    /// The archive to enumerate does not exist.
    #[error("archive {0} does not exist")]
    MissingArchive(PathBuf),
    /// Walking a directory tree failed part way.
    #[error("failed scanning {root}")]
    Scan {
        /// Root of the failed scan.
        root: PathBuf,
        /// Underlying walk failure.
        #[source]
        source: walkdir::Error,
    },
    /// Manifest or archive metadata could not be read.
    #[error("failed to load bundle metadata from {origin}")]
    Metadata {
        /// Human readable description of the metadata source.
        origin: String,
        /// Underlying read or parse failure.
        #[source]
        source: BoxError,
    },
    /// No loader root provides the requested class.
    #[error("class not found: {0}")]
    ClassNotFound(String),
    /// No ancestor of the start directory carries the project marker.
    #[error("no directory containing {marker} found above {start}")]
    ProjectRootNotFound {
        /// Directory the search started from.
        start: PathBuf,
        /// Marker file searched for.
        marker: String,
    },
}

impl ContentError {
    pub(crate) fn metadata(origin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ContentError::Metadata {
            origin: origin.into(),
            source: source.into(),
        }
    }
}
