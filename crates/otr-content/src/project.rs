//! ---
//! otr_section: "02-bundle-content"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Content collaborators feeding simulated bundles."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

use crate::{ContentError, Result};

/// Find the topmost ancestor of `start` (inclusive) holding a `marker` file.
///
/// Multi-module projects nest marker files, so the search keeps climbing
/// after the first hit and returns the outermost one.
pub fn find_project_root(start: impl AsRef<Path>, marker: &str) -> Result<PathBuf> {
    let start = start.as_ref();
    let absolute = start
        .absolutize()
        .map_err(|err| ContentError::metadata(start.display().to_string(), err))?
        .into_owned();

    absolute
        .ancestors()
        .filter(|dir| dir.join(marker).is_file())
        .last()
        .map(Path::to_path_buf)
        .ok_or_else(|| ContentError::ProjectRootNotFound {
            start: absolute.clone(),
            marker: marker.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn returns_outermost_marker_directory() {
        let dir = tempfile::tempdir().unwrap();
        let outer = dir.path().join("workspace");
        let inner = outer.join("crates/member/src");
        fs::create_dir_all(&inner).unwrap();
        fs::write(outer.join("build.marker"), "").unwrap();
        fs::write(outer.join("crates/member/build.marker"), "").unwrap();

        let root = find_project_root(&inner, "build.marker").unwrap();
        assert_eq!(root, outer.absolutize().unwrap().into_owned());
    }

    #[test]
    fn missing_marker_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_project_root(dir.path(), "no-such-marker.xyz").unwrap_err();
        assert!(matches!(err, ContentError::ProjectRootNotFound { .. }));
    }
}
