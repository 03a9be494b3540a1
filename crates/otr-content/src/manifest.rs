//! ---
//! otr_section: "02-bundle-content"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Content collaborators feeding simulated bundles."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;
use zip::ZipArchive;

use crate::{ContentError, Result};

/// File name identifying a bundle manifest entry.
pub const MANIFEST_NAME: &str = "MANIFEST.MF";

/// Location of the manifest inside a bundle archive.
pub const ARCHIVE_MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Ordered manifest header map.
pub type Headers = IndexMap<String, String>;

/// One of the three places a manifest can be read from.
pub enum ManifestSource {
    /// Read `META-INF/MANIFEST.MF` out of a bundle archive.
    Archive(PathBuf),
    /// Read a manifest file from disk.
    File(PathBuf),
    /// Read a manifest from an open stream. The stream is consumed and dropped.
    Stream(Box<dyn Read + Send>),
}

impl ManifestSource {
    /// Human readable origin used in logs and errors.
    pub fn describe(&self) -> String {
        match self {
            ManifestSource::Archive(path) => format!("{}!/{}", path.display(), ARCHIVE_MANIFEST_PATH),
            ManifestSource::File(path) => path.display().to_string(),
            ManifestSource::Stream(_) => "<stream>".to_owned(),
        }
    }
}

impl fmt::Debug for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManifestSource").field(&self.describe()).finish()
    }
}

/// Malformed line found while parsing a manifest.
#[derive(Debug, thiserror::Error)]
#[error("invalid manifest header on line {line}: {text:?}")]
pub struct ManifestSyntaxError {
    /// 1-based line number.
    pub line: usize,
    /// Offending line content.
    pub text: String,
}

/// Read the main-section headers from a manifest source.
pub fn load_headers(source: ManifestSource) -> Result<Headers> {
    let origin = source.describe();
    let raw = match source {
        ManifestSource::Archive(path) => {
            let file = File::open(&path).map_err(|err| ContentError::metadata(&origin, err))?;
            let mut archive =
                ZipArchive::new(file).map_err(|err| ContentError::metadata(&origin, err))?;
            let mut entry = archive
                .by_name(ARCHIVE_MANIFEST_PATH)
                .map_err(|err| ContentError::metadata(&origin, err))?;
            let mut raw = Vec::new();
            entry
                .read_to_end(&mut raw)
                .map_err(|err| ContentError::metadata(&origin, err))?;
            raw
        }
        ManifestSource::File(path) => {
            fs::read(&path).map_err(|err| ContentError::metadata(&origin, err))?
        }
        ManifestSource::Stream(mut reader) => {
            let mut raw = Vec::new();
            reader
                .read_to_end(&mut raw)
                .map_err(|err| ContentError::metadata(&origin, err))?;
            raw
        }
    };

    let text = String::from_utf8(raw).map_err(|err| ContentError::metadata(&origin, err))?;
    let headers = parse_manifest(&text).map_err(|err| ContentError::metadata(&origin, err))?;
    debug!(origin = %origin, headers = headers.len(), "manifest loaded");
    Ok(headers)
}

/// Parse the main section of manifest text.
///
/// Continuation lines start with a single space and extend the previous
/// value. The main section ends at the first blank line after a header.
pub fn parse_manifest(text: &str) -> std::result::Result<Headers, ManifestSyntaxError> {
    let mut headers = Headers::new();
    let mut current: Option<(String, String)> = None;

    for (index, line) in text.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if current.is_some() || !headers.is_empty() {
                break;
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix(' ') {
            match current.as_mut() {
                Some((_, value)) => value.push_str(rest),
                None => {
                    return Err(ManifestSyntaxError {
                        line: index + 1,
                        text: line.to_owned(),
                    })
                }
            }
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(ManifestSyntaxError {
                line: index + 1,
                text: line.to_owned(),
            });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ManifestSyntaxError {
                line: index + 1,
                text: line.to_owned(),
            });
        }
        if let Some((name, value)) = current.take() {
            headers.insert(name, value);
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        current = Some((name.to_owned(), value.to_owned()));
    }

    if let Some((name, value)) = current {
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = concat!(
        "Manifest-Version: 1.0\r\n",
        "Bundle-SymbolicName: moon-whale-service\r\n",
        "Import-Package: org.osgi.framework;version=\"[1.8,2)\",se.natusoft.o\r\n",
        " sgi.aps.api\r\n",
        "\r\n",
        "Name: ignored/section\r\n",
        "Extra: nope\r\n",
    );

    #[test]
    fn parses_main_section_with_continuations() {
        let headers = parse_manifest(SAMPLE).unwrap();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers["Bundle-SymbolicName"], "moon-whale-service");
        assert_eq!(
            headers["Import-Package"],
            "org.osgi.framework;version=\"[1.8,2)\",se.natusoft.osgi.aps.api"
        );
        assert!(!headers.contains_key("Extra"));
        let keys: Vec<&str> = headers.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["Manifest-Version", "Bundle-SymbolicName", "Import-Package"]
        );
    }

    #[test]
    fn rejects_lines_without_separator() {
        let err = parse_manifest("Manifest-Version: 1.0\nbroken line\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn stream_source_is_consumed() {
        let headers = load_headers(ManifestSource::Stream(Box::new(Cursor::new(
            SAMPLE.as_bytes().to_vec(),
        ))))
        .unwrap();
        assert_eq!(headers["Manifest-Version"], "1.0");
    }

    #[test]
    fn missing_file_is_a_metadata_error() {
        let err = load_headers(ManifestSource::File(PathBuf::from(
            "/definitely/not/here/MANIFEST.MF",
        )))
        .unwrap_err();
        assert!(matches!(err, ContentError::Metadata { .. }));
    }
}
