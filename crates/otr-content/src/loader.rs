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
use std::path::PathBuf;

use tracing::trace;

/// A class located by a [`ResourceLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedClass {
    /// Dotted class name as requested.
    pub name: String,
    /// Where the class file was found.
    pub location: PathBuf,
}

/// Resolves resource and class names for a bundle.
///
/// Names reach the loader already stripped of their leading separator.
pub trait ResourceLoader: Send + Sync + fmt::Debug {
    /// First location providing `name`.
    fn resource(&self, name: &str) -> Option<PathBuf>;

    /// Every location providing `name`, in search order.
    fn resources(&self, name: &str) -> Vec<PathBuf>;

    /// Locate the class file of a dotted class name.
    fn load_class(&self, name: &str) -> Option<LoadedClass> {
        let resource = format!("{}.class", name.replace('.', "/"));
        self.resource(&resource).map(|location| LoadedClass {
            name: name.to_owned(),
            location,
        })
    }
}

/// Loader searching an ordered list of directory roots.
#[derive(Debug, Clone, Default)]
pub struct ClasspathLoader {
    roots: Vec<PathBuf>,
}

impl ClasspathLoader {
    /// Create a loader over the supplied roots.
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Roots searched by this loader.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceLoader for ClasspathLoader {
    fn resource(&self, name: &str) -> Option<PathBuf> {
        let found = self
            .roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.exists());
        trace!(resource = name, found = found.is_some(), "classpath lookup");
        found
    }

    fn resources(&self, name: &str) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(name))
            .filter(|candidate| candidate.exists())
            .collect()
    }
}

/// Strip a single leading `/` from a resource name.
pub fn strip_resource_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

/// Strip a single leading `/` or `.` from a class name.
pub fn strip_class_name(name: &str) -> &str {
    name.strip_prefix('/')
        .or_else(|| name.strip_prefix('.'))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn strips_single_leading_qualifier() {
        assert_eq!(strip_resource_name("/a/b.txt"), "a/b.txt");
        assert_eq!(strip_resource_name("//a"), "/a");
        assert_eq!(strip_resource_name("a"), "a");
        assert_eq!(strip_class_name(".com.acme.Foo"), "com.acme.Foo");
        assert_eq!(strip_class_name("/com.acme.Foo"), "com.acme.Foo");
        assert_eq!(strip_class_name("com.acme.Foo"), "com.acme.Foo");
    }

    #[test]
    fn searches_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("shared.txt"), "2").unwrap();
        fs::write(first.path().join("shared.txt"), "1").unwrap();
        fs::write(second.path().join("only-second.txt"), "2").unwrap();

        let loader = ClasspathLoader::new([first.path(), second.path()]);
        assert_eq!(
            loader.resource("shared.txt"),
            Some(first.path().join("shared.txt"))
        );
        assert_eq!(loader.resources("shared.txt").len(), 2);
        assert_eq!(
            loader.resource("only-second.txt"),
            Some(second.path().join("only-second.txt"))
        );
        assert!(loader.resource("absent.txt").is_none());
    }

    #[test]
    fn classes_resolve_to_class_files() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("com/acme")).unwrap();
        fs::write(root.path().join("com/acme/Foo.class"), [0xCA, 0xFE]).unwrap();

        let loader = ClasspathLoader::new([root.path()]);
        let class = loader.load_class("com.acme.Foo").unwrap();
        assert_eq!(class.location, root.path().join("com/acme/Foo.class"));
        assert!(loader.load_class("com.acme.Missing").is_none());
    }
}
