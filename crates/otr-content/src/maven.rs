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
use std::path::{Path, PathBuf};

/// Group/artifact/version reference into a local Maven repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinate {
    /// Dotted group id.
    pub group: String,
    /// Artifact id.
    pub artifact: String,
    /// Artifact version.
    pub version: String,
    /// Optional classifier appended to the jar name.
    pub classifier: Option<String>,
}

impl MavenCoordinate {
    /// Construct a coordinate without classifier.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    /// Attach a classifier. Blank classifiers are ignored.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into().trim().to_owned();
        self.classifier = (!classifier.is_empty()).then_some(classifier);
        self
    }

    /// File name of the artifact jar.
    pub fn jar_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}-{}-{}.jar", self.artifact, self.version, classifier),
            None => format!("{}-{}.jar", self.artifact, self.version),
        }
    }

    /// Location of the artifact jar inside `repository`.
    pub fn resolve(&self, repository: impl AsRef<Path>) -> PathBuf {
        let mut path = repository.as_ref().to_path_buf();
        path.extend(self.group.split('.'));
        path.push(&self.artifact);
        path.push(&self.version);
        path.push(self.jar_name());
        path
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_repository_layout() {
        let coordinate = MavenCoordinate::new("se.natusoft.osgi.aps", "aps-vertx-provider", "1.0.0");
        assert_eq!(
            coordinate.resolve("/home/dev/.m2/repository"),
            PathBuf::from(
                "/home/dev/.m2/repository/se/natusoft/osgi/aps/aps-vertx-provider/1.0.0/aps-vertx-provider-1.0.0.jar"
            )
        );
    }

    #[test]
    fn classifier_is_appended_and_blank_ignored() {
        let coordinate = MavenCoordinate::new("g", "a", "2.1").with_classifier(" tests ");
        assert_eq!(coordinate.jar_name(), "a-2.1-tests.jar");
        assert_eq!(coordinate.to_string(), "g:a:2.1:tests");

        let blank = MavenCoordinate::new("g", "a", "2.1").with_classifier("  ");
        assert_eq!(blank.jar_name(), "a-2.1.jar");
    }
}
