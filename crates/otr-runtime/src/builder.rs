//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use otr_content::{ContentError, ContentSource, ManifestSource, MavenCoordinate, ResourceLoader, MANIFEST_NAME};
use otr_logging::{log_lifecycle_event, otr_info, LifecycleOutcome, LogContext};

use crate::activator::BundleActivator;
use crate::bundle::{Bundle, BundleState};
use crate::context::BundleContext;
use crate::error::{ActivatorPhase, Result, RuntimeError};
use crate::runtime::{Deployment, TestRuntime};

/// Deploy DSL returned by [`TestRuntime::deploy`].
///
/// The bundle already exists when the builder is handed out. Attach an
/// activator (and optionally a resource loader or manifest), then finish with
/// exactly one content call: `from_maven`, `from_jar`, `from_dir`,
/// `from_project_dir`, or `using`. The content call starts the bundle.
pub struct BundleBuilder<'rt> {
    runtime: &'rt TestRuntime,
    deployment: Arc<Deployment>,
}

impl<'rt> BundleBuilder<'rt> {
    pub(crate) fn new(runtime: &'rt TestRuntime, deployment: Arc<Deployment>) -> Self {
        Self {
            runtime,
            deployment,
        }
    }

    pub fn name(&self) -> &str {
        &self.deployment.name
    }

    fn bundle(&self) -> &Arc<Bundle> {
        &self.deployment.bundle
    }

    fn log_context(&self) -> LogContext<'_> {
        LogContext::new().with_bundle(self.bundle().symbolic_name(), self.bundle().id().get())
    }

    pub fn with_activator(self, activator: impl BundleActivator + 'static) -> Self {
        *self.deployment.activator.lock() = Some(Box::new(activator));
        self
    }

    /// Resolve the bundle's resources through `loader` instead of the ambient classpath.
    pub fn with_resource_loader(self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.bundle().set_resource_loader(loader);
        self
    }

    /// Load headers from `<manifest_dir>/<name>`, found through the bundle's loader.
    ///
    /// `None` or a blank name selects `MANIFEST.MF`.
    pub fn manifest_from(self, name: Option<&str>) -> Result<Self> {
        let file_name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(MANIFEST_NAME);
        let resource = self
            .runtime
            .config()
            .manifest_dir
            .join(file_name)
            .to_string_lossy()
            .into_owned();

        let location = self.bundle().resource(&resource).ok_or_else(|| ContentError::Metadata {
            origin: resource.clone(),
            source: Box::new(io::Error::new(io::ErrorKind::NotFound, "manifest resource not found")),
        })?;
        let stream = File::open(&location).map_err(|err| ContentError::Metadata {
            origin: location.display().to_string(),
            source: Box::new(err),
        })?;
        self.bundle()
            .load_manifest(ManifestSource::Stream(Box::new(stream)))?;
        Ok(self)
    }

    /// Content from `<maven repository>/<group path>/<artifact>/<version>/<artifact>-<version>.jar`.
    pub fn from_maven(self, group: &str, artifact: &str, version: &str) -> Result<Self> {
        self.from_maven_coordinate(MavenCoordinate::new(group, artifact, version))
    }

    pub fn from_maven_coordinate(self, coordinate: MavenCoordinate) -> Result<Self> {
        let jar = coordinate.resolve(self.runtime.maven_repository()?);
        otr_info!(context = self.log_context(), "resolved {coordinate} to {}", jar.display());
        self.load(ContentSource::Archive(jar))
    }

    pub fn from_jar(self, jar: impl AsRef<Path>) -> Result<Self> {
        self.load(ContentSource::Archive(jar.as_ref().to_path_buf()))
    }

    pub fn from_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
        self.load(ContentSource::Directory(dir.as_ref().to_path_buf()))
    }

    /// Content from a directory relative to the project root.
    pub fn from_project_dir(self, relative: impl AsRef<Path>) -> Result<Self> {
        let dir = self.runtime.project_root()?.join(relative);
        self.load(ContentSource::Directory(dir))
    }

    /// Content from an explicit list of entry paths, kept verbatim.
    pub fn using<I, S>(self, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load(ContentSource::Paths(paths.into_iter().map(Into::into).collect()))
    }

    fn load(self, source: ContentSource) -> Result<Self> {
        let entries = source.entries()?;
        otr_info!(
            context = self.log_context(),
            "loading {} entries from {source:?}",
            entries.len()
        );
        self.bundle().add_entry_paths(entries)?;
        self.start()
    }

    /// Run the activator's start hook and announce STARTED to every live bundle.
    pub fn start(self) -> Result<Self> {
        let bundle = self.bundle().clone();
        let state = bundle.state();
        if !state.can_transition(BundleState::Started) {
            return Err(RuntimeError::InvalidTransition {
                bundle: bundle.symbolic_name().to_owned(),
                from: state,
                to: BundleState::Started,
            });
        }

        let mut activator = self
            .deployment
            .activator
            .lock()
            .take()
            .ok_or_else(|| RuntimeError::MissingActivator {
                bundle: bundle.symbolic_name().to_owned(),
            })?;
        let started = activator.start(&bundle.context());
        *self.deployment.activator.lock() = Some(activator);
        if let Err(err) = started {
            let err = RuntimeError::activator(bundle.symbolic_name(), ActivatorPhase::Start, err);
            log_lifecycle_event(Some(&self.log_context()), "bundle.start", &err.to_string(), LifecycleOutcome::Fault);
            return Err(err);
        }
        self.deployment.mark_started();

        bundle.transition(BundleState::Started)?;
        self.runtime.deliver_started(&bundle);
        log_lifecycle_event(
            Some(&self.log_context()),
            "bundle.start",
            "bundle started",
            LifecycleOutcome::Success,
        );
        Ok(self)
    }

    pub fn as_context(&self) -> BundleContext {
        self.bundle().context()
    }

    pub fn as_bundle(&self) -> Arc<Bundle> {
        self.bundle().clone()
    }
}

impl std::fmt::Debug for BundleBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleBuilder")
            .field("name", &self.deployment.name)
            .field("bundle", self.bundle())
            .finish()
    }
}
