//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use otr_common::{init_tracing, HarnessConfig};
use otr_content::{find_project_root, ClasspathLoader, ResourceLoader};
use otr_logging::{log_lifecycle_event, otr_debug, otr_error, otr_info, LifecycleOutcome, LogContext};
use otr_registry::ServiceRegistry;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::activator::BundleActivator;
use crate::builder::BundleBuilder;
use crate::bundle::{Bundle, BundleState};
use crate::context::BundleContext;
use crate::error::{ActivatorPhase, Result, RuntimeError};
use crate::events::{fan_out, BundleEventKind};
use crate::table::BundleTable;
use crate::wait::Hold;

/// Bookkeeping for one bundle created through [`TestRuntime::deploy`].
pub(crate) struct Deployment {
    pub(crate) name: String,
    pub(crate) bundle: Arc<Bundle>,
    pub(crate) activator: Mutex<Option<Box<dyn BundleActivator>>>,
    /// Set once the activator's start hook has succeeded.
    pub(crate) started: AtomicBool,
}

impl Deployment {
    pub(crate) fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    fn take_started(&self) -> bool {
        self.started.swap(false, Ordering::AcqRel)
    }
}

/// Sleep length selected by a free text delay hint.
///
/// Hints starting with `long` map to 10 s, `very small` to 500 ms, anything
/// else to 1 s.
pub fn hint_duration(hint: &str) -> Duration {
    if hint.starts_with("long") {
        Duration::from_secs(10)
    } else if hint.starts_with("very small") {
        Duration::from_millis(500)
    } else {
        Duration::from_secs(1)
    }
}

/// Orchestrator owning bundle creation, deployment, and teardown.
pub struct TestRuntime {
    config: HarnessConfig,
    registry: Arc<ServiceRegistry>,
    table: Arc<BundleTable>,
    ambient: Arc<dyn ResourceLoader>,
    deployments: Mutex<Vec<Arc<Deployment>>>,
}

impl TestRuntime {
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self::with_table(config, BundleTable::new())
    }

    /// Runtime creating its bundles in an existing, possibly shared, table.
    pub fn with_table(config: HarnessConfig, table: Arc<BundleTable>) -> Self {
        let roots = if config.classpath.is_empty() {
            vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
        } else {
            config.classpath.clone()
        };
        Self {
            config,
            registry: Arc::new(ServiceRegistry::new()),
            table,
            ambient: Arc::new(ClasspathLoader::new(roots)),
            deployments: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn table(&self) -> &Arc<BundleTable> {
        &self.table
    }

    /// Create and track a new bundle, notifying every other live bundle.
    pub fn create_bundle(&self, symbolic_name: &str) -> Arc<Bundle> {
        let id = self.table.allocate_id();
        let bundle = Arc::new(Bundle::new(
            id,
            symbolic_name,
            self.registry.clone(),
            Arc::downgrade(&self.table),
            self.ambient.clone(),
        ));
        let others = self.table.insert(bundle.clone());
        otr_debug!(
            context = LogContext::new()
                .with_bundle(symbolic_name, id.get())
                .with_event(BundleEventKind::Installed.name()),
            "bundle installed, notifying {} live bundles",
            others.len()
        );
        fan_out(&others, BundleEventKind::Installed, &bundle);
        bundle
    }

    /// Stop tracking `bundle` and notify the remaining live bundles.
    ///
    /// Returns `false` without side effects for bundles that are not live.
    pub fn remove_bundle(&self, bundle: &Bundle) -> bool {
        let Some((removed, remaining)) = self.table.remove(bundle.id()) else {
            debug!(bundle = %bundle.symbolic_name(), bundle_id = %bundle.id(), "remove of untracked bundle ignored");
            return false;
        };
        if let Err(err) = removed.transition(BundleState::Uninstalled) {
            warn!(bundle = %removed.symbolic_name(), error = %err, "unexpected state on removal");
        }
        otr_debug!(
            context = LogContext::new()
                .with_bundle(removed.symbolic_name(), removed.id().get())
                .with_event(BundleEventKind::Uninstalled.name()),
            "bundle uninstalled, notifying {} live bundles",
            remaining.len()
        );
        fan_out(&remaining, BundleEventKind::Uninstalled, &removed);
        true
    }

    pub fn remove_bundle_context(&self, context: &BundleContext) -> bool {
        self.remove_bundle(context.bundle())
    }

    /// Live bundles in creation order.
    pub fn bundles(&self) -> Vec<Arc<Bundle>> {
        self.table.snapshot()
    }

    pub fn bundle_by_symbolic_name(&self, name: &str) -> Option<Arc<Bundle>> {
        self.table.by_symbolic_name(name)
    }

    pub fn bundle_by_id(&self, id: otr_common::BundleId) -> Option<Arc<Bundle>> {
        self.table.by_id(id)
    }

    /// Create a bundle and return a builder that supplies its content and starts it.
    pub fn deploy(&self, name: &str) -> BundleBuilder<'_> {
        let deployment = Arc::new(Deployment {
            name: name.to_owned(),
            bundle: self.create_bundle(name),
            activator: Mutex::new(None),
            started: AtomicBool::new(false),
        });
        self.deployments.lock().push(deployment.clone());
        BundleBuilder::new(self, deployment)
    }

    /// Tear down the most recently deployed bundle named `name`.
    pub fn undeploy(&self, name: &str) -> bool {
        let deployment = {
            let mut deployments = self.deployments.lock();
            let index = deployments
                .iter()
                .rposition(|deployment| deployment.name == name);
            index.map(|index| deployments.remove(index))
        };
        let Some(deployment) = deployment else {
            debug!(bundle = name, "undeploy of unknown bundle ignored");
            return false;
        };
        self.teardown(&deployment);
        let bundle = &deployment.bundle;
        log_lifecycle_event(
            Some(&LogContext::new().with_bundle(bundle.symbolic_name(), bundle.id().get())),
            "bundle.undeploy",
            "bundle undeployed",
            LifecycleOutcome::Success,
        );
        true
    }

    /// Tear down every deployed bundle in reverse deployment order.
    ///
    /// A failing stop hook is logged and teardown carries on.
    pub fn shutdown(&self) {
        let deployments = std::mem::take(&mut *self.deployments.lock());
        otr_info!("shutting down {} deployed bundles", deployments.len());
        for deployment in deployments.iter().rev() {
            self.teardown(deployment);
        }
    }

    fn teardown(&self, deployment: &Deployment) {
        let bundle = &deployment.bundle;
        let ctx = LogContext::new().with_bundle(bundle.symbolic_name(), bundle.id().get());

        if deployment.take_started() {
            let activator = deployment.activator.lock().take();
            if let Some(mut activator) = activator {
                if let Err(err) = activator.stop(&bundle.context()) {
                    let err = RuntimeError::activator(bundle.symbolic_name(), ActivatorPhase::Stop, err);
                    otr_error!(
                        context = ctx.clone().with_event(BundleEventKind::Stopped.name()),
                        "{err}; continuing teardown"
                    );
                    log_lifecycle_event(Some(&ctx), "bundle.stop", &err.to_string(), LifecycleOutcome::Fault);
                }
            }
            // A bundle removed directly is already UNINSTALLED and gets no STOPPED event.
            match bundle.transition(BundleState::Stopped) {
                Ok(_) => fan_out(&self.table.snapshot(), BundleEventKind::Stopped, bundle),
                Err(err) => debug!(bundle = %bundle.symbolic_name(), error = %err, "stop transition skipped"),
            }
        } else {
            otr_debug!(context = ctx, "activator never started, skipping stop");
        }
        self.remove_bundle(bundle);
    }

    pub(crate) fn deliver_started(&self, bundle: &Arc<Bundle>) {
        fan_out(&self.table.snapshot(), BundleEventKind::Started, bundle);
    }

    /// Names of pending deployments, oldest first.
    pub fn deployed(&self) -> Vec<String> {
        self.deployments
            .lock()
            .iter()
            .map(|deployment| deployment.name.clone())
            .collect()
    }

    /// Run `body` against a fresh bundle that is removed afterwards.
    ///
    /// Removal happens on normal return, on an error return, and while
    /// unwinding from a panic in `body`.
    pub fn with_new_bundle<R>(&self, name: &str, body: impl FnOnce(&BundleContext) -> R) -> R {
        let guard = RemoveOnDrop {
            runtime: self,
            bundle: self.create_bundle(name),
        };
        let context = guard.bundle.context();
        body(&context)
    }

    /// Install the tracing subscriber described by this runtime's logging config.
    ///
    /// Only the first subscriber installed in a process takes effect.
    pub fn init_logging(&self, service_name: &str) -> Result<()> {
        init_tracing(service_name, &self.config.logging)
            .map_err(|err| RuntimeError::Configuration(format!("logging setup failed: {err:#}")))
    }

    /// Polling wait preloaded with this runtime's wait defaults.
    pub fn hold<'a>(&self) -> Hold<'a> {
        Hold::from_config(&self.config.wait)
    }

    pub fn delay(&self, duration: Duration) {
        thread::sleep(duration);
    }

    /// Sleep for the duration named by `hint`, see [`hint_duration`].
    pub fn delay_hint(&self, hint: &str) -> Duration {
        let duration = hint_duration(hint);
        self.delay(duration);
        duration
    }

    pub(crate) fn maven_repository(&self) -> Result<PathBuf> {
        self.config
            .maven_repository()
            .map_err(|err| RuntimeError::Configuration(format!("{err:#}")))
    }

    /// Root for project relative directory scans.
    pub(crate) fn project_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.config.project_root {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir()
            .map_err(|err| RuntimeError::Configuration(format!("working directory unavailable: {err}")))?;
        Ok(find_project_root(cwd, &self.config.project_marker)?)
    }
}

impl Default for TestRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRuntime")
            .field("live", &self.table.len())
            .field("deployed", &self.deployments.lock().len())
            .field("registry", &self.registry)
            .finish()
    }
}

struct RemoveOnDrop<'rt> {
    runtime: &'rt TestRuntime,
    bundle: Arc<Bundle>,
}

impl Drop for RemoveOnDrop<'_> {
    fn drop(&mut self) {
        self.runtime.remove_bundle(&self.bundle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_hints_map_to_fixed_durations() {
        assert_eq!(hint_duration("long wait for indexing"), Duration::from_secs(10));
        assert_eq!(hint_duration("very small"), Duration::from_millis(500));
        assert_eq!(hint_duration("small"), Duration::from_secs(1));
        assert_eq!(hint_duration(""), Duration::from_secs(1));
    }

    #[test]
    fn explicit_project_root_wins() {
        let mut config = HarnessConfig::default();
        config.project_root = Some(PathBuf::from("/srv/project"));
        let runtime = TestRuntime::with_config(config);
        assert_eq!(runtime.project_root().unwrap(), PathBuf::from("/srv/project"));
    }

    #[test]
    fn configured_maven_repository_is_used() {
        let mut config = HarnessConfig::default();
        config.maven_repository = Some(PathBuf::from("/opt/m2"));
        let runtime = TestRuntime::with_config(config);
        assert_eq!(runtime.maven_repository().unwrap(), PathBuf::from("/opt/m2"));
    }

    #[test]
    fn hold_inherits_configured_defaults() {
        let mut config = HarnessConfig::default();
        config.wait.poll_interval = Duration::from_millis(7);
        let runtime = TestRuntime::with_config(config);
        let rendered = format!("{:?}", runtime.hold());
        assert!(rendered.contains("7ms"));
    }

    #[test]
    fn logging_follows_harness_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::default();
        config.logging.directory = Some(dir.path().join("logs"));
        let runtime = TestRuntime::with_config(config);
        runtime.init_logging("otr-runtime-test").unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
