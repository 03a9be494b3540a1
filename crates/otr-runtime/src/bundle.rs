//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
//! Simulated bundles.
//!
//! A [`Bundle`] never runs code of its own. It carries identity, the entry
//! paths and headers its content collaborators supplied, a lifecycle state
//! and the listeners registered through its [`BundleContext`].

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use otr_common::BundleId;
use otr_content::loader::{strip_class_name, strip_resource_name};
use otr_content::{
    load_headers, ContentError, EntryPath, Headers, LoadedClass, ManifestSource, ResourceLoader,
};
use otr_registry::{ServiceProperties, ServiceReference, ServiceRegistration, ServiceRegistry};
use parking_lot::Mutex;
use semver::Version;
use strum::Display;
use tracing::{debug, trace};
use url::Url;

use crate::context::BundleContext;
use crate::error::{Result, RuntimeError};
use crate::events::{BundleListener, ListenerId};
use crate::table::BundleTable;

/// Lifecycle state of a simulated bundle.
///
/// `Created -> Started -> Stopped -> Uninstalled`, with removal allowed from
/// any non terminal state. A stopped bundle is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleState {
    Created,
    Started,
    Stopped,
    Uninstalled,
}

impl BundleState {
    /// Whether the state machine permits moving to `next`.
    pub fn can_transition(self, next: BundleState) -> bool {
        use BundleState::*;
        matches!(
            (self, next),
            (Created, Started)
                | (Started, Stopped)
                | (Created, Uninstalled)
                | (Started, Uninstalled)
                | (Stopped, Uninstalled)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == BundleState::Uninstalled
    }
}

struct BundleInner {
    state: BundleState,
    version: Version,
    headers: Headers,
    entries: Vec<String>,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
}

/// A simulated deployable unit.
pub struct Bundle {
    id: BundleId,
    symbolic_name: String,
    registry: Arc<ServiceRegistry>,
    table: Weak<BundleTable>,
    ambient: Arc<dyn ResourceLoader>,
    inner: Mutex<BundleInner>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn BundleListener>)>>,
    next_listener: AtomicU64,
}

impl Bundle {
    pub(crate) fn new(
        id: BundleId,
        symbolic_name: impl Into<String>,
        registry: Arc<ServiceRegistry>,
        table: Weak<BundleTable>,
        ambient: Arc<dyn ResourceLoader>,
    ) -> Self {
        Self {
            id,
            symbolic_name: symbolic_name.into(),
            registry,
            table,
            ambient,
            inner: Mutex::new(BundleInner {
                state: BundleState::Created,
                version: Version::new(1, 0, 0),
                headers: Headers::new(),
                entries: Vec::new(),
                resource_loader: None,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub fn id(&self) -> BundleId {
        self.id
    }

    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    /// Context handle through which this bundle sees the runtime.
    pub fn context(self: &Arc<Self>) -> BundleContext {
        BundleContext::new(self.clone())
    }

    pub fn state(&self) -> BundleState {
        self.inner.lock().state
    }

    pub(crate) fn transition(&self, next: BundleState) -> Result<BundleState> {
        let mut inner = self.inner.lock();
        let previous = inner.state;
        if !previous.can_transition(next) {
            return Err(RuntimeError::InvalidTransition {
                bundle: self.symbolic_name.clone(),
                from: previous,
                to: next,
            });
        }
        inner.state = next;
        debug!(bundle = %self.symbolic_name, bundle_id = %self.id, from = %previous, to = %next, "bundle state changed");
        Ok(previous)
    }

    pub fn version(&self) -> Version {
        self.inner.lock().version.clone()
    }

    pub fn set_version(&self, version: Version) {
        self.inner.lock().version = version;
    }

    /// Copy of the current header map.
    pub fn headers(&self) -> Headers {
        self.inner.lock().headers.clone()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.lock().headers.get(name).cloned()
    }

    /// Replace all headers.
    pub fn set_headers(&self, headers: Headers) {
        self.inner.lock().headers = headers;
    }

    /// Merge headers read from `source` into the current header map.
    pub fn load_manifest(&self, source: ManifestSource) -> Result<()> {
        let origin = source.describe();
        let headers = load_headers(source)?;
        debug!(bundle = %self.symbolic_name, origin = %origin, headers = headers.len(), "manifest loaded");
        self.inner.lock().headers.extend(headers);
        Ok(())
    }

    /// Append one entry path.
    ///
    /// Adding a path that names a manifest loads its headers as a side
    /// effect. The entry stays recorded even if that load fails.
    pub fn add_entry_path(&self, entry: impl Into<EntryPath>) -> Result<()> {
        let entry = entry.into();
        self.inner.lock().entries.push(entry.relative().to_owned());
        trace!(bundle = %self.symbolic_name, entry = entry.relative(), "entry added");
        if entry.is_manifest() {
            self.load_manifest(entry.manifest_source())?;
        }
        Ok(())
    }

    /// Append many entry paths in order, stopping at the first manifest failure.
    pub fn add_entry_paths<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<EntryPath>,
    {
        for entry in entries {
            self.add_entry_path(entry)?;
        }
        Ok(())
    }

    /// All registered entry paths, in insertion order.
    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().entries.clone()
    }

    /// Entry paths starting with `prefix`, in insertion order.
    pub fn entry_paths(&self, prefix: &str) -> Vec<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// First entry starting with `prefix` as a `file:` URL.
    pub fn entry(&self, prefix: &str) -> Option<Url> {
        self.entry_paths(prefix)
            .first()
            .and_then(|entry| file_locator(entry))
    }

    /// Entries starting with `path` as `file:` URLs.
    ///
    /// Pattern filtering and recursion control are not simulated; the result
    /// is the plain prefix match whatever the arguments.
    pub fn find_entries(&self, path: &str, _pattern: &str, _recurse: bool) -> Vec<Url> {
        self.entry_paths(path)
            .iter()
            .filter_map(|entry| file_locator(entry))
            .collect()
    }

    pub fn set_resource_loader(&self, loader: Arc<dyn ResourceLoader>) {
        self.inner.lock().resource_loader = Some(loader);
    }

    fn loader(&self) -> Arc<dyn ResourceLoader> {
        self.inner
            .lock()
            .resource_loader
            .clone()
            .unwrap_or_else(|| self.ambient.clone())
    }

    pub fn resource(&self, name: &str) -> Option<PathBuf> {
        self.loader().resource(strip_resource_name(name))
    }

    pub fn resources(&self, name: &str) -> Vec<PathBuf> {
        self.loader().resources(strip_resource_name(name))
    }

    /// Locate the class file for a dotted class name.
    pub fn load_class(&self, name: &str) -> Result<LoadedClass> {
        let name = strip_class_name(name);
        self.loader()
            .load_class(name)
            .ok_or_else(|| RuntimeError::Content(ContentError::ClassNotFound(name.to_owned())))
    }

    /// Publish `service` under interface `I`, owned by this bundle.
    pub fn add_service_instance<I>(&self, service: Arc<I>) -> ServiceRegistration
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.registry
            .register_service(self.id, service, ServiceProperties::new())
    }

    /// Every registration in the shared registry.
    pub fn registered_services(&self) -> Vec<ServiceReference> {
        self.registry.registered_services()
    }

    /// Identical to [`registered_services`](Self::registered_services).
    pub fn services_in_use(&self) -> Vec<ServiceReference> {
        self.registry.services_in_use()
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub(crate) fn table(&self) -> Option<Arc<BundleTable>> {
        self.table.upgrade()
    }

    pub(crate) fn add_listener(&self, listener: Arc<dyn BundleListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(candidate, _)| *candidate != id);
        listeners.len() != before
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub(crate) fn listener_snapshot(&self) -> Vec<Arc<dyn BundleListener>> {
        self.listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("id", &self.id)
            .field("symbolic_name", &self.symbolic_name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn file_locator(entry: &str) -> Option<Url> {
    let locator = format!("file:{entry}");
    match Url::parse(&locator) {
        Ok(url) => Some(url),
        Err(err) => {
            debug!(entry, error = %err, "entry path is not a valid file locator");
            None
        }
    }
}
