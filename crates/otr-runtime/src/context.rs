//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::sync::Arc;

use otr_common::BundleId;
use otr_registry::{ServiceProperties, ServiceReference, ServiceRegistration};

use crate::bundle::Bundle;
use crate::events::{BundleListener, ListenerId};

/// A bundle's view of the runtime it lives in.
///
/// Listeners added here receive lifecycle events for other bundles, and
/// services registered here are attributed to the owning bundle.
#[derive(Debug, Clone)]
pub struct BundleContext {
    bundle: Arc<Bundle>,
}

impl BundleContext {
    pub(crate) fn new(bundle: Arc<Bundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &Arc<Bundle> {
        &self.bundle
    }

    /// Live bundles of the table this bundle was created in.
    pub fn bundles(&self) -> Vec<Arc<Bundle>> {
        self.bundle
            .table()
            .map(|table| table.snapshot())
            .unwrap_or_default()
    }

    pub fn bundle_by_id(&self, id: BundleId) -> Option<Arc<Bundle>> {
        self.bundle.table().and_then(|table| table.by_id(id))
    }

    pub fn add_bundle_listener(&self, listener: Arc<dyn BundleListener>) -> ListenerId {
        self.bundle.add_listener(listener)
    }

    pub fn remove_bundle_listener(&self, id: ListenerId) -> bool {
        self.bundle.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.bundle.listener_count()
    }

    pub fn register_service<I>(
        &self,
        service: Arc<I>,
        properties: ServiceProperties,
    ) -> ServiceRegistration
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bundle
            .registry()
            .register_service(self.bundle.id(), service, properties)
    }

    pub fn service_reference<I: ?Sized + 'static>(&self) -> Option<ServiceReference> {
        self.bundle.registry().service_reference::<I>()
    }

    pub fn service_references<I: ?Sized + 'static>(&self) -> Vec<ServiceReference> {
        self.bundle.registry().service_references::<I>()
    }

    pub fn service<I>(&self, reference: &ServiceReference) -> Option<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.bundle.registry().service::<I>(reference)
    }

    /// First service advertised under `I`.
    pub fn find_service<I>(&self) -> Option<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.service_reference::<I>()
            .and_then(|reference| self.service::<I>(&reference))
    }
}

impl PartialEq for BundleContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bundle, &other.bundle)
    }
}

impl Eq for BundleContext {}
