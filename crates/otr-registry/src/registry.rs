//! ---
//! otr_section: "03-service-registry"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Service registration identity, lookup, and removal."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use otr_common::BundleId;
use parking_lot::Mutex;
use tracing::debug;

use crate::properties::{ServiceProperties, OBJECT_CLASS};
use crate::reference::{RegistrationId, ServiceInterface, ServiceReference};

type Instance = Arc<dyn Any + Send + Sync>;

struct RegistryEntry {
    interface: ServiceInterface,
    service_name: String,
    owner: BundleId,
    properties: ServiceProperties,
    // Holds an `Arc<I>` for the advertised interface `I`.
    instance: Instance,
}

impl RegistryEntry {
    fn reference(&self, id: RegistrationId) -> ServiceReference {
        ServiceReference {
            id,
            interface: self.interface,
            service_name: self.service_name.clone(),
            owner: self.owner,
            properties: self.properties.clone(),
        }
    }

    fn downcast<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        self.instance.downcast_ref::<Arc<I>>().cloned()
    }
}

/// Registry shared by every bundle of one runtime.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: Mutex<IndexMap<RegistrationId, RegistryEntry>>,
}

impl ServiceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `service` under interface `I` with a fresh identity.
    ///
    /// An `objectClass` property naming the interface is added unless the
    /// caller already supplied one.
    pub fn register_service<I>(
        self: &Arc<Self>,
        owner: BundleId,
        service: Arc<I>,
        properties: ServiceProperties,
    ) -> ServiceRegistration
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register_with_id(RegistrationId::new(), owner, service, properties)
    }

    /// Publish `service` under an identity chosen by the caller.
    ///
    /// Registering an identity twice replaces the earlier registration.
    pub fn register_with_id<I>(
        self: &Arc<Self>,
        id: RegistrationId,
        owner: BundleId,
        service: Arc<I>,
        mut properties: ServiceProperties,
    ) -> ServiceRegistration
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let interface = ServiceInterface::of::<I>();
        if properties.get(OBJECT_CLASS).is_none() {
            properties.insert(OBJECT_CLASS, interface.name());
        }
        let entry = RegistryEntry {
            interface,
            service_name: interface.name().to_owned(),
            owner,
            properties,
            instance: Arc::new(service),
        };
        let replaced = self.entries.lock().insert(id, entry).is_some();
        debug!(registration = %id, interface = %interface, owner = %owner, replaced, "service registered");

        ServiceRegistration {
            id,
            interface,
            owner,
            registry: Arc::downgrade(self),
        }
    }

    /// Remove a registration. Unknown identities are ignored.
    pub fn unregister_service(&self, id: RegistrationId) -> bool {
        let removed = self.entries.lock().shift_remove(&id);
        match &removed {
            Some(entry) => {
                debug!(registration = %id, interface = %entry.interface, "service unregistered")
            }
            None => debug!(registration = %id, "unregister of unknown registration ignored"),
        }
        removed.is_some()
    }

    /// References to every current registration, in registration order.
    pub fn registered_services(&self) -> Vec<ServiceReference> {
        self.entries
            .lock()
            .iter()
            .map(|(id, entry)| entry.reference(*id))
            .collect()
    }

    /// Same as [`registered_services`](Self::registered_services); usage is not tracked.
    pub fn services_in_use(&self) -> Vec<ServiceReference> {
        self.registered_services()
    }

    /// References advertised under interface `I`.
    pub fn service_references<I: ?Sized + 'static>(&self) -> Vec<ServiceReference> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.interface.is::<I>())
            .map(|(id, entry)| entry.reference(*id))
            .collect()
    }

    /// Earliest registration advertised under `I`.
    pub fn service_reference<I: ?Sized + 'static>(&self) -> Option<ServiceReference> {
        self.entries
            .lock()
            .iter()
            .find(|(_, entry)| entry.interface.is::<I>())
            .map(|(id, entry)| entry.reference(*id))
    }

    /// Instance behind a reference, if still registered under `I`.
    pub fn service<I>(&self, reference: &ServiceReference) -> Option<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.entries
            .lock()
            .get(&reference.id)
            .and_then(RegistryEntry::downcast::<I>)
    }

    /// Every instance advertised under `I`, in registration order.
    pub fn services<I>(&self) -> Vec<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.entries
            .lock()
            .values()
            .filter_map(RegistryEntry::downcast::<I>)
            .collect()
    }

    /// References published by one bundle.
    pub fn owned_by(&self, owner: BundleId) -> Vec<ServiceReference> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(id, entry)| entry.reference(*id))
            .collect()
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: RegistrationId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn set_properties(&self, id: RegistrationId, properties: ServiceProperties) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        let object_class = entry.properties.get(OBJECT_CLASS).map(str::to_owned);
        entry.properties = properties;
        if let Some(object_class) = object_class {
            if entry.properties.get(OBJECT_CLASS).is_none() {
                entry.properties.insert(OBJECT_CLASS, object_class);
            }
        }
        true
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("registrations", &self.len())
            .finish()
    }
}

/// Handle returned to the publisher of a service.
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    id: RegistrationId,
    interface: ServiceInterface,
    owner: BundleId,
    registry: Weak<ServiceRegistry>,
}

impl ServiceRegistration {
    /// Identity of this registration.
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Interface the service was published under.
    pub fn interface(&self) -> ServiceInterface {
        self.interface
    }

    /// Bundle that published the service.
    pub fn owner(&self) -> BundleId {
        self.owner
    }

    /// Name the service was registered under.
    pub fn service_name(&self) -> &'static str {
        self.interface.name()
    }

    /// Current snapshot of this registration, `None` once unregistered.
    pub fn reference(&self) -> Option<ServiceReference> {
        let registry = self.registry.upgrade()?;
        let reference = registry
            .entries
            .lock()
            .get(&self.id)
            .map(|entry| entry.reference(self.id));
        reference
    }

    /// Replace the property bag. The `objectClass` property survives.
    pub fn set_properties(&self, properties: ServiceProperties) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.set_properties(self.id, properties))
    }

    /// Withdraw the service. Safe to call repeatedly.
    pub fn unregister(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.unregister_service(self.id))
    }
}

impl PartialEq for ServiceRegistration {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceRegistration {}
